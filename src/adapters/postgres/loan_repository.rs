use crate::domain::{Book, BookId, Loan, LoanId};
use crate::ports::loan_repository::{
    ActiveLoanConflict, LoanRepository as LoanRepositoryTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// 書籍ごとに未返却の貸出を1件に制限する部分一意インデックス
const ACTIVE_LOAN_INDEX: &str = "loans_active_book_idx";

/// 未返却貸出の一意制約違反を`ActiveLoanConflict`に変換する
fn map_save_error(err: sqlx::Error, book_id: BookId) -> Box<dyn std::error::Error + Send + Sync> {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() && db.constraint() == Some(ACTIVE_LOAN_INDEX) =>
        {
            ActiveLoanConflict(book_id).into()
        }
        _ => err.into(),
    }
}

/// PostgreSQLの行データ（loans JOIN books）をLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        id: Some(LoanId::from_i64(row.get("loan_id"))),
        customer: row.get("customer"),
        book: Book {
            id: Some(BookId::from_i64(row.get("book_id"))),
            title: row.get("title"),
            author: row.get("author"),
            isbn: row.get("isbn"),
        },
        loan_date: row.get("loan_date"),
        returned: row.get("returned"),
    }
}

/// LoanRepositoryのPostgreSQL実装
///
/// 貸出は書籍IDだけを保存し、取得時にbooksとJOINして書籍を復元する。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// 未返却の貸出の有無（部分一意インデックス loans_active_book_idx を使用）
    async fn exists_active_loan_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE book_id = $1 AND NOT returned)",
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT
                l.id AS loan_id,
                l.customer,
                l.loan_date,
                l.returned,
                b.id AS book_id,
                b.title,
                b.author,
                b.isbn
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE l.id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// 貸出を保存する
    ///
    /// IDがなければINSERT、あればUPDATE。書籍ごとの未返却貸出は
    /// 部分一意インデックスで1件に制限される。
    async fn save(&self, loan: Loan) -> Result<Loan> {
        let book_id = loan
            .book
            .id
            .ok_or("cannot persist a loan for an unsaved book")?;

        let id: i64 = match loan.id {
            None => sqlx::query_scalar(
                r#"
                INSERT INTO loans (customer, book_id, loan_date, returned)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(&loan.customer)
            .bind(book_id.value())
            .bind(loan.loan_date)
            .bind(loan.returned)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_save_error(err, book_id))?,
            Some(id) => sqlx::query_scalar(
                r#"
                UPDATE loans
                SET customer = $2, book_id = $3, loan_date = $4, returned = $5
                WHERE id = $1
                RETURNING id
                "#,
            )
            .bind(id.value())
            .bind(&loan.customer)
            .bind(book_id.value())
            .bind(loan.loan_date)
            .bind(loan.returned)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| map_save_error(err, book_id))?
            .ok_or_else(|| format!("loan {} does not exist", id))?,
        };

        Ok(loan.with_id(LoanId::from_i64(id)))
    }
}
