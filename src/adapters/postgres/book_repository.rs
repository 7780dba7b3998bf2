use crate::domain::{Book, BookField, BookFilter, BookId, Page, PageRequest};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, IsbnConflict, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

/// booksのISBN一意インデックス名
const ISBN_UNIQUE_INDEX: &str = "books_isbn_key";

/// ISBNの一意制約違反を`IsbnConflict`に変換する
fn map_save_error(err: sqlx::Error, isbn: &str) -> Box<dyn std::error::Error + Send + Sync> {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() && db.constraint() == Some(ISBN_UNIQUE_INDEX) =>
        {
            IsbnConflict(isbn.to_string()).into()
        }
        _ => err.into(),
    }
}

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: Some(BookId::from_i64(row.get("id"))),
        title: row.get("title"),
        author: row.get("author"),
        isbn: row.get("isbn"),
    }
}

/// 検索フィールドに対応するカラム名
fn column(field: BookField) -> &'static str {
    match field {
        BookField::Title => "title",
        BookField::Author => "author",
        BookField::Isbn => "isbn",
    }
}

/// 部分一致用のLIKEパターンを作る
///
/// 検索文字列中の`%`、`_`、`\`はワイルドカードとして扱わないようエスケープする。
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// フィルタ条件をWHERE句として追加する（ILIKEのAND結合）
fn push_criteria(builder: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    for (i, criterion) in filter.criteria().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(column(criterion.field));
        builder.push(" ILIKE ");
        builder.push_bind(contains_pattern(&criterion.needle));
    }
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, isbn
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, isbn
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 書籍を保存する
    ///
    /// IDがなければINSERTで採番し、あればUPDATEで全項目を上書きする。
    /// 明示IDでのINSERTは行わないので、IDの採番は常にIDENTITYに任せる。
    async fn save(&self, book: Book) -> Result<Book> {
        let id: i64 = match book.id {
            None => sqlx::query_scalar(
                r#"
                INSERT INTO books (title, author, isbn)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_save_error(err, &book.isbn))?,
            Some(id) => sqlx::query_scalar(
                r#"
                UPDATE books
                SET title = $2, author = $3, isbn = $4
                WHERE id = $1
                RETURNING id
                "#,
            )
            .bind(id.value())
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| map_save_error(err, &book.isbn))?
            .ok_or_else(|| format!("book {} does not exist", id))?,
        };

        Ok(book.with_id(BookId::from_i64(id)))
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// フィルタ付きのページング検索
    ///
    /// 件数取得とページ取得の2クエリを発行する。並び順はID昇順。
    async fn find_all(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        push_criteria(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select_query =
            QueryBuilder::<Postgres>::new("SELECT id, title, author, isbn FROM books");
        push_criteria(&mut select_query, filter);
        select_query.push(" ORDER BY id LIMIT ");
        select_query.push_bind(i64::from(page.size()));
        select_query.push(" OFFSET ");
        select_query.push_bind(i64::try_from(page.offset())?);

        let rows = select_query.build().fetch_all(&self.pool).await?;
        let content = rows.iter().map(map_row_to_book).collect();

        Ok(Page::new(content, page, u64::try_from(total)?))
    }
}
