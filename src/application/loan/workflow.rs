use crate::application::ServiceDependencies;
use crate::domain::{
    Loan, LoanId,
    commands::{LoanBook, ReturnBook},
};
use chrono::Utc;

use super::errors::{LoanApplicationError, Result};

/// 書籍を貸し出す
///
/// 2つのサービスを順に呼び出す：
/// 1. ISBNで書籍を解決する（存在しなければ`BookNotFound`。LoanServiceは呼ばれない）
/// 2. 当日の日付で貸出を組み立てる
/// 3. LoanServiceで保存する（貸出中なら`BookAlreadyLoaned`をそのまま返す）
///
/// # 戻り値
/// 成功時は作成された貸出のIDのみ
pub async fn loan_book(deps: &ServiceDependencies, cmd: LoanBook) -> Result<LoanId> {
    // 1. 書籍の解決
    let book = deps
        .book_service
        .get_by_isbn(&cmd.isbn)
        .await
        .map_err(LoanApplicationError::BookServiceError)?
        .ok_or_else(|| {
            tracing::info!(isbn = %cmd.isbn, "loan requested for unknown isbn");
            LoanApplicationError::BookNotFound
        })?;

    // 2. 貸出の組み立て
    let loan = Loan::new(book, cmd.customer, Utc::now().date_naive());

    // 3. 保存
    let saved = deps.loan_service.save(loan).await?;

    saved.id.ok_or_else(|| {
        LoanApplicationError::RepositoryError("repository returned a loan without id".into())
    })
}

/// 貸出の返却状態を更新する
///
/// # エラー
/// - LoanNotFound: 貸出が存在しない
/// - BookAlreadyLoaned: 未返却に戻そうとしたが書籍は別の貸出で貸出中
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<Loan> {
    let loan = deps
        .loan_service
        .get_by_id(cmd.loan_id)
        .await?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    let updated = Loan {
        returned: cmd.returned,
        ..loan
    };

    deps.loan_service.update(updated).await
}
