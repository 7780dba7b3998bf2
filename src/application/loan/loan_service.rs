use crate::domain::{Loan, LoanId};
use crate::ports::{ActiveLoanConflict, LoanRepository};
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};

/// 保存時のリポジトリエラーを変換する
///
/// 未返却貸出の一意制約違反は`BookAlreadyLoaned`として扱う。
fn save_error(err: Box<dyn std::error::Error + Send + Sync>) -> LoanApplicationError {
    if err.is::<ActiveLoanConflict>() {
        LoanApplicationError::BookAlreadyLoaned
    } else {
        LoanApplicationError::RepositoryError(err)
    }
}

/// 貸出のビジネスルールを持つサービス
#[derive(Clone)]
pub struct LoanService {
    repository: Arc<dyn LoanRepository>,
}

impl LoanService {
    pub fn new(repository: Arc<dyn LoanRepository>) -> Self {
        Self { repository }
    }

    /// 貸出を登録する
    ///
    /// 書籍の解決（ISBN検索）は呼び出し側の責務。ここでは同じ書籍が
    /// 未返却のまま貸し出されていないことだけを確認する。
    ///
    /// # エラー
    /// - InvalidArgument: 書籍が永続化されていない（IDがない）
    /// - BookAlreadyLoaned: 書籍が貸出中（貸出は保存されない）
    pub async fn save(&self, loan: Loan) -> Result<Loan> {
        let book_id = loan
            .book
            .id
            .ok_or(LoanApplicationError::InvalidArgument("Loan book id can't be null"))?;

        let already_loaned = self
            .repository
            .exists_active_loan_for_book(book_id)
            .await
            .map_err(LoanApplicationError::RepositoryError)?;

        if already_loaned {
            tracing::info!(book_id = %book_id, "rejected loan of a book already on loan");
            return Err(LoanApplicationError::BookAlreadyLoaned);
        }

        let saved = self.repository.save(loan).await.map_err(save_error)?;

        tracing::info!(loan_id = ?saved.id, book_id = %book_id, "loan saved");
        Ok(saved)
    }

    /// IDで貸出を取得する。存在しない場合は`None`
    pub async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(LoanApplicationError::RepositoryError)
    }

    /// 貸出を更新する（返却処理）
    ///
    /// IDがない場合はリポジトリにアクセスせずに失敗する。
    /// 返却済みの貸出を未返却に戻す場合は、新規貸出と同じく
    /// 書籍が他で貸出中でないことを確認する。
    ///
    /// # エラー
    /// - BookAlreadyLoaned: 戻そうとした書籍が別の貸出で貸出中
    pub async fn update(&self, loan: Loan) -> Result<Loan> {
        let id = loan
            .id
            .ok_or(LoanApplicationError::InvalidArgument("Loan id can't be null"))?;

        tracing::debug!(loan_id = %id, returned = loan.returned, "updating loan");

        if loan.is_active() {
            let reopening = self
                .repository
                .find_by_id(id)
                .await
                .map_err(LoanApplicationError::RepositoryError)?
                .is_some_and(|current| !current.is_active());

            if reopening {
                let book_id = loan
                    .book
                    .id
                    .ok_or(LoanApplicationError::InvalidArgument("Loan book id can't be null"))?;

                let already_loaned = self
                    .repository
                    .exists_active_loan_for_book(book_id)
                    .await
                    .map_err(LoanApplicationError::RepositoryError)?;

                if already_loaned {
                    tracing::info!(
                        loan_id = %id,
                        book_id = %book_id,
                        "rejected reopening a loan for a book already on loan"
                    );
                    return Err(LoanApplicationError::BookAlreadyLoaned);
                }
            }
        }

        self.repository.save(loan).await.map_err(save_error)
    }
}
