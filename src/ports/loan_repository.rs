use crate::domain::{BookId, Loan, LoanId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 同じ書籍に未返却の貸出が既にある
#[derive(Debug, thiserror::Error)]
#[error("book {0} already has an active loan")]
pub struct ActiveLoanConflict(pub BookId);

/// 貸出リポジトリポート
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 書籍に未返却の貸出があるか確認する
    ///
    /// 二重貸出の防止に使用される。
    async fn exists_active_loan_for_book(&self, book_id: BookId) -> Result<bool>;

    /// IDで貸出を取得する
    ///
    /// 書籍は現在の内容で復元する。書籍が削除済みの貸出は`None`。
    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>>;

    /// 貸出を保存する
    ///
    /// `id`が`None`なら新規採番、`Some`なら上書き（返却処理）。
    /// 未返却の貸出が同じ書籍に2件できる場合は`ActiveLoanConflict`で失敗する。
    async fn save(&self, loan: Loan) -> Result<Loan>;
}
