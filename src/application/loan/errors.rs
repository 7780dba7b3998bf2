use crate::application::book::BookApplicationError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 指定ISBNの書籍が存在しない
    #[error("Book not found for passed isbn")]
    BookNotFound,

    /// 書籍が既に貸出中（未返却の貸出がある）
    #[error("Book already loaned")]
    BookAlreadyLoaned,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 呼び出し側の誤用（例: IDのない貸出の更新）
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// BookServiceのエラー
    #[error("Book service error")]
    BookServiceError(#[source] BookApplicationError),

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
