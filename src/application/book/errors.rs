use thiserror::Error;

/// 書籍アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// 同じISBNの書籍が既に登録されている
    #[error("Isbn already registered")]
    DuplicateIsbn,

    /// 呼び出し側の誤用（例: IDのない書籍の更新・削除）
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
