use crate::application::{book::BookApplicationError, loan::LoanApplicationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーと検証エラーをラップし、
/// HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    /// 入力の構造的な不備（フィールドごとのメッセージ）
    Validation(Vec<String>),
    /// 要求されたリソースが存在しない
    NotFound(&'static str),
    Book(BookApplicationError),
    Loan(LoanApplicationError),
}

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        ApiError::Book(err)
    }
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal_error(context: &str, err: &dyn std::error::Error) -> (StatusCode, ErrorResponse) {
    tracing::error!(error = %err, source = ?err.source(), "{}", context);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("An unexpected error occurred"),
    )
}

fn book_error(err: &BookApplicationError) -> (StatusCode, ErrorResponse) {
    match err {
        // 400 Bad Request - ビジネスルール違反・誤用
        BookApplicationError::DuplicateIsbn | BookApplicationError::InvalidArgument(_) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
        }

        // 500 Internal Server Error - システム障害
        BookApplicationError::RepositoryError(_) => internal_error("Book repository error", err),
    }
}

fn loan_error(err: &LoanApplicationError) -> (StatusCode, ErrorResponse) {
    match err {
        // 400 Bad Request - 書籍が解決できない、または貸出中
        LoanApplicationError::BookNotFound
        | LoanApplicationError::BookAlreadyLoaned
        | LoanApplicationError::InvalidArgument(_) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
        }

        // 404 Not Found
        LoanApplicationError::LoanNotFound => {
            (StatusCode::NOT_FOUND, ErrorResponse::new(err.to_string()))
        }

        // 書籍側のエラーは書籍のマッピングに従う
        LoanApplicationError::BookServiceError(inner) => book_error(inner),

        // 500 Internal Server Error - システム障害
        LoanApplicationError::RepositoryError(_) => internal_error("Loan repository error", err),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(messages) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::from_messages(messages.clone()),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse::new(*message)),
            ApiError::Book(err) => book_error(err),
            ApiError::Loan(err) => loan_error(err),
        };

        (status, Json(body)).into_response()
    }
}
