use crate::application::{
    ServiceDependencies,
    loan::{loan_book as execute_loan_book, return_book as execute_return_book},
};
use crate::domain::{
    BookId, LoanId, PageRequest,
    commands::ReturnBook,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        BookRequest, BookResponse, BookSearchQuery, LoanRequest, LoanResponse, PageResponse,
        ReturnLoanRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    /// 検索で`size`が省略されたときのページサイズ
    pub default_page_size: u32,
}

// ============================================================================
// Book handlers
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// ISBNが既に登録されている場合は400を返す。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = req.validate().map_err(ApiError::Validation)?;

    let saved = state.service_deps.book_service.save(book).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(saved))))
}

/// GET /api/books/:id - 書籍をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state
        .service_deps
        .book_service
        .get_by_id(BookId::from_i64(id))
        .await?
        .ok_or(ApiError::NotFound("Book not found"))?;

    Ok(Json(BookResponse::from(book)))
}

/// PUT /api/books/:id - 書籍を更新（全項目上書き）
///
/// 存在しない書籍の場合は404を返す。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = req.validate().map_err(ApiError::Validation)?;
    let book_service = &state.service_deps.book_service;
    let id = BookId::from_i64(id);

    book_service
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Book not found"))?;

    let updated = book_service.update(book.with_id(id)).await?;

    Ok(Json(BookResponse::from(updated)))
}

/// DELETE /api/books/:id - 書籍を削除
///
/// 存在しない書籍の場合は404を返す。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let book_service = &state.service_deps.book_service;

    let book = book_service
        .get_by_id(BookId::from_i64(id))
        .await?
        .ok_or(ApiError::NotFound("Book not found"))?;

    book_service.delete(&book).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books - 書籍を例で検索（ページング付き）
///
/// クエリパラメータ:
/// - title, author, isbn: 部分一致（大文字小文字を区別しない）、省略可
/// - page: 0始まりのページ番号（既定値 0）
/// - size: ページサイズ（既定値は設定値、0は不可）
pub async fn find_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookSearchQuery>,
) -> Result<Json<PageResponse<BookResponse>>, ApiError> {
    let page = PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(state.default_page_size),
    )
    .map_err(|e| ApiError::Validation(vec![e.to_string()]))?;

    let result = state
        .service_deps
        .book_service
        .find(&query.example(), page)
        .await?;

    Ok(Json(PageResponse::from_page(result)))
}

// ============================================================================
// Loan handlers
// ============================================================================

/// POST /api/loans - 貸出を作成
///
/// レスポンスは作成された貸出のIDのみ。
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanRequest>,
) -> Result<(StatusCode, Json<i64>), ApiError> {
    let cmd = req.validate().map_err(ApiError::Validation)?;

    let loan_id = execute_loan_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(loan_id.value())))
}

/// GET /api/loans/:id - 貸出をIDで取得
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = state
        .service_deps
        .loan_service
        .get_by_id(LoanId::from_i64(id))
        .await?
        .ok_or(ApiError::NotFound("Loan not found"))?;

    Ok(Json(LoanResponse::from(loan)))
}

/// PATCH /api/loans/:id - 返却状態を更新
pub async fn update_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReturnLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = ReturnBook {
        loan_id: LoanId::from_i64(id),
        returned: req.returned,
    };

    let loan = execute_return_book(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}
