use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use library_catalog::adapters::memory::{BookRepository, LoanRepository};
use library_catalog::api::handlers::AppState;
use library_catalog::api::router::create_router;
use library_catalog::api::types::*;
use library_catalog::application::ServiceDependencies;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

struct TestApp {
    router: axum::Router,
    books: Arc<BookRepository>,
    loans: Arc<LoanRepository>,
}

/// インメモリのリポジトリで実際のAPIルーターを組み立てる
fn setup_e2e_app() -> TestApp {
    let books = Arc::new(BookRepository::new());
    let loans = Arc::new(LoanRepository::new(books.clone()));

    let app_state = Arc::new(AppState {
        service_deps: ServiceDependencies::new(books.clone(), loans.clone()),
        default_page_size: 20,
    });

    TestApp {
        router: create_router(app_state),
        books,
        loans,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.router.clone().oneshot(request).await.unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_book(app: &TestApp, title: &str, author: &str, isbn: &str) -> BookResponse {
    let response = send(
        app,
        "POST",
        "/api/books",
        Some(json!({ "title": title, "author": author, "isbn": isbn })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

// ============================================================================
// 書籍
// ============================================================================

#[tokio::test]
async fn test_e2e_create_book() {
    let app = setup_e2e_app();

    let book = create_book(&app, "As aventuras de wendz", "Pedro", "321").await;

    assert!(book.id.is_some());
    assert_eq!(book.title, "As aventuras de wendz");
    assert_eq!(book.author, "Pedro");
    assert_eq!(book.isbn, "321");
}

#[tokio::test]
async fn test_e2e_create_book_duplicated_isbn() {
    let app = setup_e2e_app();
    create_book(&app, "As aventuras de wendz", "Pedro", "321").await;

    let response = send(
        &app,
        "POST",
        "/api/books",
        Some(json!({ "title": "Outro", "author": "Maria", "isbn": "321" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors, vec!["Isbn already registered"]);
    assert_eq!(app.books.count().unwrap(), 1);
}

#[tokio::test]
async fn test_e2e_create_book_validation_errors() {
    let app = setup_e2e_app();

    let response = send(&app, "POST", "/api/books", Some(json!({}))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors.len(), 3);
    assert_eq!(app.books.count().unwrap(), 0);
}

#[tokio::test]
async fn test_e2e_get_book() {
    let app = setup_e2e_app();
    let created = create_book(&app, "Dom Casmurro", "Machado de Assis", "123").await;

    let response = send(
        &app,
        "GET",
        &format!("/api/books/{}", created.id.unwrap()),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let book: BookResponse = read_json(response).await;
    assert_eq!(book, created);
}

#[tokio::test]
async fn test_e2e_get_missing_book() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/api/books/1", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_update_book() {
    let app = setup_e2e_app();
    let created = create_book(&app, "Dom Casmurro", "Machado", "123").await;
    let id = created.id.unwrap();

    let response = send(
        &app,
        "PUT",
        &format!("/api/books/{}", id),
        Some(json!({ "title": "Dom Casmurro", "author": "Machado de Assis", "isbn": "123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let book: BookResponse = read_json(response).await;
    assert_eq!(book.id, Some(id));
    assert_eq!(book.author, "Machado de Assis");
    assert_eq!(app.books.count().unwrap(), 1);
}

#[tokio::test]
async fn test_e2e_update_book_to_isbn_of_another_book() {
    let app = setup_e2e_app();
    create_book(&app, "Dom Casmurro", "Machado de Assis", "111").await;
    let other = create_book(&app, "Quincas Borba", "Machado de Assis", "222").await;

    let response = send(
        &app,
        "PUT",
        &format!("/api/books/{}", other.id.unwrap()),
        Some(json!({ "title": "Quincas Borba", "author": "Machado de Assis", "isbn": "111" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors, vec!["Isbn already registered"]);

    let response = send(&app, "GET", "/api/books?isbn=111", None).await;
    let page: PageResponse<BookResponse> = read_json(response).await;
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].title, "Dom Casmurro");
}

#[tokio::test]
async fn test_e2e_update_missing_book() {
    let app = setup_e2e_app();

    let response = send(
        &app,
        "PUT",
        "/api/books/1",
        Some(json!({ "title": "A", "author": "B", "isbn": "C" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.books.count().unwrap(), 0);
}

#[tokio::test]
async fn test_e2e_delete_book() {
    let app = setup_e2e_app();
    let created = create_book(&app, "Dom Casmurro", "Machado de Assis", "123").await;
    let uri = format!("/api/books/{}", created.id.unwrap());

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.books.count().unwrap(), 0);
}

#[tokio::test]
async fn test_e2e_find_books_paged() {
    let app = setup_e2e_app();
    create_book(&app, "Rust in Action", "Tim McNamara", "1").await;
    create_book(&app, "Programming Rust", "Jim Blandy", "2").await;
    create_book(&app, "The Go Programming Language", "Alan Donovan", "3").await;

    let response = send(&app, "GET", "/api/books?title=RUST&page=0&size=100", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page: PageResponse<BookResponse> = read_json(response).await;
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.page_number, 0);
    assert_eq!(page.page_size, 100);
    assert_eq!(page.total_elements, 2);
}

#[tokio::test]
async fn test_e2e_find_books_defaults() {
    let app = setup_e2e_app();
    create_book(&app, "Rust in Action", "Tim McNamara", "1").await;

    let response = send(&app, "GET", "/api/books", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page: PageResponse<BookResponse> = read_json(response).await;
    assert_eq!(page.page_size, 20);
    assert_eq!(page.total_elements, 1);
}

#[tokio::test]
async fn test_e2e_find_books_zero_size() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/api/books?size=0", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors.len(), 1);
}

// ============================================================================
// 貸出
// ============================================================================

#[tokio::test]
async fn test_e2e_create_loan_returns_bare_id() {
    let app = setup_e2e_app();
    create_book(&app, "Memórias Póstumas", "Machado de Assis", "123").await;

    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Fulano" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let loan_id: i64 = read_json(response).await;
    assert_eq!(loan_id, 1);
    assert_eq!(app.loans.count().unwrap(), 1);
}

#[tokio::test]
async fn test_e2e_create_loan_unknown_isbn() {
    let app = setup_e2e_app();

    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Fulano" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors, vec!["Book not found for passed isbn"]);
    assert_eq!(app.loans.count().unwrap(), 0);
}

#[tokio::test]
async fn test_e2e_create_loan_already_loaned() {
    let app = setup_e2e_app();
    create_book(&app, "Memórias Póstumas", "Machado de Assis", "123").await;
    let body = json!({ "isbn": "123", "customer": "Fulano" });

    let first = send(&app, "POST", "/api/loans", Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = send(&app, "POST", "/api/loans", Some(body)).await;

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(second).await;
    assert_eq!(error.errors, vec!["Book already loaned"]);
    assert_eq!(app.loans.count().unwrap(), 1);
}

#[tokio::test]
async fn test_e2e_create_loan_validation_errors() {
    let app = setup_e2e_app();

    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "", "customer": null })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors, vec!["isbn is required", "customer is required"]);
}

#[tokio::test]
async fn test_e2e_full_loan_flow() {
    let app = setup_e2e_app();
    let book = create_book(&app, "Memórias Póstumas", "Machado de Assis", "123").await;

    // Step 1: 貸出作成
    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Fulano" })),
    )
    .await;
    let loan_id: i64 = read_json(response).await;

    // Step 2: 貸出詳細取得
    let response = send(&app, "GET", &format!("/api/loans/{}", loan_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let loan: LoanResponse = read_json(response).await;
    assert_eq!(loan.id, Some(loan_id));
    assert_eq!(loan.customer, "Fulano");
    assert_eq!(loan.book, book);
    assert!(!loan.returned);

    // Step 3: 返却
    let response = send(
        &app,
        "PATCH",
        &format!("/api/loans/{}", loan_id),
        Some(json!({ "returned": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let loan: LoanResponse = read_json(response).await;
    assert!(loan.returned);

    // Step 4: 返却後は再度貸し出せる
    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Ciclano" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.loans.count().unwrap(), 2);
}

#[tokio::test]
async fn test_e2e_reopen_loan_of_book_loaned_again() {
    let app = setup_e2e_app();
    create_book(&app, "Memórias Póstumas", "Machado de Assis", "123").await;

    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Fulano" })),
    )
    .await;
    let first: i64 = read_json(response).await;
    let uri = format!("/api/loans/{}", first);

    let response = send(&app, "PATCH", &uri, Some(json!({ "returned": true }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Ciclano" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, "PATCH", &uri, Some(json!({ "returned": false }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.errors, vec!["Book already loaned"]);

    let response = send(&app, "GET", &uri, None).await;
    let loan: LoanResponse = read_json(response).await;
    assert!(loan.returned);
}

#[tokio::test]
async fn test_e2e_loan_of_deleted_book_is_not_found() {
    let app = setup_e2e_app();
    let book = create_book(&app, "Memórias Póstumas", "Machado de Assis", "123").await;

    let response = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "isbn": "123", "customer": "Fulano" })),
    )
    .await;
    let loan_id: i64 = read_json(response).await;

    let response = send(
        &app,
        "DELETE",
        &format!("/api/books/{}", book.id.unwrap()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &format!("/api/loans/{}", loan_id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.loans.count().unwrap(), 1);
}

#[tokio::test]
async fn test_e2e_get_missing_loan() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/api/loans/99", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "PATCH",
        "/api/loans/99",
        Some(json!({ "returned": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_health_check() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}
