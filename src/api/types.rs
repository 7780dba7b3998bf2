use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Book, BookExample, Loan, Page, commands::LoanBook};

/// 必須の文字列フィールドを検証する
///
/// 欠落・空白のみの場合はフィールドごとのメッセージを追加する。
fn require(field: &str, value: Option<String>, errors: &mut Vec<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            errors.push(format!("{} is required", field));
            String::new()
        }
    }
}

/// 書籍登録・更新リクエスト（POST /api/books, PUT /api/books/:id）
///
/// 欠落フィールドをJSONエラーではなく検証エラーとして返すため、すべてOption。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl BookRequest {
    /// 検証してIDなしの書籍に変換する
    pub fn validate(self) -> Result<Book, Vec<String>> {
        let mut errors = Vec::new();
        let title = require("title", self.title, &mut errors);
        let author = require("author", self.author, &mut errors);
        let isbn = require("isbn", self.isbn, &mut errors);

        if errors.is_empty() {
            Ok(Book::new(title, author, isbn))
        } else {
            Err(errors)
        }
    }
}

/// 貸出作成リクエスト（POST /api/loans）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanRequest {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}

impl LoanRequest {
    /// 検証して貸出コマンドに変換する
    pub fn validate(self) -> Result<LoanBook, Vec<String>> {
        let mut errors = Vec::new();
        let isbn = require("isbn", self.isbn, &mut errors);
        let customer = require("customer", self.customer, &mut errors);

        if errors.is_empty() {
            Ok(LoanBook { isbn, customer })
        } else {
            Err(errors)
        }
    }
}

/// 返却状態の更新リクエスト（PATCH /api/loans/:id）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLoanRequest {
    pub returned: bool,
}

/// 書籍検索のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct BookSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl BookSearchQuery {
    pub fn example(&self) -> BookExample {
        BookExample {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.value()),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
        }
    }
}

/// 貸出レスポンス（GET /api/loans/:id, PATCH /api/loans/:id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: Option<i64>,
    pub customer: String,
    pub book: BookResponse,
    pub loan_date: NaiveDate,
    pub returned: bool,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.map(|id| id.value()),
            customer: loan.customer,
            book: BookResponse::from(loan.book),
            loan_date: loan.loan_date,
            returned: loan.returned,
        }
    }
}

/// ページレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    pub fn from_page<U>(page: Page<U>) -> Self
    where
        T: From<U>,
    {
        let total_pages = page.total_pages();
        let page = page.map(T::from);
        Self {
            content: page.content,
            page_number: page.page_number,
            page_size: page.page_size,
            total_elements: page.total_elements,
            total_pages,
        }
    }
}

/// エラーレスポンス
///
/// 検証エラーはフィールドごとに1件、ビジネスルール違反は常に1件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn from_messages(errors: Vec<String>) -> Self {
        Self { errors }
    }
}
