mod book_service;
mod errors;

pub use book_service::BookService;
pub use errors::{BookApplicationError, Result};
