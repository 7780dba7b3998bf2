pub mod book_repository;
pub mod loan_repository;

pub use book_repository::{BookRepository, IsbnConflict};
pub use loan_repository::{ActiveLoanConflict, LoanRepository};
