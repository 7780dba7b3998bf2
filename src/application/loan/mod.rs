mod errors;
mod loan_service;
mod workflow;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::LoanService;
pub use workflow::{loan_book, return_book};
