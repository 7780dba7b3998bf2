pub mod book;
pub mod commands;
pub mod errors;
pub mod loan;
pub mod page;
pub mod value_objects;

pub use book::*;
pub use errors::*;
pub use loan::Loan;
pub use page::*;
pub use value_objects::*;
