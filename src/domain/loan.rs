use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Book, LoanId};

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 書籍は値として参照するだけで、そのライフサイクルは所有しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Option<LoanId>,
    pub customer: String,
    pub book: Book,
    pub loan_date: NaiveDate,
    pub returned: bool,
}

impl Loan {
    /// 未永続化の貸出を作成する
    ///
    /// 返却フラグは常にfalseで始まる。
    pub fn new(book: Book, customer: impl Into<String>, loan_date: NaiveDate) -> Self {
        Self {
            id: None,
            customer: customer.into(),
            book,
            loan_date,
            returned: false,
        }
    }

    pub fn with_id(self, id: LoanId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// 返却されていない貸出か
    pub fn is_active(&self) -> bool {
        !self.returned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_loan_is_active_and_unpersisted() {
        let book = Book::new("Dom Casmurro", "Machado de Assis", "123");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let loan = Loan::new(book.clone(), "Fulano", date);

        assert!(loan.id.is_none());
        assert!(loan.is_active());
        assert_eq!(loan.customer, "Fulano");
        assert_eq!(loan.book, book);
        assert_eq!(loan.loan_date, date);
    }

    #[test]
    fn test_returned_loan_is_not_active() {
        let book = Book::new("Dom Casmurro", "Machado de Assis", "123");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let loan = Loan {
            returned: true,
            ..Loan::new(book, "Fulano", date)
        };
        assert!(!loan.is_active());
    }
}
