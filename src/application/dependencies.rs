use crate::ports::{BookRepository, LoanRepository};
use std::sync::Arc;

use super::{book::BookService, loan::LoanService};

/// サービスの依存関係
///
/// リポジトリからサービスを明示的に組み立てる。ハンドラーと
/// 貸出ワークフローはこの構造体を通してサービスにアクセスする。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_service: BookService,
    pub loan_service: LoanService,
}

impl ServiceDependencies {
    pub fn new(
        book_repository: Arc<dyn BookRepository>,
        loan_repository: Arc<dyn LoanRepository>,
    ) -> Self {
        Self {
            book_service: BookService::new(book_repository),
            loan_service: LoanService::new(loan_repository),
        }
    }
}
