use crate::domain::{BookId, Loan, LoanId};
use crate::ports::BookRepository as BookRepositoryTrait;
use crate::ports::loan_repository::{
    ActiveLoanConflict, LoanRepository as LoanRepositoryTrait, Result,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::BookRepository;

#[derive(Default)]
struct LoanStore {
    last_id: i64,
    loans: BTreeMap<LoanId, Loan>,
}

/// LoanRepositoryのインメモリ実装
///
/// 書籍はインメモリの書籍リポジトリから取得時に引き直す。
/// PostgreSQL実装のJOINと同じく、書籍が削除された貸出は見つからない。
pub struct LoanRepository {
    store: Mutex<LoanStore>,
    books: Arc<BookRepository>,
}

impl LoanRepository {
    pub fn new(books: Arc<BookRepository>) -> Self {
        Self {
            store: Mutex::new(LoanStore::default()),
            books,
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, LoanStore>> {
        self.store
            .lock()
            .map_err(|_| "loan store lock poisoned".into())
    }

    /// 保存されている貸出の件数（書籍の削除有無に関係なく数える）
    pub fn count(&self) -> Result<usize> {
        Ok(self.store()?.loans.len())
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn exists_active_loan_for_book(&self, book_id: BookId) -> Result<bool> {
        Ok(self
            .store()?
            .loans
            .values()
            .any(|loan| loan.book.id == Some(book_id) && loan.is_active()))
    }

    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let stored = self.store()?.loans.get(&id).cloned();
        let Some(loan) = stored else {
            return Ok(None);
        };
        let Some(book_id) = loan.book.id else {
            return Ok(None);
        };

        let book = self.books.find_by_id(book_id).await?;
        Ok(book.map(|book| Loan { book, ..loan }))
    }

    async fn save(&self, loan: Loan) -> Result<Loan> {
        let mut store = self.store()?;
        if let Some(book_id) = loan.book.id {
            let conflicting = loan.is_active()
                && store.loans.values().any(|other| {
                    other.book.id == Some(book_id) && other.is_active() && other.id != loan.id
                });
            if conflicting {
                return Err(ActiveLoanConflict(book_id).into());
            }
        }

        let id = match loan.id {
            Some(id) => {
                store.last_id = store.last_id.max(id.value());
                id
            }
            None => {
                store.last_id += 1;
                LoanId::from_i64(store.last_id)
            }
        };
        let saved = loan.with_id(id);
        store.loans.insert(id, saved.clone());
        Ok(saved)
    }
}
