use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, IsbnConflict, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct BookStore {
    last_id: i64,
    books: BTreeMap<BookId, Book>,
}

/// BookRepositoryのインメモリ実装
///
/// IDは単調増加のカウンタで採番する。走査はID順なのでページングは安定する。
/// ISBNの一意性はテーブルの一意インデックスと同じく保存時に強制する。
pub struct BookRepository {
    store: Mutex<BookStore>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(BookStore::default()),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, BookStore>> {
        self.store
            .lock()
            .map_err(|_| "book store lock poisoned".into())
    }

    /// 保存されている書籍の件数
    pub fn count(&self) -> Result<usize> {
        Ok(self.store()?.books.len())
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        Ok(self.store()?.books.values().any(|book| book.isbn == isbn))
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.store()?.books.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        Ok(self
            .store()?
            .books
            .values()
            .find(|book| book.isbn == isbn)
            .cloned())
    }

    async fn save(&self, book: Book) -> Result<Book> {
        let mut store = self.store()?;
        if store
            .books
            .values()
            .any(|other| other.isbn == book.isbn && other.id != book.id)
        {
            return Err(IsbnConflict(book.isbn).into());
        }

        let id = match book.id {
            Some(id) => {
                store.last_id = store.last_id.max(id.value());
                id
            }
            None => {
                store.last_id += 1;
                BookId::from_i64(store.last_id)
            }
        };
        let saved = book.with_id(id);
        store.books.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        self.store()?.books.remove(&id);
        Ok(())
    }

    async fn find_all(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let matching: Vec<Book> = self
            .store()?
            .books
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        Ok(Page::slice(matching, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookExample;

    #[tokio::test]
    async fn test_save_assigns_increasing_ids() {
        let repository = BookRepository::new();

        let first = repository.save(Book::new("A", "X", "1")).await.unwrap();
        let second = repository.save(Book::new("B", "Y", "2")).await.unwrap();

        assert_eq!(first.id, Some(BookId::from_i64(1)));
        assert_eq!(second.id, Some(BookId::from_i64(2)));
        assert_eq!(repository.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_with_id_overwrites() {
        let repository = BookRepository::new();
        let saved = repository.save(Book::new("A", "X", "1")).await.unwrap();

        let replacement = Book {
            title: "A (2nd edition)".to_string(),
            ..saved.clone()
        };
        repository.save(replacement).await.unwrap();

        let found = repository.find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.title, "A (2nd edition)");
        assert_eq!(repository.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_isbn_held_by_another_book() {
        let repository = BookRepository::new();
        repository.save(Book::new("A", "X", "111")).await.unwrap();
        let second = repository.save(Book::new("B", "Y", "222")).await.unwrap();

        let err = repository
            .save(Book {
                isbn: "111".to_string(),
                ..second.clone()
            })
            .await
            .unwrap_err();
        assert!(err.is::<IsbnConflict>());

        let duplicate = repository.save(Book::new("C", "Z", "111")).await.unwrap_err();
        assert!(duplicate.is::<IsbnConflict>());

        let stored = repository.find_by_id(second.id.unwrap()).await.unwrap();
        assert_eq!(stored, Some(second));
        assert_eq!(repository.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_exists_by_isbn_is_case_sensitive() {
        let repository = BookRepository::new();
        repository.save(Book::new("A", "X", "isbn-a")).await.unwrap();

        assert!(repository.exists_by_isbn("isbn-a").await.unwrap());
        assert!(!repository.exists_by_isbn("ISBN-A").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_ok() {
        let repository = BookRepository::new();
        assert!(repository.delete(BookId::from_i64(99)).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_all_filters_and_pages() {
        let repository = BookRepository::new();
        for i in 0..5 {
            repository
                .save(Book::new(format!("Rust {}", i), "Ferris", format!("r{}", i)))
                .await
                .unwrap();
        }
        repository
            .save(Book::new("Go", "Gopher", "g1"))
            .await
            .unwrap();

        let example = BookExample {
            title: Some("rust".to_string()),
            ..Default::default()
        };
        let page = repository
            .find_all(
                &BookFilter::from_example(&example),
                PageRequest::new(1, 2).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(page.total_elements, 5);
        assert_eq!(page.content.len(), 2);
        assert!(page.content.iter().all(|b| b.author == "Ferris"));
    }
}
