use crate::domain::{Book, BookExample, BookFilter, BookId, Page, PageRequest};
use crate::ports::{BookRepository, IsbnConflict};
use std::sync::Arc;

use super::errors::{BookApplicationError, Result};

const MISSING_BOOK_ID: &str = "Book id can't be null";

/// 保存時のリポジトリエラーを変換する
///
/// 一意制約違反はチェックをすり抜けた重複ISBNなので`DuplicateIsbn`として扱う。
fn save_error(err: Box<dyn std::error::Error + Send + Sync>) -> BookApplicationError {
    if err.is::<IsbnConflict>() {
        BookApplicationError::DuplicateIsbn
    } else {
        BookApplicationError::RepositoryError(err)
    }
}

/// 書籍のライフサイクルに関するビジネスルールを持つサービス
///
/// リポジトリへの参照だけを保持し、呼び出しをまたぐ状態は持たない。
/// 各メソッドがそれぞれ1つの作業単位になる。
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// 書籍を登録する
    ///
    /// ビジネスルール：
    /// - ISBNは全書籍で一意（大文字小文字を区別する完全一致）
    ///
    /// # 一貫性保証
    ///
    /// 存在確認とINSERTはアトミックではない。同時に同じISBNを登録する
    /// リクエストが競合した場合の最終的な防御はストレージ側の一意制約に任せる。
    ///
    /// # エラー
    /// - DuplicateIsbn: 同じISBNが既に存在する（リポジトリは変更されない）
    pub async fn save(&self, book: Book) -> Result<Book> {
        tracing::debug!(isbn = %book.isbn, "saving book");

        let exists = self
            .repository
            .exists_by_isbn(&book.isbn)
            .await
            .map_err(BookApplicationError::RepositoryError)?;

        if exists {
            tracing::info!(isbn = %book.isbn, "rejected book with duplicated isbn");
            return Err(BookApplicationError::DuplicateIsbn);
        }

        let saved = self.repository.save(book).await.map_err(save_error)?;

        tracing::info!(book_id = ?saved.id, isbn = %saved.isbn, "book saved");
        Ok(saved)
    }

    /// IDで書籍を取得する。存在しない場合は`None`
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(BookApplicationError::RepositoryError)
    }

    /// ISBNで書籍を取得する（完全一致）。貸出作成で使用される
    pub async fn get_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        self.repository
            .find_by_isbn(isbn)
            .await
            .map_err(BookApplicationError::RepositoryError)
    }

    /// 書籍を更新する（全項目の上書き）
    ///
    /// IDがない場合はリポジトリにアクセスせずに失敗する。
    ///
    /// # エラー
    /// - DuplicateIsbn: 別の書籍が同じISBNを持っている（リポジトリは変更されない）
    pub async fn update(&self, book: Book) -> Result<Book> {
        let id = book
            .id
            .ok_or(BookApplicationError::InvalidArgument(MISSING_BOOK_ID))?;

        tracing::debug!(book_id = %id, "updating book");

        let holder = self
            .repository
            .find_by_isbn(&book.isbn)
            .await
            .map_err(BookApplicationError::RepositoryError)?;

        if holder.is_some_and(|other| other.id != Some(id)) {
            tracing::info!(
                book_id = %id,
                isbn = %book.isbn,
                "rejected update to an isbn held by another book"
            );
            return Err(BookApplicationError::DuplicateIsbn);
        }

        self.repository.save(book).await.map_err(save_error)
    }

    /// 書籍を削除する
    ///
    /// IDがない場合はリポジトリにアクセスせずに失敗する。
    /// 貸出中の書籍でも削除は拒否しない。
    pub async fn delete(&self, book: &Book) -> Result<()> {
        let id = book
            .id
            .ok_or(BookApplicationError::InvalidArgument(MISSING_BOOK_ID))?;

        tracing::debug!(book_id = %id, "deleting book");

        self.repository
            .delete(id)
            .await
            .map_err(BookApplicationError::RepositoryError)
    }

    /// 例による検索（ページング付き）
    ///
    /// 例で値が入っているフィールドごとに、大文字小文字を区別しない部分一致で
    /// 絞り込み、すべての条件をAND結合する。値のないフィールドは無視する。
    pub async fn find(&self, example: &BookExample, page: PageRequest) -> Result<Page<Book>> {
        let filter = BookFilter::from_example(example);

        tracing::debug!(
            criteria = filter.criteria().len(),
            page = page.page(),
            size = page.size(),
            "searching books"
        );

        self.repository
            .find_all(&filter, page)
            .await
            .map_err(BookApplicationError::RepositoryError)
    }
}
