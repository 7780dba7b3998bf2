use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 別の書籍が既に同じISBNを持っている
///
/// ストレージ側の一意制約に当たった場合に`save`が返す。
#[derive(Debug, thiserror::Error)]
#[error("isbn {0} is already held by another book")]
pub struct IsbnConflict(pub String);

/// 書籍リポジトリポート
///
/// 書籍の永続化を抽象化する。サービス層はこのトレイトだけに依存する。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 指定ISBNの書籍が存在するか確認する
    ///
    /// 大文字小文字を区別する完全一致。
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool>;

    /// IDで書籍を取得する
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// ISBNで書籍を取得する（完全一致）
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// 書籍を保存する
    ///
    /// `id`が`None`なら新規採番してINSERT、`Some`なら全項目を上書きする。
    /// 保存後の書籍（採番済みID付き）を返す。
    /// 別IDの書籍とISBNが重複する場合は`IsbnConflict`で失敗する。
    async fn save(&self, book: Book) -> Result<Book>;

    /// 書籍を削除する
    ///
    /// 存在しないIDの削除はエラーにしない。
    async fn delete(&self, id: BookId) -> Result<()>;

    /// フィルタに一致する書籍をページ単位で取得する
    ///
    /// 並び順は実装依存だが、同じデータに対しては安定していること。
    async fn find_all(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>>;
}
