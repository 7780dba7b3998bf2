use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍 - カタログ管理の集約
///
/// `id`は永続化されるまで`None`。採番後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl Book {
    /// 未永続化の書籍を作成する
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }

    pub fn with_id(self, id: BookId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

/// 検索の例（Query by Example）
///
/// 値が入っているフィールドだけが検索条件になる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookExample {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

/// 検索可能なフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Title,
    Author,
    Isbn,
}

impl BookField {
    pub const ALL: [BookField; 3] = [BookField::Title, BookField::Author, BookField::Isbn];

    /// 書籍から対応するフィールド値を取り出す
    pub fn value_of<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            BookField::Title => &book.title,
            BookField::Author => &book.author,
            BookField::Isbn => &book.isbn,
        }
    }

    fn example_value<'a>(&self, example: &'a BookExample) -> Option<&'a str> {
        match self {
            BookField::Title => example.title.as_deref(),
            BookField::Author => example.author.as_deref(),
            BookField::Isbn => example.isbn.as_deref(),
        }
    }
}

/// 1フィールド分の条件：大文字小文字を区別しない部分一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCriterion {
    pub field: BookField,
    pub needle: String,
}

impl FieldCriterion {
    pub fn matches(&self, book: &Book) -> bool {
        self.field
            .value_of(book)
            .to_lowercase()
            .contains(&self.needle.to_lowercase())
    }
}

/// 書籍検索フィルタ
///
/// 条件はすべてAND結合。条件が空なら全件にマッチする。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    criteria: Vec<FieldCriterion>,
}

impl BookFilter {
    /// 例の値が入っているフィールドから条件を組み立てる
    pub fn from_example(example: &BookExample) -> Self {
        let criteria = BookField::ALL
            .iter()
            .filter_map(|field| {
                field.example_value(example).map(|needle| FieldCriterion {
                    field: *field,
                    needle: needle.to_string(),
                })
            })
            .collect();
        Self { criteria }
    }

    pub fn criteria(&self) -> &[FieldCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(book))
    }
}
