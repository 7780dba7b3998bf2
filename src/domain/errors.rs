/// ページ指定のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    /// ページサイズが0
    ZeroPageSize,
}

impl std::fmt::Display for PageRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageRequestError::ZeroPageSize => write!(f, "size must be greater than zero"),
        }
    }
}

impl std::error::Error for PageRequestError {}
