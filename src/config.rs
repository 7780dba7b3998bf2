use anyhow::{Context, Result};
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL接続文字列。未設定ならインメモリのリポジトリを使う
    pub database_url: Option<String>,
    /// サーバーポート（既定値: 3000）
    pub port: u16,
    /// コネクションプールの最大接続数（既定値: 5）
    pub max_connections: u32,
    /// 書籍検索の既定ページサイズ（既定値: 20）
    pub default_page_size: u32,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `.env`ファイルがあれば先に読み込む（なくてもエラーにしない）。
    ///
    /// - `DATABASE_URL`: PostgreSQL接続文字列（任意）
    /// - `PORT`: サーバーポート
    /// - `DATABASE_MAX_CONNECTIONS`: 最大接続数
    /// - `DEFAULT_PAGE_SIZE`: 既定ページサイズ
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let default_page_size = parse_or(&lookup, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

        if default_page_size == 0 {
            anyhow::bail!("DEFAULT_PAGE_SIZE must be greater than zero");
        }

        Ok(Self {
            database_url,
            port,
            max_connections,
            default_page_size,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
