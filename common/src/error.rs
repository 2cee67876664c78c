//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data URL error: {0}")]
    DataUrl(String),

    #[error("Index out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
