//! Photo Deck Common Library
//!
//! CLIと書き出し処理で共有される型とユーティリティ

pub mod types;
pub mod collection;
pub mod data_url;
pub mod layout;
pub mod error;
pub mod export;

pub use types::{ExportConfiguration, IntakeRecord, PreviewUrl, DEFAULT_OUTPUT_NAME, DEFAULT_WATERMARK_TEXT};
pub use collection::RecordList;
pub use data_url::{decode_data_url, encode_data_url};
pub use layout::{PageLayout, WatermarkStyle};
pub use error::{Error, Result};
