//! 取り込みレコードと書き出し設定の型定義
//!
//! - IntakeRecord: 取り込んだ画像1枚分（セッションキャッシュに保存される）
//! - PreviewUrl: 表示用の一時参照（保存されない）
//! - ExportConfiguration: 書き出し時の設定（保存されない）

use crate::data_url::decode_data_url;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 出力名が空のときのファイル名
pub const DEFAULT_OUTPUT_NAME: &str = "images";

/// 透かし文字の初期値
pub const DEFAULT_WATERMARK_TEXT: &str = "Watermark";

/// プレビュー参照
///
/// セッション内でのみ有効。解放後は無効になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 取り込み済み画像
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub file_name: String,

    /// 読み込み元のパス（表示用、再読み込みはしない）
    #[serde(default)]
    pub source_path: String,

    pub mime_type: String,

    /// 取り込み時に一度だけ生成されるData URL
    pub encoded_data: String,

    #[serde(default)]
    pub byte_len: u64,

    /// 元バイト列のSHA-256（16進）
    #[serde(default)]
    pub digest: String,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,

    /// 取り込み日時（RFC 3339）
    #[serde(default)]
    pub added_at: String,

    #[serde(skip)]
    pub preview: Option<PreviewUrl>,
}

impl IntakeRecord {
    /// Data URLから元のバイト列を取り出す
    pub fn image_bytes(&self) -> Result<Vec<u8>> {
        let (_, bytes) = decode_data_url(&self.encoded_data)?;
        Ok(bytes)
    }

    /// 短縮ダイジェスト（一覧表示用）
    pub fn short_digest(&self) -> &str {
        let end = self.digest.len().min(8);
        &self.digest[..end]
    }
}

/// 書き出し設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfiguration {
    pub watermark_enabled: bool,
    pub watermark_text: String,
    pub output_name: String,
}

impl Default for ExportConfiguration {
    fn default() -> Self {
        Self {
            watermark_enabled: false,
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
            output_name: String::new(),
        }
    }
}

impl ExportConfiguration {
    /// 出力ベース名（空なら "images"）
    pub fn effective_output_name(&self) -> &str {
        let trimmed = self.output_name.trim();
        if trimmed.is_empty() {
            DEFAULT_OUTPUT_NAME
        } else {
            trimmed
        }
    }

    /// 透かしが有効なら透かし文字を返す
    pub fn watermark(&self) -> Option<&str> {
        if self.watermark_enabled {
            Some(&self.watermark_text)
        } else {
            None
        }
    }
}
