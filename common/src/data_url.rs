//! Data URL エンコード/デコード
//!
//! `data:<mime>;base64,<payload>` 形式のみを扱う

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// バイト列をData URLに変換
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("{}{}{}{}", PREFIX, mime_type, BASE64_MARKER, STANDARD.encode(bytes))
}

/// Data URLを (MIMEタイプ, バイト列) に分解
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix(PREFIX)
        .ok_or_else(|| Error::DataUrl("\"data:\" で始まっていません".into()))?;

    let (mime_type, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| Error::DataUrl("base64部分がありません".into()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| Error::DataUrl(format!("base64デコード失敗: {}", e)))?;

    Ok((mime_type.to_string(), bytes))
}
