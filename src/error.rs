use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像が1枚もありません。`photo-deck add` で画像を追加してください")]
    NoImages,

    #[error("{}番の画像はありません（現在 {len} 枚）", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("取り込みエラー: {0}")]
    Intake(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<photo_deck_common::Error> for DeckError {
    fn from(err: photo_deck_common::Error) -> Self {
        match err {
            photo_deck_common::Error::Json(e) => DeckError::JsonParse(e),
            photo_deck_common::Error::DataUrl(msg) => DeckError::ImageLoad(msg),
            photo_deck_common::Error::IndexOutOfRange { index, len } => {
                DeckError::IndexOutOfRange { index, len }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
