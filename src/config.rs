use crate::error::{DeckError, Result};
use photo_deck_common::DEFAULT_WATERMARK_TEXT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// セッションディレクトリを上書きする環境変数
pub const SESSION_DIR_ENV: &str = "PHOTO_DECK_SESSION_DIR";

/// セッション名を指定する環境変数
pub const SESSION_NAME_ENV: &str = "PHOTO_DECK_SESSION";

pub const DEFAULT_SESSION_NAME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// セッションキャッシュの保存先（省略時はキャッシュディレクトリ）
    pub session_dir: Option<PathBuf>,
    /// PDFの出力先（省略時はカレント）
    pub output_dir: Option<PathBuf>,
    /// 透かし文字の初期値
    pub watermark_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_dir: None,
            output_dir: None,
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DeckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-deck").join("config.json"))
    }

    /// セッション群のルート
    ///
    /// 環境変数 > 設定ファイル > キャッシュディレクトリ の順で決まる。
    pub fn sessions_root(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(SESSION_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        if let Some(dir) = &self.session_dir {
            return Ok(dir.clone());
        }

        let cache = dirs::cache_dir()
            .ok_or_else(|| DeckError::Config("キャッシュディレクトリが見つかりません".into()))?;
        Ok(cache.join("photo-deck").join("sessions"))
    }

    /// 指定セッションのディレクトリ
    pub fn session_path(&self, session: &str) -> Result<PathBuf> {
        if session.is_empty() || session.contains(['/', '\\']) || session == "." || session == ".." {
            return Err(DeckError::Config(format!("セッション名が不正です: {:?}", session)));
        }
        Ok(self.sessions_root()?.join(session))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// 引数 > 環境変数 > "default"
pub fn resolve_session_name(arg: Option<&str>) -> String {
    if let Some(name) = arg {
        return name.to_string();
    }
    match std::env::var(SESSION_NAME_ENV) {
        Ok(name) if !name.is_empty() => name,
        _ => DEFAULT_SESSION_NAME.to_string(),
    }
}
