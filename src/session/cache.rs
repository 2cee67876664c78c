//! セッションキャッシュモジュール
//!
//! 取り込み済みレコードの一覧を、セッションごとの固定名JSONに丸ごと保存する。
//! 破損・欠落したキャッシュは空として扱う。

use crate::error::Result;
use fs2::FileExt;
use photo_deck_common::IntakeRecord;
use serde::Serialize;
use std::borrow::Borrow;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// キャッシュのキー（ファイル名の元）
pub const CACHE_KEY: &str = "images";

/// セッションの排他ロック
///
/// 破棄時に解放される。同じセッションを別プロセスが更新している間は取得を待つ。
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release session lock");
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// キャッシュファイルのパス
    pub fn entry_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", CACHE_KEY))
    }

    /// ロックファイルのパス
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lock", CACHE_KEY))
    }

    /// セッションの排他ロックを取得（取得できるまで待つ）
    pub fn lock(&self) -> Result<SessionLock> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;

        debug!(path = %path.display(), "session lock acquired");
        Ok(SessionLock { file, path })
    }

    pub fn exists(&self) -> bool {
        self.entry_path().exists()
    }

    /// キャッシュを読み込み
    ///
    /// 存在しない・読めない・JSONとして不正な場合は空を返す。
    pub fn load(&self) -> Vec<IntakeRecord> {
        let path = self.entry_path();
        if !path.exists() {
            return Vec::new();
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session cache unreadable, starting empty");
                return Vec::new();
            }
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, Vec<IntakeRecord>>(reader) {
            Ok(records) => {
                debug!(path = %path.display(), count = records.len(), "session cache loaded");
                records
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session cache malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// 一覧全体を保存
    ///
    /// 一時ファイルに書いてから置き換える。
    pub fn save<R>(&self, records: &[R]) -> Result<()>
    where
        R: Borrow<IntakeRecord> + Serialize,
    {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.entry_path();
        let tmp_path = self.dir.join(format!("{}.json.tmp", CACHE_KEY));
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, records)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), count = records.len(), "session cache saved");
        Ok(())
    }

    /// キャッシュを削除
    ///
    /// 削除した場合は true、もともと無い場合は false
    pub fn remove(&self) -> Result<bool> {
        let path = self.entry_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!(path = %path.display(), "session cache removed");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// キャッシュファイルのサイズ（bytes）
    pub fn size(&self) -> Option<u64> {
        std::fs::metadata(self.entry_path()).ok().map(|m| m.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_deck_common::encode_data_url;

    fn record(name: &str) -> IntakeRecord {
        IntakeRecord {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            encoded_data: encode_data_url("image/png", name.as_bytes()),
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_path_uses_fixed_key() {
        let cache = SessionCache::new("/tmp/session");
        assert_eq!(cache.entry_path(), PathBuf::from("/tmp/session/images.json"));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("none"));
        assert!(cache.load().is_empty());
        assert!(!cache.exists());
    }

    #[test]
    fn test_save_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path());

        let records = vec![record("b.png"), record("a.png"), record("c.png")];
        cache.save(&records).unwrap();

        let loaded = cache.load();
        let names: Vec<_> = loaded.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.png", "a.png", "c.png"]);
        assert!(!dir.path().join("images.json.tmp").exists());
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path());
        cache.save(&[record("a.png")]).unwrap();

        assert!(cache.remove().unwrap());
        assert!(!cache.remove().unwrap());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_save_borrowed_records() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path());

        let a = record("a.png");
        let b = record("b.png");
        cache.save(&[&a, &b]).unwrap();

        let names: Vec<_> = cache.load().into_iter().map(|r| r.file_name).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("new"));

        let first = cache.lock().unwrap();
        assert!(cache.lock_path().exists());
        drop(first);

        // 解放済みなので再取得できる
        let _second = cache.lock().unwrap();
    }
}
