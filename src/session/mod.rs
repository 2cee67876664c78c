//! 作業セッション
//!
//! 取り込み済みレコードの一覧・プレビュー参照・書き出し設定をまとめて持つ。
//! 一覧を変更するたびにセッションキャッシュへ書き込む。

pub mod cache;

pub use cache::{SessionCache, SessionLock};

use crate::error::{DeckError, Result};
use crate::intake::compute_digest;
use crate::preview::PreviewRegistry;
use photo_deck_common::{decode_data_url, ExportConfiguration, IntakeRecord, PreviewUrl, RecordList};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct Workspace {
    name: String,
    records: RecordList,
    cache: SessionCache,
    previews: PreviewRegistry,
    export_config: ExportConfiguration,
}

impl Workspace {
    /// セッションディレクトリから開く
    pub fn open(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self::with_cache(name, SessionCache::new(dir))
    }

    /// キャッシュから一覧を復元して開く
    ///
    /// キャッシュが壊れている場合は空の一覧で始める。
    pub fn with_cache(name: impl Into<String>, cache: SessionCache) -> Self {
        let name = name.into();
        let mut workspace = Self {
            previews: PreviewRegistry::new(name.clone()),
            name,
            records: RecordList::new(),
            cache,
            export_config: ExportConfiguration::default(),
        };

        workspace.refresh();
        if !workspace.records.is_empty() {
            info!(session = %workspace.name, count = workspace.records.len(), "session restored");
        }
        workspace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &RecordList {
        &self.records
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn export_config(&self) -> &ExportConfiguration {
        &self.export_config
    }

    /// セッションの排他ロックを取得
    ///
    /// ロック中に `refresh` してから変更すると、別プロセスの変更を上書きしない。
    pub fn lock(&self) -> Result<SessionLock> {
        self.cache.lock()
    }

    /// キャッシュの内容で一覧を置き換える
    ///
    /// 同じレコードのプレビュー参照は引き継ぎ、消えたレコードの参照は解放する。
    pub fn refresh(&mut self) {
        let stored = self.cache.load();
        let mut known: HashMap<RecordKey, PreviewUrl> = self
            .records
            .iter_mut()
            .filter_map(|r| {
                let key = record_key(r);
                r.preview.take().map(|p| (key, p))
            })
            .collect();

        let records = match restore_records(stored, &mut known, &mut self.previews) {
            Ok(records) => records,
            Err(reason) => {
                warn!(session = %self.name, reason = %reason, "discarding inconsistent session cache");
                self.previews.revoke_all();
                known.clear();
                Vec::new()
            }
        };

        for stale in known.values() {
            self.previews.revoke(stale);
        }
        self.records = RecordList::from_records(records);
    }

    /// 取り込んだバッチを末尾に追加
    ///
    /// キャッシュへの保存に成功してから一覧へ反映する。
    pub fn append_batch(&mut self, mut batch: Vec<IntakeRecord>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let _lock = self.lock()?;
        self.refresh();

        let next: Vec<&IntakeRecord> = self.records.iter().chain(batch.iter()).collect();
        self.cache.save(&next)?;

        let count = batch.len();
        for record in &mut batch {
            record.preview = Some(self.previews.allocate());
        }
        self.records.append_batch(batch);
        debug!(session = %self.name, added = count, total = self.records.len(), "batch appended");
        Ok(count)
    }

    /// 指定位置（0始まり）のレコードを削除し、プレビュー参照を解放
    ///
    /// 保存に失敗した場合は一覧もプレビューも変わらない。
    pub fn remove(&mut self, index: usize) -> Result<IntakeRecord> {
        let _lock = self.lock()?;
        self.refresh();

        let len = self.records.len();
        if index >= len {
            return Err(DeckError::IndexOutOfRange { index, len });
        }

        let next: Vec<&IntakeRecord> = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r)
            .collect();
        self.cache.save(&next)?;

        let removed = self.records.remove(index)?;
        if let Some(preview) = &removed.preview {
            self.previews.revoke(preview);
        }
        debug!(session = %self.name, index, file = %removed.file_name, "record removed");
        Ok(removed)
    }

    /// 並べ替え要求（常に無視される）
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let applied = self.records.reorder(from, to);
        debug!(session = %self.name, from, to, applied, "reorder requested");
        applied
    }

    /// 透かしの有効/無効を切り替え、切り替え後の状態を返す
    pub fn toggle_watermark(&mut self) -> bool {
        self.export_config.watermark_enabled = !self.export_config.watermark_enabled;
        self.export_config.watermark_enabled
    }

    pub fn set_watermark_text(&mut self, text: impl Into<String>) {
        self.export_config.watermark_text = text.into();
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.export_config.output_name = name.into();
    }

    /// 一覧・キャッシュ・プレビューをすべて破棄
    pub fn clear(&mut self) -> Result<usize> {
        let _lock = self.lock()?;
        self.clear_locked()
    }

    /// ロック取得済みの状態で破棄する
    ///
    /// キャッシュの削除に失敗した場合、一覧とプレビューは残る。
    pub(crate) fn clear_locked(&mut self) -> Result<usize> {
        self.cache.remove()?;
        let removed = self.records.clear();
        let revoked = self.previews.revoke_all();
        debug!(session = %self.name, records = removed.len(), previews = revoked, "session cleared");
        Ok(removed.len())
    }
}

/// 同一レコードの判定キー（digest, 取り込み日時, ファイル名）
type RecordKey = (String, String, String);

fn record_key(record: &IntakeRecord) -> RecordKey {
    (
        record.digest.clone(),
        record.added_at.clone(),
        record.file_name.clone(),
    )
}

/// キャッシュ内容を検証し、プレビュー参照を割り当てる
///
/// `known` にあるレコードは検証済みとして参照を引き継ぎ、`known` から取り除く。
fn restore_records(
    mut records: Vec<IntakeRecord>,
    known: &mut HashMap<RecordKey, PreviewUrl>,
    previews: &mut PreviewRegistry,
) -> std::result::Result<Vec<IntakeRecord>, String> {
    for record in &mut records {
        if let Some(preview) = known.remove(&record_key(record)) {
            record.preview = Some(preview);
            continue;
        }

        if !record.mime_type.starts_with("image/") {
            return Err(format!("{}: not an image type ({})", record.file_name, record.mime_type));
        }

        let (_, bytes) = decode_data_url(&record.encoded_data)
            .map_err(|e| format!("{}: {}", record.file_name, e))?;

        if !record.digest.is_empty() && compute_digest(&bytes) != record.digest {
            return Err(format!("{}: digest mismatch", record.file_name));
        }

        record.preview = Some(previews.allocate());
    }
    Ok(records)
}
