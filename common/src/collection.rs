//! 取り込みレコードの順序付きコレクション
//!
//! 先に取り込んだものが先のページになる。並べ替えは無効。

use crate::error::{Error, Result};
use crate::types::IntakeRecord;

#[derive(Debug, Clone, Default)]
pub struct RecordList {
    records: Vec<IntakeRecord>,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<IntakeRecord>) -> Self {
        Self { records }
    }

    /// バッチ単位で末尾に追加
    pub fn append_batch(&mut self, batch: Vec<IntakeRecord>) {
        self.records.extend(batch);
    }

    /// 指定位置のレコードを削除（他の順序は維持）
    pub fn remove(&mut self, index: usize) -> Result<IntakeRecord> {
        if index >= self.records.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// 並べ替え要求
    ///
    /// 並べ替えは無効化されているため、どの組み合わせでも順序は変わらない。
    /// 無視した場合は false を返す。
    pub fn reorder(&mut self, _from: usize, _to: usize) -> bool {
        false
    }

    /// 全件削除して取り出す
    pub fn clear(&mut self) -> Vec<IntakeRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn get(&self, index: usize) -> Option<&IntakeRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntakeRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, IntakeRecord> {
        self.records.iter_mut()
    }

    pub fn as_slice(&self) -> &[IntakeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a IntakeRecord;
    type IntoIter = std::slice::Iter<'a, IntakeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
