//! 取り込みバッチの追加順序を決めるキュー
//!
//! 取り込み操作は開始時にチケットを受け取る。読み込みは並行に進むが、
//! 一覧への追加はチケット順（開始順）に1つずつ行う。
//! 後から始まった操作が先に終わっても、先行する操作の追加を待つ。

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct AppendQueue<T> {
    next_ticket: u64,
    next_commit: u64,
    finished: BTreeMap<u64, T>,
}

impl<T> Default for AppendQueue<T> {
    fn default() -> Self {
        Self {
            next_ticket: 0,
            next_commit: 0,
            finished: BTreeMap::new(),
        }
    }
}

impl<T> AppendQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取り込み開始時に呼ぶ
    pub fn begin(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// 完了したバッチを預け、追加してよいバッチを開始順に返す
    pub fn complete(&mut self, ticket: Ticket, batch: T) -> Vec<T> {
        self.finished.insert(ticket.0, batch);

        let mut ready = Vec::new();
        while let Some(batch) = self.finished.remove(&self.next_commit) {
            ready.push(batch);
            self.next_commit += 1;
        }
        ready
    }

    /// 完了待ちの操作数（未完了 + 先行待ち）
    pub fn outstanding(&self) -> usize {
        (self.next_ticket - self.next_commit) as usize
    }

    /// 完了済みだが先行操作を待っているバッチ数
    pub fn waiting(&self) -> usize {
        self.finished.len()
    }
}
