//! プレビュー参照の管理
//!
//! プレビュー参照はプロセス内でのみ有効な一時ハンドル。
//! セッションキャッシュには保存せず、復元時に作り直す。

use photo_deck_common::PreviewUrl;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug)]
pub struct PreviewRegistry {
    session: String,
    next_id: u64,
    live: HashSet<PreviewUrl>,
}

impl PreviewRegistry {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            next_id: 1,
            live: HashSet::new(),
        }
    }

    /// 新しいプレビュー参照を割り当てる
    pub fn allocate(&mut self) -> PreviewUrl {
        let url = PreviewUrl::new(format!("preview://{}/{}", self.session, self.next_id));
        self.next_id += 1;
        self.live.insert(url.clone());
        debug!(preview = %url, "preview allocated");
        url
    }

    /// 参照を解放。既に無効なら false
    pub fn revoke(&mut self, url: &PreviewUrl) -> bool {
        let removed = self.live.remove(url);
        if removed {
            debug!(preview = %url, "preview revoked");
        }
        removed
    }

    /// すべて解放して件数を返す
    pub fn revoke_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        count
    }

    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        self.live.contains(url)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_unique_urls() {
        let mut registry = PreviewRegistry::new("default");
        let a = registry.allocate();
        let b = registry.allocate();

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("preview://default/"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_revoke() {
        let mut registry = PreviewRegistry::new("s");
        let url = registry.allocate();

        assert!(registry.is_live(&url));
        assert!(registry.revoke(&url));
        assert!(!registry.is_live(&url));
        assert!(!registry.revoke(&url));
    }

    #[test]
    fn test_revoke_all() {
        let mut registry = PreviewRegistry::new("s");
        registry.allocate();
        registry.allocate();

        assert_eq!(registry.revoke_all(), 2);
        assert!(registry.is_empty());
    }
}
