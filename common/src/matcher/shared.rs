//! マスタ更新に対応した共有照合器
//!
//! 現在の [`Matcher`] を `Arc` で保持し、更新時は新しい照合器を丸ごと
//! 構築してから参照を差し替える。呼び出し側は `load()` で取得した
//! スナップショットだけを読むので、新旧のテーブルが混ざることはない。

use super::{MatchResult, Matcher};
use crate::types::CatalogEntry;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug)]
pub struct SharedMatcher {
    current: RwLock<Arc<Matcher>>,
}

impl SharedMatcher {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            current: RwLock::new(Arc::new(matcher)),
        }
    }

    /// 現在のスナップショット
    pub fn load(&self) -> Arc<Matcher> {
        Arc::clone(&self.current.read())
    }

    /// マスタ全体を差し替える
    ///
    /// 構築はロックの外で行い、差し替えのみ書き込みロックを取る。
    pub fn update_mapping(&self, entries: &[CatalogEntry]) {
        let next = Arc::new(self.load().rebuild(entries));
        let products = next.index().len();
        *self.current.write() = next;
        tracing::info!(products, "updated mapping");
    }

    pub fn resolve(&self, raw_name: &str) -> MatchResult {
        self.load().resolve(raw_name)
    }

    pub fn get_sku(&self, raw_name: &str) -> Option<String> {
        self.load().get_sku(raw_name)
    }

    pub fn get_master_name(&self, sku: &str) -> Option<String> {
        self.load().get_master_name(sku).map(str::to_string)
    }
}
