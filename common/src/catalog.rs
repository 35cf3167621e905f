//! 商品マスタのインデックス
//!
//! マスタのスナップショットから照合用の参照テーブルを一括で構築する。
//! 構築後は変更しない。マスタ更新時は新しいインデックスを作り直す。

use crate::normalizer::{token_set, Normalizer};
use crate::types::CatalogEntry;
use std::collections::{HashMap, HashSet};

/// 正規化済みのマスタエントリ
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    /// マスタ上の商品名（原文）
    pub name: String,
    pub sku: String,
    /// 正規化済みの商品名
    pub normalized: String,
    /// 正規化済み商品名のトークン集合
    pub tokens: HashSet<String>,
}

/// 照合用インデックス
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// マスタの並び順を保持
    entries: Vec<IndexedEntry>,
    /// 商品名 → entries の位置
    exact: HashMap<String, usize>,
    /// 小文字化した商品名 → 位置
    case_folded: HashMap<String, usize>,
    /// 正規化済み商品名 → 位置
    normalized: HashMap<String, usize>,
    /// SKU → 最初に現れた商品名の位置
    sku_to_master: HashMap<String, usize>,
}

impl CatalogIndex {
    /// マスタからインデックスを構築
    ///
    /// - 同じ商品名が複数ある場合は最初の行を採用
    /// - 商品名・SKUが空の行はスキップ
    /// - 小文字化・正規化で衝突した場合は後の行で上書き
    /// - SKU → 商品名は最初に現れた商品名を保持
    pub fn build(entries: &[CatalogEntry], normalizer: &Normalizer) -> Self {
        let mut index = Self::default();
        let mut skipped = 0usize;

        for entry in entries {
            if entry.name.trim().is_empty() || entry.sku.trim().is_empty() {
                tracing::warn!(name = %entry.name, sku = %entry.sku, "skipping catalog row with blank name or sku");
                skipped += 1;
                continue;
            }
            if index.exact.contains_key(&entry.name) {
                tracing::debug!(name = %entry.name, "duplicate catalog name, keeping first");
                skipped += 1;
                continue;
            }

            let position = index.entries.len();
            let normalized = normalizer.normalize(&entry.name);
            let tokens = token_set(&normalized);

            index.exact.insert(entry.name.clone(), position);
            index.case_folded.insert(entry.name.trim().to_lowercase(), position);
            if !normalized.is_empty() {
                index.normalized.insert(normalized.clone(), position);
            }
            index
                .sku_to_master
                .entry(entry.sku.clone())
                .or_insert(position);

            index.entries.push(IndexedEntry {
                name: entry.name.clone(),
                sku: entry.sku.clone(),
                normalized,
                tokens,
            });
        }

        tracing::debug!(
            products = index.entries.len(),
            skus = index.sku_to_master.len(),
            skipped,
            "catalog index built"
        );

        index
    }

    /// 商品名の完全一致
    pub fn exact(&self, name: &str) -> Option<&IndexedEntry> {
        self.exact.get(name).map(|&i| &self.entries[i])
    }

    /// 小文字化した商品名での一致（引数は小文字化済みであること）
    pub fn case_insensitive(&self, lowered: &str) -> Option<&IndexedEntry> {
        self.case_folded.get(lowered).map(|&i| &self.entries[i])
    }

    /// 正規化済み商品名での一致
    pub fn normalized(&self, normalized: &str) -> Option<&IndexedEntry> {
        self.normalized.get(normalized).map(|&i| &self.entries[i])
    }

    /// SKUに対応する代表商品名（最初に現れたもの）
    pub fn master_name(&self, sku: &str) -> Option<&str> {
        self.sku_to_master
            .get(sku)
            .map(|&i| self.entries[i].name.as_str())
    }

    /// マスタの並び順でエントリを返す
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// SKUの種類数
    pub fn sku_count(&self) -> usize {
        self.sku_to_master.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
