//! 集計結果の型定義

use crate::matcher::Suggestion;
use serde::{Deserialize, Serialize};

/// 行ごとの照合上の問題
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    /// 閾値を満たす候補がない
    Unresolvable,
    /// 上位候補のスコアが拮抗している
    Ambiguous,
    /// 商品名または数量が欠けている
    Unprocessable,
    /// SKU合計が i64 を超えるため集計に含めなかった
    QuantityOverflow,
}

/// SKUグループに含まれる1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLine {
    pub name: String,
    pub quantity: i64,
    /// 照合の信頼度
    pub confidence: f64,
    /// OCR側の信頼度
    pub ocr_confidence: f64,
}

/// SKUごとの集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSku {
    pub sku: String,
    pub master_name: String,
    pub total_qty: i64,
    pub count: usize,
    pub avg_confidence: f64,
    pub needs_review: bool,
    pub members: Vec<MemberLine>,
}

/// SKUに照合できなかった行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedEntry {
    pub product_name: String,
    pub quantity: i64,
    pub ocr_confidence: f64,
    pub suggestions: Vec<Suggestion>,
}

/// 入力1行ごとの照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDetail {
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    pub ocr_confidence: f64,
    pub error: Option<String>,
    pub stock_start: Option<i64>,
    pub stock_end: Option<i64>,
    pub sku: Option<String>,
    pub sku_confidence: f64,
    pub suggestions: Vec<Suggestion>,
    pub needs_review: bool,
    pub issue: Option<Issue>,
}

/// 1ドキュメント分の集計結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub matched: Vec<AggregatedSku>,
    pub unmatched: Vec<UnmatchedEntry>,
    pub entries: Vec<LineDetail>,
}

impl Aggregation {
    /// 照合済みSKUの数量合計（SKU間の合計は i128 で桁あふれしない）
    pub fn total_quantity(&self) -> i128 {
        self.matched.iter().map(|m| i128::from(m.total_qty)).sum()
    }

    /// 要確認の行数
    pub fn review_count(&self) -> usize {
        self.entries.iter().filter(|e| e.needs_review).count()
    }

    /// 指定SKUの集計
    pub fn find(&self, sku: &str) -> Option<&AggregatedSku> {
        self.matched.iter().find(|m| m.sku == sku)
    }

    /// 行に付いたOCRエラー
    pub fn errors(&self) -> Vec<String> {
        self.entries.iter().filter_map(|e| e.error.clone()).collect()
    }
}
