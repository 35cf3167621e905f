//! 入力データの型定義
//!
//! - CatalogEntry: 商品マスタの1行（商品名 → SKU）
//! - OcrLine: OCRで抽出した1行（商品名・数量・信頼度）

use serde::{Deserialize, Serialize};

/// 商品マスタの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub sku: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
        }
    }
}

/// マッピング（商品名, SKU）の並びから CatalogEntry の一覧を作る
pub fn entries_from_pairs<I, N, S>(pairs: I) -> Vec<CatalogEntry>
where
    I: IntoIterator<Item = (N, S)>,
    N: Into<String>,
    S: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, sku)| CatalogEntry::new(name, sku))
        .collect()
}

/// OCRで抽出した1行
///
/// `None` は「読み取れなかった／未記入」を意味し、0 とは区別する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrLine {
    pub product_name: Option<String>,

    /// 販売数量
    #[serde(alias = "stock_terjual")]
    pub quantity: Option<i64>,

    /// OCR側の信頼度（0.0〜1.0）
    #[serde(alias = "confidence_score")]
    pub ocr_confidence: f64,

    /// OCR側で既に要確認とされているか
    pub needs_review: bool,

    pub error: Option<String>,

    /// 期首在庫
    #[serde(alias = "stock_awal")]
    pub stock_start: Option<i64>,

    /// 期末在庫
    #[serde(alias = "stock_akhir")]
    pub stock_end: Option<i64>,

    pub raw_text: String,
}

impl OcrLine {
    /// 商品名と数量だけを持つ行
    pub fn new(product_name: &str, quantity: i64, ocr_confidence: f64) -> Self {
        Self {
            product_name: Some(product_name.to_string()),
            quantity: Some(quantity),
            ocr_confidence,
            ..Default::default()
        }
    }

    /// 照合に必要な商品名と数量を取り出す（どちらか欠けていれば None）
    pub fn processable(&self) -> Option<(&str, i64)> {
        let name = self.product_name.as_deref()?;
        if name.trim().is_empty() {
            return None;
        }
        Some((name, self.quantity?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_line_processable() {
        let line = OcrLine::new("Youvit Omega Kids", 5, 0.9);
        assert_eq!(line.processable(), Some(("Youvit Omega Kids", 5)));

        let no_name = OcrLine {
            quantity: Some(5),
            ..Default::default()
        };
        assert_eq!(no_name.processable(), None);

        let blank = OcrLine {
            product_name: Some("   ".to_string()),
            quantity: Some(5),
            ..Default::default()
        };
        assert_eq!(blank.processable(), None);

        let no_qty = OcrLine {
            product_name: Some("Youvit".to_string()),
            ..Default::default()
        };
        assert_eq!(no_qty.processable(), None);
    }

    #[test]
    fn test_ocr_line_deserialize_aliases() {
        let json = r#"{
            "product_name": "Youvit Omega Kids",
            "stock_awal": 10,
            "stock_akhir": 4,
            "stock_terjual": 6,
            "confidence_score": 0.82,
            "needs_review": false,
            "error": null,
            "raw_text": "YOUVIT OMEGA KIDS 10 4 6"
        }"#;
        let line: OcrLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.quantity, Some(6));
        assert_eq!(line.stock_start, Some(10));
        assert_eq!(line.stock_end, Some(4));
        assert!((line.ocr_confidence - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_ocr_line_deserialize_missing_fields() {
        let line: OcrLine = serde_json::from_str(r#"{"product_name": "Youvit"}"#).unwrap();
        assert_eq!(line.quantity, None);
        assert_eq!(line.stock_start, None);
        assert_eq!(line.ocr_confidence, 0.0);
        assert!(!line.needs_review);
    }

    #[test]
    fn test_entries_from_pairs() {
        let entries = entries_from_pairs([("A", "SKU1"), ("B", "SKU2")]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], CatalogEntry::new("B", "SKU2"));
    }
}
