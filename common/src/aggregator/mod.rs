//! SKU別集計モジュール
//!
//! 1ドキュメント分のOCR行を照合し、SKUごとに数量を合計する。
//!
//! ## 処理フロー
//! 1. 各行を並列に照合（同じスナップショットを参照）
//! 2. 照合結果を順に畳み込み、SKUごとの合計・件数・信頼度合計を更新
//! 3. 平均信頼度と要確認フラグを確定し、商品名順に並べる

pub mod types;

pub use types::{AggregatedSku, Aggregation, Issue, LineDetail, MemberLine, UnmatchedEntry};

use crate::error::{Error, Result};
use crate::matcher::{check_unit, MatchResult, Resolve};
use crate::types::OcrLine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 集計の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// これ未満の信頼度は要確認
    pub review_threshold: f64,
    /// 上位2候補の差がこの値以内なら要確認（None で無効）
    pub ambiguity_margin: Option<f64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            review_threshold: 0.7,
            ambiguity_margin: None,
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit("review_threshold", self.review_threshold)?;
        if let Some(margin) = self.ambiguity_margin {
            if !(0.0..=1.0).contains(&margin) {
                return Err(Error::Config(format!(
                    "ambiguity_margin must be within [0, 1], got {}",
                    margin
                )));
            }
        }
        Ok(())
    }
}

/// SKU別の途中集計
struct Bucket {
    total_qty: i64,
    confidence_sum: f64,
    members: Vec<MemberLine>,
}

impl Bucket {
    fn new(member: MemberLine) -> Self {
        Self {
            total_qty: member.quantity,
            confidence_sum: member.confidence,
            members: vec![member],
        }
    }

    /// 合計が i64 を超える場合は加算せず false
    fn add(&mut self, member: MemberLine) -> bool {
        let Some(total) = self.total_qty.checked_add(member.quantity) else {
            return false;
        };
        self.total_qty = total;
        self.confidence_sum += member.confidence;
        self.members.push(member);
        true
    }
}

/// SKU別集計器
#[derive(Debug, Clone, Default)]
pub struct SkuAggregator {
    config: AggregatorConfig,
}

impl SkuAggregator {
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// OCR行を照合してSKU別に集計する
    pub fn aggregate<R>(&self, lines: &[OcrLine], resolver: &R) -> Aggregation
    where
        R: Resolve + Sync + ?Sized,
    {
        let resolutions: Vec<Option<MatchResult>> = lines
            .par_iter()
            .map(|line| line.processable().map(|(name, _)| resolver.resolve(name)))
            .collect();

        let mut buckets: HashMap<String, Bucket> = HashMap::new();
        let mut unmatched = Vec::new();
        let mut entries = Vec::with_capacity(lines.len());

        for (line, resolution) in lines.iter().zip(resolutions) {
            let (Some((name, quantity)), Some(result)) = (line.processable(), resolution) else {
                entries.push(self.unprocessable_detail(line));
                continue;
            };

            let ambiguous = self
                .config
                .ambiguity_margin
                .is_some_and(|margin| result.is_ambiguous(margin));
            let mut added = true;
            match &result.sku {
                Some(sku) => {
                    let member = MemberLine {
                        name: name.to_string(),
                        quantity,
                        confidence: result.confidence,
                        ocr_confidence: line.ocr_confidence,
                    };
                    match buckets.get_mut(sku) {
                        Some(bucket) => added = bucket.add(member),
                        None => {
                            buckets.insert(sku.clone(), Bucket::new(member));
                        }
                    }
                }
                None => unmatched.push(UnmatchedEntry {
                    product_name: name.to_string(),
                    quantity,
                    ocr_confidence: line.ocr_confidence,
                    suggestions: result.suggestions.clone(),
                }),
            }
            if !added {
                tracing::warn!(product = name, quantity, "sku total overflows, line left out of the bucket");
            }

            let needs_review = line.needs_review
                || result.sku.is_none()
                || result.confidence < self.config.review_threshold
                || ambiguous
                || !added;
            let issue = if result.sku.is_none() {
                Some(Issue::Unresolvable)
            } else if !added {
                Some(Issue::QuantityOverflow)
            } else if ambiguous {
                Some(Issue::Ambiguous)
            } else {
                None
            };

            entries.push(LineDetail {
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                ocr_confidence: line.ocr_confidence,
                error: line.error.clone(),
                stock_start: line.stock_start,
                stock_end: line.stock_end,
                sku: result.sku,
                sku_confidence: result.confidence,
                suggestions: result.suggestions,
                needs_review,
                issue,
            });
        }

        let mut matched: Vec<AggregatedSku> = buckets
            .into_iter()
            .map(|(sku, bucket)| self.finish_bucket(sku, bucket, resolver))
            .collect();

        matched.sort_by(|a, b| a.master_name.cmp(&b.master_name).then_with(|| a.sku.cmp(&b.sku)));
        unmatched.sort_by(|a, b| a.product_name.cmp(&b.product_name));

        tracing::debug!(
            lines = lines.len(),
            matched = matched.len(),
            unmatched = unmatched.len(),
            "aggregated document"
        );

        Aggregation {
            matched,
            unmatched,
            entries,
        }
    }

    fn finish_bucket<R>(&self, sku: String, bucket: Bucket, resolver: &R) -> AggregatedSku
    where
        R: Resolve + ?Sized,
    {
        let count = bucket.members.len();
        let avg_confidence = if count == 0 {
            0.0
        } else {
            bucket.confidence_sum / count as f64
        };
        let master_name = resolver.master_name(&sku).unwrap_or_else(|| sku.clone());

        AggregatedSku {
            sku,
            master_name,
            total_qty: bucket.total_qty,
            count,
            avg_confidence,
            needs_review: avg_confidence < self.config.review_threshold,
            members: bucket.members,
        }
    }

    fn unprocessable_detail(&self, line: &OcrLine) -> LineDetail {
        LineDetail {
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            ocr_confidence: line.ocr_confidence,
            error: line.error.clone(),
            stock_start: line.stock_start,
            stock_end: line.stock_end,
            sku: None,
            sku_confidence: 0.0,
            suggestions: Vec::new(),
            needs_review: true,
            issue: Some(Issue::Unprocessable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatchMethod, Matcher, Suggestion};
    use crate::types::entries_from_pairs;

    fn matcher() -> Matcher {
        Matcher::from_entries(&entries_from_pairs([
            ("Youvit Omega Kids", "SKU001"),
            ("Youvit Collagen Beauty", "SKU002"),
            ("Youvit Multivitamin Dewasa", "SKU003"),
        ]))
    }

    /// 固定の結果を返す照合器
    struct FixedResolver {
        confidence: f64,
    }

    impl Resolve for FixedResolver {
        fn resolve(&self, name: &str) -> MatchResult {
            MatchResult {
                sku: Some("SKU_FIXED".into()),
                confidence: self.confidence,
                suggestions: vec![Suggestion {
                    name: name.to_string(),
                    sku: "SKU_FIXED".into(),
                    score: self.confidence,
                }],
                method: MatchMethod::Fuzzy,
            }
        }

        fn master_name(&self, _sku: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_same_sku_lines_are_summed() {
        let lines = vec![
            OcrLine::new("Youvit Omega Kids", 5, 0.9),
            OcrLine::new("youvit omega kids", 3, 0.8),
        ];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());

        assert_eq!(result.matched.len(), 1);
        let bucket = &result.matched[0];
        assert_eq!(bucket.sku, "SKU001");
        assert_eq!(bucket.master_name, "Youvit Omega Kids");
        assert_eq!(bucket.total_qty, 8);
        assert_eq!(bucket.count, 2);
        assert!((bucket.avg_confidence - 0.975).abs() < 1e-9);
        assert!(!bucket.needs_review);
        assert_eq!(bucket.members[1].quantity, 3);
        assert_eq!(bucket.members[1].ocr_confidence, 0.8);
        assert!(result.unmatched.is_empty());
        assert_eq!(result.entries.len(), 2);
    }

    #[test]
    fn test_missing_name_is_only_in_entries() {
        let lines = vec![OcrLine {
            product_name: None,
            quantity: Some(5),
            ocr_confidence: 0.9,
            ..Default::default()
        }];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());

        assert!(result.matched.is_empty());
        assert!(result.unmatched.is_empty());
        assert_eq!(result.entries.len(), 1);
        let entry = &result.entries[0];
        assert!(entry.needs_review);
        assert_eq!(entry.sku, None);
        assert_eq!(entry.sku_confidence, 0.0);
        assert_eq!(entry.issue, Some(Issue::Unprocessable));
    }

    #[test]
    fn test_missing_quantity_is_unprocessable() {
        let lines = vec![OcrLine {
            product_name: Some("Youvit Omega Kids".into()),
            quantity: None,
            ..Default::default()
        }];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());
        assert!(result.matched.is_empty());
        assert_eq!(result.entries[0].issue, Some(Issue::Unprocessable));
    }

    #[test]
    fn test_unmatched_lines_keep_suggestions() {
        let lines = vec![
            OcrLine::new("Paracetamol Sirup", 2, 0.7),
            OcrLine::new("Antangin Cair", 4, 0.6),
        ];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());

        assert!(result.matched.is_empty());
        assert_eq!(result.unmatched.len(), 2);
        // 商品名順
        assert_eq!(result.unmatched[0].product_name, "Antangin Cair");
        assert_eq!(result.unmatched[0].quantity, 4);
        assert!(!result.unmatched[0].suggestions.is_empty());
        assert!(result
            .entries
            .iter()
            .all(|e| e.needs_review && e.issue == Some(Issue::Unresolvable)));
    }

    #[test]
    fn test_ocr_flag_forces_line_review() {
        let lines = vec![OcrLine {
            needs_review: true,
            ..OcrLine::new("Youvit Omega Kids", 1, 0.4)
        }];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());
        assert!(result.entries[0].needs_review);
        assert_eq!(result.entries[0].issue, None);
        // グループの要確認は平均信頼度のみで決まる
        assert!(!result.matched[0].needs_review);
    }

    #[test]
    fn test_bucket_review_follows_average_confidence() {
        let lines = vec![
            OcrLine::new("a", 1, 1.0),
            OcrLine::new("b", 2, 1.0),
        ];
        let low = SkuAggregator::default().aggregate(&lines, &FixedResolver { confidence: 0.69 });
        assert!(low.matched[0].needs_review);
        assert_eq!(low.matched[0].master_name, "SKU_FIXED");

        let at = SkuAggregator::default().aggregate(&lines, &FixedResolver { confidence: 0.7 });
        assert!(!at.matched[0].needs_review);
        assert_eq!(at.matched[0].total_qty, 3);
    }

    #[test]
    fn test_matched_sorted_by_master_name() {
        let lines = vec![
            OcrLine::new("Youvit Multivitamin Dewasa", 1, 0.9),
            OcrLine::new("Youvit Collagen Beauty", 2, 0.9),
            OcrLine::new("Youvit Omega Kids", 3, 0.9),
        ];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());
        let names: Vec<&str> = result.matched.iter().map(|m| m.master_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Youvit Collagen Beauty", "Youvit Multivitamin Dewasa", "Youvit Omega Kids"]
        );
        // entries は入力順
        assert_eq!(result.entries[0].sku.as_deref(), Some("SKU003"));
    }

    #[test]
    fn test_total_qty_is_exact_for_large_values() {
        let quantities = [i64::from(u32::MAX), 7, 1_000_000_007, 0, 42];
        let lines: Vec<OcrLine> = quantities
            .iter()
            .map(|&q| OcrLine::new("Youvit Omega Kids", q, 0.9))
            .collect();
        let result = SkuAggregator::default().aggregate(&lines, &matcher());
        assert_eq!(result.matched[0].total_qty, quantities.iter().sum::<i64>());
        assert_eq!(result.matched[0].count, quantities.len());
        assert_eq!(result.total_quantity(), i128::from(quantities.iter().sum::<i64>()));
    }

    #[test]
    fn test_overflowing_quantity_is_left_out_and_flagged() {
        let lines = vec![
            OcrLine::new("Youvit Omega Kids", i64::MAX, 0.9),
            OcrLine::new("Youvit Omega Kids", 1, 0.9),
            OcrLine::new("Youvit Omega Kids", -5, 0.9),
        ];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());

        let bucket = result.find("SKU001").unwrap();
        assert_eq!(bucket.total_qty, i64::MAX - 5);
        assert_eq!(bucket.count, 2);

        let skipped = &result.entries[1];
        assert_eq!(skipped.sku.as_deref(), Some("SKU001"));
        assert!(skipped.needs_review);
        assert_eq!(skipped.issue, Some(Issue::QuantityOverflow));
        assert_eq!(result.entries[0].issue, None);
        assert_eq!(result.entries[2].issue, None);
    }

    #[test]
    fn test_total_quantity_across_skus_does_not_overflow() {
        let lines = vec![
            OcrLine::new("Youvit Omega Kids", i64::MAX, 0.9),
            OcrLine::new("Youvit Collagen Beauty", i64::MAX, 0.9),
        ];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());
        assert_eq!(result.total_quantity(), i128::from(i64::MAX) * 2);
    }

    #[test]
    fn test_ambiguity_margin_flags_near_ties() {
        let matcher = Matcher::from_entries(&entries_from_pairs([
            ("Youvit Kids A", "SKU_A"),
            ("Youvit Kids B", "SKU_B"),
        ]));
        let lines = vec![OcrLine::new("Youvit Kids", 1, 1.0)];

        let aggregator = SkuAggregator::new(AggregatorConfig {
            review_threshold: 0.0,
            ambiguity_margin: Some(0.01),
        })
        .unwrap();
        let result = aggregator.aggregate(&lines, &matcher);
        assert!(result.entries[0].needs_review);
        assert_eq!(result.entries[0].issue, Some(Issue::Ambiguous));

        let plain = SkuAggregator::new(AggregatorConfig {
            review_threshold: 0.0,
            ambiguity_margin: None,
        })
        .unwrap();
        let result = plain.aggregate(&lines, &matcher);
        assert!(!result.entries[0].needs_review);
        assert_eq!(result.entries[0].issue, None);
    }

    #[test]
    fn test_empty_input_and_config_validation() {
        let result = SkuAggregator::default().aggregate(&[], &matcher());
        assert_eq!(result, Aggregation::default());
        assert_eq!(result.review_count(), 0);

        let bad = AggregatorConfig {
            review_threshold: 2.0,
            ..Default::default()
        };
        assert!(SkuAggregator::new(bad).is_err());
        let bad = AggregatorConfig {
            ambiguity_margin: Some(-0.5),
            ..Default::default()
        };
        assert!(SkuAggregator::new(bad).is_err());
    }

    #[test]
    fn test_errors_and_stock_fields_are_carried() {
        let lines = vec![OcrLine {
            product_name: Some("Youvit Omega Kids".into()),
            quantity: Some(6),
            stock_start: Some(10),
            stock_end: Some(4),
            error: Some("low contrast".into()),
            ..Default::default()
        }];
        let result = SkuAggregator::default().aggregate(&lines, &matcher());
        assert_eq!(result.entries[0].stock_start, Some(10));
        assert_eq!(result.entries[0].stock_end, Some(4));
        assert_eq!(result.errors(), vec!["low contrast".to_string()]);
    }
}
