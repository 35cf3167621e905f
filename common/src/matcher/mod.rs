//! 商品名 → SKU 照合モジュール
//!
//! 優先順に照合し、最初に一致した段階の結果を返す。
//!
//! 1. 空入力 → 未照合
//! 2. 完全一致 → 1.0
//! 3. 大文字小文字を無視した一致 → 0.95
//! 4. 正規化後の完全一致 → 0.9
//! 5. ファジー照合（類似度 × キーワードペナルティ）。最上位が閾値以上なら採用

pub mod scoring;
pub mod shared;
pub mod types;

pub use scoring::{default_keyword_penalties, KeywordPenalty};
pub use shared::SharedMatcher;
pub use types::{MatchMethod, MatchResult, Suggestion};

use crate::catalog::{CatalogIndex, IndexedEntry};
use crate::error::{Error, Result};
use crate::normalizer::{token_set, Normalizer};
use crate::types::CatalogEntry;
use serde::{Deserialize, Serialize};

pub const EXACT_CONFIDENCE: f64 = 1.0;
pub const CASE_INSENSITIVE_CONFIDENCE: f64 = 0.95;
pub const NORMALIZED_CONFIDENCE: f64 = 0.9;

/// 照合の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// ファジー照合でSKUを採用する最低スコア
    pub acceptance_threshold: f64,
    /// 返す候補数
    pub suggestion_count: usize,
    /// 識別キーワードのペナルティ表
    pub keyword_penalties: Vec<KeywordPenalty>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.75,
            suggestion_count: 5,
            keyword_penalties: default_keyword_penalties(),
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit("acceptance_threshold", self.acceptance_threshold)?;
        if self.suggestion_count == 0 {
            return Err(Error::Config("suggestion_count must be at least 1".into()));
        }
        for rule in &self.keyword_penalties {
            if rule.keyword.trim().is_empty() {
                return Err(Error::Config("keyword penalty with empty keyword".into()));
            }
            check_unit(&format!("{}.candidate_only", rule.keyword), rule.candidate_only)?;
            check_unit(&format!("{}.input_only", rule.keyword), rule.input_only)?;
        }
        Ok(())
    }
}

impl MatcherConfig {
    /// キーワードを正規化済みトークンの形に揃えた設定を返す
    ///
    /// 候補・入力のトークン集合と比較するため、`Beauty` は `beauti` になる。
    /// 正規化で空になる、または複数トークンになるキーワードは設定エラー。
    pub fn normalized_keywords(&self, normalizer: &Normalizer) -> Result<Self> {
        let mut config = self.clone();
        for rule in &mut config.keyword_penalties {
            let keyword = normalizer.normalize(&rule.keyword);
            if keyword.is_empty() || keyword.contains(' ') {
                return Err(Error::Config(format!(
                    "keyword {:?} must normalize to a single token, got {:?}",
                    rule.keyword, keyword
                )));
            }
            rule.keyword = keyword;
        }
        Ok(config)
    }
}

/// 0.0〜1.0 の範囲チェック
pub(crate) fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!("{} must be within [0, 1], got {}", name, value)))
    }
}

/// 集計側から見た照合器
pub trait Resolve {
    /// 商品名をSKUに照合
    fn resolve(&self, name: &str) -> MatchResult;
    /// SKUの代表商品名
    fn master_name(&self, sku: &str) -> Option<String>;
}

/// 1つのマスタスナップショットに対する照合器
///
/// 構築後は変更しない。マスタ更新は [`SharedMatcher`] で差し替える。
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatcherConfig,
    normalizer: Normalizer,
    index: CatalogIndex,
}

impl Matcher {
    /// 設定を検証して照合器を構築
    pub fn new(entries: &[CatalogEntry], config: MatcherConfig, normalizer: Normalizer) -> Result<Self> {
        config.validate()?;
        let config = config.normalized_keywords(&normalizer)?;
        Ok(Self::build(entries, config, normalizer))
    }

    /// 組み込み設定で照合器を構築
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        Self::build(entries, MatcherConfig::default(), Normalizer::default())
    }

    /// 同じ設定で別のマスタから構築し直す
    pub fn rebuild(&self, entries: &[CatalogEntry]) -> Self {
        Self::build(entries, self.config.clone(), self.normalizer.clone())
    }

    fn build(entries: &[CatalogEntry], config: MatcherConfig, normalizer: Normalizer) -> Self {
        let index = CatalogIndex::build(entries, &normalizer);
        Self {
            config,
            normalizer,
            index,
        }
    }

    /// 商品名をSKUに照合する
    pub fn resolve(&self, raw_name: &str) -> MatchResult {
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return MatchResult::blank();
        }

        if let Some(entry) = self.index.exact(raw_name).or_else(|| self.index.exact(trimmed)) {
            return hit(entry, EXACT_CONFIDENCE, MatchMethod::Exact);
        }

        if let Some(entry) = self.index.case_insensitive(&trimmed.to_lowercase()) {
            return hit(entry, CASE_INSENSITIVE_CONFIDENCE, MatchMethod::CaseInsensitive);
        }

        let normalized = self.normalizer.normalize(trimmed);
        if normalized.is_empty() {
            return MatchResult::blank();
        }

        if let Some(entry) = self.index.normalized(&normalized) {
            return hit(entry, NORMALIZED_CONFIDENCE, MatchMethod::Normalized);
        }

        let suggestions = self.rank(&normalized, self.config.suggestion_count);
        let Some(top) = suggestions.first() else {
            return MatchResult::blank();
        };

        let confidence = top.score;
        let sku = (confidence >= self.config.acceptance_threshold).then(|| top.sku.clone());
        tracing::debug!(
            input = trimmed,
            normalized = %normalized,
            top = %top.name,
            score = confidence,
            accepted = sku.is_some(),
            "fuzzy match"
        );

        MatchResult {
            sku,
            confidence,
            suggestions,
            method: MatchMethod::Fuzzy,
        }
    }

    /// ファジー照合の上位 n 件
    pub fn suggestions(&self, raw_name: &str, n: usize) -> Vec<Suggestion> {
        let normalized = self.normalizer.normalize(raw_name.trim());
        if normalized.is_empty() {
            return Vec::new();
        }
        self.rank(&normalized, n)
    }

    /// 商品名のSKUのみを返す
    pub fn get_sku(&self, raw_name: &str) -> Option<String> {
        self.resolve(raw_name).sku
    }

    /// SKUの代表商品名
    pub fn get_master_name(&self, sku: &str) -> Option<&str> {
        self.index.master_name(sku)
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// 全エントリを採点してスコア降順に n 件（同点はマスタ順）
    fn rank(&self, normalized_input: &str, n: usize) -> Vec<Suggestion> {
        let input_tokens = token_set(normalized_input);
        let entries = self.index.entries();

        let mut scored: Vec<(usize, f64)> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let score = scoring::score_candidate(
                    &self.config.keyword_penalties,
                    normalized_input,
                    &entry.normalized,
                    &input_tokens,
                    &entry.tokens,
                );
                (i, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(n);

        scored
            .into_iter()
            .map(|(i, score)| Suggestion {
                name: entries[i].name.clone(),
                sku: entries[i].sku.clone(),
                score,
            })
            .collect()
    }
}

impl Resolve for Matcher {
    fn resolve(&self, name: &str) -> MatchResult {
        Matcher::resolve(self, name)
    }

    fn master_name(&self, sku: &str) -> Option<String> {
        self.get_master_name(sku).map(str::to_string)
    }
}

fn hit(entry: &IndexedEntry, confidence: f64, method: MatchMethod) -> MatchResult {
    MatchResult::single(&entry.name, &entry.sku, confidence, method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::entries_from_pairs;

    fn catalog() -> Vec<CatalogEntry> {
        entries_from_pairs([
            ("Youvit Omega-3 Kids 30 Days Candy", "SKU001"),
            ("Youvit Multivitamin Anak 7's", "SKU002"),
            ("Youvit Collagen Beauty 30 Days", "SKU003"),
            ("Youvit Multivitamin Dewasa 30 Days", "SKU004"),
            ("Youvit Kids Immune 7 Days", "SKU005"),
            ("Youvit Vitamin C Dewasa", "SKU006"),
        ])
    }

    fn matcher() -> Matcher {
        Matcher::from_entries(&catalog())
    }

    #[test]
    fn test_blank_input() {
        let m = matcher();
        for input in ["", "   ", "\t\n"] {
            let result = m.resolve(input);
            assert_eq!(result, MatchResult::blank());
        }
    }

    #[test]
    fn test_every_catalog_name_resolves_exactly() {
        let m = matcher();
        for entry in catalog() {
            let result = m.resolve(&entry.name);
            assert_eq!(result.sku.as_deref(), Some(entry.sku.as_str()));
            assert_eq!(result.confidence, 1.0);
            assert_eq!(result.method, MatchMethod::Exact);
            assert_eq!(result.suggestions.len(), 1);
            assert_eq!(result.suggestions[0].name, entry.name);
        }
    }

    #[test]
    fn test_exact_match_on_trimmed_input() {
        let m = matcher();
        let result = m.resolve("  Youvit Vitamin C Dewasa  ");
        assert_eq!(result.sku.as_deref(), Some("SKU006"));
        assert_eq!(result.method, MatchMethod::Exact);
    }

    #[test]
    fn test_case_insensitive_match() {
        let m = matcher();
        let result = m.resolve("YOUVIT VITAMIN C DEWASA");
        assert_eq!(result.sku.as_deref(), Some("SKU006"));
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.method, MatchMethod::CaseInsensitive);
        assert_eq!(result.suggestions[0].name, "Youvit Vitamin C Dewasa");
    }

    #[test]
    fn test_normalized_match() {
        let m = matcher();
        let result = m.resolve("YOUVIT OMEGA 3 ANAK 30 DAYS");
        assert_eq!(result.sku.as_deref(), Some("SKU001"));
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.method, MatchMethod::Normalized);
    }

    #[test]
    fn test_only_noise_words_is_blank() {
        let m = matcher();
        assert_eq!(m.resolve("Candy Tablet"), MatchResult::blank());
    }

    #[test]
    fn test_fuzzy_example_from_single_entry_catalog() {
        let m = Matcher::from_entries(&entries_from_pairs([(
            "Youvit Omega-3 Kids 30 Days Candy",
            "SKU001",
        )]));
        let result = m.resolve("YOUVIT OMEGA -3 ANAK 30 DAYS CANDY");
        assert_eq!(result.sku.as_deref(), Some("SKU001"));
        assert!(result.confidence >= 0.75);
    }

    #[test]
    fn test_fuzzy_match_ocr_typo() {
        let m = matcher();
        let result = m.resolve("Youvit Collagen Beauty 30 Dais");
        assert_eq!(result.method, MatchMethod::Fuzzy);
        assert_eq!(result.suggestions[0].sku, "SKU003");
        assert_eq!(result.sku.as_deref(), Some("SKU003"));
        assert!(result.confidence >= 0.75 && result.confidence < 1.0);
    }

    #[test]
    fn test_fuzzy_below_threshold_keeps_suggestions() {
        let m = matcher();
        let result = m.resolve("Paracetamol Sirup");
        assert_eq!(result.method, MatchMethod::Fuzzy);
        assert_eq!(result.sku, None);
        assert!(!result.suggestions.is_empty());
        assert_eq!(result.confidence, result.suggestions[0].score);
    }

    #[test]
    fn test_suggestions_sorted_and_capped() {
        let m = matcher();
        for input in ["youvit", "Youvit Omega", "multi vitamin", "zzz", "Youvit 30 days"] {
            let result = m.resolve(input);
            assert!(result.suggestions.len() <= 5);
            assert!((0.0..=1.0).contains(&result.confidence));
            for pair in result.suggestions.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            for s in &result.suggestions {
                assert!((0.0..=1.0).contains(&s.score));
            }
        }
    }

    #[test]
    fn test_keyword_penalty_changes_ranking() {
        let catalog = entries_from_pairs([
            ("Youvit Omega Kids", "SKU_OMEGA"),
            ("Youvit Kids", "SKU_PLAIN"),
        ]);
        let m = Matcher::from_entries(&catalog);
        // "omega" が入力にない → omega 候補は 0.4 倍
        let suggestions = m.suggestions("Youvit Kid", 2);
        assert_eq!(suggestions[0].sku, "SKU_PLAIN");
        assert!(suggestions[1].score < suggestions[0].score);
    }

    #[test]
    fn test_empty_catalog() {
        let m = Matcher::from_entries(&[]);
        assert_eq!(m.resolve("Youvit Omega Kids"), MatchResult::blank());
        assert!(m.suggestions("Youvit", 5).is_empty());
    }

    #[test]
    fn test_get_sku_and_master_name() {
        let catalog = entries_from_pairs([
            ("Youvit Omega Kids", "SKU001"),
            ("Youvit Omega Anak", "SKU001"),
        ]);
        let m = Matcher::from_entries(&catalog);
        assert_eq!(m.get_sku("youvit omega anak"), Some("SKU001".to_string()));
        assert_eq!(m.get_sku(""), None);
        assert_eq!(m.get_master_name("SKU001"), Some("Youvit Omega Kids"));
        assert_eq!(m.get_master_name("SKU404"), None);
    }

    #[test]
    fn test_custom_threshold_and_count() {
        let config = MatcherConfig {
            acceptance_threshold: 0.99,
            suggestion_count: 2,
            ..Default::default()
        };
        let m = Matcher::new(&catalog(), config, Normalizer::default()).unwrap();
        let result = m.resolve("Youvit Collagen Beauty 30 Dais");
        assert_eq!(result.sku, None);
        assert_eq!(result.suggestions.len(), 2);
    }

    #[test]
    fn test_config_validation() {
        let bad = MatcherConfig {
            acceptance_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::Config(_))));

        let bad = MatcherConfig {
            suggestion_count: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = MatcherConfig {
            keyword_penalties: vec![KeywordPenalty::new("omega", -0.1, 0.5)],
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        assert!(MatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_configured_keyword_is_normalized() {
        let entries = entries_from_pairs([("Youvit Beauty Kids", "SKU010")]);
        let config = MatcherConfig {
            keyword_penalties: vec![KeywordPenalty::new("Beauty", 0.1, 1.0)],
            ..Default::default()
        };
        let m = Matcher::new(&entries, config, Normalizer::default()).unwrap();
        assert_eq!(m.config().keyword_penalties[0].keyword, "beauti");

        let top = &m.suggestions("Youvit Kidz", 1)[0];
        let unpenalized = crate::similarity::ratio("youvit kidz", "youvit beauti kids");
        assert!((top.score - unpenalized * 0.1).abs() < 1e-9);
        assert!(top.score < 0.1);
    }

    #[test]
    fn test_keyword_must_be_single_token() {
        for keyword in ["the", "!!", "omega 3"] {
            let config = MatcherConfig {
                keyword_penalties: vec![KeywordPenalty::new(keyword, 0.5, 0.5)],
                ..Default::default()
            };
            let err = Matcher::new(&catalog(), config, Normalizer::default()).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{}", keyword);
        }
    }

    #[test]
    fn test_padded_catalog_name_case_insensitive() {
        let m = Matcher::from_entries(&entries_from_pairs([("  Padded Name  ", "SKU020")]));
        let result = m.resolve("PADDED NAME");
        assert_eq!(result.sku.as_deref(), Some("SKU020"));
        assert_eq!(result.method, MatchMethod::CaseInsensitive);
        assert_eq!(result.confidence, CASE_INSENSITIVE_CONFIDENCE);
    }

    #[test]
    fn test_rebuild_keeps_config() {
        let config = MatcherConfig {
            suggestion_count: 1,
            ..Default::default()
        };
        let m = Matcher::new(&catalog(), config, Normalizer::default()).unwrap();
        let rebuilt = m.rebuild(&entries_from_pairs([("Other", "SKU900")]));
        assert_eq!(rebuilt.config().suggestion_count, 1);
        assert_eq!(rebuilt.index().len(), 1);
    }
}
