//! エンジン設定
//!
//! 照合・集計・正規化の設定をまとめたもの。環境変数は読まない
//! （読み込みは呼び出し側の責務）。

use crate::aggregator::{AggregatorConfig, SkuAggregator};
use crate::error::Result;
use crate::matcher::{Matcher, MatcherConfig, SharedMatcher};
use crate::normalizer::{Normalizer, NormalizerConfig};
use crate::types::CatalogEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub matcher: MatcherConfig,
    pub aggregator: AggregatorConfig,
    pub normalizer: NormalizerConfig,
}

impl EngineConfig {
    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み（検証込み）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 閾値の範囲、翻訳テーブルの循環、キーワードの形を検証
    pub fn validate(&self) -> Result<()> {
        self.matcher.validate()?;
        self.aggregator.validate()?;
        let normalizer = Normalizer::new(&self.normalizer)?;
        self.matcher.normalized_keywords(&normalizer)?;
        Ok(())
    }

    /// マスタから照合器を構築
    pub fn build_matcher(&self, entries: &[CatalogEntry]) -> Result<Matcher> {
        Matcher::new(
            entries,
            self.matcher.clone(),
            Normalizer::new(&self.normalizer)?,
        )
    }

    /// マスタ更新に対応した照合器を構築
    pub fn build_shared_matcher(&self, entries: &[CatalogEntry]) -> Result<SharedMatcher> {
        Ok(SharedMatcher::new(self.build_matcher(entries)?))
    }

    pub fn build_aggregator(&self) -> Result<SkuAggregator> {
        SkuAggregator::new(self.aggregator.clone())
    }
}
