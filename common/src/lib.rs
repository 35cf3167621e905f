//! SKU Recon Common Library
//!
//! OCR商品名とSKUマスタの照合エンジン（CLIと共有）
//!
//! - normalizer: 商品名の正規化
//! - similarity: Ratcliff/Obershelp 類似度
//! - catalog: マスタのインデックス
//! - matcher: 商品名 → SKU 照合
//! - aggregator: SKU別集計

pub mod types;
pub mod error;
pub mod normalizer;
pub mod similarity;
pub mod catalog;
pub mod matcher;
pub mod aggregator;
pub mod config;

pub use types::{entries_from_pairs, CatalogEntry, OcrLine};
pub use error::{Error, Result};
pub use normalizer::{Normalizer, NormalizerConfig};
pub use catalog::CatalogIndex;
pub use matcher::{MatchMethod, MatchResult, Matcher, MatcherConfig, Resolve, SharedMatcher, Suggestion};
pub use aggregator::{AggregatedSku, Aggregation, AggregatorConfig, Issue, SkuAggregator};
pub use config::EngineConfig;
