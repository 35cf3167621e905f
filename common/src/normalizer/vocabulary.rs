//! 語彙テーブル
//!
//! インドネシア語／英語の表記ゆれを吸収する翻訳テーブルと、
//! 識別に寄与しないノイズ語の一覧。

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 組み込みの翻訳テーブル（トークン → 正規形）
pub const DEFAULT_TRANSLATIONS: &[(&str, &str)] = &[
    ("anak", "kids"),
    ("dewasa", "adult"),
    ("multivitamin", "mltvmn"),
    ("vitamin", "vit"),
    ("gummy", "gummy"),
    ("collagen", "collagen"),
    ("omega", "omega"),
    ("beauty", "beauti"),
];

/// 組み込みのノイズ語（剤形・包装・接続詞）
pub const DEFAULT_NOISE_WORDS: &[&str] = &[
    "candy", "gummy", "tablet", "kapsul", "caplet", "the", "and", "for", "with",
];

/// 正規化テーブルの設定
///
/// JSONでテーブルを指定した場合は組み込みテーブルを置き換える。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// 翻訳テーブル
    pub translations: HashMap<String, String>,
    /// ノイズ語
    pub noise_words: HashSet<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            translations: DEFAULT_TRANSLATIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            noise_words: DEFAULT_NOISE_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl NormalizerConfig {
    /// 翻訳を追加（既存のキーは上書き）
    pub fn with_translation(mut self, from: &str, to: &str) -> Self {
        self.translations.insert(from.to_string(), to.to_string());
        self
    }

    /// ノイズ語を追加
    pub fn with_noise_word(mut self, word: &str) -> Self {
        self.noise_words.insert(word.to_string());
        self
    }
}
