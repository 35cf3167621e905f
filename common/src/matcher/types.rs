use serde::{Deserialize, Serialize};

/// 照合候補（商品名, SKU, スコア）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub sku: String,
    pub score: f64,
}

/// どの段階で照合したか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// 空入力・正規化後に空
    #[default]
    Blank,
    Exact,
    CaseInsensitive,
    Normalized,
    Fuzzy,
}

/// 照合結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 採用したSKU（閾値未満なら None）
    pub sku: Option<String>,
    /// 照合の信頼度（0.0〜1.0）。未採用でも最上位候補のスコアを返す
    pub confidence: f64,
    /// スコア降順の候補
    pub suggestions: Vec<Suggestion>,
    pub method: MatchMethod,
}

impl MatchResult {
    /// 照合できなかった結果
    pub fn blank() -> Self {
        Self::default()
    }

    pub(crate) fn single(name: &str, sku: &str, confidence: f64, method: MatchMethod) -> Self {
        Self {
            sku: Some(sku.to_string()),
            confidence,
            suggestions: vec![Suggestion {
                name: name.to_string(),
                sku: sku.to_string(),
                score: confidence,
            }],
            method,
        }
    }

    /// 上位2候補のスコア差が margin 以内か（ファジー照合のみ）
    pub fn is_ambiguous(&self, margin: f64) -> bool {
        if self.method != MatchMethod::Fuzzy {
            return false;
        }
        match (self.suggestions.first(), self.suggestions.get(1)) {
            (Some(top), Some(second)) => top.score - second.score <= margin,
            _ => false,
        }
    }
}
