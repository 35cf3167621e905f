//! 候補スコアの計算
//!
//! スコア = 類似度 × キーワードペナルティ

use crate::similarity::ratio;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 識別キーワードのペナルティ設定
///
/// キーワードが候補にだけある場合は `candidate_only`、
/// 入力にだけある場合は `input_only` をスコアに掛ける。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPenalty {
    pub keyword: String,
    pub candidate_only: f64,
    pub input_only: f64,
}

impl KeywordPenalty {
    pub fn new(keyword: &str, candidate_only: f64, input_only: f64) -> Self {
        Self {
            keyword: keyword.to_string(),
            candidate_only,
            input_only,
        }
    }
}

/// 組み込みのペナルティ表
pub fn default_keyword_penalties() -> Vec<KeywordPenalty> {
    vec![
        KeywordPenalty::new("omega", 0.4, 0.6),
        KeywordPenalty::new("collagen", 0.5, 0.6),
        KeywordPenalty::new("beauti", 0.5, 0.6),
    ]
}

/// キーワードペナルティ（全キーワードの積）
pub fn keyword_penalty(
    penalties: &[KeywordPenalty],
    input_tokens: &HashSet<String>,
    candidate_tokens: &HashSet<String>,
) -> f64 {
    let mut penalty = 1.0;
    for rule in penalties {
        let in_input = input_tokens.contains(&rule.keyword);
        let in_candidate = candidate_tokens.contains(&rule.keyword);
        if in_candidate && !in_input {
            penalty *= rule.candidate_only;
        }
        if in_input && !in_candidate {
            penalty *= rule.input_only;
        }
    }
    penalty
}

/// 候補1件のスコア
pub fn score_candidate(
    penalties: &[KeywordPenalty],
    normalized_input: &str,
    normalized_candidate: &str,
    input_tokens: &HashSet<String>,
    candidate_tokens: &HashSet<String>,
) -> f64 {
    let base = ratio(normalized_input, normalized_candidate);
    let score = base * keyword_penalty(penalties, input_tokens, candidate_tokens);
    score.clamp(0.0, 1.0)
}
