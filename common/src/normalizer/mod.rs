//! 商品名の正規化モジュール
//!
//! OCRで読み取った商品名とマスタの商品名を同じ形に揃える。
//!
//! ## 処理フロー
//! 1. 小文字化
//! 2. 英数字・空白以外を空白に置換
//! 3. トークン単位で翻訳テーブルを適用
//! 4. 数量サフィックス（`30 days`, `7's`）を `<数字>days` に統一
//! 5. ノイズ語を除去
//! 6. 空白を畳み込んで前後を除去
//!
//! 3〜5 は出力が変化しなくなるまで繰り返す（ノイズ語の除去で
//! 「30 candy days」→「30 days」のように新しい並びが生じるため）。
//!
//! 翻訳テーブルは構築時に連鎖を解決しておく（`remaja→teen`, `teen→youth`
//! なら `remaja→youth`）。翻訳結果が再びキーになることはない。循環する
//! テーブルは設定エラー。

pub mod quantity;
pub mod vocabulary;

pub use vocabulary::NormalizerConfig;

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// 3〜5 の繰り返し上限
const MAX_PASSES: usize = 8;

/// 正規化器
#[derive(Debug, Clone)]
pub struct Normalizer {
    translations: HashMap<String, String>,
    noise_words: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        let config = NormalizerConfig::default();
        Self {
            // 組み込みテーブルに連鎖・循環はない
            translations: clean_translations(&config.translations),
            noise_words: clean_noise_words(&config.noise_words),
        }
    }
}

impl Normalizer {
    /// 設定から正規化器を構築
    ///
    /// テーブルのキー・値も同じ字種規則で整形し、翻訳の連鎖を解決する。
    /// 翻訳が循環している場合は `Error::Config`。
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let translations = resolve_chains(&clean_translations(&config.translations))?;
        Ok(Self {
            translations,
            noise_words: clean_noise_words(&config.noise_words),
        })
    }

    /// テキストを正規化する
    ///
    /// 空文字・空白のみの入力は空文字を返す。
    pub fn normalize(&self, text: &str) -> String {
        let mut current = clean(text);
        if current.is_empty() {
            return current;
        }

        for _ in 0..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }

        current
    }

    /// 翻訳・数量統一・ノイズ除去の1パス
    fn pass(&self, text: &str) -> String {
        let translated = text
            .split_whitespace()
            .map(|token| {
                self.translations
                    .get(token)
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ");

        let folded = quantity::fold_day_suffixes(&translated);

        folded
            .split_whitespace()
            .filter(|token| !self.noise_words.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// キー・値を整形（キーが1トークンでないもの、恒等写像は捨てる）
fn clean_translations(table: &HashMap<String, String>) -> HashMap<String, String> {
    table
        .iter()
        .filter_map(|(from, to)| {
            let from = clean(from);
            let to = clean(to);
            if from.is_empty() || from.contains(' ') || from == to {
                return None;
            }
            Some((from, to))
        })
        .collect()
}

fn clean_noise_words(words: &HashSet<String>) -> HashSet<String> {
    words
        .iter()
        .map(|w| clean(w))
        .filter(|w| !w.is_empty())
        .collect()
}

/// 各キーを連鎖の終端まで展開したテーブルを作る
fn resolve_chains(table: &HashMap<String, String>) -> Result<HashMap<String, String>> {
    let mut resolved = HashMap::with_capacity(table.len());
    for key in table.keys() {
        let mut path = Vec::new();
        expand_token(key, table, &mut resolved, &mut path)?;
    }
    Ok(resolved)
}

/// トークンを翻訳し、結果の各トークンも再帰的に展開する
///
/// 翻訳結果は数量サフィックスの統一も済ませてから展開する
/// （`7days→7 day` のような循環もここで検出される）。
fn expand_token(
    token: &str,
    table: &HashMap<String, String>,
    resolved: &mut HashMap<String, String>,
    path: &mut Vec<String>,
) -> Result<String> {
    if let Some(done) = resolved.get(token) {
        return Ok(done.clone());
    }
    let Some(value) = table.get(token) else {
        return Ok(token.to_string());
    };
    if path.iter().any(|p| p == token) {
        path.push(token.to_string());
        return Err(Error::Config(format!(
            "translation cycle: {}",
            path.join(" -> ")
        )));
    }

    path.push(token.to_string());
    let folded = quantity::fold_day_suffixes(value);
    let mut parts = Vec::new();
    for part in folded.split_whitespace() {
        let expanded = expand_token(part, table, resolved, path)?;
        if !expanded.is_empty() {
            parts.push(expanded);
        }
    }
    path.pop();

    let expanded = parts.join(" ");
    resolved.insert(token.to_string(), expanded.clone());
    Ok(expanded)
}

/// 正規化済み文字列をトークン集合にする
pub fn token_set(normalized: &str) -> HashSet<String> {
    normalized
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// 小文字化 + 英数字・空白以外を空白に置換 + 空白の畳み込み
fn clean(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
