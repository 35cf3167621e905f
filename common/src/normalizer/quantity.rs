//! 数量サフィックスの正規化
//!
//! 「30 days」「7's」「7 day's」のような日数・個数表記を
//! `<数字>days` の単一トークンに畳み込む。

use regex::Regex;
use std::borrow::Cow;

lazy_static::lazy_static! {
    // 「30 day」「30days」「30 day s」（アポストロフィ除去後の "day's"）
    static ref DAYS_RE: Regex = Regex::new(r"(?i)\b(\d+)\s*day(?:\s*s)?\b").unwrap();
    // 「7s」「7 s」（アポストロフィ除去後の "7's"）
    static ref COUNT_S_RE: Regex = Regex::new(r"(?i)\b(\d+)\s*s\b").unwrap();
}

/// 数量サフィックスを `<数字>days` に統一する
///
/// 句読点除去後のテキストを前提とする。`30days` のように既に統一済みの
/// トークンは変化しない。
pub fn fold_day_suffixes(text: &str) -> Cow<'_, str> {
    let folded = DAYS_RE.replace_all(text, "${1}days");
    if !COUNT_S_RE.is_match(&folded) {
        return folded;
    }
    Cow::Owned(COUNT_S_RE.replace_all(&folded, "${1}days").into_owned())
}
