//! Input normalization shared by every search path.
//!
//! All user text is funnelled through [`normalize`] before a query is planned:
//! diacritics are stripped by NFD decomposition, characters outside
//! `[A-Za-z0-9 -]` are removed, and the case is folded according to the facet
//! being searched. The whole pipeline is idempotent.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Minimum normalized length before any query is issued. Shorter input is a
/// normal typing transient, not an error.
pub const MIN_QUERY_LEN: usize = 3;

/// How a facet folds letter case.
///
/// Identifier facets stay mixed-case so a literal `X` check digit survives;
/// name facets fold to the case their stored values use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFold {
    Preserve,
    Upper,
    Lower,
}

/// Strip combining marks after NFD decomposition, so `"cadeira-giratória"`
/// becomes `"cadeira-giratoria"`.
#[must_use]
pub fn strip_diacritics(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Full normalization: diacritic stripping, charset filter, case fold.
#[must_use]
pub fn normalize(input: &str, fold: CaseFold) -> String {
    let stripped = strip_diacritics(input);
    let filtered: String = stripped
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect();
    let folded = match fold {
        CaseFold::Preserve => filtered,
        CaseFold::Upper => filtered.to_uppercase(),
        CaseFold::Lower => filtered.to_lowercase(),
    };
    folded.trim().to_string()
}

/// Whether normalized input is long enough to search at all.
#[must_use]
pub fn meets_min_len(normalized: &str) -> bool {
    normalized.chars().count() >= MIN_QUERY_LEN
}

/// Split hyphenated input into the `(code, check digit)` composite pair.
///
/// The code part must be all digits; the check digit is a single digit or a
/// literal `X` (uppercased on the way out). Anything else disqualifies the
/// exact-composite strategy for this input.
#[must_use]
pub fn split_composite(input: &str) -> Option<(String, String)> {
    let normalized = normalize(input, CaseFold::Preserve);
    let (code, check) = normalized.rsplit_once('-')?;
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut chars = check.chars();
    let digit = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if !digit.is_ascii_digit() && !digit.eq_ignore_ascii_case(&'x') {
        return None;
    }
    Some((code.to_string(), digit.to_ascii_uppercase().to_string()))
}

/// Identifier-box formatting: keep digits, drop leading zeros, insert the
/// hyphen before the trailing check digit. `"0123"` becomes `"12-3"`.
#[must_use]
pub fn format_asset_code(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.len() < 2 {
        return trimmed.to_string();
    }
    let (code, check) = trimmed.split_at(trimmed.len() - 1);
    format!("{code}-{check}")
}
