//! Name and numeric normalization for extracted rows.
//!
//! PDF text extraction runs words together (`AssaAbloy`), splits hyphenated
//! names (`Toronto- Dominion`), and glues parentheses to the preceding word.
//! [`normalize_name`] repairs these; it is idempotent, so re-running an
//! already-extracted document cannot change its output.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::FOOTNOTE_MARKS;

lazy_static! {
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LOWER_UPPER: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
    static ref HYPHEN_SPACE: Regex = Regex::new(r"([A-Za-z])-\s+").unwrap();
    static ref SPACE_COMMA: Regex = Regex::new(r"\s+,").unwrap();
    static ref COMMA_LETTER: Regex = Regex::new(r",([A-Za-z])").unwrap();
    static ref AMP_SPACED: Regex = Regex::new(r"\s+&\s*|\s*&\s+").unwrap();
    static ref BEFORE_PAREN: Regex = Regex::new(r"([^\s(])\(").unwrap();
    static ref INSIDE_OPEN: Regex = Regex::new(r"\(\s+").unwrap();
    static ref INSIDE_CLOSE: Regex = Regex::new(r"\s+\)").unwrap();
    static ref AFTER_PAREN: Regex = Regex::new(r"\)([A-Za-z0-9])").unwrap();
}

/// Normalize a security name assembled from raw line fragments.
///
/// Applying this twice yields the same string as applying it once.
pub fn normalize_name(raw: &str) -> String {
    let mut name = MULTI_SPACE.replace_all(raw.trim(), " ").into_owned();

    // Run-together issuer names: a lowercase letter immediately followed by
    // an uppercase one gets a boundary space.
    name = LOWER_UPPER.replace_all(&name, "$1 $2").into_owned();

    // "Toronto- Dominion" -> "Toronto-Dominion".
    name = HYPHEN_SPACE.replace_all(&name, "$1-").into_owned();

    // No space before a comma, one space after a comma preceding a letter.
    name = SPACE_COMMA.replace_all(&name, ",").into_owned();
    name = COMMA_LETTER.replace_all(&name, ", $1").into_owned();

    // Balance spacing around an ampersand that already has whitespace on
    // either side; "AT&T" stays untouched.
    name = AMP_SPACED.replace_all(&name, " & ").into_owned();

    // "Bank( The)" -> "Bank (The)".
    name = BEFORE_PAREN.replace_all(&name, "$1 (").into_owned();
    name = INSIDE_OPEN.replace_all(&name, "(").into_owned();
    name = INSIDE_CLOSE.replace_all(&name, ")").into_owned();
    name = AFTER_PAREN.replace_all(&name, ") $1").into_owned();

    MULTI_SPACE.replace_all(&name, " ").trim().to_string()
}

/// Truncate a normalized name at the first configured trim marker.
pub fn trim_name(name: &str, markers: &[String]) -> String {
    let mut cut = name.len();
    for marker in markers {
        if let Some(pos) = name.find(marker.as_str()) {
            cut = cut.min(pos);
        }
    }
    name[..cut].trim_end().to_string()
}

/// Parse a currency/number token into a decimal.
///
/// Strips `$`, thousands commas, and footnote markers; a parenthesized value
/// is negative; a bare dash placeholder is absent. Returns `None` when the
/// remainder does not parse, which the caller records as a per-field issue.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = FOOTNOTE_MARKS.replace_all(raw, "");
    let cleaned = cleaned.trim();

    let (body, negative) = match cleaned
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (inner, true),
        None => (cleaned, false),
    };

    let body: String = body.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let body = body.trim();
    if body.is_empty() || body == "-" || body == "—" {
        return None;
    }

    let value = Decimal::from_str(body).ok()?;
    Some(if negative { -value } else { value })
}
