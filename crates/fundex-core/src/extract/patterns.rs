//! Common regex patterns for schedule-of-investments line classification.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A whole whitespace-delimited token that reads as a number: optional $,
    // digit groups with comma separators, optional decimal part, optional
    // parentheses for negatives, optional % suffix, optional footnote marks.
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"^\(?\$?[0-9][0-9,]*(?:\.[0-9]+)?\)?%?[*\u{2020}\u{2021}]*$"
    ).unwrap();

    // A currency-sized number anywhere in a line; drives the
    // looks-like-holdings page predicate.
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"\$?[0-9][0-9,]{2,}(?:\.[0-9]+)?"
    ).unwrap();

    // Sector or country heading: "Airlines - 0.0%", "China–28.8%".
    pub static ref HEADING_WITH_PERCENT: Regex = Regex::new(
        r"^(.+?)\s*[—–-]\s*\(?[0-9]+(?:\.[0-9]+)?\)?%$"
    ).unwrap();

    // Trailing percentage decoration on instrument headers: " - 0.0%".
    pub static ref HEADER_DECORATION: Regex = Regex::new(
        r"\s*[—–-]?\s*\(?[0-9]+(?:\.[0-9]+)?\)?%\s*$"
    ).unwrap();

    // Long month-name report date: "October 31, 2024".
    pub static ref REPORT_DATE: Regex = Regex::new(
        r"(?i)(?:January|February|March|April|May|June|July|August|September|October|November|December)\s*\.?\s*\d{1,2},\s*\d{4}"
    ).unwrap();

    // Fund-name fallback: a line ending in "Fund".
    pub static ref FUND_NAME_LINE: Regex = Regex::new(
        r"(?im)^\s*(\S.*\bFund)\s*$"
    ).unwrap();

    // Footnote markers attached to numeric tokens.
    pub static ref FOOTNOTE_MARKS: Regex = Regex::new(
        r"[*\u{2020}\u{2021}]+"
    ).unwrap();
}
