//! Numeric-token field mapping and holding assembly.

use regex::RegexBuilder;
use tracing::debug;

use crate::models::config::LayoutConfig;
use crate::models::holding::{FundMetadata, Holding, Page};

use super::normalize::{normalize_name, parse_amount, trim_name};
use super::patterns::{FUND_NAME_LINE, REPORT_DATE};
use super::ExtractionIssue;
use super::rows::RawRow;

/// How many leading pages are scanned for fund name and report date.
const METADATA_PAGES: usize = 3;

/// Whether a security type denotes a fixed-income instrument, whose quantity
/// column is a principal amount rather than a share count.
pub fn is_bond_like(security_type: &str) -> bool {
    let lower = security_type.to_lowercase();
    ["bond", "note", "debenture", "fixed income"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn is_percent_token(token: &str) -> bool {
    token.trim_end_matches(['*', '\u{2020}', '\u{2021}']).ends_with('%')
}

/// Assemble a holding from a closed raw row.
///
/// Percentage tokens are discarded outright; the token at the configured
/// shares index becomes shares or principal depending on the active security
/// type; the token at the value index becomes market value. A missing token
/// leaves its field absent (surfaced later as a presence issue, never an
/// error here); an unparsable token is recorded as a per-field issue.
pub fn build_holding(
    cfg: &LayoutConfig,
    meta: &FundMetadata,
    raw: &RawRow,
) -> (Holding, Vec<ExtractionIssue>) {
    let mut issues = Vec::new();

    let name = trim_name(&normalize_name(&raw.name), &cfg.name_trim_markers);

    let values: Vec<&str> = raw
        .numeric_tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !is_percent_token(t))
        .collect();

    let mut shares = None;
    let mut principal = None;
    let mut market_value = None;

    if let Some(idx) = cfg.shares_token_index {
        if let Some(token) = values.get(idx) {
            match parse_amount(token) {
                Some(amount) => {
                    if raw.security_type.as_deref().is_some_and(is_bond_like) {
                        principal = Some(amount);
                    } else {
                        shares = Some(amount);
                    }
                }
                None => issues.push(ExtractionIssue::field_unparsable(raw, "shares", token)),
            }
        }
    }

    if let Some(idx) = cfg.value_token_index {
        if let Some(token) = values.get(idx) {
            match parse_amount(token) {
                Some(amount) => market_value = Some(amount),
                None => issues.push(ExtractionIssue::field_unparsable(raw, "market_value", token)),
            }
        }
    }

    let holding = Holding {
        fund_name: meta.fund_name.clone(),
        report_date: meta.report_date.clone(),
        security_name: name,
        security_type: raw.security_type.clone(),
        country_iso3: raw.country_iso3.clone(),
        sector: raw.sector.clone(),
        shares,
        principal,
        market_value,
    };
    (holding, issues)
}

/// Extract fund name and report date from the document's first pages.
///
/// The configured patterns run first; the fund name falls back to a line
/// ending in "Fund" and then to the humanized layout id, the report date to
/// the long month-name pattern.
pub fn extract_fund_metadata(pages: &[Page], cfg: &LayoutConfig) -> FundMetadata {
    let text = pages
        .iter()
        .take(METADATA_PAGES)
        .map(Page::text)
        .collect::<Vec<_>>()
        .join("\n");

    let fund_name = match_configured(&text, cfg.fund_name_pattern.as_deref())
        .or_else(|| {
            FUND_NAME_LINE
                .captures(&text)
                .map(|caps| caps[1].trim().to_string())
        })
        .unwrap_or_else(|| cfg.display_name());

    let report_date = match_configured(&text, cfg.report_date_pattern.as_deref())
        .or_else(|| REPORT_DATE.find(&text).map(|m| m.as_str().trim().to_string()))
        .unwrap_or_default();

    debug!("layout {}: fund `{}`, report date `{}`", cfg.id, fund_name, report_date);

    FundMetadata {
        fund_name,
        report_date,
    }
}

/// First capture group of a configured pattern, or its whole match.
fn match_configured(text: &str, pattern: Option<&str>) -> Option<String> {
    let re = RegexBuilder::new(pattern?)
        .case_insensitive(true)
        .build()
        .ok()?;
    let caps = re.captures(text)?;
    let m = caps.get(1).or_else(|| caps.get(0))?;
    let value = m.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::super::IssueKind;
    use super::*;

    fn raw_row(name: &str, tokens: &[&str], security_type: Option<&str>) -> RawRow {
        RawRow {
            name: name.to_string(),
            numeric_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            security_type: security_type.map(str::to_string),
            sector: None,
            country_iso3: None,
            page: 0,
            column: 0,
        }
    }

    fn meta() -> FundMetadata {
        FundMetadata {
            fund_name: "Test Fund".to_string(),
            report_date: "October 31, 2024".to_string(),
        }
    }

    #[test]
    fn test_equity_row_maps_shares_and_value() {
        let cfg = LayoutConfig::default();
        let raw = raw_row("Toyota Motor Corp.", &["2,000", "41,950"], Some("Common Stock"));

        let (holding, issues) = build_holding(&cfg, &meta(), &raw);
        assert_eq!(holding.shares, Some(Decimal::from(2_000)));
        assert_eq!(holding.principal, None);
        assert_eq!(holding.market_value, Some(Decimal::from(41_950)));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_bond_row_maps_principal() {
        let cfg = LayoutConfig::default();
        let raw = raw_row(
            "Delta Air Lines, Inc. 5.750%, 5/15/28",
            &["1,499,000", "1,499,932"],
            Some("Convertible Bonds"),
        );

        let (holding, issues) = build_holding(&cfg, &meta(), &raw);
        assert_eq!(holding.shares, None);
        assert_eq!(holding.principal, Some(Decimal::from(1_499_000)));
        assert_eq!(holding.market_value, Some(Decimal::from(1_499_932)));
        assert_eq!(
            holding.security_name,
            "Delta Air Lines, Inc. 5.750%, 5/15/28"
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_percent_tokens_are_discarded_before_indexing() {
        let cfg = LayoutConfig::default();
        let raw = raw_row("Apple Inc.", &["100", "1,234", "0.4%"], None);

        let (holding, _) = build_holding(&cfg, &meta(), &raw);
        assert_eq!(holding.shares, Some(Decimal::from(100)));
        assert_eq!(holding.market_value, Some(Decimal::from(1_234)));
    }

    #[test]
    fn test_missing_tokens_leave_fields_absent() {
        let cfg = LayoutConfig::default();
        let raw = raw_row("Sparse Issuer", &["750"], None);

        let (holding, issues) = build_holding(&cfg, &meta(), &raw);
        assert_eq!(holding.shares, Some(Decimal::from(750)));
        assert_eq!(holding.market_value, None);
        assert!(issues.is_empty(), "missing token is not an extraction issue");
    }

    #[test]
    fn test_unparsable_token_records_issue() {
        let cfg = LayoutConfig::default();
        let raw = raw_row("Broken Issuer", &["(1,234", "5,678"], None);

        let (holding, issues) = build_holding(&cfg, &meta(), &raw);
        assert_eq!(holding.shares, None);
        assert_eq!(holding.market_value, Some(Decimal::from(5_678)));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::FieldUnparsable);
    }

    #[test]
    fn test_is_bond_like() {
        assert!(is_bond_like("Convertible Bonds"));
        assert!(is_bond_like("Corporate Notes"));
        assert!(is_bond_like("Fixed Income Securities"));
        assert!(!is_bond_like("Common Stock"));
        assert!(!is_bond_like("Preferred Stock"));
    }

    #[test]
    fn test_fund_metadata_from_pattern() {
        let cfg = LayoutConfig {
            id: "hartford_small_cap".to_string(),
            fund_name_pattern: Some(r"The Hartford [A-Za-z ]*Fund".to_string()),
            ..LayoutConfig::default()
        };
        let mut page = Page::new(0, 612.0);
        page.push_line("The Hartford Small Cap Growth Fund", 40.0);
        page.push_line("Schedule of Investments", 40.0);
        page.push_line("October 31, 2024 (Unaudited)", 40.0);

        let meta = extract_fund_metadata(&[page], &cfg);
        assert_eq!(meta.fund_name, "The Hartford Small Cap Growth Fund");
        assert_eq!(meta.report_date, "October 31, 2024");
    }

    #[test]
    fn test_fund_metadata_fallbacks() {
        let cfg = LayoutConfig {
            id: "gsam_em_equity".to_string(),
            ..LayoutConfig::default()
        };

        // A line ending in "Fund" wins over the humanized id.
        let mut page = Page::new(0, 612.0);
        page.push_line("Goldman Sachs Emerging Markets Equity Fund", 40.0);
        let meta = extract_fund_metadata(&[page], &cfg);
        assert_eq!(meta.fund_name, "Goldman Sachs Emerging Markets Equity Fund");

        // No match at all: humanized layout id, empty date.
        let empty = Page::new(0, 612.0);
        let meta = extract_fund_metadata(&[empty], &cfg);
        assert_eq!(meta.fund_name, "Gsam Em Equity");
        assert_eq!(meta.report_date, "");
    }
}
