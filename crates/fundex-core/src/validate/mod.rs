//! Validation engine over extracted holdings.
//!
//! Validation is advisory: it records issues for downstream review tooling
//! and never mutates or drops a holding. Rule groups can be switched off per
//! layout, since some report families legitimately violate them (e.g. funds
//! that short).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::countries;
use crate::extract::fields::is_bond_like;
use crate::models::holding::{Holding, ReportedTotal};

/// Issue severity; errors are for clearly bad data, warnings for suspicious
/// patterns. Downstream consumers decide whether to gate on errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Per-layout validation switches and tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Check that the report date parses as a date.
    pub check_types: bool,

    /// Check required fields and field combinations.
    pub check_presence: bool,

    /// Check that amounts are non-negative (long-only assumption).
    pub check_range: bool,

    /// Compare summed market values against reported totals.
    pub check_aggregates: bool,

    /// Relative tolerance for aggregate comparisons.
    pub relative_tolerance: Decimal,

    /// Absolute tolerance for aggregate comparisons, in currency units.
    pub absolute_tolerance: Decimal,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            check_types: true,
            check_presence: true,
            check_range: true,
            check_aggregates: true,
            relative_tolerance: Decimal::new(5, 3), // 0.5%
            absolute_tolerance: Decimal::ONE,       // $1
        }
    }
}

/// An issue attached to one holding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    /// Index of the holding in the extraction output.
    pub row: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    pub severity: Severity,

    pub message: String,
}

/// A document-level issue not tied to a single holding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentIssue {
    pub severity: Severity,
    pub message: String,
}

/// Outcome of one reported-total comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateOutcome {
    /// What was compared: a security-type group or the whole document.
    pub scope: String,

    /// The reported total.
    pub expected: Decimal,

    /// The sum over the matching holdings.
    pub actual: Decimal,

    pub passed: bool,
}

/// Validation output: advisory issues plus aggregate outcomes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub row_issues: Vec<RowIssue>,
    pub document_issues: Vec<DocumentIssue>,
    pub aggregates: Vec<AggregateOutcome>,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.row_issues.is_empty()
            && self.document_issues.is_empty()
            && self.aggregates.iter().all(|a| a.passed)
    }

    fn count(&self, severity: Severity) -> usize {
        self.row_issues.iter().filter(|i| i.severity == severity).count()
            + self
                .document_issues
                .iter()
                .filter(|i| i.severity == severity)
                .count()
    }

    fn row(&mut self, row: usize, field: Option<&str>, severity: Severity, message: impl Into<String>) {
        self.row_issues.push(RowIssue {
            row,
            field: field.map(str::to_string),
            severity,
            message: message.into(),
        });
    }

    fn document(&mut self, severity: Severity, message: impl Into<String>) {
        self.document_issues.push(DocumentIssue {
            severity,
            message: message.into(),
        });
    }
}

/// Parse a report date as printed in fund reports.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    const FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%Y-%m-%d", "%m/%d/%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

/// Run every enabled rule group over a document's holdings.
pub fn validate(
    holdings: &[Holding],
    reported_totals: &[ReportedTotal],
    rules: &ValidationRules,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    if holdings.is_empty() {
        result.document(Severity::Error, "no holdings extracted");
        return result;
    }

    for (row, holding) in holdings.iter().enumerate() {
        if rules.check_types {
            check_types(&mut result, row, holding);
        }
        if rules.check_presence {
            check_presence(&mut result, row, holding);
        }
        if rules.check_range {
            check_range(&mut result, row, holding);
        }
    }

    if rules.check_aggregates {
        check_aggregates(&mut result, holdings, reported_totals, rules);
    }

    result
}

fn check_types(result: &mut ValidationResult, row: usize, holding: &Holding) {
    if !holding.report_date.is_empty() && parse_report_date(&holding.report_date).is_none() {
        result.row(
            row,
            Some("report_date"),
            Severity::Warning,
            format!("report_date `{}` does not parse as a date", holding.report_date),
        );
    }
}

fn check_presence(result: &mut ValidationResult, row: usize, holding: &Holding) {
    if holding.fund_name.is_empty() {
        result.row(row, Some("fund_name"), Severity::Error, "fund_name is empty");
    }
    if holding.report_date.is_empty() {
        result.row(row, Some("report_date"), Severity::Warning, "report_date is empty");
    }
    if holding.security_name.is_empty() {
        result.row(row, Some("security_name"), Severity::Error, "security_name is empty");
    } else if holding.security_name.split_whitespace().count() < 2 {
        result.row(
            row,
            Some("security_name"),
            Severity::Warning,
            format!("security_name `{}` has suspiciously few words", holding.security_name),
        );
    }
    if !holding.has_numeric_field() {
        result.row(
            row,
            None,
            Severity::Error,
            "none of shares, principal, or market_value is present",
        );
    }
    if holding.security_type.as_deref().is_some_and(is_bond_like) && holding.principal.is_none() {
        result.row(
            row,
            Some("principal"),
            Severity::Warning,
            "fixed-income holding has no principal amount",
        );
    }
    if let Some(code) = &holding.country_iso3 {
        if !countries::is_known_iso3(code) {
            result.row(
                row,
                Some("country_iso3"),
                Severity::Warning,
                format!("country_iso3 `{code}` is not a known ISO3 code"),
            );
        }
    }
}

fn check_range(result: &mut ValidationResult, row: usize, holding: &Holding) {
    let fields = [
        ("shares", holding.shares),
        ("principal", holding.principal),
        ("market_value", holding.market_value),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            if value < Decimal::ZERO {
                result.row(
                    row,
                    Some(field),
                    Severity::Error,
                    format!("{field} is negative ({value}); long-only funds should not have negative amounts"),
                );
            }
        }
    }
}

fn check_aggregates(
    result: &mut ValidationResult,
    holdings: &[Holding],
    reported_totals: &[ReportedTotal],
    rules: &ValidationRules,
) {
    let document_sum: Decimal = holdings.iter().filter_map(|h| h.market_value).sum();

    if document_sum <= Decimal::ZERO {
        result.document(
            Severity::Warning,
            "total market_value across all holdings is non-positive",
        );
    }

    let mut security_types: Vec<&str> = holdings
        .iter()
        .filter_map(|h| h.security_type.as_deref())
        .collect();
    security_types.sort_unstable();
    security_types.dedup();

    for total in reported_totals {
        let label_lower = total.label.to_lowercase();

        // A total naming a security type compares against that group's sum;
        // anything else is treated as a whole-document total.
        let (scope, actual) = match security_types
            .iter()
            .find(|t| label_lower.contains(&t.to_lowercase()))
        {
            Some(security_type) => {
                let group_sum: Decimal = holdings
                    .iter()
                    .filter(|h| h.security_type.as_deref() == Some(*security_type))
                    .filter_map(|h| h.market_value)
                    .sum();
                ((*security_type).to_string(), group_sum)
            }
            None => ("document".to_string(), document_sum),
        };

        let passed = within_tolerance(total.value, actual, rules);
        if !passed {
            result.document(
                Severity::Warning,
                format!(
                    "aggregate mismatch for `{}` ({scope}): expected {} but holdings sum to {actual}",
                    total.label, total.value
                ),
            );
        }
        result.aggregates.push(AggregateOutcome {
            scope,
            expected: total.value,
            actual,
            passed,
        });
    }
}

fn within_tolerance(expected: Decimal, actual: Decimal, rules: &ValidationRules) -> bool {
    let diff = (expected - actual).abs();
    if diff <= rules.absolute_tolerance {
        return true;
    }
    expected != Decimal::ZERO && diff / expected.abs() <= rules.relative_tolerance
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    fn holding(name: &str, market_value: Option<&str>) -> Holding {
        Holding {
            fund_name: "Test Fund".to_string(),
            report_date: "October 31, 2024".to_string(),
            security_name: name.to_string(),
            security_type: Some("Common Stock".to_string()),
            country_iso3: None,
            sector: None,
            shares: Some(Decimal::from(100)),
            principal: None,
            market_value: market_value.map(|v| Decimal::from_str(v).unwrap()),
        }
    }

    fn total(label: &str, value: &str) -> ReportedTotal {
        ReportedTotal {
            label: label.to_string(),
            value: Decimal::from_str(value).unwrap(),
        }
    }

    #[test]
    fn test_clean_document() {
        let holdings = vec![holding("Apple Inc.", Some("100.00"))];
        let result = validate(&holdings, &[], &ValidationRules::default());
        assert!(result.is_clean(), "unexpected issues: {result:?}");
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let result = validate(&[], &[], &ValidationRules::default());
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_presence_errors() {
        let mut bad = holding("", Some("100.00"));
        bad.shares = None;
        bad.market_value = None;
        let result = validate(&[bad], &[], &ValidationRules::default());

        let fields: Vec<Option<&str>> = result
            .row_issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.field.as_deref())
            .collect();
        assert!(fields.contains(&Some("security_name")));
        assert!(fields.contains(&None), "missing all-numeric-fields error");
    }

    #[test]
    fn test_bond_without_principal_is_a_warning() {
        let mut bond = holding("Delta Air Lines, Inc. 5.750%, 5/15/28", Some("1499932"));
        bond.security_type = Some("Convertible Bonds".to_string());
        let result = validate(&[bond], &[], &ValidationRules::default());

        assert_eq!(result.error_count(), 0);
        assert!(
            result
                .row_issues
                .iter()
                .any(|i| i.field.as_deref() == Some("principal") && i.severity == Severity::Warning)
        );
    }

    #[test]
    fn test_negative_market_value_is_a_range_error() {
        let negative = holding("Short Position Corp.", Some("-5"));
        let result = validate(&[negative], &[], &ValidationRules::default());

        assert!(
            result
                .row_issues
                .iter()
                .any(|i| i.field.as_deref() == Some("market_value") && i.severity == Severity::Error)
        );
    }

    #[test]
    fn test_aggregate_within_tolerance_passes() {
        let holdings = vec![
            holding("Apple Inc.", Some("100.00")),
            holding("Microsoft Corp.", Some("250.00")),
        ];
        let totals = vec![total("Total Investments", "350.00")];
        let result = validate(&holdings, &totals, &ValidationRules::default());

        assert_eq!(result.aggregates.len(), 1);
        assert!(result.aggregates[0].passed);
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_aggregate_mismatch_is_a_warning() {
        let holdings = vec![
            holding("Apple Inc.", Some("100.00")),
            holding("Microsoft Corp.", Some("250.00")),
        ];
        let totals = vec![total("Total Investments", "400.00")];
        let result = validate(&holdings, &totals, &ValidationRules::default());

        assert!(!result.aggregates[0].passed);
        assert_eq!(result.aggregates[0].actual, Decimal::from_str("350.00").unwrap());
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.error_count(), 0);
    }

    #[test]
    fn test_aggregate_scopes_to_named_security_type() {
        let mut stock = holding("Apple Inc.", Some("100.00"));
        stock.security_type = Some("Common Stock".to_string());
        let mut bond = holding("Issuer Notes 5%", Some("900.00"));
        bond.security_type = Some("Convertible Bonds".to_string());
        bond.principal = Some(Decimal::from(900));

        let totals = vec![total("Total Convertible Bonds", "900.00")];
        let result = validate(&[stock, bond], &totals, &ValidationRules::default());

        assert_eq!(result.aggregates[0].scope, "Convertible Bonds");
        assert!(result.aggregates[0].passed);
    }

    #[test]
    fn test_disabled_rule_groups_record_nothing() {
        let rules = ValidationRules {
            check_types: false,
            check_presence: false,
            check_range: false,
            check_aggregates: false,
            ..ValidationRules::default()
        };
        let negative = holding("Short Position Corp.", Some("-5"));
        let result = validate(&[negative], &[], &rules);
        assert!(result.is_clean());
    }

    #[test]
    fn test_parse_report_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 10, 31).unwrap();
        assert_eq!(parse_report_date("October 31, 2024"), Some(expected));
        assert_eq!(parse_report_date("October  31,  2024"), Some(expected));
        assert_eq!(parse_report_date("2024-10-31"), Some(expected));
        assert_eq!(parse_report_date("10/31/2024"), Some(expected));
        assert_eq!(parse_report_date("Fourth Quarter"), None);
    }

    #[test]
    fn test_validation_never_mutates_holdings() {
        let holdings = vec![holding("Short Position Corp.", Some("-5"))];
        let before = holdings.clone();
        let _ = validate(&holdings, &[], &ValidationRules::default());
        assert_eq!(holdings, before);
    }
}
