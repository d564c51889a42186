//! Layout configuration: a declarative description of one fund-report
//! family's Schedule of Investments.
//!
//! Heterogeneous per-fund layouts are handled by one generic engine
//! parameterized by this data-only profile, rather than per-fund code.

use std::collections::BTreeMap;
use std::path::Path;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::validate::ValidationRules;

/// Layout profile for one fund-report family, loaded once per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Identifier, e.g. `gsam_em_equity`.
    pub id: String,

    /// Regexes matched against the first pages of a document to pick this
    /// config; matching is case-insensitive and retried with all whitespace
    /// stripped from the text.
    pub fund_name_patterns: Vec<String>,

    /// Section header fragments; a page containing any of them (case- and
    /// whitespace-insensitively) anchors the schedule section.
    pub schedule_headers: Vec<String>,

    /// Number of horizontal column bands per page.
    pub columns: usize,

    /// Ordinal of the numeric token holding shares (or principal for
    /// fixed-income types) on a closing line.
    pub shares_token_index: Option<usize>,

    /// Ordinal of the numeric token holding market value on a closing line.
    pub value_token_index: Option<usize>,

    /// Raw heading text -> normalized security type.
    pub instrument_headers: BTreeMap<String, String>,

    /// A line starting with any of these ends the current column's holdings.
    pub stop_line_prefixes: Vec<String>,

    /// A line containing any of these ends the current column's holdings.
    pub stop_line_contains: Vec<String>,

    /// A line starting with any of these is ignored entirely.
    pub noise_prefixes: Vec<String>,

    /// Regex extracting the fund name from the first pages; first capture
    /// group if present, whole match otherwise.
    pub fund_name_pattern: Option<String>,

    /// Regex extracting the report date; defaults to a long month-name date.
    pub report_date_pattern: Option<String>,

    /// Extra country-heading names -> ISO3, consulted before the built-in
    /// table.
    pub country_headings: BTreeMap<String, String>,

    /// Markers that truncate a security name, e.g. `( Cost`.
    pub name_trim_markers: Vec<String>,

    /// Per-layout validation rule switches and tolerances.
    pub validation: ValidationRules,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            fund_name_patterns: Vec::new(),
            schedule_headers: vec!["Schedule of Investments".to_string()],
            columns: 1,
            shares_token_index: Some(0),
            value_token_index: Some(1),
            instrument_headers: BTreeMap::new(),
            stop_line_prefixes: Vec::new(),
            stop_line_contains: Vec::new(),
            noise_prefixes: Vec::new(),
            fund_name_pattern: None,
            report_date_pattern: None,
            country_headings: BTreeMap::new(),
            name_trim_markers: Vec::new(),
            validation: ValidationRules::default(),
        }
    }
}

impl LayoutConfig {
    /// Check the structural invariants of this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 1 {
            return Err(self.invalid("columns must be at least 1"));
        }
        if let (Some(shares), Some(value)) = (self.shares_token_index, self.value_token_index) {
            if shares == value {
                return Err(self.invalid("shares_token_index and value_token_index must differ"));
            }
        }
        if self.schedule_headers.iter().all(|h| h.trim().is_empty()) {
            return Err(self.invalid("at least one schedule header is required"));
        }
        for pattern in self
            .fund_name_patterns
            .iter()
            .chain(&self.fund_name_pattern)
            .chain(&self.report_date_pattern)
        {
            if let Err(e) = RegexBuilder::new(pattern).case_insensitive(true).build() {
                return Err(self.invalid(format!("bad pattern `{pattern}`: {e}")));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    /// Parse a config from YAML text and check its invariants.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<yaml>".to_string(),
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from JSON text and check its invariants.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<json>".to_string(),
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a config from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let display = path.display().to_string();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: display,
                reason: e.to_string(),
            })?,
            "json" => serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
                path: display,
                reason: e.to_string(),
            })?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load every config file in a directory, in path order.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, ConfigError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml") | Some("json")
                )
            })
            .collect();
        paths.sort();

        let mut configs = Vec::with_capacity(paths.len());
        for path in paths {
            configs.push(Self::from_file(&path)?);
        }
        Ok(configs)
    }

    /// Human-readable form of the layout id, used as the fund-name fallback.
    pub fn display_name(&self) -> String {
        self.id
            .split(['_', '-'])
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pick the first config whose `fund_name_patterns` matches the concatenated
/// text of a document's first pages.
///
/// Patterns are matched case-insensitively, and retried against the text with
/// all whitespace stripped, since extraction sometimes drops spaces.
pub fn detect_for_text<'a>(text: &str, configs: &'a [LayoutConfig]) -> Option<&'a LayoutConfig> {
    let nospace: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    for cfg in configs {
        for pattern in &cfg.fund_name_patterns {
            let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(re) => re,
                Err(e) => {
                    debug!("layout {}: skipping bad pattern `{}`: {}", cfg.id, pattern, e);
                    continue;
                }
            };
            if re.is_match(text) || re.is_match(&nospace) {
                return Some(cfg);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.columns, 1);
        assert_eq!(cfg.shares_token_index, Some(0));
        assert_eq!(cfg.value_token_index, Some(1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_columns() {
        let cfg = LayoutConfig {
            id: "test".to_string(),
            columns: 0,
            ..LayoutConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_equal_token_indices() {
        let cfg = LayoutConfig {
            id: "test".to_string(),
            shares_token_index: Some(1),
            value_token_index: Some(1),
            ..LayoutConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_from_yaml() {
        let cfg = LayoutConfig::from_yaml(
            r#"
id: gsam_em_equity
fund_name_patterns:
  - "Goldman Sachs Emerging Markets Equity Fund"
schedule_headers:
  - "Schedule of Investments"
columns: 2
shares_token_index: 0
value_token_index: 1
instrument_headers:
  "Common Stocks": "Common Stock"
  "Preferred Stocks": "Preferred Stock"
stop_line_prefixes:
  - "TOTAL INVESTMENTS"
noise_prefixes:
  - "Shares Description"
"#,
        )
        .unwrap();

        assert_eq!(cfg.id, "gsam_em_equity");
        assert_eq!(cfg.columns, 2);
        assert_eq!(
            cfg.instrument_headers.get("Common Stocks"),
            Some(&"Common Stock".to_string())
        );
        assert!(cfg.validation.check_presence);
    }

    #[test]
    fn test_from_json() {
        let cfg = LayoutConfig::from_json(
            r#"{"id": "blackrock_intl", "schedule_headers": ["Schedule of Investments"]}"#,
        )
        .unwrap();
        assert_eq!(cfg.id, "blackrock_intl");
        assert_eq!(cfg.columns, 1);
    }

    #[test]
    fn test_display_name() {
        let cfg = LayoutConfig {
            id: "gsam_em_equity".to_string(),
            ..LayoutConfig::default()
        };
        assert_eq!(cfg.display_name(), "Gsam Em Equity");
    }

    #[test]
    fn test_detect_for_text() {
        let configs = vec![
            LayoutConfig {
                id: "hartford".to_string(),
                fund_name_patterns: vec![r"Hartford.*Fund".to_string()],
                ..LayoutConfig::default()
            },
            LayoutConfig {
                id: "gsam".to_string(),
                fund_name_patterns: vec![r"Goldman Sachs .* Fund".to_string()],
                ..LayoutConfig::default()
            },
        ];

        let text = "Annual Report\nGOLDMAN SACHS EMERGING MARKETS EQUITY FUND\n";
        assert_eq!(detect_for_text(text, &configs).map(|c| c.id.as_str()), Some("gsam"));

        // Run-together text still matches through the whitespace-stripped pass.
        let squashed = "TheHartfordSmallCapGrowthFund";
        assert_eq!(
            detect_for_text(squashed, &configs).map(|c| c.id.as_str()),
            Some("hartford")
        );

        assert!(detect_for_text("Unrelated prospectus", &configs).is_none());
    }
}
