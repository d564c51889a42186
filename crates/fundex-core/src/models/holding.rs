//! Page input and holding output models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line of text with its horizontal position on the page.
///
/// Produced by an external PDF text-extraction collaborator; the engine only
/// needs the text and the left edge for column assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    /// Raw line content.
    pub text: String,

    /// Horizontal position of the line's left edge, in page units.
    pub x: f64,

    /// Index of the page this line belongs to (0-based).
    pub page: usize,
}

impl TextLine {
    pub fn new(text: impl Into<String>, x: f64, page: usize) -> Self {
        Self {
            text: text.into(),
            x,
            page,
        }
    }
}

/// One page of extracted text, immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index within the document (0-based).
    pub index: usize,

    /// Page width in the same units as [`TextLine::x`].
    pub width: f64,

    /// Lines in original top-to-bottom order.
    pub lines: Vec<TextLine>,
}

impl Page {
    pub fn new(index: usize, width: f64) -> Self {
        Self {
            index,
            width,
            lines: Vec::new(),
        }
    }

    /// Append a line, positioning it on this page.
    pub fn push_line(&mut self, text: impl Into<String>, x: f64) {
        let page = self.index;
        self.lines.push(TextLine::new(text, x, page));
    }

    /// Full page text, lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Fund-level metadata extracted once per document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMetadata {
    /// Fund name as printed, or a humanized layout id when no pattern matched.
    pub fund_name: String,

    /// Report date as printed; validation parses it as a date.
    pub report_date: String,
}

/// A single extracted investment holding.
///
/// Permissive at construction: any combination of absent fields is
/// representable, and the validation engine is where the invariants
/// (non-empty name, at least one numeric field) are enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub fund_name: String,

    pub report_date: String,

    pub security_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_iso3: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Share count, for equity-like instruments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<Decimal>,

    /// Principal amount, for fixed-income instruments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_value: Option<Decimal>,
}

impl Holding {
    /// Whether at least one of shares, principal, or market value is present.
    pub fn has_numeric_field(&self) -> bool {
        self.shares.is_some() || self.principal.is_some() || self.market_value.is_some()
    }
}

/// A reported total captured from a stop line, e.g. the value on a
/// `Total Long-Term Investments $3,459,186` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedTotal {
    /// Stop-line text with the trailing amount removed.
    pub label: String,

    pub value: Decimal,
}
