//! Row accumulation: an explicit two-state machine over a column's lines.
//!
//! Each line is classified, in order: noise, stop, instrument header,
//! sector/country heading, row line. A row line carrying trailing numeric
//! tokens closes the pending multi-line name; one without them extends it.
//! The machine holds only the pending fragments; heading context lives in
//! [`Context`], threaded through the whole section traversal by the caller.

use tracing::debug;

use crate::countries;
use crate::models::config::LayoutConfig;
use crate::models::holding::{ReportedTotal, TextLine};

use super::normalize::parse_amount;
use super::patterns::{HEADING_WITH_PERCENT, HEADER_DECORATION, NUMERIC_TOKEN};
use super::section::fold_for_match;

/// Accumulator state: whether unresolved name fragments are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Scanning,
    Accumulating,
}

/// Heading context propagated onto rows until overridden.
///
/// Headers are sparse: one instrument or country heading scopes every row
/// after it, across holdings, columns, and page boundaries within the
/// located section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub security_type: Option<String>,
    pub sector: Option<String>,
    pub country_iso3: Option<String>,
}

/// A raw holding candidate: joined name text plus the closing line's numeric
/// tokens, stamped with the context active when the row closed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub name: String,
    pub numeric_tokens: Vec<String>,
    pub security_type: Option<String>,
    pub sector: Option<String>,
    pub country_iso3: Option<String>,
    pub page: usize,
    pub column: usize,
}

/// What feeding one line produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Line absorbed with no externally visible effect.
    Consumed,

    /// A context header closed an unterminated row; the dropped fragment
    /// text is reported for issue logging.
    PendingDropped(String),

    /// A closed row candidate.
    Row(RawRow),

    /// Stop line reached; this column's processing ends here.
    Stop {
        reported_total: Option<ReportedTotal>,
        pending_dropped: Option<String>,
    },
}

/// One accumulator per column stream.
pub struct RowAccumulator<'a> {
    cfg: &'a LayoutConfig,
    state: RowState,
    pending: Vec<String>,
}

impl<'a> RowAccumulator<'a> {
    pub fn new(cfg: &'a LayoutConfig) -> Self {
        Self {
            cfg,
            state: RowState::Scanning,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> RowState {
        self.state
    }

    /// Classify and consume one line.
    pub fn feed(&mut self, line: &TextLine, column: usize, ctx: &mut Context) -> LineOutcome {
        let text = line.text.trim();
        if text.is_empty() {
            return LineOutcome::Consumed;
        }
        let folded = fold_for_match(text);

        // 1. Noise: ignored entirely, state unchanged.
        if self.matches_prefix(text, &folded, &self.cfg.noise_prefixes) {
            debug!("noise line skipped: {text}");
            return LineOutcome::Consumed;
        }

        // 2. Stop: an unterminated row at a stop boundary is incomplete and
        // dropped; a trailing amount on the stop line is kept as a reported
        // total for aggregate validation.
        if self.matches_prefix(text, &folded, &self.cfg.stop_line_prefixes)
            || self.cfg.stop_line_contains.iter().any(|s| text.contains(s.as_str()))
        {
            return LineOutcome::Stop {
                reported_total: capture_reported_total(text),
                pending_dropped: self.take_pending(),
            };
        }

        // 3. Instrument header: always closes any unterminated row; a new
        // header never precedes the previous row's trailing numeric line.
        if let Some(security_type) = self.match_instrument_header(text, &folded) {
            let dropped = self.take_pending();
            ctx.security_type = Some(security_type);
            return match dropped {
                Some(fragments) => LineOutcome::PendingDropped(fragments),
                None => LineOutcome::Consumed,
            };
        }

        // 4. Sector/country heading: context update only; these appear
        // between rows, so an in-progress name is left alone.
        if let Some(iso3) = countries::country_heading_to_iso3(text, &self.cfg.country_headings) {
            ctx.country_iso3 = Some(iso3);
            return LineOutcome::Consumed;
        }
        if let Some(caps) = HEADING_WITH_PERCENT.captures(text) {
            ctx.sector = Some(caps[1].trim().to_string());
            return LineOutcome::Consumed;
        }

        // 5. Row line: trailing numeric tokens close the row, their absence
        // extends the pending name.
        let (name_text, numeric_tokens) = split_row_tokens(text);
        if numeric_tokens.is_empty() {
            self.pending.push(text.to_string());
            self.state = RowState::Accumulating;
            return LineOutcome::Consumed;
        }

        let mut fragments = std::mem::take(&mut self.pending);
        if !name_text.is_empty() {
            fragments.push(name_text);
        }
        self.state = RowState::Scanning;

        LineOutcome::Row(RawRow {
            name: fragments.join(" "),
            numeric_tokens,
            security_type: ctx.security_type.clone(),
            sector: ctx.sector.clone(),
            country_iso3: ctx.country_iso3.clone(),
            page: line.page,
            column,
        })
    }

    /// Drop any pending fragments at end of stream, returning them for
    /// issue logging.
    pub fn finish(&mut self) -> Option<String> {
        self.take_pending()
    }

    fn take_pending(&mut self) -> Option<String> {
        self.state = RowState::Scanning;
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending).join(" "))
        }
    }

    fn matches_prefix(&self, text: &str, folded: &str, prefixes: &[String]) -> bool {
        prefixes.iter().filter(|p| !p.trim().is_empty()).any(|p| {
            text.starts_with(p.as_str()) || folded.starts_with(&fold_for_match(p))
        })
    }

    fn match_instrument_header(&self, text: &str, folded: &str) -> Option<String> {
        let stripped = fold_for_match(&HEADER_DECORATION.replace(text, ""));
        for (key, security_type) in &self.cfg.instrument_headers {
            let key_folded = fold_for_match(key);
            if key_folded.is_empty() {
                continue;
            }
            if stripped == key_folded {
                return Some(security_type.clone());
            }
            // Decoration the stripper did not recognize, e.g. "— 98.2% of
            // Net Assets": accept the key as a prefix when a dash or paren
            // follows it.
            if let Some(rest) = folded.strip_prefix(&key_folded) {
                if matches!(rest.chars().next(), Some('-' | '–' | '—' | '(')) {
                    return Some(security_type.clone());
                }
            }
        }
        None
    }
}

/// Split a line into leading name text and trailing numeric tokens.
fn split_row_tokens(text: &str) -> (String, Vec<String>) {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut split = tokens.len();
    while split > 0 && NUMERIC_TOKEN.is_match(tokens[split - 1]) {
        split -= 1;
    }
    (
        tokens[..split].join(" "),
        tokens[split..].iter().map(|t| t.to_string()).collect(),
    )
}

/// Parse a reported total off a stop line, e.g.
/// `Total Long-Term Investments $3,459,186`.
fn capture_reported_total(text: &str) -> Option<ReportedTotal> {
    let (label, numeric_tokens) = split_row_tokens(text);
    let value_token = numeric_tokens.iter().rev().find(|t| !t.contains('%'))?;
    let value = parse_amount(value_token)?;
    if label.is_empty() {
        return None;
    }
    Some(ReportedTotal { label, value })
}
