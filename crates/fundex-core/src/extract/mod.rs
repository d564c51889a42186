//! Holdings extraction pipeline.
//!
//! One document flows linearly through section location, per-page column
//! splitting, row accumulation, and field mapping. All mutable state lives
//! in the traversal; the engine itself is stateless and reentrant, so
//! independent documents can be processed in parallel.

pub mod columns;
pub mod fields;
pub mod normalize;
pub(crate) mod patterns;
pub mod rows;
pub mod section;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ExtractError;
use crate::models::config::LayoutConfig;
use crate::models::holding::{FundMetadata, Holding, Page, ReportedTotal};

use columns::split_columns;
use rows::{Context, LineOutcome, RawRow, RowAccumulator};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Kind of a non-fatal anomaly recorded during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Pending name fragments were discarded at a stop boundary or end of
    /// column.
    RowIncomplete,
    /// A numeric token did not parse; the field was left absent.
    FieldUnparsable,
    /// A page inside the anchor span did not look like holdings.
    LowConfidencePage,
}

/// A non-fatal anomaly recorded during extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionIssue {
    pub kind: IssueKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,

    pub message: String,
}

impl ExtractionIssue {
    fn low_confidence_page(page: usize) -> Self {
        Self {
            kind: IssueKind::LowConfidencePage,
            page: Some(page),
            column: None,
            message: format!("page {page} is inside the schedule span but does not look like holdings"),
        }
    }

    fn row_incomplete(page: usize, column: usize, fragments: &str) -> Self {
        Self {
            kind: IssueKind::RowIncomplete,
            page: Some(page),
            column: Some(column),
            message: format!("unterminated row discarded: `{fragments}`"),
        }
    }

    pub(crate) fn field_unparsable(raw: &RawRow, field: &str, token: &str) -> Self {
        Self {
            kind: IssueKind::FieldUnparsable,
            page: Some(raw.page),
            column: Some(raw.column),
            message: format!("could not parse {field} token `{token}` for `{}`", raw.name),
        }
    }
}

/// Everything the engine produces for one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Holdings in (page, column, top-to-bottom) traversal order.
    pub holdings: Vec<Holding>,

    pub metadata: FundMetadata,

    /// Totals captured from stop lines, for aggregate validation.
    pub reported_totals: Vec<ReportedTotal>,

    /// Non-fatal anomalies, in the order they were encountered.
    pub issues: Vec<ExtractionIssue>,

    /// Inclusive page range of the located section.
    pub first_page: usize,
    pub last_page: usize,
}

/// The generic, configuration-driven extraction engine.
pub struct HoldingsExtractor<'a> {
    cfg: &'a LayoutConfig,
}

impl<'a> HoldingsExtractor<'a> {
    pub fn new(cfg: &'a LayoutConfig) -> Self {
        Self { cfg }
    }

    /// Run the full pipeline over one document's pages.
    ///
    /// Section location is the only hard failure; everything downstream
    /// degrades to absent fields and recorded issues, so a partially
    /// readable document still yields its readable holdings.
    pub fn extract(&self, pages: &[Page]) -> Result<ExtractionResult> {
        let metadata = fields::extract_fund_metadata(pages, self.cfg);
        let span = section::locate_section(pages, self.cfg)?;

        let mut holdings: Vec<Holding> = Vec::new();
        let mut reported_totals: Vec<ReportedTotal> = Vec::new();
        let mut issues: Vec<ExtractionIssue> = span
            .pages
            .iter()
            .filter(|p| !p.confident)
            .map(|p| ExtractionIssue::low_confidence_page(p.index))
            .collect();

        // Heading context survives column and page boundaries within the
        // section: headers are sparse and apply until overridden.
        let mut ctx = Context::default();

        for located in &span.pages {
            let Some(page) = pages.iter().find(|p| p.index == located.index) else {
                continue;
            };

            for (column, band) in split_columns(page, self.cfg.columns).into_iter().enumerate() {
                let mut acc = RowAccumulator::new(self.cfg);

                for line in band {
                    match acc.feed(line, column, &mut ctx) {
                        LineOutcome::Consumed => {}
                        LineOutcome::PendingDropped(fragments) => {
                            warn!(
                                "page {} column {}: header closed unterminated row `{fragments}`",
                                page.index, column
                            );
                            issues.push(ExtractionIssue::row_incomplete(page.index, column, &fragments));
                        }
                        LineOutcome::Row(raw) => {
                            let (holding, field_issues) = fields::build_holding(self.cfg, &metadata, &raw);
                            issues.extend(field_issues);
                            holdings.push(holding);
                        }
                        LineOutcome::Stop {
                            reported_total,
                            pending_dropped,
                        } => {
                            if let Some(total) = reported_total {
                                reported_totals.push(total);
                            }
                            if let Some(fragments) = pending_dropped {
                                warn!(
                                    "page {} column {}: stop line discarded pending row `{fragments}`",
                                    page.index, column
                                );
                                issues.push(ExtractionIssue::row_incomplete(page.index, column, &fragments));
                            }
                            break;
                        }
                    }
                }

                if let Some(fragments) = acc.finish() {
                    warn!(
                        "page {} column {}: column ended with pending row `{fragments}`",
                        page.index, column
                    );
                    issues.push(ExtractionIssue::row_incomplete(page.index, column, &fragments));
                }
            }
        }

        info!(
            "layout {}: extracted {} holdings from pages {}-{} ({} issues)",
            self.cfg.id,
            holdings.len(),
            span.first_page,
            span.last_page,
            issues.len()
        );

        Ok(ExtractionResult {
            holdings,
            metadata,
            reported_totals,
            issues,
            first_page: span.first_page,
            last_page: span.last_page,
        })
    }
}

/// Convenience wrapper over [`HoldingsExtractor`].
pub fn extract_holdings(pages: &[Page], cfg: &LayoutConfig) -> Result<ExtractionResult> {
    HoldingsExtractor::new(cfg).extract(pages)
}
