//! Core library for Schedule-of-Investments extraction from fund reports.
//!
//! This crate provides:
//! - Declarative layout configuration for per-fund-family report formats
//! - Section location, column splitting, and multi-line row accumulation
//! - Field mapping and normalization into holding records
//! - A validation engine over the extracted holdings
//!
//! PDF byte-level text extraction is an external concern: the engine
//! consumes pages of positioned text lines and a layout config, and produces
//! holdings plus validation output. It is deterministic and reentrant, so
//! independent documents can be processed in parallel.

pub mod cache;
pub mod countries;
pub mod error;
pub mod extract;
pub mod models;
pub mod validate;

pub use error::{ConfigError, ExtractError, FundexError, Result};
pub use extract::{
    ExtractionIssue, ExtractionResult, HoldingsExtractor, IssueKind, extract_holdings,
};
pub use models::config::{LayoutConfig, detect_for_text};
pub use models::holding::{FundMetadata, Holding, Page, ReportedTotal, TextLine};
pub use validate::{Severity, ValidationResult, ValidationRules, validate};

pub use cache::MemoCache;
