//! Section locator: finds the page range holding the Schedule of Investments.

use tracing::{debug, info};

use crate::error::ExtractError;
use crate::models::config::LayoutConfig;
use crate::models::holding::Page;

use super::patterns::CURRENCY_AMOUNT;

/// An in-range page tagged with a holdings-likeness flag.
///
/// Low-confidence pages are kept: a non-matching page inside the anchor span
/// is assumed to be a continuation (blank or transition page) and excluding
/// it would truncate genuine continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedPage {
    pub index: usize,
    pub confident: bool,
}

/// The located schedule section: an inclusive, ordered page range.
#[derive(Debug, Clone)]
pub struct SectionSpan {
    pub first_page: usize,
    pub last_page: usize,
    pub pages: Vec<LocatedPage>,
}

/// Lowercase and strip all whitespace, so headers broken across lines or
/// with collapsed spaces still match.
pub fn fold_for_match(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn contains_normalized(haystack_folded: &str, needle: &str) -> bool {
    let needle = fold_for_match(needle);
    !needle.is_empty() && haystack_folded.contains(&needle)
}

fn has_schedule_header(page_folded: &str, cfg: &LayoutConfig) -> bool {
    cfg.schedule_headers
        .iter()
        .any(|header| contains_normalized(page_folded, header))
}

/// Whether a page inside the anchor span looks like it carries holdings:
/// a header fragment is present, or at least one line reads as a
/// currency/number.
fn looks_like_holdings(page: &Page, page_folded: &str, cfg: &LayoutConfig) -> bool {
    if has_schedule_header(page_folded, cfg) {
        return true;
    }
    if cfg
        .instrument_headers
        .keys()
        .any(|header| contains_normalized(page_folded, header))
    {
        return true;
    }
    page.lines.iter().any(|line| CURRENCY_AMOUNT.is_match(&line.text))
}

/// Scan every page for a schedule header and return the inclusive anchor
/// span, each page tagged with a confidence flag.
pub fn locate_section(pages: &[Page], cfg: &LayoutConfig) -> Result<SectionSpan, ExtractError> {
    let folded: Vec<String> = pages.iter().map(|p| fold_for_match(&p.text())).collect();

    let anchors: Vec<usize> = pages
        .iter()
        .zip(&folded)
        .filter(|(_, text)| has_schedule_header(text, cfg))
        .map(|(page, _)| page.index)
        .collect();

    debug!("layout {}: anchor pages {:?}", cfg.id, anchors);

    let (&first_page, &last_page) = match (anchors.first(), anchors.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(ExtractError::SectionNotFound {
                pages_searched: pages.len(),
            });
        }
    };

    let located: Vec<LocatedPage> = pages
        .iter()
        .zip(&folded)
        .filter(|(page, _)| page.index >= first_page && page.index <= last_page)
        .map(|(page, text)| LocatedPage {
            index: page.index,
            confident: looks_like_holdings(page, text, cfg),
        })
        .collect();

    info!(
        "layout {}: schedule section spans pages {}-{} ({} pages, {} low-confidence)",
        cfg.id,
        first_page,
        last_page,
        located.len(),
        located.iter().filter(|p| !p.confident).count()
    );

    Ok(SectionSpan {
        first_page,
        last_page,
        pages: located,
    })
}
