//! Column splitter: partitions a page into ordered column bands.

use crate::models::holding::{Page, TextLine};

/// Partition a page's lines into `columns` equal-width horizontal bands.
///
/// Each line lands in exactly one band, decided by its left edge; a line
/// straddling a boundary stays in the band its left edge falls in. Within a
/// band the page's original top-to-bottom order is preserved, and bands are
/// returned left to right, so (page, column, top-to-bottom) traversal order
/// falls out of iterating the result.
pub fn split_columns<'a>(page: &'a Page, columns: usize) -> Vec<Vec<&'a TextLine>> {
    let columns = columns.max(1);
    let mut bands: Vec<Vec<&TextLine>> = vec![Vec::new(); columns];

    if columns == 1 {
        bands[0] = page.lines.iter().collect();
        return bands;
    }

    let band_width = page.width / columns as f64;
    for line in &page.lines {
        let band = if band_width > 0.0 {
            ((line.x / band_width).floor() as usize).min(columns - 1)
        } else {
            0
        };
        bands[band].push(line);
    }
    bands
}
