//! Hymn segmentation: recognized text → ordered [`HymnRecord`]s.
//!
//! Two levels, both single-pass line scanners:
//!
//! ```text
//! text ──▶ segment (hymn boundaries) ──▶ content::segment_content (blocks) ──▶ HymnRecord
//!          title lines "N. TITULO"        numerals / CORO / blank lines
//! ```
//!
//! The scan is best-effort. Text before the first title is dropped, blocks
//! without content are dropped, and nothing here returns an error: a bad
//! scan produces fewer hymns, and re-running extraction on a better scan
//! fixes them.

pub mod content;
pub mod patterns;

use crate::model::HymnRecord;
use patterns::{match_title, IRREGULAR_HYMN};
use tracing::debug;

/// A hymn whose title has been seen and whose lines are still arriving.
struct OpenHymn {
    number: u32,
    title: String,
    lines: Vec<String>,
}

impl OpenHymn {
    fn finish(self) -> HymnRecord {
        let content = content::segment_content(&self.lines, self.number);
        debug!(
            "Hymn {} '{}': {} lines → {} blocks",
            self.number,
            self.title,
            self.lines.len(),
            content.len()
        );
        HymnRecord {
            number: self.number,
            title: self.title,
            content,
        }
    }
}

/// Split recognized text into hymns.
///
/// A line starting with `N.` followed by at least five capital letters,
/// spaces or hyphens opens hymn `N`; every other line belongs to the open
/// hymn. While hymn 176 is open, title-looking lines are kept as its content.
///
/// # Example
/// ```rust
/// use hymnal_extract::segment;
///
/// let hymns = segment("1. SANTO SANTO SANTO\nsanto, santo, santo\n\nseñor omnipotente");
/// assert_eq!(hymns.len(), 1);
/// assert_eq!(hymns[0].title, "santo santo santo");
/// assert_eq!(hymns[0].content.len(), 2);
/// ```
pub fn segment(text: &str) -> Vec<HymnRecord> {
    let mut hymns = Vec::new();
    let mut open: Option<OpenHymn> = None;

    for line in text.split('\n') {
        let title = match_title(line);

        if let Some(hymn) = open.as_mut() {
            if title.is_none() || hymn.number == IRREGULAR_HYMN {
                hymn.lines.push(line.to_lowercase());
                continue;
            }
        }

        if let Some((number, title)) = title {
            if let Some(done) = open.take() {
                hymns.push(done.finish());
            }
            open = Some(OpenHymn {
                number,
                title,
                lines: Vec::new(),
            });
        }
    }

    if let Some(done) = open.take() {
        hymns.push(done.finish());
    }

    debug!("Segmented {} hymns", hymns.len());
    hymns
}
