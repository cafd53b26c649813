//! Line patterns recognised by the segmentation parser.
//!
//! All matching is done on single physical lines. The title pattern runs on
//! the raw line; the marker patterns run on the trimmed, lower-cased line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Hymn whose source pages misprint stanza markers as `N. text`.
///
/// While this hymn is open, title-looking lines are stanza markers, not new
/// hymns, and its stanzas are numbered by those markers.
pub const IRREGULAR_HYMN: u32 = 176;

/// Chorus marker, compared against the upper-cased line.
pub const CHORUS_MARKER: &str = "CORO";

// `<digits>. <at least five of: letters incl. accented vowels and ñ, spaces, hyphens>`
static RE_HYMN_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(\d+)\.\s+([A-ZÁÉÍÓÚÑ\s-]{5,})").unwrap());

static RE_LONE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static RE_IRREGULAR_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").unwrap());

/// Match a hymn title line, returning `(number, lower-cased title)`.
///
/// Numbers that are 0 or overflow `u32` are OCR noise, not titles.
pub fn match_title(line: &str) -> Option<(u32, String)> {
    let caps = RE_HYMN_TITLE.captures(line)?;
    let number: u32 = caps[1].parse().ok().filter(|n| *n > 0)?;
    let title = caps[2].trim().to_lowercase();
    Some((number, title))
}

/// `true` when the trimmed line is one or more ASCII digits and nothing else.
pub fn is_lone_digits(trimmed: &str) -> bool {
    RE_LONE_DIGITS.is_match(trimmed)
}

/// Parse a standalone stanza numeral line.
pub fn match_stanza_numeral(trimmed: &str) -> Option<u32> {
    if is_lone_digits(trimmed) {
        trimmed.parse().ok()
    } else {
        None
    }
}

/// Parse an irregular-hymn marker `N.` with optional trailing text.
pub fn match_irregular_marker(trimmed: &str) -> Option<(u32, &str)> {
    let caps = RE_IRREGULAR_MARKER.captures(trimmed)?;
    let number = caps[1].parse().ok()?;
    let rest = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((number, rest))
}

pub fn is_chorus_marker(trimmed: &str) -> bool {
    trimmed.to_uppercase().starts_with(CHORUS_MARKER)
}
