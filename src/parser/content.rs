//! Inner level: split one hymn's buffered lines into stanza and chorus blocks.
//!
//! The numbering regime is chosen once per hymn by [`NumberingRegime::detect`]
//! and then drives a single pass over the lines. The pending block is an
//! explicit [`BlockState`]; [`close_block`] turns it into a finished
//! [`ContentBlock`] or drops it. Blank lines are never content: they close
//! the pending block when numbering is implicit and are skipped otherwise.

use super::patterns::{
    is_chorus_marker, is_lone_digits, match_irregular_marker, match_stanza_numeral,
    IRREGULAR_HYMN,
};
use crate::model::{BlockKind, ContentBlock};

/// How stanza boundaries and numbers are expressed in a hymn's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingRegime {
    /// Stanzas are preceded by a line holding only a numeral.
    Explicit,
    /// Stanzas are separated by blank lines and numbered here.
    Implicit,
    /// Hymn 176: stanzas start with `N. first line`.
    Irregular,
}

impl NumberingRegime {
    /// Pick the regime for a hymn.
    ///
    /// A single lone-digit line anywhere in the hymn makes it explicit, even
    /// if that line is OCR noise.
    pub fn detect<S: AsRef<str>>(lines: &[S], hymn_number: u32) -> Self {
        if hymn_number == IRREGULAR_HYMN {
            NumberingRegime::Irregular
        } else if lines.iter().any(|l| is_lone_digits(l.as_ref().trim())) {
            NumberingRegime::Explicit
        } else {
            NumberingRegime::Implicit
        }
    }
}

/// The block currently being accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    pub kind: BlockKind,
    /// Number taken from a source marker, if this block was opened by one.
    pub marker: Option<u32>,
    pub lines: Vec<String>,
}

impl BlockState {
    pub fn stanza(marker: Option<u32>) -> Self {
        Self {
            kind: BlockKind::Stanza,
            marker,
            lines: Vec::new(),
        }
    }

    pub fn chorus() -> Self {
        Self {
            kind: BlockKind::Chorus,
            marker: None,
            lines: Vec::new(),
        }
    }

    fn has_content(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Finish a pending block.
///
/// A block without lines yields `None`. Stanzas take their marker number,
/// or `next_number` when they were not opened by a marker.
pub fn close_block(state: BlockState, next_number: u32) -> Option<ContentBlock> {
    if !state.has_content() {
        return None;
    }

    Some(match state.kind {
        BlockKind::Stanza => ContentBlock::stanza(state.marker.unwrap_or(next_number), state.lines),
        BlockKind::Chorus => ContentBlock::chorus(state.lines),
    })
}

/// Running output of the scan: finished blocks plus the stanza counter.
///
/// A marker moves the counter to its number even if the block it opens is
/// later dropped; an emitted stanza moves it to the following number.
struct Segmenter {
    blocks: Vec<ContentBlock>,
    next_number: u32,
}

impl Segmenter {
    /// Close the pending block and open a stanza at source marker `number`.
    fn open_marked(&mut self, current: &mut BlockState, number: u32) {
        self.finish(std::mem::replace(current, BlockState::stanza(Some(number))));
        self.next_number = number;
    }

    fn finish(&mut self, state: BlockState) {
        if let Some(block) = close_block(state, self.next_number) {
            if let Some(n) = block.stanza_number {
                self.next_number = n.saturating_add(1);
            }
            self.blocks.push(block);
        }
    }
}

/// Segment one hymn's lines into content blocks.
pub fn segment_content<S: AsRef<str>>(lines: &[S], hymn_number: u32) -> Vec<ContentBlock> {
    let regime = NumberingRegime::detect(lines, hymn_number);
    segment_with_regime(lines, regime)
}

/// Segment lines under an already-chosen regime.
pub fn segment_with_regime<S: AsRef<str>>(lines: &[S], regime: NumberingRegime) -> Vec<ContentBlock> {
    let mut out = Segmenter {
        blocks: Vec::new(),
        next_number: 1,
    };
    let mut current = BlockState::stanza(None);

    for raw in lines {
        let line = raw.as_ref().trim();

        if regime == NumberingRegime::Irregular {
            if let Some((number, rest)) = match_irregular_marker(line) {
                out.open_marked(&mut current, number);
                if !rest.is_empty() {
                    current.lines.push(rest.to_string());
                }
                continue;
            }
        }

        if regime == NumberingRegime::Explicit {
            if let Some(number) = match_stanza_numeral(line) {
                out.open_marked(&mut current, number);
                continue;
            }
        }

        if is_chorus_marker(line) {
            out.finish(std::mem::replace(&mut current, BlockState::chorus()));
            continue;
        }

        if line.is_empty() {
            if regime != NumberingRegime::Explicit && current.has_content() {
                out.finish(std::mem::replace(&mut current, BlockState::stanza(None)));
            }
            continue;
        }

        current.lines.push(line.to_string());
    }

    out.finish(current);
    out.blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn regime_detection() {
        assert_eq!(
            NumberingRegime::detect(&lines(&["a", "", "b"]), 1),
            NumberingRegime::Implicit
        );
        assert_eq!(
            NumberingRegime::detect(&lines(&["1", "a", " 2 ", "b"]), 1),
            NumberingRegime::Explicit
        );
        assert_eq!(
            NumberingRegime::detect(&lines(&["1", "a"]), IRREGULAR_HYMN),
            NumberingRegime::Irregular
        );
    }

    #[test]
    fn stray_numeral_forces_explicit_regime() {
        let l = lines(&["linea uno", "", "7", "linea dos"]);
        assert_eq!(NumberingRegime::detect(&l, 3), NumberingRegime::Explicit);
    }

    #[test]
    fn close_block_prefers_marker_and_drops_empty() {
        let mut s = BlockState::stanza(Some(4));
        s.lines = lines(&["a", "b"]);
        assert_eq!(close_block(s, 1), Some(ContentBlock::stanza(4, lines(&["a", "b"]))));

        assert_eq!(close_block(BlockState::chorus(), 1), None);
        assert_eq!(close_block(BlockState::stanza(None), 1), None);
    }

    #[test]
    fn close_block_uses_counter_without_marker() {
        let mut s = BlockState::stanza(None);
        s.lines = lines(&["x"]);
        assert_eq!(close_block(s, 5), Some(ContentBlock::stanza(5, lines(&["x"]))));
    }

    #[test]
    fn implicit_numbers_follow_closure_order() {
        let blocks = segment_content(&lines(&["a", "b", "", "c", "", "", "d"]), 10);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(1, lines(&["a", "b"])),
                ContentBlock::stanza(2, lines(&["c"])),
                ContentBlock::stanza(3, lines(&["d"])),
            ]
        );
    }

    #[test]
    fn explicit_numbers_are_taken_verbatim() {
        let blocks = segment_content(&lines(&["3", "tres", "1", "uno", "9", "nueve"]), 10);
        let numbers: Vec<_> = blocks.iter().map(|b| b.stanza_number).collect();
        assert_eq!(numbers, vec![Some(3), Some(1), Some(9)]);
    }

    #[test]
    fn explicit_regime_skips_blank_lines() {
        let blocks = segment_content(&lines(&["1", "", "a", "", "b", "", "2", "c"]), 10);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(1, lines(&["a", "b"])),
                ContentBlock::stanza(2, lines(&["c"])),
            ]
        );
    }

    #[test]
    fn marker_without_content_is_dropped() {
        let blocks = segment_content(&lines(&["1", "2", "solo"]), 10);
        assert_eq!(blocks, vec![ContentBlock::stanza(2, lines(&["solo"]))]);
    }

    #[test]
    fn chorus_marker_opens_chorus_and_is_not_content() {
        let blocks = segment_content(&lines(&["a", "CORO", "gloria", "gloria", "", "b"]), 10);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(1, lines(&["a"])),
                ContentBlock::chorus(lines(&["gloria", "gloria"])),
                ContentBlock::stanza(2, lines(&["b"])),
            ]
        );
    }

    #[test]
    fn chorus_does_not_advance_counter() {
        let blocks = segment_content(&lines(&["coro", "g", "", "a", "", "b"]), 10);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::chorus(lines(&["g"])),
                ContentBlock::stanza(1, lines(&["a"])),
                ContentBlock::stanza(2, lines(&["b"])),
            ]
        );
    }

    #[test]
    fn blank_after_empty_chorus_marker_keeps_chorus() {
        let blocks = segment_content(&lines(&["a", "", "coro", "", "gloria"]), 10);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(1, lines(&["a"])),
                ContentBlock::chorus(lines(&["gloria"])),
            ]
        );
    }

    #[test]
    fn irregular_markers_seed_first_line() {
        let blocks = segment_content(
            &lines(&["1. primera", "sigue", "2. segunda estrofa", "3.", "tercera"]),
            IRREGULAR_HYMN,
        );
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(1, lines(&["primera", "sigue"])),
                ContentBlock::stanza(2, lines(&["segunda estrofa"])),
                ContentBlock::stanza(3, lines(&["tercera"])),
            ]
        );
    }

    #[test]
    fn irregular_blank_line_continues_from_last_marker() {
        let blocks = segment_content(&lines(&["4. cuarta", "", "sin marca"]), IRREGULAR_HYMN);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(4, lines(&["cuarta"])),
                ContentBlock::stanza(5, lines(&["sin marca"])),
            ]
        );
    }

    #[test]
    fn irregular_empty_marker_still_sets_counter() {
        let blocks = segment_content(
            &lines(&["1. uno", "3.", "coro", "g", "", "x"]),
            IRREGULAR_HYMN,
        );
        assert_eq!(
            blocks,
            vec![
                ContentBlock::stanza(1, lines(&["uno"])),
                ContentBlock::chorus(lines(&["g"])),
                ContentBlock::stanza(3, lines(&["x"])),
            ]
        );
    }

    #[test]
    fn irregular_regime_ignores_lone_digits_as_markers() {
        let blocks = segment_content(&lines(&["2. dos", "5"]), IRREGULAR_HYMN);
        assert_eq!(blocks, vec![ContentBlock::stanza(2, lines(&["dos", "5"]))]);
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(segment_content::<String>(&[], 1).is_empty());
        assert!(segment_content(&lines(&["", "  ", ""]), 1).is_empty());
    }

    #[test]
    fn lines_are_trimmed_but_not_collapsed() {
        let blocks = segment_content(&lines(&["   dos  espacios  "]), 1);
        assert_eq!(blocks[0].lines, vec!["dos  espacios".to_string()]);
    }
}
