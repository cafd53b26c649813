//! Structured hymn records produced by the segmentation parser.
//!
//! These are plain owned values: the parser builds them, hands them to the
//! caller, and keeps nothing. Serde derives let a persistence collaborator
//! store them as-is.

use serde::{Deserialize, Serialize};

/// One hymn: its printed number, its title, and its blocks in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HymnRecord {
    /// Number printed next to the title. Unique within one hymnal.
    pub number: u32,
    /// Lower-cased title without the number marker.
    pub title: String,
    pub content: Vec<ContentBlock>,
}

impl HymnRecord {
    pub fn stanzas(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().filter(|b| b.kind == BlockKind::Stanza)
    }

    pub fn choruses(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().filter(|b| b.kind == BlockKind::Chorus)
    }

    pub fn line_count(&self) -> usize {
        self.content.iter().map(|b| b.lines.len()).sum()
    }
}

/// Kind of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Stanza,
    Chorus,
}

/// A stanza or chorus and its lines.
///
/// Never empty: the parser discards blocks that end up without content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub kind: BlockKind,
    /// Set for stanzas only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stanza_number: Option<u32>,
    pub lines: Vec<String>,
}

impl ContentBlock {
    pub fn stanza(number: u32, lines: Vec<String>) -> Self {
        Self {
            kind: BlockKind::Stanza,
            stanza_number: Some(number),
            lines,
        }
    }

    pub fn chorus(lines: Vec<String>) -> Self {
        Self {
            kind: BlockKind::Chorus,
            stanza_number: None,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serialises_lowercase() {
        let json = serde_json::to_string(&ContentBlock::chorus(vec!["gloria".into()])).unwrap();
        assert_eq!(json, r#"{"kind":"chorus","lines":["gloria"]}"#);

        let json = serde_json::to_string(&ContentBlock::stanza(2, vec!["x".into()])).unwrap();
        assert!(json.contains(r#""kind":"stanza""#));
        assert!(json.contains(r#""stanza_number":2"#));
    }

    #[test]
    fn record_helpers_filter_by_kind() {
        let hymn = HymnRecord {
            number: 1,
            title: "santo".into(),
            content: vec![
                ContentBlock::stanza(1, vec!["a".into(), "b".into()]),
                ContentBlock::chorus(vec!["c".into()]),
                ContentBlock::stanza(2, vec!["d".into()]),
            ],
        };
        assert_eq!(hymn.stanzas().count(), 2);
        assert_eq!(hymn.choruses().count(), 1);
        assert_eq!(hymn.line_count(), 4);
    }
}
