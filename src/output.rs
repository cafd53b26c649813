//! Result types returned by acquisition and extraction.

use crate::model::HymnRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a [`RecognizedText`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// A previous OCR run for identical bytes.
    Cache,
    /// The PDF's embedded text objects.
    TextLayer,
    /// Two-column OCR over rasterised pages.
    Ocr,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextSource::Cache => "cache",
            TextSource::TextLayer => "text layer",
            TextSource::Ocr => "ocr",
        };
        f.write_str(s)
    }
}

/// All text recovered from one PDF, in page/column reading order.
///
/// Produced once by the acquirer and consumed once by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedText {
    text: String,
    source: TextSource,
    content_hash: String,
}

impl RecognizedText {
    pub(crate) fn new(text: String, source: TextSource, content_hash: String) -> Self {
        Self {
            text,
            source,
            content_hash,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn source(&self) -> TextSource {
        self.source
    }

    /// SHA-256 of the PDF bytes, lower-case hex.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

impl AsRef<str> for RecognizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Timing and provenance for one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// `None` only in a default-constructed value.
    pub source: Option<TextSource>,
    pub text_chars: usize,
    pub hymns_extracted: usize,
    pub content_blocks: usize,
    pub acquire_duration_ms: u64,
    pub segment_duration_ms: u64,
}

/// Structured hymns plus the stats of the run that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub hymns: Vec<HymnRecord>,
    pub stats: ExtractionStats,
}
