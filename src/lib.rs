//! # hymnal-extract
//!
//! Turn a scanned or digital hymnal PDF into structured hymns: number, title,
//! and the ordered stanzas and choruses of each.
//!
//! ## Why this crate?
//!
//! Hymnals are printed in two columns, often with no usable text layer.
//! Whole-page OCR reads straight across the gutter and interleaves the
//! columns. This crate prefers the embedded text when there is one, and
//! otherwise cuts every page down the middle and OCRs each half on its own,
//! caching the result by content hash so a re-upload is free. A line-oriented
//! parser then recovers hymn boundaries, stanza numbers and choruses from the
//! flat text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Cache    sha256(bytes) → previously recognised text?
//!  ├─ 2. Stage    validate %PDF, write a temp file (removed on drop)
//!  ├─ 3. Text     embedded text layer via pdfium (spawn_blocking)
//!  ├─ 4. OCR      rasterise at 300 DPI → split columns → tesseract (spa)
//!  ├─ 5. Segment  "N. TITULO" lines → hymns; numerals / CORO / blanks → blocks
//!  └─ 6. Output   Vec<HymnRecord> + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hymnal_extract::{extract_hymns, AcquisitionConfig, DiskCache, TextAcquirer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = Arc::new(DiskCache::new(DiskCache::default_dir()));
//!     let acquirer = TextAcquirer::new(AcquisitionConfig::default(), cache);
//!     let bytes = std::fs::read("himnario.pdf")?;
//!     let output = extract_hymns(&acquirer, &bytes).await?;
//!     eprintln!("{} hymns from {:?}", output.stats.hymns_extracted, output.stats.source);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `hymnal` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `leptess` | off     | In-process Tesseract via leptess instead of the `tesseract` executable |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! hymnal-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod acquire;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use acquire::TextAcquirer;
pub use cache::{
    content_hash, content_key, DiskCache, MemoryCache, NoopCache, TextCache, DEFAULT_MEMORY_CAPACITY,
};
pub use config::{AcquisitionConfig, AcquisitionConfigBuilder, ColumnLayout};
pub use error::{CacheError, ExtractionError};
pub use extract::{extract_hymns, extract_hymns_from_file, extract_hymns_sync};
pub use model::{BlockKind, ContentBlock, HymnRecord};
pub use output::{ExtractionOutput, ExtractionStats, RecognizedText, TextSource};
pub use parser::segment;
pub use pipeline::ocr::{OcrEngine, OcrError, TesseractCli};
pub use pipeline::pdf::{PdfBackend, PdfiumBackend, RenderedPage};
pub use progress::{AcquisitionProgressCallback, NoopProgressCallback, ProgressCallback};

#[cfg(feature = "leptess")]
pub use pipeline::ocr::LeptessEngine;
