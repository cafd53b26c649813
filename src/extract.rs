//! End-to-end entry points: PDF → recognized text → hymn records.
//!
//! Acquisition and segmentation are separate stages that can be called on
//! their own ([`TextAcquirer::acquire`], [`crate::parser::segment`]). These
//! functions chain them and fill in [`ExtractionStats`].

use crate::acquire::TextAcquirer;
use crate::error::ExtractionError;
use crate::output::{ExtractionOutput, ExtractionStats, RecognizedText};
use crate::parser::segment;
use crate::pipeline::input::read_pdf_file;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Extract every hymn from PDF bytes.
///
/// # Example
/// ```rust,no_run
/// use hymnal_extract::{extract_hymns, AcquisitionConfig, NoopCache, TextAcquirer};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let acquirer = TextAcquirer::new(AcquisitionConfig::default(), Arc::new(NoopCache));
/// let bytes = std::fs::read("himnario.pdf")?;
/// let output = extract_hymns(&acquirer, &bytes).await?;
/// for hymn in &output.hymns {
///     println!("{}. {} ({} blocks)", hymn.number, hymn.title, hymn.content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_hymns(
    acquirer: &TextAcquirer,
    pdf_bytes: &[u8],
) -> Result<ExtractionOutput, ExtractionError> {
    let acquire_start = Instant::now();
    let text = acquirer.acquire(pdf_bytes).await?;
    let acquire_duration_ms = acquire_start.elapsed().as_millis() as u64;

    Ok(segment_recognized(&text, acquire_duration_ms))
}

/// Read a PDF from disk and extract its hymns.
pub async fn extract_hymns_from_file(
    acquirer: &TextAcquirer,
    path: impl AsRef<Path>,
) -> Result<ExtractionOutput, ExtractionError> {
    let path = path.as_ref();
    info!("Reading {}", path.display());
    let bytes = read_pdf_file(path).await?;
    extract_hymns(acquirer, &bytes).await
}

/// Synchronous wrapper around [`extract_hymns`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_hymns_sync(
    acquirer: &TextAcquirer,
    pdf_bytes: &[u8],
) -> Result<ExtractionOutput, ExtractionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_hymns(acquirer, pdf_bytes))
}

fn segment_recognized(text: &RecognizedText, acquire_duration_ms: u64) -> ExtractionOutput {
    let segment_start = Instant::now();
    let hymns = segment(text.as_str());
    let segment_duration_ms = segment_start.elapsed().as_millis() as u64;

    let stats = ExtractionStats {
        source: Some(text.source()),
        text_chars: text.as_str().chars().count(),
        hymns_extracted: hymns.len(),
        content_blocks: hymns.iter().map(|h| h.content.len()).sum(),
        acquire_duration_ms,
        segment_duration_ms,
    };

    info!(
        "Extracted {} hymns ({} blocks) from {} text",
        stats.hymns_extracted, stats.content_blocks, text.source()
    );

    ExtractionOutput { hymns, stats }
}
