//! Error types for the hymnal-extract library.
//!
//! Two error types reflect two very different failure modes:
//!
//! * [`ExtractionError`] — **Fatal**: no text could be recovered from the
//!   PDF, or a capability the acquisition stage needs (pdfium, the OCR
//!   engine) is missing or misbehaving. Returned as `Err(ExtractionError)`
//!   from [`crate::acquire::TextAcquirer::acquire`] and the `extract_hymns*`
//!   entry points. Never retried automatically.
//!
//! * [`CacheError`] — **Absorbed**: the cache store failed. The acquirer logs
//!   it and carries on as if the cache had missed, so an outage only makes
//!   extraction slower, never wrong.
//!
//! The segmentation parser has no error type at all: malformed text yields
//! fewer hymns, not an `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the hymnal-extract library.
#[derive(Debug, Error)]
pub enum ExtractionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The bytes are not a PDF.
    #[error("Input is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, or place libpdfium next to the\n\
executable, or install it in a system library directory.\n"
    )]
    PdfiumBindingFailed(String),

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine is missing or misconfigured.
    #[error("OCR engine '{engine}' is not available: {hint}")]
    OcrUnavailable { engine: String, hint: String },

    /// The OCR engine ran but failed on one column of one page.
    #[error("OCR failed on page {page} ({column}): {detail}")]
    OcrFailed {
        page: usize,
        column: String,
        detail: String,
    },

    // ── Outcome errors ────────────────────────────────────────────────────
    /// A stage exceeded its time budget.
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: String, secs: u64 },

    /// Every method ran and the recognized text is still blank.
    #[error("No text could be extracted from the PDF (text layer empty, OCR returned nothing)")]
    NoTextRecovered,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractionError {
    /// `true` when the failure came from a time budget rather than the input.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExtractionError::Timeout { .. })
    }
}

/// A cache-store failure. Never escapes the acquirer.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry could not be (de)serialised: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}
