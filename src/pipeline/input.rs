//! Input staging: validate PDF bytes and give them a path on disk.
//!
//! pdfium and most rasterisers want a file path. The bytes go into a
//! [`NamedTempFile`] owned by [`StagedPdf`]; the file is removed when the
//! value is dropped, on success, on error, on timeout, and during unwinding.

use crate::error::ExtractionError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// PDF bytes written to a temporary file that lives as long as this value.
pub struct StagedPdf {
    file: NamedTempFile,
}

impl StagedPdf {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Reject anything that does not start with `%PDF`.
pub fn validate_pdf(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < PDF_MAGIC.len() || &bytes[..PDF_MAGIC.len()] != PDF_MAGIC {
        return Err(ExtractionError::NotAPdf {
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }
    Ok(())
}

/// Validate `bytes` and write them to a fresh temporary file.
pub fn stage_pdf(bytes: &[u8]) -> Result<StagedPdf, ExtractionError> {
    validate_pdf(bytes)?;

    let mut file = tempfile::Builder::new()
        .prefix("hymnal-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ExtractionError::Internal(format!("tempfile: {e}")))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ExtractionError::Internal(format!("tempfile write: {e}")))?;

    debug!("Staged {} PDF bytes at {}", bytes.len(), file.path().display());
    Ok(StagedPdf { file })
}

/// Read a PDF from disk, mapping a missing file to [`ExtractionError::FileNotFound`].
pub async fn read_pdf_file(path: &Path) -> Result<Vec<u8>, ExtractionError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExtractionError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ExtractionError::Internal(format!("read {}: {e}", path.display())),
    })
}
