//! OCR engines: image in, recognised text out.
//!
//! The acquirer only needs "given an image and a language, return text", so
//! engines sit behind [`OcrEngine`]. Two implementations ship:
//!
//! - [`TesseractCli`] (default) pipes a PNG into the `tesseract` executable.
//!   The child is spawned with `kill_on_drop`, so when the acquirer's
//!   timeout drops the future, a hung engine is killed with it.
//! - `LeptessEngine` (feature `leptess`) runs Tesseract in-process.
//!
//! PNG is used for the hand-off because it is lossless; JPEG artefacts
//! around thin glyph strokes cost accuracy on accented characters.

use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Failure of an OCR engine.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine cannot run at all (missing binary, missing language data).
    #[error("{0}")]
    Unavailable(String),

    /// The engine ran and failed on this image.
    #[error("{0}")]
    Failed(String),
}

/// An OCR capability.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short name used in error messages and logs.
    fn name(&self) -> &str;

    /// Check the engine can run with `language` before any page is sent.
    async fn probe(&self, language: &str) -> Result<(), OcrError>;

    /// Recognise the text in `image`.
    async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError>;
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| OcrError::Failed(format!("PNG encoding failed: {e}")))?;
    debug!("Encoded {}x{} image → {} bytes PNG", img.width(), img.height(), buf.len());
    Ok(buf)
}

/// Languages listed by `tesseract --list-langs`; the first line is a header.
fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Language codes missing from `installed`. `language` may be `"spa+eng"`.
fn missing_languages(language: &str, installed: &[String]) -> Vec<String> {
    language
        .split('+')
        .map(str::trim)
        .filter(|l| !l.is_empty() && !installed.iter().any(|i| i == l))
        .map(str::to_string)
        .collect()
}

// ── Tesseract CLI ────────────────────────────────────────────────────────

/// [`OcrEngine`] that runs the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    cmd: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, OcrError> {
        Command::new(&self.cmd)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OcrError::Unavailable(format!(
                    "could not run '{}': {e}. Install tesseract or set TESSERACT_CMD.",
                    self.cmd
                ))
            })
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        &self.cmd
    }

    async fn probe(&self, language: &str) -> Result<(), OcrError> {
        let version = self.run(&["--version"]).await?;
        if !version.status.success() {
            return Err(OcrError::Unavailable(format!(
                "'{} --version' exited with {}",
                self.cmd, version.status
            )));
        }

        let langs = self.run(&["--list-langs"]).await?;
        let installed = parse_language_list(&String::from_utf8_lossy(&langs.stdout));
        let missing = missing_languages(language, &installed);
        if !missing.is_empty() {
            return Err(OcrError::Unavailable(format!(
                "language data not installed: {} (e.g. apt install tesseract-ocr-{})",
                missing.join(", "),
                missing[0]
            )));
        }

        Ok(())
    }

    async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        let mut child = Command::new(&self.cmd)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrError::Unavailable(format!("could not run '{}': {e}", self.cmd)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Failed("tesseract stdin was not captured".into()))?;
        stdin
            .write_all(&png)
            .await
            .map_err(|e| OcrError::Failed(format!("writing image to tesseract: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::Failed(format!("waiting for tesseract: {e}")))?;

        if !output.status.success() {
            return Err(OcrError::Failed(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ── leptess (in-process) ─────────────────────────────────────────────────

#[cfg(feature = "leptess")]
pub use in_process::LeptessEngine;

#[cfg(feature = "leptess")]
mod in_process {
    use super::{encode_png, OcrEngine, OcrError};
    use async_trait::async_trait;
    use image::DynamicImage;
    use leptess::LepTess;

    /// [`OcrEngine`] backed by libtesseract through leptess.
    ///
    /// Each call creates its own `LepTess` on a blocking thread; the handle
    /// is not `Send`.
    #[derive(Debug, Default, Clone)]
    pub struct LeptessEngine;

    fn join_error(e: tokio::task::JoinError) -> OcrError {
        OcrError::Failed(format!("OCR task panicked: {e}"))
    }

    #[async_trait]
    impl OcrEngine for LeptessEngine {
        fn name(&self) -> &str {
            "leptess"
        }

        async fn probe(&self, language: &str) -> Result<(), OcrError> {
            let lang = language.to_string();
            tokio::task::spawn_blocking(move || {
                LepTess::new(None, &lang).map(|_| ()).map_err(|e| {
                    OcrError::Unavailable(format!(
                        "failed to initialise Tesseract with language '{lang}': {e}"
                    ))
                })
            })
            .await
            .map_err(join_error)?
        }

        async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
            let png = encode_png(image)?;
            let lang = language.to_string();
            tokio::task::spawn_blocking(move || {
                let mut lt = LepTess::new(None, &lang)
                    .map_err(|e| OcrError::Unavailable(format!("Tesseract init: {e}")))?;
                lt.set_image_from_mem(&png)
                    .map_err(|e| OcrError::Failed(format!("Tesseract image: {e}")))?;
                lt.get_utf8_text()
                    .map_err(|e| OcrError::Failed(format!("Tesseract text: {e}")))
            })
            .await
            .map_err(join_error)?
        }
    }
}
