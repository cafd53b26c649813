//! Text acquisition: PDF bytes in, recognized text out.
//!
//! ## Order of attempts
//!
//! ```text
//! bytes ─▶ sha256 ─▶ cache hit? ──────────────────────────────▶ Cache
//!                     │ miss
//!                     ▼
//!                  stage ─▶ text layer non-empty? ─────────────▶ TextLayer
//!                            │ empty / error
//!                            ▼
//!                  probe OCR ─▶ rasterise ─▶ split ─▶ OCR ─▶ cache ─▶ Ocr
//! ```
//!
//! Only OCR output is cached: it is the expensive path, and the text layer is
//! re-read in milliseconds.
//!
//! ## Resource bounds
//!
//! Pages are rasterised on a blocking thread and streamed through a bounded
//! channel, so at most a couple of page bitmaps are alive at once however
//! long the hymnal is. Every OCR call has its own timeout and the whole
//! acquisition has another; dropping the future on either kills the OCR
//! child process and removes the staged PDF.

use crate::cache::{content_hash, content_key, TextCache};
use crate::config::AcquisitionConfig;
use crate::error::ExtractionError;
use crate::output::{RecognizedText, TextSource};
use crate::pipeline::columns::{split_columns, Column};
use crate::pipeline::input::{stage_pdf, StagedPdf};
use crate::pipeline::ocr::{OcrEngine, OcrError, TesseractCli};
use crate::pipeline::pdf::{PdfBackend, PdfiumBackend, RenderedPage};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pages rendered ahead of the OCR loop.
const RENDER_AHEAD: usize = 2;

/// Turns PDF bytes into [`RecognizedText`].
///
/// Cheap to share: wrap it in an `Arc` and call [`acquire`](Self::acquire)
/// from as many tasks as needed.
///
/// # Example
/// ```rust,no_run
/// use hymnal_extract::{AcquisitionConfig, MemoryCache, TextAcquirer};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let acquirer = TextAcquirer::new(AcquisitionConfig::default(), Arc::new(MemoryCache::new()));
/// let bytes = std::fs::read("himnario.pdf")?;
/// let text = acquirer.acquire(&bytes).await?;
/// println!("{} chars from {}", text.as_str().len(), text.source());
/// # Ok(())
/// # }
/// ```
pub struct TextAcquirer {
    config: AcquisitionConfig,
    backend: Arc<dyn PdfBackend>,
    ocr: Arc<dyn OcrEngine>,
    cache: Arc<dyn TextCache>,
}

impl TextAcquirer {
    /// An acquirer using pdfium and the `tesseract` executable named in
    /// `config`.
    pub fn new(config: AcquisitionConfig, cache: Arc<dyn TextCache>) -> Self {
        let backend = PdfiumBackend::new().with_max_rendered_pixels(config.max_rendered_pixels);
        let ocr = TesseractCli::new(config.tesseract_cmd.clone());
        Self {
            config,
            backend: Arc::new(backend),
            ocr: Arc::new(ocr),
            cache,
        }
    }

    /// Replace the PDF backend.
    pub fn with_backend(mut self, backend: Arc<dyn PdfBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the OCR engine.
    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = engine;
        self
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Recover all text from `pdf_bytes`.
    ///
    /// # Errors
    /// - [`ExtractionError::NotAPdf`] and the PDF variants for bad input
    /// - [`ExtractionError::OcrUnavailable`] when OCR is needed but cannot run
    /// - [`ExtractionError::Timeout`] when an OCR call or the whole request
    ///   runs out of time
    /// - [`ExtractionError::NoTextRecovered`] when every method came back blank
    ///
    /// Cache failures are never returned; they are logged and treated as
    /// misses.
    pub async fn acquire(&self, pdf_bytes: &[u8]) -> Result<RecognizedText, ExtractionError> {
        let budget = self.config.request_timeout();
        match tokio::time::timeout(budget, self.acquire_inner(pdf_bytes)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Acquisition exceeded {}s", budget.as_secs());
                Err(ExtractionError::Timeout {
                    stage: "Text acquisition".to_string(),
                    secs: budget.as_secs(),
                })
            }
        }
    }

    /// Synchronous wrapper around [`acquire`](Self::acquire).
    ///
    /// Creates a temporary tokio runtime internally; do not call it from
    /// inside an async context.
    pub fn acquire_sync(&self, pdf_bytes: &[u8]) -> Result<RecognizedText, ExtractionError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| ExtractionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.acquire(pdf_bytes))
    }

    async fn acquire_inner(&self, pdf_bytes: &[u8]) -> Result<RecognizedText, ExtractionError> {
        let start = Instant::now();
        let hash = content_hash(pdf_bytes);
        let key = content_key(&self.config.cache_key_prefix, &hash);

        // ── Step 1: Cache ────────────────────────────────────────────────
        match self.cache.get(&key) {
            Ok(Some(text)) if !text.trim().is_empty() => {
                info!("Cache hit for {}", key);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_cache_hit(&key);
                    cb.on_acquired(TextSource::Cache, text.len());
                }
                return Ok(RecognizedText::new(text, TextSource::Cache, hash));
            }
            Ok(_) => debug!("Cache miss for {}", key),
            Err(e) => warn!("Cache lookup failed for {}, continuing without it: {}", key, e),
        }

        // ── Step 2: Stage ────────────────────────────────────────────────
        let staged = stage_pdf(pdf_bytes)?;

        // ── Step 3: Text layer ───────────────────────────────────────────
        let direct = {
            let backend = Arc::clone(&self.backend);
            let path = staged.path().to_path_buf();
            let password = self.config.password.clone();
            tokio::task::spawn_blocking(move || backend.extract_text(&path, password.as_deref()))
                .await
                .map_err(|e| ExtractionError::Internal(format!("Text extraction task panicked: {}", e)))?
        };

        match direct {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    "Text layer yielded {} chars in {}ms",
                    text.len(),
                    start.elapsed().as_millis()
                );
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_acquired(TextSource::TextLayer, text.len());
                }
                return Ok(RecognizedText::new(text, TextSource::TextLayer, hash));
            }
            Ok(_) => info!("No text layer, falling back to OCR"),
            Err(e) => warn!("Text layer extraction failed, falling back to OCR: {}", e),
        }

        // ── Step 4: OCR ──────────────────────────────────────────────────
        let text = self.recognize_pages(&staged).await?;
        drop(staged);

        if text.trim().is_empty() {
            return Err(ExtractionError::NoTextRecovered);
        }

        // ── Step 5: Cache the OCR result ─────────────────────────────────
        if let Err(e) = self.cache.set(&key, &text, self.config.cache_ttl()) {
            warn!("Cache store failed for {}, result not cached: {}", key, e);
        }

        info!(
            "OCR yielded {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_acquired(TextSource::Ocr, text.len());
        }

        Ok(RecognizedText::new(text, TextSource::Ocr, hash))
    }

    /// Rasterise, split and OCR every page; outputs joined with `"\n"`.
    async fn recognize_pages(&self, staged: &StagedPdf) -> Result<String, ExtractionError> {
        let language = self.config.ocr_language.as_str();

        self.ocr
            .probe(language)
            .await
            .map_err(|e| ExtractionError::OcrUnavailable {
                engine: self.ocr.name().to_string(),
                hint: e.to_string(),
            })?;

        let (tx, mut rx) = tokio::sync::mpsc::channel::<RenderedPage>(RENDER_AHEAD);
        let render = {
            let backend = Arc::clone(&self.backend);
            let path = staged.path().to_path_buf();
            let password = self.config.password.clone();
            let dpi = self.config.dpi;
            tokio::task::spawn_blocking(move || {
                backend.rasterize(&path, dpi, password.as_deref(), &mut |page| {
                    tx.blocking_send(page).is_ok()
                })
            })
        };

        let mut pieces: Vec<String> = Vec::new();
        while let Some(page) = rx.recv().await {
            let page_num = page.index + 1;
            if page.index == 0 {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_ocr_start(page.total);
                }
            }
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_page_start(page_num, page.total);
            }

            let mut page_chars = 0;
            for (column, image) in split_columns(&page.image, self.config.columns) {
                let text = self.recognize_one(&image, page_num, column).await?;
                debug!("Page {} {}: {} chars", page_num, column, text.len());
                page_chars += text.len();
                pieces.push(text);
            }

            if let Some(ref cb) = self.config.progress_callback {
                cb.on_page_complete(page_num, page.total, page_chars);
            }
        }

        render
            .await
            .map_err(|e| ExtractionError::Internal(format!("Render task panicked: {}", e)))??;

        Ok(pieces.join("\n"))
    }

    async fn recognize_one(
        &self,
        image: &DynamicImage,
        page_num: usize,
        column: Column,
    ) -> Result<String, ExtractionError> {
        let budget = self.config.ocr_timeout();
        let call = self.ocr.recognize(image, &self.config.ocr_language);

        match tokio::time::timeout(budget, call).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(OcrError::Unavailable(hint))) => Err(ExtractionError::OcrUnavailable {
                engine: self.ocr.name().to_string(),
                hint,
            }),
            Ok(Err(OcrError::Failed(detail))) => Err(ExtractionError::OcrFailed {
                page: page_num,
                column: column.to_string(),
                detail,
            }),
            Err(_) => {
                warn!("OCR of page {} ({}) exceeded {}s", page_num, column, budget.as_secs());
                Err(ExtractionError::Timeout {
                    stage: format!("OCR of page {} ({})", page_num, column),
                    secs: budget.as_secs(),
                })
            }
        }
    }
}
