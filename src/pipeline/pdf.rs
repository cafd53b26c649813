//! PDF access: embedded text extraction and page rasterisation.
//!
//! Both operations sit behind [`PdfBackend`] so the acquirer can be tested
//! with in-memory doubles. [`PdfiumBackend`] is the real implementation.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and is not async-safe.
//! The acquirer calls these methods from `tokio::task::spawn_blocking`, so
//! implementations are plain blocking functions.

use crate::error::ExtractionError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// The PDF capabilities acquisition needs.
pub trait PdfBackend: Send + Sync {
    /// Text from the PDF's embedded text objects, pages joined in order.
    ///
    /// An empty string means "no text layer", not an error.
    fn extract_text(&self, pdf_path: &Path, password: Option<&str>) -> Result<String, ExtractionError>;

    /// Render every page at `dpi`, in page order, handing each to `sink`
    /// as soon as it is ready. Stops early when `sink` returns `false`.
    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
        sink: &mut dyn FnMut(RenderedPage) -> bool,
    ) -> Result<(), ExtractionError>;
}

/// One rasterised page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 0-based.
    pub index: usize,
    pub total: usize,
    pub image: DynamicImage,
}

/// [`PdfBackend`] backed by pdfium-render.
///
/// Binding order: explicit library path, then `PDFIUM_LIB_PATH`, then a
/// library next to the working directory, then the system library.
#[derive(Debug, Clone)]
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
    max_rendered_pixels: u32,
}

impl Default for PdfiumBackend {
    fn default() -> Self {
        Self {
            library_path: None,
            max_rendered_pixels: 6000,
        }
    }
}

impl PdfiumBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the pdfium library at `path` instead of searching for one.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn with_max_rendered_pixels(mut self, px: u32) -> Self {
        self.max_rendered_pixels = px.max(100);
        self
    }

    fn bind(&self) -> Result<Pdfium, ExtractionError> {
        let explicit = self
            .library_path
            .clone()
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => Pdfium::bind_to_library(&path),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ExtractionError::PdfiumBindingFailed(e.to_string()))?;

        Ok(Pdfium::new(bindings))
    }
}

/// Map a pdfium load error onto the password/corruption variants.
fn load_error(e: PdfiumError, password: Option<&str>) -> ExtractionError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ExtractionError::WrongPassword
        } else {
            ExtractionError::PasswordRequired
        }
    } else {
        ExtractionError::CorruptPdf { detail: err_str }
    }
}

impl PdfBackend for PdfiumBackend {
    fn extract_text(&self, pdf_path: &Path, password: Option<&str>) -> Result<String, ExtractionError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| load_error(e, password))?;

        let mut parts = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| ExtractionError::CorruptPdf {
                    detail: format!("text layer of page {}: {:?}", idx + 1, e),
                })?
                .all();
            debug!("Page {}: {} chars in text layer", idx + 1, text.len());
            parts.push(text);
        }

        Ok(parts.join("\n"))
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
        sink: &mut dyn FnMut(RenderedPage) -> bool,
    ) -> Result<(), ExtractionError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| load_error(e, password))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("Rasterising {} pages at {} DPI", total, dpi);

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / PDF_POINTS_PER_INCH)
            .set_maximum_width(self.max_rendered_pixels as i32)
            .set_maximum_height(self.max_rendered_pixels as i32);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ExtractionError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            let keep_going = sink(RenderedPage {
                index: idx,
                total,
                image,
            });
            if !keep_going {
                debug!("Rasterisation stopped after page {}", idx + 1);
                break;
            }
        }

        Ok(())
    }
}
