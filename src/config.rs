//! Configuration for the text acquisition stage.
//!
//! Every acquisition knob lives in [`AcquisitionConfig`], built through
//! [`AcquisitionConfigBuilder`]. The segmentation parser takes no
//! configuration: its rules are fixed by the hymnal format.

use crate::error::ExtractionError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for turning PDF bytes into recognized text.
///
/// # Example
/// ```rust
/// use hymnal_extract::AcquisitionConfig;
///
/// let config = AcquisitionConfig::builder()
///     .dpi(300)
///     .ocr_language("spa")
///     .ocr_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct AcquisitionConfig {
    /// Rasterisation DPI for the OCR fallback. Range: 72–600. Default: 300.
    ///
    /// Tesseract's accuracy drops sharply below ~250 DPI on the small print
    /// of hymnal columns.
    pub dpi: u32,

    /// Cap on either rendered dimension, in pixels. Default: 6000.
    ///
    /// A 300-DPI A4 page is 2480 × 3508 px; the cap only bites on oversized
    /// pages.
    pub max_rendered_pixels: u32,

    /// How each rendered page is cut before OCR. Default: [`ColumnLayout::Dual`].
    pub columns: ColumnLayout,

    /// Tesseract language code(s). Default: `"spa"`.
    ///
    /// Must cover the accented Latin alphabet of the source (á é í ó ú ñ).
    pub ocr_language: String,

    /// Tesseract executable used by [`crate::pipeline::ocr::TesseractCli`].
    /// Default: `"tesseract"`.
    pub tesseract_cmd: String,

    /// Time budget for a single OCR call (one column of one page). Default: 120.
    pub ocr_timeout_secs: u64,

    /// Time budget for a whole `acquire` call. Default: 900.
    pub request_timeout_secs: u64,

    /// Lifetime of a cached OCR result in seconds. Default: 3600.
    pub cache_ttl_secs: u64,

    /// Prefix prepended to the content hash to form the cache key.
    /// Default: `"ocr_text:"`.
    pub cache_key_prefix: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Receives OCR progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            max_rendered_pixels: 6000,
            columns: ColumnLayout::default(),
            ocr_language: "spa".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            ocr_timeout_secs: 120,
            request_timeout_secs: 900,
            cache_ttl_secs: 3600,
            cache_key_prefix: "ocr_text:".to_string(),
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AcquisitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquisitionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("columns", &self.columns)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_key_prefix", &self.cache_key_prefix)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AcquisitionProgressCallback>"),
            )
            .finish()
    }
}

impl AcquisitionConfig {
    /// Create a new builder for `AcquisitionConfig`.
    pub fn builder() -> AcquisitionConfigBuilder {
        AcquisitionConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for [`AcquisitionConfig`].
#[derive(Debug)]
pub struct AcquisitionConfigBuilder {
    config: AcquisitionConfig,
}

impl AcquisitionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn columns(mut self, layout: ColumnLayout) -> Self {
        self.config.columns = layout;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn ocr_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ocr_timeout_secs = secs;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.cache_ttl_secs = secs;
        self
    }

    pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.cache_key_prefix = prefix.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AcquisitionConfig, ExtractionError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ExtractionError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(ExtractionError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(ExtractionError::InvalidConfig(
                "Tesseract command must not be empty".into(),
            ));
        }
        if c.ocr_timeout_secs == 0 || c.request_timeout_secs == 0 {
            return Err(ExtractionError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// How a rendered page is divided before OCR.
///
/// Whole-page OCR on a two-column page interleaves the columns line by line,
/// so hymnals are cut down the middle and each half is read on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnLayout {
    /// One column: the page is recognised whole.
    Single,
    /// Two columns: left half, then right half. (default)
    #[default]
    Dual,
}
