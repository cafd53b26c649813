//! Progress-callback trait for acquisition events.
//!
//! Inject an [`Arc<dyn AcquisitionProgressCallback>`] via
//! [`crate::config::AcquisitionConfigBuilder::progress_callback`] to hear
//! about the expensive part of acquisition: OCR, page by page.
//!
//! # Example
//!
//! ```rust
//! use hymnal_extract::{AcquisitionConfig, AcquisitionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl AcquisitionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, chars: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("OCR page {}/{} ({} chars)", page_num, total_pages, chars);
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//! let config = AcquisitionConfig::builder()
//!     .progress_callback(cb as Arc<dyn AcquisitionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::TextSource;
use std::sync::Arc;

/// Called by the acquirer as it works through a PDF.
///
/// All methods default to no-ops. Implementations must be `Send + Sync`
/// because one acquirer may serve concurrent requests.
pub trait AcquisitionProgressCallback: Send + Sync {
    /// The cache already held text for these bytes.
    fn on_cache_hit(&self, key: &str) {
        let _ = key;
    }

    /// The text layer was empty; OCR is about to start on `total_pages`.
    fn on_ocr_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// OCR is about to run on a page (1-indexed).
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Both columns of a page were recognised.
    ///
    /// `chars` is the character count of the page's recognised text.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, chars: usize) {
        let _ = (page_num, total_pages, chars);
    }

    /// Acquisition finished with text from `source`.
    fn on_acquired(&self, source: TextSource, chars: usize) {
        let _ = (source, chars);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AcquisitionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AcquisitionConfig`].
pub type ProgressCallback = Arc<dyn AcquisitionProgressCallback>;
