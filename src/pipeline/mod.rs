//! Pipeline stages for turning PDF bytes into recognized text.
//!
//! Each submodule implements one step; [`crate::acquire::TextAcquirer`]
//! drives them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf ──────────────┬──▶ text layer non-empty? done
//! (stage)   (text / raster)   │
//!                             └──▶ columns ──▶ ocr
//!                                  (split)     (tesseract)
//! ```
//!
//! 1. [`input`]   — validate the bytes and stage them in a temp file
//! 2. [`pdf`]     — embedded text, or page rasters; blocking, so the
//!    acquirer calls it from `spawn_blocking`
//! 3. [`columns`] — cut each page into left and right halves
//! 4. [`ocr`]     — recognise one image; the only stage that spawns
//!    processes

pub mod columns;
pub mod input;
pub mod ocr;
pub mod pdf;
