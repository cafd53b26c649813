//! End-to-end integration tests for hymnal-extract.
//!
//! These tests use real hymnal PDFs in `./test_cases/`, a real pdfium
//! library and a real `tesseract` with Spanish language data. They are gated
//! behind the `HYMNAL_E2E` environment variable so they do not run in CI
//! unless explicitly requested.
//!
//! Run with:
//!   HYMNAL_E2E=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture
//!
//! Expected files:
//!   test_cases/himnario_escaneado.pdf   two-column scan, no text layer
//!   test_cases/himnario_digital.pdf     same hymnal with an embedded text layer

use hymnal_extract::{
    extract_hymns, extract_hymns_from_file, AcquisitionConfig, DiskCache, ExtractionError,
    HymnRecord, MemoryCache, NoopCache, TextAcquirer, TextSource,
};
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Route library logs to the test output; `RUST_LOG=hymnal_extract=debug`
/// shows per-page OCR detail.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Skip this test if HYMNAL_E2E is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("HYMNAL_E2E").is_err() {
            println!("SKIP — set HYMNAL_E2E=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Structural checks every extracted hymnal must pass.
fn assert_hymnal_quality(hymns: &[HymnRecord], context: &str) {
    assert!(!hymns.is_empty(), "[{context}] No hymns extracted");

    for hymn in hymns {
        assert!(hymn.number > 0, "[{context}] Hymn with number 0");
        assert!(
            hymn.title.chars().count() >= 5,
            "[{context}] Hymn {} has a short title: {:?}",
            hymn.number,
            hymn.title
        );
        assert_eq!(
            hymn.title,
            hymn.title.to_lowercase(),
            "[{context}] Title not lower-cased"
        );
        for block in &hymn.content {
            assert!(
                !block.lines.is_empty(),
                "[{context}] Empty block in hymn {}",
                hymn.number
            );
            assert!(
                block.lines.iter().all(|l| !l.to_uppercase().starts_with("CORO")),
                "[{context}] Chorus marker leaked into hymn {}",
                hymn.number
            );
        }
    }

    println!("[{context}] ✓  {} hymns, quality checks passed", hymns.len());
}

// ── Scanned hymnal (OCR) ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_scanned_hymnal_via_ocr() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("himnario_escaneado.pdf"));
    init_tracing();

    let acquirer = TextAcquirer::new(AcquisitionConfig::default(), Arc::new(NoopCache));
    let output = extract_hymns_from_file(&acquirer, &path)
        .await
        .expect("extraction should succeed");

    assert_eq!(output.stats.source, Some(TextSource::Ocr));
    assert_hymnal_quality(&output.hymns, "scanned");

    let accented = output
        .hymns
        .iter()
        .flat_map(|h| h.content.iter())
        .flat_map(|b| b.lines.iter())
        .any(|l| l.chars().any(|c| "áéíóúñ".contains(c)));
    assert!(accented, "Spanish OCR should recover accented characters");
}

#[tokio::test]
async fn test_scanned_hymnal_second_run_hits_disk_cache() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("himnario_escaneado.pdf"));
    let cache_dir = tempfile::TempDir::new().expect("temp dir");
    init_tracing();

    let acquirer = TextAcquirer::new(
        AcquisitionConfig::default(),
        Arc::new(DiskCache::new(cache_dir.path())),
    );
    let bytes = std::fs::read(&path).expect("read test PDF");

    let first = extract_hymns(&acquirer, &bytes).await.expect("first run");
    let second = extract_hymns(&acquirer, &bytes).await.expect("second run");

    assert_eq!(first.stats.source, Some(TextSource::Ocr));
    assert_eq!(second.stats.source, Some(TextSource::Cache));
    assert_eq!(first.hymns, second.hymns);
    assert!(second.stats.acquire_duration_ms < first.stats.acquire_duration_ms);
}

// ── Digital hymnal (text layer) ──────────────────────────────────────────────

#[tokio::test]
async fn test_digital_hymnal_uses_text_layer() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("himnario_digital.pdf"));

    let cache = Arc::new(MemoryCache::new());
    let acquirer = TextAcquirer::new(AcquisitionConfig::default(), cache.clone());
    let output = extract_hymns_from_file(&acquirer, &path)
        .await
        .expect("extraction should succeed");

    assert_eq!(output.stats.source, Some(TextSource::TextLayer));
    assert!(cache.is_empty(), "text-layer results are not cached");
    assert_hymnal_quality(&output.hymns, "digital");
}

#[tokio::test]
async fn test_output_is_json_serialisable() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("himnario_digital.pdf"));

    let acquirer = TextAcquirer::new(AcquisitionConfig::default(), Arc::new(NoopCache));
    let output = extract_hymns_from_file(&acquirer, &path)
        .await
        .expect("extraction should succeed");

    let json = serde_json::to_string(&output).expect("serialise");
    assert!(json.contains("\"hymns\""));
    assert!(json.contains("\"stats\""));
}

// ── Failure modes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_file() {
    if std::env::var("HYMNAL_E2E").is_err() {
        println!("SKIP");
        return;
    }

    let acquirer = TextAcquirer::new(AcquisitionConfig::default(), Arc::new(NoopCache));
    let err = extract_hymns_from_file(&acquirer, "/definitely/not/a/real/himnario.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_missing_tesseract_is_reported() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("himnario_escaneado.pdf"));

    let config = AcquisitionConfig::builder()
        .tesseract_cmd("/nonexistent/tesseract")
        .build()
        .expect("valid config");
    let acquirer = TextAcquirer::new(config, Arc::new(NoopCache));
    let err = extract_hymns_from_file(&acquirer, &path).await.unwrap_err();
    assert!(
        matches!(err, ExtractionError::OcrUnavailable { .. }),
        "got {err:?}"
    );
}
