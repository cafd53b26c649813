//! CLI binary for hymnal-extract.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AcquisitionConfig`, picks a cache, and prints hymns.

use anyhow::{Context, Result};
use clap::Parser;
use hymnal_extract::{
    extract_hymns, AcquisitionConfig, AcquisitionProgressCallback, BlockKind, ColumnLayout,
    DiskCache, HymnRecord, NoopCache, ProgressCallback, TextAcquirer, TextCache, TextSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the cache and text layer are tried; a page bar once OCR
/// starts.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Looking for a text layer…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }
}

impl AcquisitionProgressCallback for CliProgressCallback {
    fn on_cache_hit(&self, _key: &str) {
        self.bar.println(format!("{} {}", cyan("◆"), "Recognised text found in cache"));
    }

    fn on_ocr_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("OCR");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("No text layer; running OCR on {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, chars: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(&page_num))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{chars:>5} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_acquired(&self, source: TextSource, chars: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} chars from {}",
            green("✔"),
            bold(&chars.to_string()),
            source
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # List hymns (stdout)
  hymnal himnario.pdf

  # Structured output for import
  hymnal --json himnario.pdf -o himnos.json

  # Only the recognised text, to inspect OCR quality
  hymnal --text-only himnario.pdf > himnario.txt

  # Single-column scan, English + Spanish language data
  hymnal --single-column --lang spa+eng scan.pdf

  # Force a fresh OCR run
  hymnal --no-cache himnario.pdf

ENVIRONMENT VARIABLES:
  TESSERACT_CMD      Tesseract executable (default: tesseract)
  HYMNAL_CACHE_DIR   Cache directory (default: platform cache dir)
  PDFIUM_LIB_PATH    Path to libpdfium
  RUST_LOG           Overrides the log filter

SETUP:
  Tesseract with Spanish language data is needed for scanned PDFs:
    apt install tesseract-ocr tesseract-ocr-spa
    brew install tesseract tesseract-lang
"#;

/// Extract hymns from a hymnal PDF.
#[derive(Parser, Debug)]
#[command(
    name = "hymnal",
    version,
    about = "Extract numbered hymns, stanzas and choruses from a hymnal PDF",
    long_about = "Extract hymns from a hymnal PDF. Uses the embedded text layer when present, \
otherwise rasterises each page, splits it into two columns and runs Tesseract OCR. OCR results \
are cached by the SHA-256 of the PDF bytes.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Hymnal PDF file.
    input: PathBuf,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "HYMNAL_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (hymns + stats).
    #[arg(long, env = "HYMNAL_JSON", conflicts_with = "text_only")]
    json: bool,

    /// Output the recognised text without segmenting it.
    #[arg(long)]
    text_only: bool,

    /// Rasterisation DPI for OCR (72–600).
    #[arg(long, env = "HYMNAL_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Tesseract language code(s), e.g. spa or spa+eng.
    #[arg(long, env = "HYMNAL_LANG", default_value = "spa")]
    lang: String,

    /// Tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,

    /// OCR the whole page instead of left and right halves.
    #[arg(long, env = "HYMNAL_SINGLE_COLUMN")]
    single_column: bool,

    /// Timeout for one OCR call in seconds.
    #[arg(long, env = "HYMNAL_OCR_TIMEOUT", default_value_t = 120)]
    ocr_timeout: u64,

    /// Timeout for the whole text acquisition in seconds.
    #[arg(long, env = "HYMNAL_TIMEOUT", default_value_t = 900)]
    timeout: u64,

    /// Cache directory for OCR results.
    #[arg(long, env = "HYMNAL_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Do not read or write the OCR cache.
    #[arg(long, env = "HYMNAL_NO_CACHE")]
    no_cache: bool,

    /// Lifetime of cached OCR results in seconds.
    #[arg(long, env = "HYMNAL_CACHE_TTL", default_value_t = 3600)]
    cache_ttl: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "HYMNAL_PASSWORD")]
    password: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "HYMNAL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HYMNAL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HYMNAL_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build acquirer ───────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn AcquisitionProgressCallback>);

    let config = build_config(&cli, progress_cb)?;
    let cache = build_cache(&cli);
    let acquirer = TextAcquirer::new(config, cache);

    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // ── Text only ────────────────────────────────────────────────────────
    if cli.text_only {
        let text = clear_on_error(acquirer.acquire(&bytes).await, cli_progress.as_deref())
            .context("Text acquisition failed")?;
        let mut body = text.into_string();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        return emit(&cli, &body).await;
    }

    // ── Full extraction ──────────────────────────────────────────────────
    let output = clear_on_error(extract_hymns(&acquirer, &bytes).await, cli_progress.as_deref())
        .context("Hymn extraction failed")?;

    let body = if cli.json {
        let mut json =
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        json.push('\n');
        json
    } else {
        render_hymns(&output.hymns)
    };
    emit(&cli, &body).await?;

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} hymns  {} blocks  {}ms read + {}ms parse{}",
            if stats.hymns_extracted > 0 { green("✔") } else { cyan("⚠") },
            bold(&stats.hymns_extracted.to_string()),
            stats.content_blocks,
            stats.acquire_duration_ms,
            stats.segment_duration_ms,
            cli.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
    }

    Ok(())
}

/// Stop the spinner before a failure is reported; `on_acquired` never fires
/// on the error path.
fn clear_on_error<T, E>(
    result: std::result::Result<T, E>,
    progress: Option<&CliProgressCallback>,
) -> std::result::Result<T, E> {
    if result.is_err() {
        if let Some(cb) = progress {
            cb.bar.finish_and_clear();
        }
    }
    result
}

/// Map CLI args to `AcquisitionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AcquisitionConfig> {
    let mut builder = AcquisitionConfig::builder()
        .dpi(cli.dpi)
        .ocr_language(cli.lang.clone())
        .tesseract_cmd(cli.tesseract_cmd.clone())
        .columns(if cli.single_column {
            ColumnLayout::Single
        } else {
            ColumnLayout::Dual
        })
        .ocr_timeout_secs(cli.ocr_timeout)
        .request_timeout_secs(cli.timeout)
        .cache_ttl_secs(cli.cache_ttl);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn build_cache(cli: &Cli) -> Arc<dyn TextCache> {
    if cli.no_cache {
        return Arc::new(NoopCache);
    }
    let dir = cli.cache_dir.clone().unwrap_or_else(DiskCache::default_dir);
    tracing::debug!("Using OCR cache at {}", dir.display());
    Arc::new(DiskCache::new(dir))
}

/// Plain-text listing: one heading per hymn, blocks indented below it.
fn render_hymns(hymns: &[HymnRecord]) -> String {
    let mut out = String::new();
    for hymn in hymns {
        let _ = writeln!(out, "{}. {}", hymn.number, hymn.title);
        for block in &hymn.content {
            let label = match (block.kind, block.stanza_number) {
                (BlockKind::Chorus, _) => "coro".to_string(),
                (BlockKind::Stanza, Some(n)) => n.to_string(),
                (BlockKind::Stanza, None) => String::new(),
            };
            for (i, line) in block.lines.iter().enumerate() {
                let tag = if i == 0 { label.as_str() } else { "" };
                let _ = writeln!(out, "  {:>4}  {}", tag, line);
            }
        }
        out.push('\n');
    }
    out
}

/// Write to `--output` atomically, or to stdout.
async fn emit(cli: &Cli, body: &str) -> Result<()> {
    match cli.output {
        Some(ref path) => write_atomic(path, body).await,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(body.as_bytes())
                .context("Failed to write to stdout")
        }
    }
}

async fn write_atomic(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, body)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move output into {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hymnal_extract::ExtractionError;

    #[test]
    fn failed_acquisition_clears_spinner() {
        let cb = CliProgressCallback::new();
        let result: std::result::Result<(), ExtractionError> =
            Err(ExtractionError::Internal("boom".into()));
        assert!(clear_on_error(result, Some(&*cb)).is_err());
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn successful_acquisition_leaves_spinner_to_callbacks() {
        let cb = CliProgressCallback::new();
        let result: std::result::Result<u8, ExtractionError> = Ok(1);
        assert_eq!(clear_on_error(result, Some(&*cb)).ok(), Some(1));
        assert!(!cb.bar.is_finished());
        cb.bar.finish_and_clear();

        assert!(clear_on_error::<(), _>(Err("x"), None).is_err());
    }
}
