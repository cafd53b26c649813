//! Content-addressed cache for recognized text.
//!
//! OCR of a 300-page hymnal takes minutes; re-uploading the same scan should
//! take milliseconds. Entries are keyed by the SHA-256 of the PDF bytes, so
//! identical input always maps to the same key and stale entries are
//! impossible. Expiry exists only to bound storage.
//!
//! The acquirer receives its cache as an injected `Arc<dyn TextCache>`.
//! Implementations report failures as [`CacheError`]; the acquirer logs them
//! and continues as if the cache had missed.
//!
//! | Store | Scope | Use |
//! |-------|-------|-----|
//! | [`MemoryCache`] | process, LRU-bounded | long-running services, tests |
//! | [`DiskCache`]   | machine, swept on write | the CLI, repeated batch runs |
//! | [`NoopCache`]   | none    | always recompute |

use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use lru::LruCache;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// A key/value store for recognized text with per-entry expiry.
///
/// Must be safe to share between concurrent requests. Two writers racing on
/// one key always carry the same value, so last-writer-wins is fine.
pub trait TextCache: Send + Sync {
    /// Fetch a live entry. Expired entries read as `None`.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Cache key for a PDF: `prefix` followed by its [`content_hash`].
pub fn content_key(prefix: &str, hash: &str) -> String {
    format!("{prefix}{hash}")
}

// ── No-op ────────────────────────────────────────────────────────────────

/// A cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl TextCache for NoopCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

// ── In-memory ────────────────────────────────────────────────────────────

/// Entries kept by [`MemoryCache::new`].
pub const DEFAULT_MEMORY_CAPACITY: usize = 32;

struct MemoryEntry {
    value: String,
    /// `None` when `now + ttl` overflows: effectively never expires.
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|t| now < t)
    }
}

/// Process-local LRU cache.
///
/// Holds at most `capacity` entries; inserting past that evicts the least
/// recently used one. Expired entries are dropped on lookup and swept on
/// every insert.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, MemoryEntry>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// A cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().map(|m| m.cap().get()).unwrap_or(0)
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let found = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match found {
            None => Ok(None),
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                entries.pop(key);
                debug!("Evicted expired cache entry {}", key);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: now.checked_add(ttl),
        };

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        // LruCache has no retain; collect then pop.
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| !e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            entries.pop(k);
        }
        if !expired.is_empty() {
            debug!("Swept {} expired cache entries", expired.len());
        }

        if let Some((evicted, _)) = entries.push(key.to_string(), entry) {
            if evicted != key {
                debug!("Evicted least recently used cache entry {}", evicted);
            }
        }
        Ok(())
    }
}

// ── On-disk ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct DiskEntry {
    value: String,
    /// Unix seconds.
    expires_at: u64,
}

/// One JSON file per key under a cache directory.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers never see a half-written entry. Every write first
/// sweeps expired entry files, so the directory only holds live entries
/// plus whatever expired since the last write.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform cache directory for hymnal-extract.
    ///
    /// - **macOS**: `~/Library/Caches/hymnal-extract/`
    /// - **Linux**: `~/.cache/hymnal-extract/`
    /// - **Windows**: `%LOCALAPPDATA%\hymnal-extract\`
    ///
    /// Override by setting `HYMNAL_CACHE_DIR`.
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("HYMNAL_CACHE_DIR") {
            return PathBuf::from(dir);
        }

        let base = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir);

        base.join("hymnal-extract")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Delete entry files whose expiry has passed. Returns how many went.
    ///
    /// Unreadable or corrupt files are left for `get` to report.
    pub fn sweep_expired(&self) -> Result<usize, CacheError> {
        let dir = match std::fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = unix_now();
        let mut removed = 0;
        for item in dir.flatten() {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(raw) = std::fs::read(&path) else { continue };
            let Ok(entry) = serde_json::from_slice::<DiskEntry>(&raw) else { continue };
            if now >= entry.expires_at && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Swept {} expired cache files from {}", removed, self.dir.display());
        }
        Ok(removed)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TextCache for DiskCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: DiskEntry = serde_json::from_slice(&raw)?;
        if unix_now() >= entry.expires_at {
            // Another reader may have removed it already.
            let _ = std::fs::remove_file(&path);
            debug!("Evicted expired cache file {}", path.display());
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        self.sweep_expired()?;

        let entry = DiskEntry {
            value: value.to_string(),
            expires_at: unix_now().saturating_add(ttl.as_secs()),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, &entry)?;
        tmp.flush()?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}
