//! Local snapshot cache for the card catalog.
//!
//! The catalog is fetched from the catalog API as JSON and stored gzip
//! compressed next to a `fetched_at.txt` timestamp. A snapshot older than
//! [`config::CATALOG_MAX_AGE_HOURS`] is refreshed on next access, unless the
//! cache is offline, in which case the stale snapshot is served as-is.

use crate::config;
use crate::error::{CompanionError, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::blocking::Client;
use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Downloads and caches the catalog snapshot.
pub struct CacheManager {
    /// Directory where cached files are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use the cached snapshot only).
    pub offline: bool,
    catalog_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl CacheManager {
    /// Create a new cache manager.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(
        cache_dir: Option<PathBuf>,
        offline: bool,
        timeout: Duration,
        catalog_url: Option<String>,
    ) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            catalog_url: catalog_url.unwrap_or_else(|| config::DEFAULT_CATALOG_URL.to_string()),
            timeout,
            client: None,
        })
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<Client> {
        if let Some(ref client) = self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(config::CATALOG_FILE)
    }

    fn fetched_at_path(&self) -> PathBuf {
        self.cache_dir.join(config::FETCHED_AT_FILE)
    }

    /// When the cached snapshot was fetched, if known.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let raw = fs::read_to_string(self.fetched_at_path()).ok()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    fn save_fetched_at(&self, at: DateTime<Utc>) {
        if let Err(e) = fs::write(self.fetched_at_path(), at.to_rfc3339()) {
            log::warn!("Could not record catalog fetch time: {}", e);
        }
    }

    /// Returns `true` if there is no snapshot, its fetch time is unknown, or
    /// it is older than the maximum age.
    pub fn is_stale(&self) -> bool {
        if !self.snapshot_path().exists() {
            return true;
        }
        match self.fetched_at() {
            None => true,
            Some(at) => Utc::now() - at > ChronoDuration::hours(config::CATALOG_MAX_AGE_HOURS),
        }
    }

    /// Download the catalog and store it gzip compressed.
    ///
    /// Writes to a temp file first and renames on success, so an interrupted
    /// download never leaves a corrupt partial snapshot behind.
    fn download_snapshot(&mut self, dest: &Path) -> Result<()> {
        log::info!("Downloading catalog from {}", self.catalog_url);
        let tmp_dest = dest.with_extension("gz.tmp");
        let client = self.client()?;
        let url = self.catalog_url.clone();

        let result = (|| -> Result<()> {
            let bytes = client.get(&url).send()?.error_for_status()?.bytes()?;
            // Reject garbage before it replaces a good snapshot.
            serde_json::from_slice::<serde_json::Value>(&bytes)?;
            let file = fs::File::create(&tmp_dest)?;
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }
        result
    }

    /// Ensure a catalog snapshot exists locally, downloading if stale.
    ///
    /// A failed refresh falls back to an existing stale snapshot.
    pub fn ensure_catalog(&mut self) -> Result<PathBuf> {
        let path = self.snapshot_path();
        if !self.is_stale() {
            return Ok(path);
        }

        if self.offline {
            if path.exists() {
                log::debug!("Offline: serving cached catalog {}", path.display());
                return Ok(path);
            }
            return Err(CompanionError::NotFound(
                "Catalog not cached and offline mode is enabled".into(),
            ));
        }

        match self.download_snapshot(&path) {
            Ok(()) => {
                self.save_fetched_at(Utc::now());
                Ok(path)
            }
            Err(e) if path.exists() => {
                log::warn!("Catalog refresh failed, using stale snapshot: {}", e);
                Ok(path)
            }
            Err(e) => Err(e),
        }
    }

    /// Load and parse the catalog snapshot.
    ///
    /// If the cached file is corrupt (truncated download, disk error),
    /// it is deleted automatically so the next call re-downloads a fresh copy.
    pub fn load_catalog_json(&mut self) -> Result<serde_json::Value> {
        let path = self.ensure_catalog()?;

        let parse_result = (|| -> Result<serde_json::Value> {
            let file = fs::File::open(&path)?;
            let mut contents = String::new();
            BufReader::new(GzDecoder::new(BufReader::new(file))).read_to_string(&mut contents)?;
            Ok(serde_json::from_str(&contents)?)
        })();

        parse_result.map_err(|e| {
            log::warn!("Corrupt cache file {}: {} -- removing", path.display(), e);
            let _ = fs::remove_file(&path);
            let _ = fs::remove_file(self.fetched_at_path());
            CompanionError::NotFound(format!(
                "Cached catalog was corrupt and has been removed. \
                 Retry to re-download. Original error: {}",
                e
            ))
        })
    }

    /// Store an already-fetched catalog document as the current snapshot.
    pub fn store_catalog_json(&self, value: &serde_json::Value) -> Result<()> {
        let path = self.snapshot_path();
        let file = fs::File::create(&path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, value)?;
        encoder.finish()?;
        self.save_fetched_at(Utc::now());
        Ok(())
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
