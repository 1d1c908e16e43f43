//! One Piece TCG companion for Rust.
//!
//! Provides the catalog filter engine, deck builder state, price aggregation,
//! proxy sheet generation, and persistence for decks, game logs, user lists and
//! marketplace links. The card catalog is downloaded as a JSON snapshot, cached
//! locally and queried in memory; user data is stored in DuckDB.
//!
//! # Quick start
//!
//! ```no_run
//! use optcg_companion::Companion;
//! use optcg_companion::filter::CardFilter;
//!
//! let companion = Companion::builder().build().unwrap();
//!
//! // Leaders sharing the deck builder's filter
//! let mut filter = CardFilter::new();
//! filter.colors = vec!["Red".into()];
//! let pool = companion.cards().pool(&filter, None).unwrap();
//!
//! // Win rates
//! let stats = companion.logs().stats(1).unwrap();
//! ```

pub mod api_client;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod deck;
pub mod error;
pub mod filter;
pub mod models;
pub mod pricing;
pub mod proxy;
pub mod queries;
pub mod sql_builder;

pub use api_client::{ApiClient, GameLogPage};
#[cfg(feature = "async")]
pub use async_client::AsyncCompanion;
pub use cache::CacheManager;
pub use catalog::Catalog;
pub use connection::Connection;
pub use deck::{DeckChange, DeckState, DeckViolation};
pub use error::{CompanionError, Result};
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// CompanionBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Companion`] instance.
///
/// Use [`Companion::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CompanionBuilder::build) to create it.
#[derive(Debug, Clone)]
pub struct CompanionBuilder {
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    catalog_url: Option<String>,
    database_path: Option<PathBuf>,
}

impl Default for CompanionBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
            catalog_url: None,
            database_path: None,
        }
    }
}

impl CompanionBuilder {
    /// Set a custom cache directory.
    ///
    /// If not set, the platform-appropriate default cache directory is used
    /// (e.g. `~/.cache/optcg-companion` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline, the catalog is never downloaded and only a previously
    /// cached snapshot is used. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for catalog downloads.
    ///
    /// Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where the catalog snapshot is downloaded from.
    pub fn catalog_url(mut self, url: &str) -> Self {
        self.catalog_url = Some(url.to_string());
        self
    }

    /// Persist user data in a DuckDB file instead of memory.
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the companion, initializing the cache and the DuckDB schema.
    ///
    /// The catalog is **not** downloaded eagerly; it is fetched on first use.
    pub fn build(self) -> Result<Companion> {
        let cache = CacheManager::new(self.cache_dir, self.offline, self.timeout, self.catalog_url)?;
        let conn = match self.database_path {
            Some(path) => Connection::open(cache, path)?,
            None => Connection::new(cache)?,
        };
        Ok(Companion { conn })
    }
}

// ---------------------------------------------------------------------------
// Companion
// ---------------------------------------------------------------------------

/// The main entry point.
///
/// Wraps a [`Connection`] (which owns the [`CacheManager`], the catalog and the
/// DuckDB database) and exposes query interfaces as lightweight borrowing
/// wrappers.
pub struct Companion {
    conn: Connection,
}

impl Companion {
    /// Create a new builder.
    pub fn builder() -> CompanionBuilder {
        CompanionBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Catalog lookups and filtering, with marketplace links applied.
    pub fn cards(&self) -> queries::CardQuery<'_> {
        queries::CardQuery::new(&self.conn)
    }

    /// Saved decks.
    pub fn decks(&self) -> queries::DeckQuery<'_> {
        queries::DeckQuery::new(&self.conn)
    }

    /// Game logs and statistics.
    pub fn logs(&self) -> queries::LogQuery<'_> {
        queries::LogQuery::new(&self.conn)
    }

    pub fn lists(&self) -> queries::ListQuery<'_> {
        queries::ListQuery::new(&self.conn)
    }

    /// Marketplace link administration.
    pub fn tcgplayer(&self) -> queries::TcgplayerQuery<'_> {
        queries::TcgplayerQuery::new(&self.conn)
    }

    // -- Catalog-level operations ------------------------------------------

    /// The current catalog snapshot, loading it if needed.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        self.conn.catalog()
    }

    /// Use `catalog` instead of the cached snapshot.
    pub fn set_catalog(&self, catalog: Catalog) {
        self.conn.set_catalog(catalog);
    }

    /// Price a deck under construction against the current catalog.
    pub fn price_deck(&self, deck: &DeckState) -> Result<pricing::PriceSummary> {
        let catalog = self.conn.catalog()?;
        Ok(pricing::price_deck(deck, &catalog))
    }

    /// Proxy entries for a saved list, resolved against the current catalog.
    pub fn list_proxy_entries(&self, list: &models::UserList) -> Result<Vec<proxy::ProxyEntry>> {
        let catalog = self.conn.catalog()?;
        Ok(proxy::entries_from_list(list, &catalog))
    }

    // -- Metadata and utility methods --------------------------------------

    /// Execute a raw SQL query against the user data store.
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Reload the catalog if the cached snapshot is stale.
    ///
    /// Returns `true` if the snapshot was stale and the in-memory catalog was
    /// dropped (the next query downloads a fresh one).
    pub fn refresh(&self) -> Result<bool> {
        let stale = self.conn.cache.borrow().is_stale();
        if stale {
            self.conn.reset_catalog();
            log::info!("Catalog snapshot was stale; it will be reloaded on next use");
        }
        Ok(stale)
    }

    /// Consume the companion and release all resources.
    pub fn close(self) {
        drop(self);
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Companion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.conn.cache.borrow();
        write!(
            f,
            "Companion(cache_dir={}, catalog_loaded={}, offline={})",
            cache.cache_dir.display(),
            self.conn.has_catalog(),
            cache.offline
        )
    }
}
