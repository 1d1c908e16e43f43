//! Async wrapper around [`Companion`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all companion operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use optcg_companion::AsyncCompanion;
//!
//! #[tokio::main]
//! async fn main() {
//!     let companion = AsyncCompanion::builder().build().await.unwrap();
//!
//!     // Run any sync method via closure
//!     let leaders = companion.run(|c| c.cards().leaders()).await.unwrap();
//!
//!     // Convenience method for raw SQL
//!     let rows = companion.sql("SELECT COUNT(*) FROM game_logs", &[]).await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Catalog;
use crate::error::{CompanionError, Result};
use crate::proxy::{entries_from_list, ImageLoader, PdfDocument, ProxySheet};
use crate::Companion;

// ---------------------------------------------------------------------------
// AsyncCompanionBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCompanion`] instance.
#[derive(Debug, Clone)]
pub struct AsyncCompanionBuilder {
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    catalog_url: Option<String>,
    database_path: Option<PathBuf>,
}

impl Default for AsyncCompanionBuilder {
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

impl AsyncCompanionBuilder {
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog_url(mut self, url: &str) -> Self {
        self.catalog_url = Some(url.to_string());
        self
    }

    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the async companion on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncCompanion> {
        tokio::task::spawn_blocking(move || {
            let mut builder = Companion::builder()
                .offline(self.offline)
                .timeout(self.timeout);
            if let Some(dir) = self.cache_dir {
                builder = builder.cache_dir(dir);
            }
            if let Some(url) = self.catalog_url {
                builder = builder.catalog_url(&url);
            }
            if let Some(path) = self.database_path {
                builder = builder.database_path(path);
            }
            Ok(AsyncCompanion::from_sync(builder.build()?))
        })
        .await
        .map_err(|e| CompanionError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCompanion
// ---------------------------------------------------------------------------

/// Async wrapper around [`Companion`].
///
/// The underlying [`Companion`] is protected by a [`Mutex`] since it uses
/// `RefCell` internally. Cloning is cheap and shares the same instance.
#[derive(Clone)]
pub struct AsyncCompanion {
    inner: Arc<Mutex<Companion>>,
}

impl AsyncCompanion {
    pub fn builder() -> AsyncCompanionBuilder {
        AsyncCompanionBuilder::default()
    }

    /// Wrap an already-built companion.
    pub fn from_sync(companion: Companion) -> Self {
        Self {
            inner: Arc::new(Mutex::new(companion)),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    ///
    /// The closure receives a `&Companion` and returns a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Companion) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let companion = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = companion
                .lock()
                .map_err(|_| CompanionError::InvalidArgument("Companion lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| CompanionError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |c| c.sql(&query, &params)).await
    }

    /// The current catalog snapshot.
    pub async fn catalog(&self) -> Result<Arc<Catalog>> {
        self.run(|c| c.catalog()).await
    }

    pub async fn refresh(&self) -> Result<bool> {
        self.run(|c| c.refresh()).await
    }

    /// Render a user's list as a proxy sheet.
    ///
    /// The list is resolved on the blocking pool; images load and pages
    /// render on the async runtime.
    pub async fn list_proxy_sheet(
        &self,
        user_id: i64,
        list_id: i64,
        loader: &ImageLoader,
    ) -> Result<PdfDocument> {
        let entries = self
            .run(move |c| {
                let list = c.lists().get(user_id, list_id)?.ok_or_else(|| {
                    CompanionError::NotFound(format!("List {} not found", list_id))
                })?;
                let catalog = c.catalog()?;
                Ok(entries_from_list(&list, &catalog))
            })
            .await?;
        ProxySheet::new(&entries)?.render(loader).await
    }
}
