//! DuckDB connection wrapper: user data store plus the cached catalog.
//!
//! User data (decks, game logs, lists, marketplace links) lives in DuckDB
//! tables created on open. The card catalog is not stored in DuckDB; it is
//! loaded from the [`CacheManager`] snapshot once, overlaid with the stored
//! marketplace links and shared as an [`Arc<Catalog>`].

use crate::cache::CacheManager;
use crate::catalog::Catalog;
use crate::error::{CompanionError, Result};
use crate::models::TcgplayerLink;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS decks_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS game_logs_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS user_lists_id_seq START 1;

CREATE TABLE IF NOT EXISTS decks (
    id BIGINT PRIMARY KEY DEFAULT nextval('decks_id_seq'),
    user_id BIGINT NOT NULL,
    name VARCHAR NOT NULL,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS deck_cards (
    deck_id BIGINT NOT NULL,
    seq INTEGER NOT NULL,
    is_leader BOOLEAN NOT NULL,
    card_id BIGINT NOT NULL,
    code VARCHAR NOT NULL,
    quantity INTEGER NOT NULL,
    name VARCHAR NOT NULL,
    image VARCHAR,
    category VARCHAR NOT NULL,
    cost VARCHAR,
    colors VARCHAR,
    rarity VARCHAR
);

CREATE TABLE IF NOT EXISTS game_logs (
    id BIGINT PRIMARY KEY DEFAULT nextval('game_logs_id_seq'),
    user_id BIGINT NOT NULL,
    deck_id BIGINT NOT NULL,
    opponent_leader_id BIGINT NOT NULL,
    opponent_name VARCHAR,
    is_win BOOLEAN NOT NULL,
    went_first BOOLEAN NOT NULL,
    comments VARCHAR,
    played_at VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS game_log_hand_cards (
    log_id BIGINT NOT NULL,
    seq INTEGER NOT NULL,
    card_id BIGINT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_lists (
    id BIGINT PRIMARY KEY DEFAULT nextval('user_lists_id_seq'),
    user_id BIGINT NOT NULL,
    name VARCHAR NOT NULL,
    is_ordered BOOLEAN NOT NULL,
    is_collection BOOLEAN NOT NULL,
    max_rows INTEGER NOT NULL,
    max_columns INTEGER NOT NULL,
    total_pages INTEGER NOT NULL,
    created_at VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS list_cards (
    list_id BIGINT NOT NULL,
    card_id BIGINT NOT NULL,
    quantity INTEGER NOT NULL,
    page_no INTEGER,
    row_no INTEGER,
    col_no INTEGER
);

CREATE TABLE IF NOT EXISTS tcgplayer_links (
    card_id BIGINT PRIMARY KEY,
    product_id BIGINT,
    market_price DOUBLE,
    url VARCHAR,
    missing BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at VARCHAR NOT NULL
);
";

/// Wraps a DuckDB connection and the catalog loaded through the cache.
pub struct Connection {
    conn: DuckDbConnection,
    /// The cache manager used to download/locate the catalog snapshot.
    pub cache: RefCell<CacheManager>,
    base_catalog: RefCell<Option<Arc<Catalog>>>,
    catalog: RefCell<Option<Arc<Catalog>>>,
}

impl Connection {
    /// Create a connection backed by the given cache and an in-memory database.
    pub fn new(cache: CacheManager) -> Result<Self> {
        Self::with_db(cache, DuckDbConnection::open_in_memory()?)
    }

    /// Create a connection backed by the given cache and a database file.
    pub fn open<P: AsRef<Path>>(cache: CacheManager, path: P) -> Result<Self> {
        Self::with_db(cache, DuckDbConnection::open(path)?)
    }

    fn with_db(cache: CacheManager, conn: DuckDbConnection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            base_catalog: RefCell::new(None),
            catalog: RefCell::new(None),
        })
    }

    // -- Catalog -----------------------------------------------------------

    /// The catalog with marketplace links applied, loading it on first use.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        if let Some(ref catalog) = *self.catalog.borrow() {
            return Ok(Arc::clone(catalog));
        }

        let base = self.base_catalog()?;
        let links = self.load_links()?;
        let catalog = if links.is_empty() {
            base
        } else {
            let mut overlaid = (*base).clone();
            overlaid.apply_links(&links);
            Arc::new(overlaid)
        };
        *self.catalog.borrow_mut() = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    fn base_catalog(&self) -> Result<Arc<Catalog>> {
        if let Some(ref base) = *self.base_catalog.borrow() {
            return Ok(Arc::clone(base));
        }
        let json = self.cache.borrow_mut().load_catalog_json()?;
        let base = Arc::new(Catalog::from_json(json)?);
        log::info!("Loaded catalog snapshot with {} cards", base.len());
        *self.base_catalog.borrow_mut() = Some(Arc::clone(&base));
        Ok(base)
    }

    /// Replace the catalog snapshot without going through the cache.
    pub fn set_catalog(&self, catalog: Catalog) {
        *self.base_catalog.borrow_mut() = Some(Arc::new(catalog));
        self.invalidate_catalog();
    }

    /// Drop the link overlay so the next [`catalog`](Self::catalog) call
    /// re-reads the stored links.
    pub fn invalidate_catalog(&self) {
        *self.catalog.borrow_mut() = None;
    }

    /// Forget the loaded snapshot entirely.
    pub fn reset_catalog(&self) {
        *self.base_catalog.borrow_mut() = None;
        self.invalidate_catalog();
    }

    pub fn has_catalog(&self) -> bool {
        self.base_catalog.borrow().is_some()
    }

    fn load_links(&self) -> Result<Vec<TcgplayerLink>> {
        self.execute_into(
            "SELECT card_id AS \"cardId\", product_id AS \"productId\", \
             market_price AS \"marketPrice\", url, missing \
             FROM tcgplayer_links",
            &[],
        )
    }

    // -- Query execution ---------------------------------------------------

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows_result = stmt.query(duckdb::params_from_iter(params.iter()))?;

        // Column metadata is only available after execution.
        let stmt_ref = rows_result
            .as_ref()
            .ok_or_else(|| CompanionError::InvalidArgument("query produced no statement".into()))?;
        let column_names: Vec<String> = stmt_ref
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = stmt_ref.column_count();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::new();
            for (i, col_name) in column_names.iter().enumerate().take(column_count) {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    ///
    /// Column names must match `T`'s serde field names, so camelCase models
    /// need quoted aliases (`card_id AS "cardId"`).
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(
                row.into_iter().collect::<serde_json::Map<String, serde_json::Value>>(),
            );
            let item: T = serde_json::from_value(value)?;
            results.push(item);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(duckdb::params_from_iter(params.iter()))?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Execute a statement that returns no rows; yields the affected row count.
    pub fn execute_update(&self, sql: &str, params: &[String]) -> Result<usize> {
        Ok(self.conn.execute(sql, duckdb::params_from_iter(params.iter()))?)
    }

    /// Run `f` inside a transaction, committing on success and rolling back
    /// on any error.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    log::warn!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }
}

/// Read an integer column from a row returned by [`Connection::execute`].
pub(crate) fn row_i64(row: &HashMap<String, serde_json::Value>, col: &str) -> i64 {
    row.get(col).and_then(|v| v.as_i64()).unwrap_or(0)
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // SUM over integer columns yields HUGEINT
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => serde_json::Value::Null,
    }
}
