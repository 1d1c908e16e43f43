use std::path::PathBuf;

/// Default location of the catalog snapshot export.
pub const DEFAULT_CATALOG_URL: &str =
    "http://localhost:3000/api/cards/full?includeRelations=true&includeAlternates=true&limit=5000";

/// File name of the gzip-compressed catalog snapshot inside the cache dir.
pub const CATALOG_FILE: &str = "catalog.json.gz";

/// File holding the RFC 3339 timestamp of the last successful snapshot fetch.
pub const FETCHED_AT_FILE: &str = "fetched_at.txt";

/// How long a cached snapshot is considered fresh.
pub const CATALOG_MAX_AGE_HOURS: i64 = 24;

// -- Deck rules ----------------------------------------------------------------

pub const DECK_SIZE: u32 = 50;
pub const MAX_COPIES_PER_CODE: u32 = 4;

// -- Catalog endpoint ----------------------------------------------------------

pub const FULL_CARDS_DEFAULT_LIMIT: usize = 1000;
pub const FULL_CARDS_MAX_LIMIT: usize = 5000;

/// Sentinel filter values selecting cards that have no counter / no trigger.
pub const NO_COUNTER: &str = "No counter";
pub const NO_TRIGGER: &str = "No trigger";

/// Alternate print kinds that are cosmetic reprints and never shown as alternates.
pub const EXCLUDED_ALTERNATE_VARIANTS: &[&str] = &["Reprint", "Pre-Release", "Demo Version"];

// -- Proxy sheets ----------------------------------------------------------------

pub const PROXY_COLUMNS: usize = 3;
pub const PROXY_ROWS: usize = 3;
pub const PROXY_CARDS_PER_PAGE: usize = PROXY_COLUMNS * PROXY_ROWS;

/// Most physical copies one proxy document may hold (100 pages).
pub const MAX_PROXY_CARDS: usize = 100 * PROXY_CARDS_PER_PAGE;

/// A4 portrait, millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Standard card size, millimetres.
pub const CARD_WIDTH_MM: f64 = 63.0;
pub const CARD_HEIGHT_MM: f64 = 88.0;

/// Raster resolution used when embedding card images.
pub const PROXY_DPI: f64 = 300.0;

/// Image hosts that must be fetched through the same-origin image proxy.
pub const PROXIED_IMAGE_HOSTS: &[&str] = &[
    "en.onepiece-cardgame.com",
    "asia-en.onepiece-cardgame.com",
    "tcgplayer-cdn.tcgplayer.com",
    "product-images.tcgplayer.com",
    "limitlesstcg.nyc3.cdn.digitaloceanspaces.com",
];

/// Path of the same-origin image proxy endpoint.
pub const IMAGE_PROXY_PATH: &str = "/api/proxy-image";

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("optcg-companion")
    } else {
        PathBuf::from(".optcg-companion-cache")
    }
}
