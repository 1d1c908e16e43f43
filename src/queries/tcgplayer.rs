//! Marketplace (tcgplayer) links between catalog cards and products.
//!
//! Every mutation invalidates the connection's catalog overlay so the next
//! card query sees the new product, price and missing flag.

use chrono::{SecondsFormat, Utc};

use crate::connection::Connection;
use crate::error::{CompanionError, Result};
use crate::models::{Card, LinkRequest, TcgplayerLink};
use crate::sql_builder::SqlBuilder;

const LINK_COLUMNS: &[&str] = &[
    "card_id AS \"cardId\"",
    "product_id AS \"productId\"",
    "market_price AS \"marketPrice\"",
    "url",
    "missing",
];

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// TcgplayerQuery
// ---------------------------------------------------------------------------

/// Admin interface for marketplace links.
pub struct TcgplayerQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TcgplayerQuery<'a> {
    /// Create a new `TcgplayerQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, card_id: i64) -> Result<Option<TcgplayerLink>> {
        let (sql, params) = SqlBuilder::new("tcgplayer_links")
            .select(LINK_COLUMNS)
            .where_id("card_id", card_id)
            .build();
        let mut rows: Vec<TcgplayerLink> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.pop())
    }

    pub fn all(&self) -> Result<Vec<TcgplayerLink>> {
        let (sql, params) = SqlBuilder::new("tcgplayer_links")
            .select(LINK_COLUMNS)
            .order_by(&["card_id"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Link a printing to a marketplace product. Clears the missing flag.
    pub fn link(&self, card_id: i64, request: &LinkRequest) -> Result<Card> {
        self.require_card(card_id)?;
        if let Some(price) = request.market_price {
            if !price.is_finite() || price < 0.0 {
                return Err(CompanionError::InvalidArgument(format!(
                    "Invalid market price {}",
                    price
                )));
            }
        }

        self.conn.execute_update(
            "INSERT INTO tcgplayer_links (card_id, product_id, market_price, url, missing, updated_at) \
             VALUES (CAST(? AS BIGINT), CAST(? AS BIGINT), CAST(NULLIF(?, '') AS DOUBLE), NULLIF(?, ''), FALSE, ?) \
             ON CONFLICT (card_id) DO UPDATE SET \
                product_id = excluded.product_id, \
                market_price = excluded.market_price, \
                url = excluded.url, \
                missing = FALSE, \
                updated_at = excluded.updated_at",
            &[
                card_id.to_string(),
                request.product_id.to_string(),
                request
                    .market_price
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                request.url.clone().unwrap_or_default(),
                now(),
            ],
        )?;
        log::info!("Linked card {} to product {}", card_id, request.product_id);
        self.refreshed_card(card_id)
    }

    /// Remove a card's product link. The missing flag is kept.
    pub fn unlink(&self, card_id: i64) -> Result<Card> {
        self.require_card(card_id)?;
        self.conn.execute_update(
            "UPDATE tcgplayer_links SET product_id = NULL, market_price = NULL, url = NULL, updated_at = ? \
             WHERE card_id = CAST(? AS BIGINT)",
            &[now(), card_id.to_string()],
        )?;
        self.conn.execute_update(
            "DELETE FROM tcgplayer_links WHERE card_id = CAST(? AS BIGINT) AND NOT missing",
            &[card_id.to_string()],
        )?;
        log::info!("Unlinked card {}", card_id);
        self.refreshed_card(card_id)
    }

    /// Flag a card as having no marketplace product. Any link is dropped.
    pub fn mark_missing(&self, card_id: i64) -> Result<Card> {
        self.require_card(card_id)?;
        self.conn.execute_update(
            "INSERT INTO tcgplayer_links (card_id, product_id, market_price, url, missing, updated_at) \
             VALUES (CAST(? AS BIGINT), NULL, NULL, NULL, TRUE, ?) \
             ON CONFLICT (card_id) DO UPDATE SET \
                product_id = NULL, market_price = NULL, url = NULL, \
                missing = TRUE, updated_at = excluded.updated_at",
            &[card_id.to_string(), now()],
        )?;
        log::info!("Marked card {} as missing from the marketplace", card_id);
        self.refreshed_card(card_id)
    }

    pub fn unmark_missing(&self, card_id: i64) -> Result<Card> {
        self.require_card(card_id)?;
        self.conn.execute_update(
            "DELETE FROM tcgplayer_links \
             WHERE card_id = CAST(? AS BIGINT) AND missing AND product_id IS NULL",
            &[card_id.to_string()],
        )?;
        self.conn.execute_update(
            "UPDATE tcgplayer_links SET missing = FALSE, updated_at = ? WHERE card_id = CAST(? AS BIGINT)",
            &[now(), card_id.to_string()],
        )?;
        self.refreshed_card(card_id)
    }

    /// Printings (base and alternates) with neither a product link nor the
    /// missing flag, in catalog order.
    pub fn unlinked(&self) -> Result<Vec<Card>> {
        let catalog = self.conn.catalog()?;
        Ok(catalog
            .cards()
            .iter()
            .flat_map(|c| std::iter::once(c).chain(c.alternates.iter()))
            .filter(|c| c.tcgplayer_product_id.is_none() && !c.tcgplayer_missing)
            .map(|c| {
                let mut card = c.clone();
                card.alternates.clear();
                card
            })
            .collect())
    }

    fn require_card(&self, card_id: i64) -> Result<()> {
        let catalog = self.conn.catalog()?;
        if catalog.find(card_id).is_none() {
            return Err(CompanionError::NotFound(format!("Card {} not found", card_id)));
        }
        Ok(())
    }

    fn refreshed_card(&self, card_id: i64) -> Result<Card> {
        self.conn.invalidate_catalog();
        let catalog = self.conn.catalog()?;
        catalog
            .find(card_id)
            .cloned()
            .ok_or_else(|| CompanionError::NotFound(format!("Card {} not found", card_id)))
    }
}
