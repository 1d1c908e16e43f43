//! Proxy sheet generation.
//!
//! A quantity-keyed card collection is expanded into one entry per physical
//! copy, tiled into 3×3 pages and rendered into a printable PDF. Card images
//! are loaded concurrently before any page is assembled; a card whose image
//! cannot be loaded is printed as a text placeholder instead.

pub mod images;
pub mod layout;
pub mod pdf;
pub mod sheet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config;
use crate::deck::DeckState;
use crate::error::{CompanionError, Result};
use crate::models::{Card, DeckCard, UserList};

pub use images::{resolve_image_url, CellImage, ImageLoader};
pub use pdf::{PdfDocument, PdfPage};
pub use sheet::ProxySheet;

// ---------------------------------------------------------------------------
// ProxyEntry / ProxyCard
// ---------------------------------------------------------------------------

/// One line of a quantity-keyed collection to print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEntry {
    pub id: i64,
    pub quantity: u32,
    pub name: String,
    pub code: String,
    pub image: Option<String>,
}

impl ProxyEntry {
    pub fn from_card(card: &Card, quantity: u32) -> Self {
        Self {
            id: card.id,
            quantity,
            name: card.name.clone(),
            code: card.code.clone(),
            image: card.image.clone(),
        }
    }
}

impl From<&DeckCard> for ProxyEntry {
    fn from(card: &DeckCard) -> Self {
        Self {
            id: card.card_id,
            quantity: card.quantity,
            name: card.name.clone(),
            code: card.code.clone(),
            image: card.image.clone(),
        }
    }
}

/// One physical copy on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyCard {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub image: Option<String>,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Entries for a deck: the leader (when asked for) followed by the main deck.
pub fn entries_from_deck(deck: &DeckState, include_leader: bool) -> Vec<ProxyEntry> {
    let leader = deck
        .leader()
        .filter(|_| include_leader)
        .map(ProxyEntry::from);
    leader
        .into_iter()
        .chain(deck.cards().iter().map(ProxyEntry::from))
        .collect()
}

/// Entries for a user list. Cards missing from the catalog are skipped.
pub fn entries_from_list(list: &UserList, catalog: &Catalog) -> Vec<ProxyEntry> {
    list.cards
        .iter()
        .filter(|lc| lc.quantity > 0)
        .filter_map(|lc| {
            let card = catalog.find(lc.card_id);
            if card.is_none() {
                log::warn!("List {} references unknown card {}", list.id, lc.card_id);
            }
            card.map(|c| ProxyEntry::from_card(c, lc.quantity as u32))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Expansion and tiling
// ---------------------------------------------------------------------------

/// Repeat each entry `quantity` times, preserving order.
///
/// Fails with [`CompanionError::NothingToPrint`] when the result is empty and
/// with `InvalidArgument` when it would exceed [`config::MAX_PROXY_CARDS`].
pub fn expand(entries: &[ProxyEntry]) -> Result<Vec<ProxyCard>> {
    let total: u64 = entries.iter().map(|e| u64::from(e.quantity)).sum();
    if total > config::MAX_PROXY_CARDS as u64 {
        return Err(CompanionError::InvalidArgument(format!(
            "Cannot print {} proxies; the limit is {}",
            total,
            config::MAX_PROXY_CARDS
        )));
    }

    let cards: Vec<ProxyCard> = entries
        .iter()
        .flat_map(|e| {
            let card = ProxyCard {
                id: e.id,
                name: e.name.clone(),
                code: e.code.clone(),
                image: e.image.clone(),
            };
            std::iter::repeat(card).take(e.quantity as usize)
        })
        .collect();

    if cards.is_empty() {
        return Err(CompanionError::NothingToPrint);
    }
    Ok(cards)
}

/// Split expanded cards into pages of [`layout::CARDS_PER_PAGE`].
pub fn paginate(cards: &[ProxyCard]) -> Vec<&[ProxyCard]> {
    cards.chunks(layout::CARDS_PER_PAGE).collect()
}
