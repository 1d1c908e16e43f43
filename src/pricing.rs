//! Deck price aggregation over the catalog's marketplace prices.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::deck::DeckState;
use crate::models::Card;

/// Price of one deck entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub card_id: i64,
    pub quantity: u32,
    pub unit_price: Option<f64>,
    pub subtotal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub total: f64,
    pub leader_price: Option<f64>,
    /// Deck entries with no resolvable price; they add nothing to `total`.
    pub unpriced_count: usize,
    pub lines: Vec<PriceLine>,
}

/// Unit price of a printing: its own market price, else the market price of
/// the first visible alternate that has one.
pub fn unit_price(card: &Card) -> Option<f64> {
    card.market_price
        .or_else(|| card.visible_alternates().find_map(|a| a.market_price))
}

/// Resolve a printing id against base cards and nested alternates. An
/// unpriced alternate falls back to its base card's unit price.
pub fn resolve_price(catalog: &Catalog, card_id: i64) -> Option<f64> {
    let variant = catalog.find_variant(card_id)?;
    unit_price(variant.card).or_else(|| variant.parent.and_then(unit_price))
}

/// Leader price plus the sum of unit price × quantity over every entry.
pub fn price_deck(deck: &DeckState, catalog: &Catalog) -> PriceSummary {
    let leader_price = deck
        .leader()
        .and_then(|l| resolve_price(catalog, l.card_id));

    let mut total = leader_price.unwrap_or(0.0);
    let mut unpriced_count = 0;
    let mut lines = Vec::with_capacity(deck.cards().len());

    for entry in deck.cards() {
        let unit = resolve_price(catalog, entry.card_id);
        let subtotal = unit.map(|p| p * f64::from(entry.quantity));
        match subtotal {
            Some(s) => total += s,
            None => unpriced_count += 1,
        }
        lines.push(PriceLine {
            card_id: entry.card_id,
            quantity: entry.quantity,
            unit_price: unit,
            subtotal,
        });
    }

    PriceSummary {
        total: round_cents(total),
        leader_price,
        unpriced_count,
        lines,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
