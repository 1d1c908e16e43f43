//! In-memory catalog snapshot.
//!
//! The snapshot is fetched once (see [`CacheManager`](crate::cache::CacheManager))
//! and every filter, deck and pricing operation reads from it. Card ids are
//! resolved against base printings first and nested alternates second.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::models::{Card, TcgplayerLink};

/// A printing found in the catalog, with the base card it is nested under
/// when it is an alternate.
#[derive(Debug, Clone, Copy)]
pub struct VariantRef<'a> {
    pub card: &'a Card,
    pub parent: Option<&'a Card>,
}

impl<'a> VariantRef<'a> {
    /// The base printing of the logical card.
    pub fn base(&self) -> &'a Card {
        self.parent.unwrap_or(self.card)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<Card>,
}

impl Catalog {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Parse a snapshot payload.
    ///
    /// Accepts either the `{ "items": [...] }` envelope returned by
    /// `/api/cards/full` or a bare array of cards.
    pub fn from_json(value: Value) -> Result<Self> {
        let items = match value {
            Value::Object(mut map) => match map.remove("items") {
                Some(items) => items,
                None => Value::Array(Vec::new()),
            },
            other => other,
        };
        let cards: Vec<Card> = serde_json::from_value(items)?;
        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Find a printing by id among base cards and their alternates.
    pub fn find_variant(&self, id: i64) -> Option<VariantRef<'_>> {
        if let Some(card) = self.cards.iter().find(|c| c.id == id) {
            return Some(VariantRef { card, parent: None });
        }
        self.cards.iter().find_map(|parent| {
            parent
                .alternates
                .iter()
                .find(|alt| alt.id == id)
                .map(|card| VariantRef {
                    card,
                    parent: Some(parent),
                })
        })
    }

    pub fn find(&self, id: i64) -> Option<&Card> {
        self.find_variant(id).map(|v| v.card)
    }

    pub fn leaders(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cards.iter().filter(|c| c.is_leader())
    }

    /// Overlay marketplace links onto every printing they reference.
    pub fn apply_links(&mut self, links: &[TcgplayerLink]) {
        if links.is_empty() {
            return;
        }
        let by_card: HashMap<i64, &TcgplayerLink> =
            links.iter().map(|l| (l.card_id, l)).collect();
        for card in &mut self.cards {
            if let Some(link) = by_card.get(&card.id) {
                link.apply_to(card);
            }
            for alt in &mut card.alternates {
                if let Some(link) = by_card.get(&alt.id) {
                    link.apply_to(alt);
                }
            }
        }
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}
