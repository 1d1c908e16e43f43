//! Deck composition state.
//!
//! All mutations go through [`DeckState::check_capacity`], the single guard for
//! the 50-card total and the 4-copies-per-code limit. Rejected mutations leave
//! the state untouched and report a [`DeckViolation`] suitable for a warning
//! notification.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::config;
use crate::models::{Card, Category, Deck, DeckCard};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckViolation {
    #[error("A deck cannot hold more than {limit} cards")]
    DeckFull { limit: u32 },

    #[error("A deck cannot hold more than {limit} copies of {code}")]
    CopyLimit { code: String, limit: u32 },

    #[error("Leader cards cannot be added to the main deck")]
    LeaderInMainDeck,

    #[error("Card {card_id} is not a leader")]
    NotALeader { card_id: i64 },

    #[error("Card {card_id} is not in the deck or catalog")]
    UnknownCard { card_id: i64 },

    #[error("Card {card_id} has invalid quantity {quantity}")]
    InvalidQuantity { card_id: i64, quantity: u32 },

    #[error("A deck needs a leader before it can be saved")]
    MissingLeader,

    #[error("A deck needs a name before it can be saved")]
    MissingName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckChange {
    LeaderSet { card_id: i64, previous: Option<i64> },
    Added { card_id: i64, quantity: u32 },
    QuantityChanged { card_id: i64, quantity: u32 },
    Removed { card_id: i64 },
    Cleared,
}

pub type DeckResult = std::result::Result<DeckChange, DeckViolation>;

// ---------------------------------------------------------------------------
// DeckGroup: Display grouping by code
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DeckGroup<'a> {
    pub code: &'a str,
    pub quantity: u32,
    pub cards: Vec<&'a DeckCard>,
}

impl<'a> DeckGroup<'a> {
    /// The first printing added for this code.
    pub fn representative(&self) -> &'a DeckCard {
        self.cards[0]
    }
}

// ---------------------------------------------------------------------------
// DeckState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckState {
    pub name: String,
    leader: Option<DeckCard>,
    cards: Vec<DeckCard>,
}

impl DeckState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild editable state from a saved deck.
    pub fn from_deck(deck: &Deck) -> Self {
        Self {
            name: deck.name.clone(),
            leader: deck.leader.clone(),
            cards: deck.cards.clone(),
        }
    }

    /// Rebuild a deck from catalog printings, replaying every entry through
    /// [`set_leader`](Self::set_leader) and [`add_card`](Self::add_card).
    ///
    /// Only ids and quantities are taken from `deck`; code, category and the
    /// other denormalized fields come from the catalog. Alternates count
    /// against their base card's code.
    pub fn from_catalog(deck: &Deck, catalog: &Catalog) -> Result<Self, DeckViolation> {
        let mut state = Self {
            name: deck.name.clone(),
            ..Self::default()
        };
        if let Some(leader) = deck.leader.as_ref() {
            state.set_leader(&catalog_printing(catalog, leader.card_id)?)?;
        }
        for entry in &deck.cards {
            if entry.quantity == 0 || entry.quantity > config::MAX_COPIES_PER_CODE {
                return Err(DeckViolation::InvalidQuantity {
                    card_id: entry.card_id,
                    quantity: entry.quantity,
                });
            }
            let card = catalog_printing(catalog, entry.card_id)?;
            for _ in 0..entry.quantity {
                state.add_card(&card)?;
            }
        }
        Ok(state)
    }

    pub fn leader(&self) -> Option<&DeckCard> {
        self.leader.as_ref()
    }

    pub fn cards(&self) -> &[DeckCard] {
        &self.cards
    }

    pub fn total(&self) -> u32 {
        self.cards.iter().map(|c| c.quantity).sum()
    }

    /// Copies of every printing sharing `code`.
    pub fn code_total(&self, code: &str) -> u32 {
        self.cards
            .iter()
            .filter(|c| c.code == code)
            .map(|c| c.quantity)
            .sum()
    }

    pub fn quantity_of(&self, card_id: i64) -> u32 {
        self.cards
            .iter()
            .find(|c| c.card_id == card_id)
            .map(|c| c.quantity)
            .unwrap_or(0)
    }

    /// Guard shared by every mutation that adds `extra` copies of `code`.
    pub fn check_capacity(&self, code: &str, extra: u32) -> Result<(), DeckViolation> {
        if extra == 0 {
            return Ok(());
        }
        if self.total() + extra > config::DECK_SIZE {
            return Err(DeckViolation::DeckFull {
                limit: config::DECK_SIZE,
            });
        }
        if self.code_total(code) + extra > config::MAX_COPIES_PER_CODE {
            return Err(DeckViolation::CopyLimit {
                code: code.to_string(),
                limit: config::MAX_COPIES_PER_CODE,
            });
        }
        Ok(())
    }

    // -- Mutations ---------------------------------------------------------

    /// Replace the leader. Cards already in the deck are kept even when they no
    /// longer share a color; see [`incompatible_cards`](Self::incompatible_cards).
    pub fn set_leader(&mut self, card: &Card) -> DeckResult {
        if !card.is_leader() {
            return Err(DeckViolation::NotALeader { card_id: card.id });
        }
        let previous = self.leader.replace(DeckCard::from_card(card, 1));
        Ok(DeckChange::LeaderSet {
            card_id: card.id,
            previous: previous.map(|p| p.card_id),
        })
    }

    /// Add one copy of a printing, creating its entry or incrementing it.
    pub fn add_card(&mut self, card: &Card) -> DeckResult {
        if card.is_leader() {
            return Err(DeckViolation::LeaderInMainDeck);
        }
        self.check_capacity(&card.code, 1)?;

        let quantity = match self.cards.iter_mut().find(|c| c.card_id == card.id) {
            Some(entry) => {
                entry.quantity += 1;
                entry.quantity
            }
            None => {
                self.cards.push(DeckCard::from_card(card, 1));
                1
            }
        };
        Ok(DeckChange::Added {
            card_id: card.id,
            quantity,
        })
    }

    /// Add one copy of the printing with `card_id`, looked up in the catalog
    /// (base cards and alternates).
    pub fn add_from_catalog(&mut self, catalog: &Catalog, card_id: i64) -> DeckResult {
        let card = catalog
            .find(card_id)
            .ok_or(DeckViolation::UnknownCard { card_id })?;
        self.add_card(card)
    }

    /// Set the quantity of an entry. Values at or below zero remove it;
    /// increases are checked against the deck and per-code limits.
    pub fn update_quantity(&mut self, card_id: i64, quantity: i64) -> DeckResult {
        let index = self
            .cards
            .iter()
            .position(|c| c.card_id == card_id)
            .ok_or(DeckViolation::UnknownCard { card_id })?;

        if quantity <= 0 {
            self.cards.remove(index);
            return Ok(DeckChange::Removed { card_id });
        }

        let target = u32::try_from(quantity).unwrap_or(u32::MAX);
        let current = self.cards[index].quantity;
        if target > current {
            let code = self.cards[index].code.clone();
            self.check_capacity(&code, target - current)?;
        }
        self.cards[index].quantity = target;
        Ok(DeckChange::QuantityChanged {
            card_id,
            quantity: target,
        })
    }

    pub fn remove_card(&mut self, card_id: i64) -> DeckResult {
        let before = self.cards.len();
        self.cards.retain(|c| c.card_id != card_id);
        if self.cards.len() == before {
            return Err(DeckViolation::UnknownCard { card_id });
        }
        Ok(DeckChange::Removed { card_id })
    }

    /// Empty the deck and unset the leader.
    pub fn clear(&mut self) -> DeckChange {
        self.cards.clear();
        self.leader = None;
        DeckChange::Cleared
    }

    // -- Derived views -----------------------------------------------------

    /// Entries sharing no color with the current leader.
    pub fn incompatible_cards(&self) -> Vec<&DeckCard> {
        let Some(leader) = self.leader.as_ref() else {
            return Vec::new();
        };
        self.cards
            .iter()
            .filter(|c| {
                !c.colors
                    .iter()
                    .any(|color| leader.colors.iter().any(|l| l.eq_ignore_ascii_case(color)))
            })
            .collect()
    }

    /// Entries grouped by code. Groups are ordered by ascending numeric cost,
    /// except Event and Stage groups which always come last.
    pub fn grouped(&self) -> Vec<DeckGroup<'_>> {
        let mut order: Vec<&str> = Vec::new();
        let mut by_code: HashMap<&str, Vec<&DeckCard>> = HashMap::new();
        for card in &self.cards {
            let entry = by_code.entry(card.code.as_str()).or_default();
            if entry.is_empty() {
                order.push(card.code.as_str());
            }
            entry.push(card);
        }

        let mut groups: Vec<DeckGroup<'_>> = order
            .into_iter()
            .filter_map(|code| by_code.remove(code).map(|cards| (code, cards)))
            .map(|(code, cards)| DeckGroup {
                code,
                quantity: cards.iter().map(|c| c.quantity).sum(),
                cards,
            })
            .collect();

        groups.sort_by_key(|g| {
            let rep = g.representative();
            (
                rep.category.sorts_last(),
                rep.numeric_cost().unwrap_or(i64::MAX),
            )
        });
        groups
    }

    /// Check the rules a deck must satisfy before it is persisted.
    pub fn validate_for_save(&self) -> Result<(), DeckViolation> {
        if self.name.trim().is_empty() {
            return Err(DeckViolation::MissingName);
        }
        if self.leader.is_none() {
            return Err(DeckViolation::MissingLeader);
        }
        if self.total() > config::DECK_SIZE {
            return Err(DeckViolation::DeckFull {
                limit: config::DECK_SIZE,
            });
        }
        if let Some(card) = self
            .cards
            .iter()
            .find(|c| self.code_total(&c.code) > config::MAX_COPIES_PER_CODE)
        {
            return Err(DeckViolation::CopyLimit {
                code: card.code.clone(),
                limit: config::MAX_COPIES_PER_CODE,
            });
        }
        if self.cards.iter().any(|c| c.category == Category::Leader) {
            return Err(DeckViolation::LeaderInMainDeck);
        }
        Ok(())
    }

    /// Snapshot as a [`Deck`] ready to be saved for `user_id`.
    pub fn to_deck(&self, user_id: i64, id: Option<i64>) -> Deck {
        Deck {
            id,
            user_id,
            name: self.name.trim().to_string(),
            leader: self.leader.clone(),
            cards: self.cards.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// A printing with its base card's code and category.
fn catalog_printing(catalog: &Catalog, card_id: i64) -> Result<Card, DeckViolation> {
    let variant = catalog
        .find_variant(card_id)
        .ok_or(DeckViolation::UnknownCard { card_id })?;
    let base = variant.base();
    let mut card = variant.card.clone();
    card.alternates.clear();
    card.code = base.code.clone();
    card.category = base.category;
    if card.colors.is_empty() {
        card.colors = base.colors.clone();
    }
    Ok(card)
}
