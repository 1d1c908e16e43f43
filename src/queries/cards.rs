//! Card queries against the cached catalog snapshot.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::connection::Connection;
use crate::error::{CompanionError, Result};
use crate::filter::CardFilter;
use crate::models::{Card, Category};

// ---------------------------------------------------------------------------
// FullCardsParams
// ---------------------------------------------------------------------------

/// Query string of `GET /api/cards/full`.
///
/// Multi-select dimensions are comma-separated. Flags are the strings
/// `"true"` / `"false"`; anything other than `"true"` counts as false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FullCardsParams {
    pub search: Option<String>,
    pub colors: Option<String>,
    pub rarities: Option<String>,
    pub categories: Option<String>,
    pub costs: Option<String>,
    pub powers: Option<String>,
    pub attributes: Option<String>,
    pub counters: Option<String>,
    pub triggers: Option<String>,
    pub sets: Option<String>,
    pub set_code: Option<String>,
    pub alternate_arts: Option<String>,
    pub effects: Option<String>,
    pub families: Option<String>,
    pub limit: Option<String>,
    pub include_relations: Option<String>,
    pub include_alternates: Option<String>,
    pub include_counts: Option<String>,
}

fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

impl FullCardsParams {
    /// Build the filter these parameters describe. Unknown category names
    /// are ignored.
    pub fn to_filter(&self) -> CardFilter {
        CardFilter {
            search: non_blank(&self.search),
            colors: split_list(&self.colors),
            rarities: split_list(&self.rarities),
            categories: split_list(&self.categories)
                .iter()
                .filter_map(|c| Category::parse(c))
                .collect(),
            costs: split_list(&self.costs),
            powers: split_list(&self.powers),
            attributes: split_list(&self.attributes),
            counters: split_list(&self.counters),
            triggers: split_list(&self.triggers),
            sets: split_list(&self.sets),
            set_code: non_blank(&self.set_code),
            alternate_arts: split_list(&self.alternate_arts),
            effects: split_list(&self.effects),
            families: split_list(&self.families),
        }
    }

    /// Requested limit clamped to `1..=5000`. Missing or unparsable values
    /// fall back to the default.
    pub fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .map(|l| l.clamp(1, config::FULL_CARDS_MAX_LIMIT as i64) as usize)
            .unwrap_or(config::FULL_CARDS_DEFAULT_LIMIT)
    }

    pub fn include_relations(&self) -> bool {
        flag(&self.include_relations)
    }

    pub fn include_alternates(&self) -> bool {
        flag(&self.include_alternates)
    }

    pub fn include_counts(&self) -> bool {
        flag(&self.include_counts)
    }
}

/// Body of `GET /api/cards/full`.
///
/// `count` is the number of matches before the limit when counts were
/// requested, otherwise the number of items returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPage {
    pub items: Vec<Card>,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// CardQuery
// ---------------------------------------------------------------------------

/// Query interface over the catalog snapshot, with marketplace links applied.
pub struct CardQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CardQuery<'a> {
    /// Create a new `CardQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // -- Single card lookup ------------------------------------------------

    /// Retrieve a printing by id, searching base cards then alternates.
    pub fn get(&self, id: i64) -> Result<Option<Card>> {
        let catalog = self.conn.catalog()?;
        Ok(catalog.find(id).cloned())
    }

    /// Like [`get`](Self::get) but fails with `NotFound` when absent.
    pub fn require(&self, id: i64) -> Result<Card> {
        self.get(id)?
            .ok_or_else(|| CompanionError::NotFound(format!("Card {} not found", id)))
    }

    // -- Listing -----------------------------------------------------------

    /// All leader cards, in catalog order.
    pub fn leaders(&self) -> Result<Vec<Card>> {
        let catalog = self.conn.catalog()?;
        Ok(catalog.leaders().cloned().collect())
    }

    /// Filter the catalog.
    pub fn filter(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let catalog = self.conn.catalog()?;
        Ok(filter.apply(catalog.cards()).into_iter().cloned().collect())
    }

    /// Cards offered by the deck builder for the current leader.
    pub fn pool(&self, filter: &CardFilter, leader: Option<&Card>) -> Result<Vec<Card>> {
        let catalog = self.conn.catalog()?;
        Ok(crate::filter::visible_pool(catalog.cards(), filter, leader)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Serve `GET /api/cards/full`.
    ///
    /// Filtering sees the complete cards; relations (`sets`, `types`) and
    /// alternates are stripped from the response afterwards unless requested.
    pub fn full(&self, params: &FullCardsParams) -> Result<CardPage> {
        let catalog = self.conn.catalog()?;
        let matched = params.to_filter().apply(catalog.cards());
        let total = matched.len();

        let include_relations = params.include_relations();
        let include_alternates = params.include_alternates();
        let items: Vec<Card> = matched
            .into_iter()
            .take(params.limit())
            .map(|card| {
                let mut card = card.clone();
                if include_alternates {
                    card.alternates = card.visible_alternates().cloned().collect();
                } else {
                    card.alternates.clear();
                }
                if !include_relations {
                    strip_relations(&mut card);
                }
                card
            })
            .collect();

        let count = if params.include_counts() {
            total
        } else {
            items.len()
        };
        log::debug!("cards/full matched {} cards, returning {}", total, items.len());
        Ok(CardPage { items, count })
    }
}

fn strip_relations(card: &mut Card) {
    card.sets.clear();
    card.types.clear();
    for alt in &mut card.alternates {
        alt.sets.clear();
        alt.types.clear();
    }
}
