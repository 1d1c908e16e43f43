//! Saved deck persistence in the `decks` / `deck_cards` tables.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use crate::connection::{row_i64, Connection};
use crate::deck::DeckState;
use crate::error::{CompanionError, Result};
use crate::models::{Category, Deck, DeckCard};
use crate::sql_builder::SqlBuilder;

/// A `deck_cards` row as returned by the select below.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckCardRow {
    deck_id: i64,
    is_leader: bool,
    card_id: i64,
    code: String,
    quantity: i64,
    name: String,
    image: Option<String>,
    category: Category,
    cost: Option<String>,
    colors: Option<String>,
    rarity: Option<String>,
}

impl DeckCardRow {
    fn into_card(self) -> DeckCard {
        DeckCard {
            card_id: self.card_id,
            code: self.code,
            quantity: u32::try_from(self.quantity).unwrap_or(0),
            name: self.name,
            image: self.image,
            category: self.category,
            cost: self.cost,
            colors: self
                .colors
                .map(|c| {
                    c.split(',')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            rarity: self.rarity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckRow {
    id: i64,
    user_id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

const DECK_COLUMNS: &[&str] = &[
    "id",
    "user_id AS \"userId\"",
    "name",
    "created_at AS \"createdAt\"",
    "updated_at AS \"updatedAt\"",
];

const DECK_CARD_COLUMNS: &[&str] = &[
    "deck_id AS \"deckId\"",
    "is_leader AS \"isLeader\"",
    "card_id AS \"cardId\"",
    "code",
    "quantity",
    "name",
    "image",
    "category",
    "cost",
    "colors",
    "rarity",
];

// ---------------------------------------------------------------------------
// DeckQuery
// ---------------------------------------------------------------------------

/// Query interface for saved decks.
pub struct DeckQuery<'a> {
    conn: &'a Connection,
}

impl<'a> DeckQuery<'a> {
    /// Create a new `DeckQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new deck, or replace an existing one when `deck.id` is set.
    ///
    /// Every card id is resolved against the catalog and the deck is rebuilt
    /// through [`DeckState::from_catalog`] before it must pass
    /// [`DeckState::validate_for_save`]; the stored cards are the rebuilt ones.
    /// Replacing a deck owned by another user fails with `Forbidden`.
    pub fn save(&self, deck: &Deck) -> Result<Deck> {
        let catalog = self.conn.catalog()?;
        let checked = DeckState::from_catalog(deck, &catalog)
            .and_then(|state| state.validate_for_save().map(|_| state))
            .map_err(|v| CompanionError::InvalidArgument(v.to_string()))?
            .to_deck(deck.user_id, deck.id);

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let name = deck.name.trim().to_string();

        let id = self.conn.transaction(|conn| {
            let id = match deck.id {
                Some(id) => {
                    let owner = self.owner_of(id)?;
                    if owner != deck.user_id {
                        return Err(CompanionError::Forbidden(format!(
                            "Deck {} belongs to another user",
                            id
                        )));
                    }
                    conn.execute_update(
                        "UPDATE decks SET name = ?, updated_at = ? WHERE id = CAST(? AS BIGINT)",
                        &[name.clone(), now.clone(), id.to_string()],
                    )?;
                    conn.execute_update(
                        "DELETE FROM deck_cards WHERE deck_id = CAST(? AS BIGINT)",
                        &[id.to_string()],
                    )?;
                    id
                }
                None => conn
                    .execute_scalar(
                        "INSERT INTO decks (user_id, name, created_at, updated_at) \
                         VALUES (CAST(? AS BIGINT), ?, ?, ?) RETURNING id",
                        &[deck.user_id.to_string(), name.clone(), now.clone(), now.clone()],
                    )?
                    .and_then(|v| v.as_i64())
                    .ok_or_else(|| CompanionError::InvalidArgument("Deck insert returned no id".into()))?,
            };

            let leader = checked.leader.iter().map(|c| (true, c));
            let main = checked.cards.iter().map(|c| (false, c));
            for (position, (is_leader, card)) in leader.chain(main).enumerate() {
                insert_deck_card(conn, id, position, is_leader, card)?;
            }
            Ok(id)
        })?;

        log::info!("Saved deck {} ({}) for user {}", id, name, deck.user_id);
        self.get(id)?
            .ok_or_else(|| CompanionError::NotFound(format!("Deck {} not found", id)))
    }

    /// Retrieve a deck with its leader and cards.
    pub fn get(&self, id: i64) -> Result<Option<Deck>> {
        let (sql, params) = SqlBuilder::new("decks")
            .select(DECK_COLUMNS)
            .where_id("id", id)
            .build();
        let rows: Vec<DeckRow> = self.conn.execute_into(&sql, &params)?;
        let mut decks = self.assemble(rows)?;
        Ok(decks.pop())
    }

    /// All decks saved by `user_id`, most recently updated first.
    pub fn list_by_user(&self, user_id: i64) -> Result<Vec<Deck>> {
        let (sql, params) = SqlBuilder::new("decks")
            .select(DECK_COLUMNS)
            .where_id("user_id", user_id)
            .order_by(&["updated_at DESC", "id DESC"])
            .build();
        let rows: Vec<DeckRow> = self.conn.execute_into(&sql, &params)?;
        self.assemble(rows)
    }

    /// Delete a deck owned by `user_id`. Returns `false` when no such deck exists.
    pub fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let Some(owner) = self.try_owner_of(id)? else {
            return Ok(false);
        };
        if owner != user_id {
            return Err(CompanionError::Forbidden(format!(
                "Deck {} belongs to another user",
                id
            )));
        }
        self.conn.transaction(|conn| {
            conn.execute_update(
                "DELETE FROM deck_cards WHERE deck_id = CAST(? AS BIGINT)",
                &[id.to_string()],
            )?;
            conn.execute_update("DELETE FROM decks WHERE id = CAST(? AS BIGINT)", &[id.to_string()])?;
            Ok(())
        })?;
        log::info!("Deleted deck {}", id);
        Ok(true)
    }

    fn try_owner_of(&self, id: i64) -> Result<Option<i64>> {
        let rows = self.conn.execute(
            "SELECT user_id FROM decks WHERE id = CAST(? AS BIGINT)",
            &[id.to_string()],
        )?;
        Ok(rows.first().map(|r| row_i64(r, "user_id")))
    }

    fn owner_of(&self, id: i64) -> Result<i64> {
        self.try_owner_of(id)?
            .ok_or_else(|| CompanionError::NotFound(format!("Deck {} not found", id)))
    }

    /// Attach leader and cards to deck rows, keeping the row order.
    fn assemble(&self, rows: Vec<DeckRow>) -> Result<Vec<Deck>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let (sql, params) = SqlBuilder::new("deck_cards")
            .select(DECK_CARD_COLUMNS)
            .where_in_ids("deck_id", &ids)
            .order_by(&["deck_id", "seq"])
            .build();
        let card_rows: Vec<DeckCardRow> = self.conn.execute_into(&sql, &params)?;

        let mut decks: Vec<Deck> = rows
            .into_iter()
            .map(|r| Deck {
                id: Some(r.id),
                user_id: r.user_id,
                name: r.name,
                leader: None,
                cards: Vec::new(),
                created_at: Some(r.created_at),
                updated_at: Some(r.updated_at),
            })
            .collect();

        for row in card_rows {
            let Some(deck) = decks.iter_mut().find(|d| d.id == Some(row.deck_id)) else {
                continue;
            };
            if row.is_leader {
                deck.leader = Some(row.into_card());
            } else {
                deck.cards.push(row.into_card());
            }
        }
        Ok(decks)
    }
}

fn insert_deck_card(
    conn: &Connection,
    deck_id: i64,
    position: usize,
    is_leader: bool,
    card: &DeckCard,
) -> Result<()> {
    conn.execute_update(
        "INSERT INTO deck_cards \
         (deck_id, seq, is_leader, card_id, code, quantity, name, image, category, cost, colors, rarity) \
         VALUES (CAST(? AS BIGINT), CAST(? AS INTEGER), CAST(? AS BOOLEAN), CAST(? AS BIGINT), ?, \
         CAST(? AS INTEGER), ?, NULLIF(?, ''), ?, NULLIF(?, ''), ?, NULLIF(?, ''))",
        &[
            deck_id.to_string(),
            position.to_string(),
            is_leader.to_string(),
            card.card_id.to_string(),
            card.code.clone(),
            card.quantity.to_string(),
            card.name.clone(),
            card.image.clone().unwrap_or_default(),
            card.category.as_str().to_string(),
            card.cost.clone().unwrap_or_default(),
            card.colors.join(","),
            card.rarity.clone().unwrap_or_default(),
        ],
    )?;
    Ok(())
}
