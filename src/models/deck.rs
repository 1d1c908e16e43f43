use serde::{Deserialize, Serialize};

use super::card::{Card, Category};

// ---------------------------------------------------------------------------
// DeckCard: A chosen printing inside a deck
// ---------------------------------------------------------------------------

/// Denormalized copy of a chosen card or alternate. `code` groups printings
/// for the per-code copy limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub card_id: i64,
    pub code: String,
    pub quantity: u32,
    pub name: String,
    pub image: Option<String>,
    pub category: Category,
    pub cost: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub rarity: Option<String>,
}

impl DeckCard {
    pub fn from_card(card: &Card, quantity: u32) -> Self {
        Self {
            card_id: card.id,
            code: card.code.clone(),
            quantity,
            name: card.name.clone(),
            image: card.image.clone(),
            category: card.category,
            cost: card.cost.clone(),
            colors: card.colors.clone(),
            rarity: card.rarity.clone(),
        }
    }

    pub fn numeric_cost(&self) -> Option<i64> {
        self.cost.as_deref().and_then(|c| c.trim().parse().ok())
    }
}

// ---------------------------------------------------------------------------
// Deck: A saved deck
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub leader: Option<DeckCard>,
    #[serde(default)]
    pub cards: Vec<DeckCard>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Deck {
    pub fn total_cards(&self) -> u32 {
        self.cards.iter().map(|c| c.quantity).sum()
    }
}
