use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Leader,
    Character,
    Event,
    Stage,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Leader => "Leader",
            Category::Character => "Character",
            Category::Event => "Event",
            Category::Stage => "Stage",
            Category::Other => "Other",
        }
    }

    /// Parse a category name, ignoring case. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        [
            Category::Leader,
            Category::Character,
            Category::Event,
            Category::Stage,
        ]
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Event and Stage cards are listed after everything else in a deck.
    pub fn sorts_last(&self) -> bool {
        matches!(self, Category::Event | Category::Stage)
    }
}

// ---------------------------------------------------------------------------
// CardSetRef: Set a printing belongs to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSetRef {
    pub title: String,
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Card: A catalog printing, with its alternate printings nested
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub image: Option<String>,
    pub category: Category,
    pub cost: Option<String>,
    pub power: Option<String>,
    pub counter: Option<String>,
    pub attribute: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub rarity: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub texts: Vec<String>,
    pub trigger_card: Option<String>,
    #[serde(default)]
    pub sets: Vec<CardSetRef>,
    #[serde(default)]
    pub alternates: Vec<Card>,
    /// Print kind of an alternate (e.g. "Parallel", "Manga", "Reprint").
    pub variant: Option<String>,

    // -- Marketplace fields --
    pub tcgplayer_product_id: Option<i64>,
    pub tcgplayer_url: Option<String>,
    pub market_price: Option<f64>,
    #[serde(default)]
    pub tcgplayer_missing: bool,
}

impl Card {
    pub fn is_leader(&self) -> bool {
        self.category == Category::Leader
    }

    /// Alternates that are shown to users: never the card itself, never a
    /// cosmetic reprint.
    pub fn visible_alternates(&self) -> impl Iterator<Item = &Card> + '_ {
        self.alternates.iter().filter(move |alt| {
            alt.id != self.id
                && !alt
                    .variant
                    .as_deref()
                    .map(|v| {
                        config::EXCLUDED_ALTERNATE_VARIANTS
                            .iter()
                            .any(|excluded| excluded.eq_ignore_ascii_case(v))
                    })
                    .unwrap_or(false)
        })
    }

    /// The base printing followed by its visible alternates.
    pub fn printings(&self) -> impl Iterator<Item = &Card> + '_ {
        std::iter::once(self).chain(self.visible_alternates())
    }

    /// Cost parsed as a number; cards without a numeric cost have `None`.
    pub fn numeric_cost(&self) -> Option<i64> {
        self.cost.as_deref().and_then(|c| c.trim().parse().ok())
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger_card
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    /// Counter value, treating blank and "-" as no counter.
    pub fn counter_value(&self) -> Option<&str> {
        self.counter
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "-")
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(color))
    }

    pub fn shares_color_with(&self, other: &Card) -> bool {
        self.colors.iter().any(|c| other.has_color(c))
    }

    /// Set prefix of the code (`"OP01"` for `"OP01-001"`).
    pub fn set_prefix(&self) -> &str {
        self.code.split('-').next().unwrap_or(self.code.as_str())
    }
}
