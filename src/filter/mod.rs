//! Predicate filter engine over the catalog snapshot.
//!
//! A [`CardFilter`] holds one selection per dimension. An empty selection is
//! inactive; active dimensions are AND-ed together and the values chosen inside
//! one multi-select dimension are OR-ed. Filtering is a pure function of the
//! snapshot and the filter, so re-applying the same filter is a no-op.

pub mod gate;
pub mod search;

use crate::config;
use crate::models::{Card, Category};

pub use gate::visible_pool;
pub use search::{matches_code, matches_text};

// ---------------------------------------------------------------------------
// CardFilter
// ---------------------------------------------------------------------------

/// Every filter dimension offered by the catalog and deck builder.
///
/// `counters` and `triggers` accept the sentinels [`config::NO_COUNTER`] and
/// [`config::NO_TRIGGER`] to select cards without a counter / trigger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilter {
    pub search: Option<String>,
    pub colors: Vec<String>,
    pub rarities: Vec<String>,
    pub categories: Vec<Category>,
    pub costs: Vec<String>,
    pub powers: Vec<String>,
    pub attributes: Vec<String>,
    pub counters: Vec<String>,
    pub triggers: Vec<String>,
    /// Set titles.
    pub sets: Vec<String>,
    /// Set prefix of the code, e.g. `"OP05"`.
    pub set_code: Option<String>,
    /// Alternate print kinds, e.g. `"Parallel"`.
    pub alternate_arts: Vec<String>,
    /// Bracketed keywords in rules text, e.g. `"Rush"` for `[Rush]`.
    pub effects: Vec<String>,
    pub families: Vec<String>,
}

impl CardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when at least one dimension constrains the result.
    pub fn is_active(&self) -> bool {
        self.search
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
            || self
                .set_code
                .as_deref()
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false)
            || !self.colors.is_empty()
            || !self.rarities.is_empty()
            || !self.categories.is_empty()
            || !self.costs.is_empty()
            || !self.powers.is_empty()
            || !self.attributes.is_empty()
            || !self.counters.is_empty()
            || !self.triggers.is_empty()
            || !self.sets.is_empty()
            || !self.alternate_arts.is_empty()
            || !self.effects.is_empty()
            || !self.families.is_empty()
    }

    /// Return the cards matching every active dimension, in input order.
    pub fn apply<'a>(&self, cards: &'a [Card]) -> Vec<&'a Card> {
        cards.iter().filter(|c| self.matches(c)).collect()
    }

    pub fn matches(&self, card: &Card) -> bool {
        if let Some(ref query) = self.search {
            if !search::matches_text(card, query) {
                return false;
            }
        }

        // -- colors: base or any visible alternate -------------------------
        if !self.colors.is_empty()
            && !card
                .printings()
                .any(|p| self.colors.iter().any(|c| p.has_color(c)))
        {
            return false;
        }

        if !self.rarities.is_empty() && !any_eq(&self.rarities, card.rarity.as_deref()) {
            return false;
        }

        if !self.categories.is_empty() && !self.categories.contains(&card.category) {
            return false;
        }

        if !self.costs.is_empty() && !any_eq(&self.costs, card.cost.as_deref()) {
            return false;
        }

        if !self.powers.is_empty() && !any_eq(&self.powers, card.power.as_deref()) {
            return false;
        }

        // -- attributes: dual attributes are written "Slash/Strike" ---------
        if !self.attributes.is_empty() {
            let attrs: Vec<&str> = card
                .attribute
                .as_deref()
                .map(|a| a.split('/').map(str::trim).collect())
                .unwrap_or_default();
            if !attrs.into_iter().any(|a| any_eq(&self.attributes, Some(a))) {
                return false;
            }
        }

        if !self.counters.is_empty() && !self.counters.iter().any(|c| counter_matches(card, c)) {
            return false;
        }

        if !self.triggers.is_empty() && !self.triggers.iter().any(|t| trigger_matches(card, t)) {
            return false;
        }

        // -- sets: base or any visible alternate ----------------------------
        if !self.sets.is_empty()
            && !card
                .printings()
                .flat_map(|p| p.sets.iter())
                .any(|s| any_eq(&self.sets, Some(s.title.as_str())))
        {
            return false;
        }

        if let Some(ref set_code) = self.set_code {
            let set_code = set_code.trim();
            if !set_code.is_empty() && !card.printings().any(|p| in_set_code(p, set_code)) {
                return false;
            }
        }

        // -- alternate art: variant of the base or any visible alternate ----
        if !self.alternate_arts.is_empty()
            && !card
                .printings()
                .any(|p| any_eq(&self.alternate_arts, p.variant.as_deref()))
        {
            return false;
        }

        if !self.effects.is_empty() && !self.effects.iter().any(|e| has_effect(card, e)) {
            return false;
        }

        if !self.families.is_empty()
            && !card.types.iter().any(|t| any_eq(&self.families, Some(t.as_str())))
        {
            return false;
        }

        true
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn any_eq(choices: &[String], value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            choices.iter().any(|c| c.trim().eq_ignore_ascii_case(v))
        }
        None => false,
    }
}

fn counter_matches(card: &Card, choice: &str) -> bool {
    if choice.eq_ignore_ascii_case(config::NO_COUNTER) {
        return card.counter_value().is_none();
    }
    card.counter_value()
        .map(|c| c.eq_ignore_ascii_case(choice.trim()))
        .unwrap_or(false)
}

fn trigger_matches(card: &Card, choice: &str) -> bool {
    if choice.eq_ignore_ascii_case(config::NO_TRIGGER) {
        return !card.has_trigger();
    }
    let choice = choice.trim().to_lowercase();
    card.trigger_card
        .as_deref()
        .map(|t| !t.trim().is_empty() && t.to_lowercase().contains(&choice))
        .unwrap_or(false)
}

fn in_set_code(card: &Card, set_code: &str) -> bool {
    card.set_prefix().eq_ignore_ascii_case(set_code)
        || card
            .sets
            .iter()
            .filter_map(|s| s.code.as_deref())
            .any(|c| c.eq_ignore_ascii_case(set_code))
}

fn has_effect(card: &Card, effect: &str) -> bool {
    let effect = effect.trim();
    let needle = if effect.starts_with('[') {
        effect.to_lowercase()
    } else {
        format!("[{}]", effect.to_lowercase())
    };
    card.texts.iter().any(|t| t.to_lowercase().contains(&needle))
}
