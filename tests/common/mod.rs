//! Shared test fixtures for the companion integration tests.
//!
//! Provides a small sample catalog (three leaders, characters, an event and a
//! stage, with nested alternates) and `setup_companion()` which builds an
//! offline [`Companion`] over a temporary cache directory with that catalog
//! installed.

#![allow(dead_code)]

use optcg_companion::models::{Card, Deck};
use optcg_companion::{Catalog, Companion, DeckState};
use serde_json::{json, Value};

pub const ZORO_LEADER: i64 = 1;
pub const DOFLAMINGO_LEADER: i64 = 2;
pub const LAW_LEADER: i64 = 3;
pub const NAMI: i64 = 4;
pub const ZORO: i64 = 5;
pub const FISHER_TIGER: i64 = 6;
pub const LUFFY: i64 = 7;
pub const RADICAL_BEAM: i64 = 8;
pub const SUNNY: i64 = 9;

pub const ZORO_LEADER_PARALLEL: i64 = 101;
pub const ZORO_LEADER_REPRINT: i64 = 102;
pub const ZORO_REPRINT: i64 = 502;
pub const ZORO_PARALLEL: i64 = 501;

const ROMANCE_DAWN: &str = "Romance Dawn";
const NEW_ERA: &str = "Awakening of the New Era";
const STARTER: &str = "Starter Deck 1: Straw Hat Crew";

/// The sample catalog as served by `/api/cards/full`.
pub fn sample_catalog_json() -> Value {
    json!({
        "items": [
            {
                "id": ZORO_LEADER,
                "code": "OP01-001",
                "name": "Roronoa Zoro",
                "image": "https://en.onepiece-cardgame.com/images/cardlist/card/OP01-001.png",
                "category": "Leader",
                "power": "5000",
                "attribute": "Slash",
                "colors": ["Red"],
                "rarity": "L",
                "types": ["Supernovas", "Straw Hat Crew"],
                "texts": ["[DON!! x1] [Your Turn] All of your Characters gain +1000 power."],
                "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }],
                "marketPrice": 0.5,
                "alternates": [
                    {
                        "id": ZORO_LEADER_PARALLEL,
                        "code": "OP01-001",
                        "name": "Roronoa Zoro",
                        "category": "Leader",
                        "colors": ["Red"],
                        "variant": "Parallel",
                        "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }],
                        "marketPrice": 12.0
                    },
                    {
                        "id": ZORO_LEADER_REPRINT,
                        "code": "OP01-001",
                        "name": "Roronoa Zoro",
                        "category": "Leader",
                        "colors": ["Red"],
                        "variant": "Reprint"
                    }
                ]
            },
            {
                "id": DOFLAMINGO_LEADER,
                "code": "OP01-060",
                "name": "Donquixote Doflamingo",
                "category": "Leader",
                "power": "5000",
                "attribute": "Special",
                "colors": ["Blue"],
                "rarity": "L",
                "types": ["The Seven Warlords of the Sea", "Donquixote Pirates"],
                "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }]
            },
            {
                "id": LAW_LEADER,
                "code": "OP01-002",
                "name": "Trafalgar Law",
                "category": "Leader",
                "power": "5000",
                "attribute": "Slash",
                "colors": ["Red", "Green"],
                "rarity": "L",
                "types": ["Heart Pirates", "Supernovas"],
                "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }],
                "marketPrice": 1.25
            },
            {
                "id": NAMI,
                "code": "OP01-016",
                "name": "Nami",
                "image": "https://en.onepiece-cardgame.com/images/cardlist/card/OP01-016.png",
                "category": "Character",
                "cost": "1",
                "power": "1000",
                "counter": "1000",
                "attribute": "Special",
                "colors": ["Red"],
                "rarity": "R",
                "types": ["Straw Hat Crew"],
                "texts": ["[On Play] Look at 5 cards from the top of your deck."],
                "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }],
                "marketPrice": 0.25
            },
            {
                "id": ZORO,
                "code": "OP01-025",
                "name": "Roronoa Zoro",
                "category": "Character",
                "cost": "3",
                "power": "5000",
                "counter": "-",
                "attribute": "Slash",
                "colors": ["Red"],
                "rarity": "SR",
                "types": ["Supernovas", "Straw Hat Crew"],
                "texts": ["[Rush] (This card can attack on the turn in which it is played.)"],
                "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }],
                "alternates": [
                    {
                        "id": ZORO_REPRINT,
                        "code": "OP01-025",
                        "name": "Roronoa Zoro",
                        "category": "Character",
                        "cost": "3",
                        "colors": ["Red"],
                        "variant": "Reprint",
                        "marketPrice": 1.0
                    },
                    {
                        "id": ZORO_PARALLEL,
                        "code": "OP01-025",
                        "name": "Roronoa Zoro",
                        "category": "Character",
                        "cost": "3",
                        "colors": ["Red"],
                        "variant": "Parallel",
                        "marketPrice": 30.0
                    }
                ]
            },
            {
                "id": FISHER_TIGER,
                "code": "OP05-070",
                "name": "Fisher Tiger",
                "category": "Character",
                "cost": "5",
                "power": "6000",
                "counter": "1000",
                "attribute": "Strike",
                "colors": ["Blue"],
                "rarity": "C",
                "types": ["Fish-Man", "Sun Pirates"],
                "texts": ["[Trigger] Play this card."],
                "triggerCard": "Play this card.",
                "sets": [{ "title": NEW_ERA, "code": "OP05" }],
                "marketPrice": 0.1
            },
            {
                "id": LUFFY,
                "code": "ST01-012",
                "name": "Monkey.D.Luffy",
                "category": "Character",
                "cost": "5",
                "power": "6000",
                "attribute": "Slash/Strike",
                "colors": ["Green"],
                "rarity": "SR",
                "types": ["Supernovas", "Straw Hat Crew"],
                "texts": ["[Rush] [Blocker]"],
                "sets": [{ "title": STARTER, "code": "ST01" }],
                "marketPrice": 2.0
            },
            {
                "id": RADICAL_BEAM,
                "code": "OP01-029",
                "name": "Radical Beam!!",
                "category": "Event",
                "cost": "1",
                "colors": ["Red"],
                "rarity": "UC",
                "types": ["Straw Hat Crew"],
                "texts": ["[Counter] Up to 1 of your Leader or Character cards gains +4000 power during this battle."],
                "triggerCard": "Up to 1 of your Leader or Character cards gains +1000 power during this turn.",
                "sets": [{ "title": ROMANCE_DAWN, "code": "OP01" }],
                "marketPrice": 0.2
            },
            {
                "id": SUNNY,
                "code": "ST01-017",
                "name": "Thousand Sunny",
                "category": "Stage",
                "cost": "2",
                "colors": ["Red"],
                "rarity": "C",
                "types": ["Straw Hat Crew"],
                "sets": [{ "title": STARTER, "code": "ST01" }]
            }
        ]
    })
}

pub fn sample_catalog() -> Catalog {
    Catalog::from_json(sample_catalog_json()).unwrap()
}

/// Look up a printing (base or alternate) in the sample catalog.
pub fn card(id: i64) -> Card {
    sample_catalog().find(id).cloned().unwrap()
}

/// Ids of `cards`, in order.
pub fn ids(cards: &[&Card]) -> Vec<i64> {
    cards.iter().map(|c| c.id).collect()
}

/// A plain red character, for building large decks.
pub fn filler(id: i64, code: &str, cost: &str) -> Card {
    serde_json::from_value(json!({
        "id": id,
        "code": code,
        "name": format!("Filler {}", code),
        "category": "Character",
        "cost": cost,
        "colors": ["Red"]
    }))
    .unwrap()
}

/// Create an offline `Companion` backed by a temporary cache directory with
/// the sample catalog installed.
///
/// Returns `(Companion, tempfile::TempDir)`. The caller must keep the `TempDir`
/// alive for the duration of the test so the cache directory is not deleted
/// prematurely.
pub fn setup_companion() -> (Companion, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let companion = Companion::builder()
        .cache_dir(tmp_dir.path())
        .offline(true)
        .build()
        .unwrap();
    companion.set_catalog(sample_catalog());
    (companion, tmp_dir)
}

/// A valid deck for `user_id`: Zoro leader, 4 Nami, 2 Zoro, 1 Thousand Sunny.
pub fn sample_deck(user_id: i64) -> Deck {
    let mut state = DeckState::new();
    state.name = "Red Zoro".to_string();
    state.set_leader(&card(ZORO_LEADER)).unwrap();
    for _ in 0..4 {
        state.add_card(&card(NAMI)).unwrap();
    }
    state.add_card(&card(ZORO)).unwrap();
    state.add_card(&card(ZORO)).unwrap();
    state.add_card(&card(SUNNY)).unwrap();
    state.to_deck(user_id, None)
}
