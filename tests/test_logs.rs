//! Game log persistence and statistics.

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use optcg_companion::models::{flatten_hand, win_rate, NewGameLog};
use optcg_companion::{Companion, CompanionError};
use std::collections::BTreeMap;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn new_log(deck_id: i64, opponent: i64, is_win: bool, went_first: bool, day: u32) -> NewGameLog {
    NewGameLog {
        deck_id,
        opponent_leader_id: opponent,
        opponent_name: Some("  Kid  ".into()),
        is_win,
        went_first,
        played_at: Utc.with_ymd_and_hms(2024, 5, day, 18, 30, 0).unwrap(),
        final_hand: None,
        comments: Some(String::new()),
    }
}

fn saved_deck(companion: &Companion, user_id: i64) -> i64 {
    companion.decks().save(&sample_deck(user_id)).unwrap().id.unwrap()
}

// ---------------------------------------------------------------------------
// Final hand
// ---------------------------------------------------------------------------

#[test]
fn flatten_hand_repeats_ids_in_ascending_order() {
    let mut counts = BTreeMap::new();
    counts.insert(ZORO, 1);
    counts.insert(NAMI, 2);
    counts.insert(SUNNY, 0);
    assert_eq!(flatten_hand(&counts), Some(vec![NAMI, NAMI, ZORO]));
}

#[test]
fn empty_hand_flattens_to_none() {
    let mut counts = BTreeMap::new();
    assert_eq!(flatten_hand(&counts), None);
    counts.insert(NAMI, 0);
    assert_eq!(flatten_hand(&counts), None);
}

#[test]
fn win_rate_is_a_rounded_percentage() {
    assert_eq!(win_rate(0, 0), 0.0);
    assert!(approx(win_rate(2, 3), 66.67));
    assert!(approx(win_rate(1, 2), 50.0));
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[test]
fn create_stores_log_and_hand() {
    let (companion, _tmp) = setup_companion();
    let deck_id = saved_deck(&companion, 1);

    let mut counts = BTreeMap::new();
    counts.insert(ZORO, 1);
    counts.insert(NAMI, 2);
    let game = new_log(deck_id, DOFLAMINGO_LEADER, true, true, 1).with_hand_counts(&counts);

    let log = companion.logs().create(1, &game).unwrap();
    assert_eq!(log.user_id, 1);
    assert_eq!(log.deck_id, deck_id);
    assert_eq!(log.opponent_name.as_deref(), Some("Kid"));
    assert_eq!(log.comments, None);
    assert_eq!(log.final_hand, Some(vec![NAMI, NAMI, ZORO]));
    assert_eq!(log.played_at, "2024-05-01T18:30:00.000Z");

    let fetched = companion.logs().get(1, log.id).unwrap().unwrap();
    assert_eq!(fetched, log);
}

#[test]
fn log_without_hand_has_none() {
    let (companion, _tmp) = setup_companion();
    let deck_id = saved_deck(&companion, 1);
    let log = companion
        .logs()
        .create(1, &new_log(deck_id, LAW_LEADER, false, false, 2))
        .unwrap();
    assert_eq!(log.final_hand, None);
}

#[test]
fn create_requires_existing_own_deck() {
    let (companion, _tmp) = setup_companion();
    let deck_id = saved_deck(&companion, 1);

    let err = companion
        .logs()
        .create(2, &new_log(deck_id, LAW_LEADER, true, true, 1))
        .unwrap_err();
    assert!(matches!(err, CompanionError::Forbidden(_)));

    let err = companion
        .logs()
        .create(1, &new_log(4242, LAW_LEADER, true, true, 1))
        .unwrap_err();
    assert!(matches!(err, CompanionError::NotFound(_)));
}

#[test]
fn list_is_newest_first_and_per_user() {
    let (companion, _tmp) = setup_companion();
    let deck_id = saved_deck(&companion, 1);
    let other_deck = saved_deck(&companion, 2);

    for day in [3, 1, 2] {
        companion
            .logs()
            .create(1, &new_log(deck_id, LAW_LEADER, true, true, day))
            .unwrap();
    }
    companion
        .logs()
        .create(2, &new_log(other_deck, LAW_LEADER, true, true, 5))
        .unwrap();

    let logs = companion.logs().list(1).unwrap();
    let days: Vec<&str> = logs.iter().map(|l| &l.played_at[..10]).collect();
    assert_eq!(days, vec!["2024-05-03", "2024-05-02", "2024-05-01"]);
    assert_eq!(companion.logs().list(2).unwrap().len(), 1);
}

#[test]
fn delete_only_touches_own_logs() {
    let (companion, _tmp) = setup_companion();
    let deck_id = saved_deck(&companion, 1);
    let log = companion
        .logs()
        .create(1, &new_log(deck_id, LAW_LEADER, true, true, 1))
        .unwrap();

    assert!(!companion.logs().delete(2, log.id).unwrap());
    assert!(companion.logs().delete(1, log.id).unwrap());
    assert!(!companion.logs().delete(1, log.id).unwrap());
    assert!(companion.logs().list(1).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[test]
fn stats_for_user_without_games_are_zero() {
    let (companion, _tmp) = setup_companion();
    let stats = companion.logs().stats(1).unwrap();
    assert_eq!(stats.stats.total_games, 0);
    assert_eq!(stats.stats.win_rate, 0.0);
    assert!(stats.leader_stats.is_empty());
    assert!(stats.opponent_leader_stats.is_empty());
    assert!(stats.card_performance.is_empty());
}

#[test]
fn stats_aggregate_games_leaders_and_hands() {
    let (companion, _tmp) = setup_companion();
    let deck_id = saved_deck(&companion, 1);

    let hand = |ids: &[i64]| {
        let mut counts = BTreeMap::new();
        for id in ids {
            *counts.entry(*id).or_insert(0) += 1;
        }
        counts
    };

    let logs = companion.logs();
    logs.create(
        1,
        &new_log(deck_id, DOFLAMINGO_LEADER, true, true, 1).with_hand_counts(&hand(&[NAMI, NAMI, ZORO])),
    )
    .unwrap();
    logs.create(
        1,
        &new_log(deck_id, DOFLAMINGO_LEADER, false, false, 2).with_hand_counts(&hand(&[NAMI])),
    )
    .unwrap();
    logs.create(1, &new_log(deck_id, LAW_LEADER, true, false, 3))
        .unwrap();

    let stats = logs.stats(1).unwrap();

    let overall = &stats.stats;
    assert_eq!(overall.total_games, 3);
    assert_eq!(overall.wins, 2);
    assert_eq!(overall.losses, 1);
    assert!(approx(overall.win_rate, 66.67));
    assert_eq!(overall.games_first, 1);
    assert_eq!(overall.wins_first, 1);
    assert!(approx(overall.win_rate_first, 100.0));
    assert_eq!(overall.games_second, 2);
    assert_eq!(overall.wins_second, 1);
    assert!(approx(overall.win_rate_second, 50.0));

    assert_eq!(stats.leader_stats.len(), 1);
    assert_eq!(stats.leader_stats[0].leader_id, ZORO_LEADER);
    assert_eq!(stats.leader_stats[0].games, 3);
    assert_eq!(stats.leader_stats[0].wins, 2);

    let opponents: Vec<(i64, i64, i64)> = stats
        .opponent_leader_stats
        .iter()
        .map(|s| (s.leader_id, s.games, s.wins))
        .collect();
    assert_eq!(opponents, vec![(DOFLAMINGO_LEADER, 2, 1), (LAW_LEADER, 1, 1)]);

    let cards: Vec<(i64, i64, i64, i64)> = stats
        .card_performance
        .iter()
        .map(|c| (c.card_id, c.games, c.wins, c.copies))
        .collect();
    assert_eq!(cards, vec![(NAMI, 2, 1, 3), (ZORO, 1, 1, 1)]);
    assert!(approx(stats.card_performance[0].win_rate, 50.0));
    assert!(approx(stats.card_performance[1].win_rate, 100.0));
}
