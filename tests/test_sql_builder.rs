//! Unit tests for the SqlBuilder query construction.

use optcg_companion::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("decks").build();
    assert_eq!(sql, "SELECT *\nFROM decks");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("decks")
        .select(&["id", "leader_id AS \"leaderId\""])
        .build();
    assert!(sql.starts_with("SELECT id, leader_id AS \"leaderId\"\n"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_id_casts_placeholder() {
    let (sql, params) = SqlBuilder::new("decks")
        .where_id("user_id", 42)
        .build();
    assert!(sql.contains("WHERE user_id = CAST(? AS BIGINT)"));
    assert_eq!(params, vec!["42"]);
}

#[test]
fn where_flag_binds_boolean_text() {
    let (sql, params) = SqlBuilder::new("game_logs")
        .where_flag("is_win", false)
        .build();
    assert!(sql.contains("is_win = CAST(? AS BOOLEAN)"));
    assert_eq!(params, vec!["false"]);
}

#[test]
fn where_in_ids_adds_one_placeholder_per_id() {
    let (sql, params) = SqlBuilder::new("deck_cards")
        .where_in_ids("deck_id", &[3, 1, 2])
        .build();
    assert!(sql.contains(
        "deck_id IN (CAST(? AS BIGINT), CAST(? AS BIGINT), CAST(? AS BIGINT))"
    ));
    assert_eq!(params, vec!["3", "1", "2"]);
}

#[test]
fn where_in_ids_empty_produces_false() {
    let (sql, params) = SqlBuilder::new("deck_cards")
        .where_in_ids("deck_id", &[])
        .build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

#[test]
fn limit_comes_last() {
    let (sql, _) = SqlBuilder::new("user_lists")
        .where_flag("is_collection", true)
        .order_by(&["id"])
        .limit(1)
        .build();
    assert!(sql.ends_with("ORDER BY id\nLIMIT 1"));
}

#[test]
fn full_query_with_join_and_grouping() {
    let (sql, params) = SqlBuilder::new("game_logs g")
        .select(&["d.leader_id AS \"leaderId\"", "COUNT(*) AS games"])
        .join("JOIN decks d ON d.id = g.deck_id")
        .where_id("g.user_id", 7)
        .group_by(&["d.leader_id"])
        .order_by(&["games DESC", "d.leader_id"])
        .build();

    assert_eq!(
        sql,
        "SELECT d.leader_id AS \"leaderId\", COUNT(*) AS games\n\
         FROM game_logs g\n\
         JOIN decks d ON d.id = g.deck_id\n\
         WHERE g.user_id = CAST(? AS BIGINT)\n\
         GROUP BY d.leader_id\n\
         ORDER BY games DESC, d.leader_id"
    );
    assert_eq!(params, vec!["7"]);
}
