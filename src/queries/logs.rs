//! Game log persistence and win/loss statistics.
//!
//! Logs live in `game_logs`; each copy of a card in the final hand is one
//! `game_log_hand_cards` row, so statistics can aggregate hands in SQL.

use std::collections::HashMap;

use chrono::SecondsFormat;
use serde::Deserialize;

use crate::connection::{row_i64, Connection};
use crate::error::{CompanionError, Result};
use crate::models::{
    win_rate, CardPerformance, GameLog, LeaderStat, LogStats, NewGameLog, OverallStats,
};
use crate::sql_builder::SqlBuilder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameLogRow {
    id: i64,
    user_id: i64,
    deck_id: i64,
    opponent_leader_id: i64,
    opponent_name: Option<String>,
    is_win: bool,
    went_first: bool,
    comments: Option<String>,
    played_at: String,
}

const LOG_COLUMNS: &[&str] = &[
    "id",
    "user_id AS \"userId\"",
    "deck_id AS \"deckId\"",
    "opponent_leader_id AS \"opponentLeaderId\"",
    "opponent_name AS \"opponentName\"",
    "is_win AS \"isWin\"",
    "went_first AS \"wentFirst\"",
    "comments",
    "played_at AS \"playedAt\"",
];

fn trimmed_or_empty(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// LogQuery
// ---------------------------------------------------------------------------

/// Query interface for a user's game logs.
pub struct LogQuery<'a> {
    conn: &'a Connection,
}

impl<'a> LogQuery<'a> {
    /// Create a new `LogQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a game for `user_id`. The deck must belong to that user.
    pub fn create(&self, user_id: i64, game: &NewGameLog) -> Result<GameLog> {
        let owner = self
            .conn
            .execute_scalar(
                "SELECT user_id FROM decks WHERE id = CAST(? AS BIGINT)",
                &[game.deck_id.to_string()],
            )?
            .and_then(|v| v.as_i64());
        match owner {
            None => {
                return Err(CompanionError::NotFound(format!(
                    "Deck {} not found",
                    game.deck_id
                )))
            }
            Some(owner) if owner != user_id => {
                return Err(CompanionError::Forbidden(format!(
                    "Deck {} belongs to another user",
                    game.deck_id
                )))
            }
            Some(_) => {}
        }

        let played_at = game.played_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let id = self.conn.transaction(|conn| {
            let id = conn
                .execute_scalar(
                    "INSERT INTO game_logs \
                     (user_id, deck_id, opponent_leader_id, opponent_name, is_win, went_first, comments, played_at) \
                     VALUES (CAST(? AS BIGINT), CAST(? AS BIGINT), CAST(? AS BIGINT), NULLIF(?, ''), \
                     CAST(? AS BOOLEAN), CAST(? AS BOOLEAN), NULLIF(?, ''), ?) RETURNING id",
                    &[
                        user_id.to_string(),
                        game.deck_id.to_string(),
                        game.opponent_leader_id.to_string(),
                        trimmed_or_empty(&game.opponent_name),
                        game.is_win.to_string(),
                        game.went_first.to_string(),
                        trimmed_or_empty(&game.comments),
                        played_at.clone(),
                    ],
                )?
                .and_then(|v| v.as_i64())
                .ok_or_else(|| CompanionError::InvalidArgument("Log insert returned no id".into()))?;

            for (seq, card_id) in game.final_hand.iter().flatten().enumerate() {
                conn.execute_update(
                    "INSERT INTO game_log_hand_cards (log_id, seq, card_id) \
                     VALUES (CAST(? AS BIGINT), CAST(? AS INTEGER), CAST(? AS BIGINT))",
                    &[id.to_string(), seq.to_string(), card_id.to_string()],
                )?;
            }
            Ok(id)
        })?;

        log::info!("Recorded game {} for user {}", id, user_id);
        self.get(user_id, id)?
            .ok_or_else(|| CompanionError::NotFound(format!("Game log {} not found", id)))
    }

    pub fn get(&self, user_id: i64, id: i64) -> Result<Option<GameLog>> {
        let (sql, params) = SqlBuilder::new("game_logs")
            .select(LOG_COLUMNS)
            .where_id("id", id)
            .where_id("user_id", user_id)
            .build();
        let rows: Vec<GameLogRow> = self.conn.execute_into(&sql, &params)?;
        Ok(self.assemble(rows)?.pop())
    }

    /// All logs of `user_id`, newest first.
    pub fn list(&self, user_id: i64) -> Result<Vec<GameLog>> {
        let (sql, params) = SqlBuilder::new("game_logs")
            .select(LOG_COLUMNS)
            .where_id("user_id", user_id)
            .order_by(&["played_at DESC", "id DESC"])
            .build();
        let rows: Vec<GameLogRow> = self.conn.execute_into(&sql, &params)?;
        self.assemble(rows)
    }

    /// Delete a log of `user_id`. Returns `false` when it does not exist.
    pub fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        if self.get(user_id, id)?.is_none() {
            return Ok(false);
        }
        self.conn.transaction(|conn| {
            conn.execute_update(
                "DELETE FROM game_log_hand_cards WHERE log_id = CAST(? AS BIGINT)",
                &[id.to_string()],
            )?;
            conn.execute_update(
                "DELETE FROM game_logs WHERE id = CAST(? AS BIGINT)",
                &[id.to_string()],
            )?;
            Ok(())
        })?;
        log::info!("Deleted game log {}", id);
        Ok(true)
    }

    // -- Statistics --------------------------------------------------------

    /// Aggregate win/loss statistics over every log of `user_id`.
    pub fn stats(&self, user_id: i64) -> Result<LogStats> {
        let uid = [user_id.to_string()];

        let overall = self.conn.execute(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE is_win) AS wins, \
                    COUNT(*) FILTER (WHERE went_first) AS games_first, \
                    COUNT(*) FILTER (WHERE went_first AND is_win) AS wins_first \
             FROM game_logs WHERE user_id = CAST(? AS BIGINT)",
            &uid,
        )?;
        let stats = overall
            .first()
            .map(|row| {
                let total = row_i64(row, "total");
                let wins = row_i64(row, "wins");
                let games_first = row_i64(row, "games_first");
                let wins_first = row_i64(row, "wins_first");
                let games_second = total - games_first;
                let wins_second = wins - wins_first;
                OverallStats {
                    total_games: total,
                    wins,
                    losses: total - wins,
                    win_rate: win_rate(wins, total),
                    games_first,
                    wins_first,
                    win_rate_first: win_rate(wins_first, games_first),
                    games_second,
                    wins_second,
                    win_rate_second: win_rate(wins_second, games_second),
                }
            })
            .unwrap_or_default();

        let (sql, params) = SqlBuilder::new("game_logs g")
            .select(&[
                "dc.card_id AS \"leaderId\"",
                "COUNT(*) AS games",
                "COUNT(*) FILTER (WHERE g.is_win) AS wins",
            ])
            .join("JOIN deck_cards dc ON dc.deck_id = g.deck_id AND dc.is_leader")
            .where_id("g.user_id", user_id)
            .group_by(&["dc.card_id"])
            .order_by(&["games DESC", "dc.card_id"])
            .build();
        let mut leader_stats: Vec<LeaderStat> = self.conn.execute_into(&sql, &params)?;

        let (sql, params) = SqlBuilder::new("game_logs")
            .select(&[
                "opponent_leader_id AS \"leaderId\"",
                "COUNT(*) AS games",
                "COUNT(*) FILTER (WHERE is_win) AS wins",
            ])
            .where_id("user_id", user_id)
            .group_by(&["opponent_leader_id"])
            .order_by(&["games DESC", "opponent_leader_id"])
            .build();
        let mut opponent_leader_stats: Vec<LeaderStat> = self.conn.execute_into(&sql, &params)?;

        let (sql, params) = SqlBuilder::new("game_log_hand_cards h")
            .select(&[
                "h.card_id AS \"cardId\"",
                "COUNT(DISTINCT h.log_id) AS games",
                "COUNT(DISTINCT CASE WHEN g.is_win THEN h.log_id END) AS wins",
                "COUNT(*) AS copies",
            ])
            .join("JOIN game_logs g ON g.id = h.log_id")
            .where_id("g.user_id", user_id)
            .group_by(&["h.card_id"])
            .order_by(&["games DESC", "h.card_id"])
            .build();
        let mut card_performance: Vec<CardPerformance> = self.conn.execute_into(&sql, &params)?;

        for s in leader_stats.iter_mut().chain(opponent_leader_stats.iter_mut()) {
            s.win_rate = win_rate(s.wins, s.games);
        }
        for c in &mut card_performance {
            c.win_rate = win_rate(c.wins, c.games);
        }

        Ok(LogStats {
            stats,
            leader_stats,
            opponent_leader_stats,
            card_performance,
        })
    }

    /// Attach final hands to log rows, keeping the row order.
    fn assemble(&self, rows: Vec<GameLogRow>) -> Result<Vec<GameLog>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let (sql, params) = SqlBuilder::new("game_log_hand_cards")
            .select(&["log_id", "card_id"])
            .where_in_ids("log_id", &ids)
            .order_by(&["log_id", "seq"])
            .build();

        let mut hands: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in self.conn.execute(&sql, &params)? {
            hands
                .entry(row_i64(&row, "log_id"))
                .or_default()
                .push(row_i64(&row, "card_id"));
        }

        Ok(rows
            .into_iter()
            .map(|r| GameLog {
                final_hand: hands.remove(&r.id),
                id: r.id,
                user_id: r.user_id,
                deck_id: r.deck_id,
                opponent_leader_id: r.opponent_leader_id,
                opponent_name: r.opponent_name,
                is_win: r.is_win,
                went_first: r.went_first,
                comments: r.comments,
                played_at: r.played_at,
            })
            .collect())
    }
}
