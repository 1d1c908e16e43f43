use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameLog: One recorded match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLog {
    pub id: i64,
    pub user_id: i64,
    pub deck_id: i64,
    pub opponent_leader_id: i64,
    pub opponent_name: Option<String>,
    pub is_win: bool,
    pub went_first: bool,
    pub final_hand: Option<Vec<i64>>,
    pub comments: Option<String>,
    pub played_at: String,
}

// ---------------------------------------------------------------------------
// NewGameLog: Body of `POST /api/logs`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameLog {
    pub deck_id: i64,
    pub opponent_leader_id: i64,
    pub opponent_name: Option<String>,
    pub is_win: bool,
    pub went_first: bool,
    pub played_at: DateTime<Utc>,
    pub final_hand: Option<Vec<i64>>,
    pub comments: Option<String>,
}

impl NewGameLog {
    /// Set `final_hand` from a card-id → count map, one id per copy in
    /// ascending id order. An empty map clears the hand.
    pub fn with_hand_counts(mut self, counts: &BTreeMap<i64, u32>) -> Self {
        self.final_hand = flatten_hand(counts);
        self
    }
}

/// Flatten a card-id → count map into a repeated-id array.
///
/// Returns `None` when no card has a positive count.
pub fn flatten_hand(counts: &BTreeMap<i64, u32>) -> Option<Vec<i64>> {
    let hand: Vec<i64> = counts
        .iter()
        .flat_map(|(id, n)| std::iter::repeat(*id).take(*n as usize))
        .collect();
    if hand.is_empty() {
        None
    } else {
        Some(hand)
    }
}

// ---------------------------------------------------------------------------
// Statistics: Body of `GET /api/logs/stats`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_games: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_rate: f64,
    pub games_first: i64,
    pub wins_first: i64,
    pub win_rate_first: f64,
    pub games_second: i64,
    pub wins_second: i64,
    pub win_rate_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderStat {
    pub leader_id: i64,
    pub games: i64,
    pub wins: i64,
    #[serde(default)]
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPerformance {
    pub card_id: i64,
    pub games: i64,
    pub wins: i64,
    pub copies: i64,
    #[serde(default)]
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub stats: OverallStats,
    pub leader_stats: Vec<LeaderStat>,
    pub opponent_leader_stats: Vec<LeaderStat>,
    pub card_performance: Vec<CardPerformance>,
}

/// Percentage of `wins` over `games`, 0 when nothing was played.
pub fn win_rate(wins: i64, games: i64) -> f64 {
    if games == 0 {
        0.0
    } else {
        (wins as f64 / games as f64 * 10000.0).round() / 100.0
    }
}
