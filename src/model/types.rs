use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ScoreWarning;
use crate::model::score::GolferResult;

pub const DEFAULT_PAR: i32 = 71;
pub const DEFAULT_BEST_OF: usize = 3;
pub const DEFAULT_TEAM_SIZE: usize = 4;
pub const OFFICIAL_STATUS: &str = "Official";

fn default_par() -> i32 {
    DEFAULT_PAR
}

fn default_best_of() -> usize {
    DEFAULT_BEST_OF
}

fn default_team_size() -> usize {
    DEFAULT_TEAM_SIZE
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    /// Provider player ids or full names, in roster order.
    pub golfers: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    #[serde(default = "default_par")]
    pub par: i32,
    #[serde(default = "default_best_of")]
    pub best_of: usize,
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Tournament {
    #[must_use]
    pub fn new(id: impl Into<String>, teams: Vec<Team>) -> Self {
        Self {
            id: id.into(),
            par: DEFAULT_PAR,
            best_of: DEFAULT_BEST_OF,
            team_size: DEFAULT_TEAM_SIZE,
            teams,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundDetail {
    pub score: i32,
    pub penalty_scores: usize,
    pub valid_scores: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamScoreResult {
    pub team_name: String,
    pub total_score: i32,
    pub players: Vec<GolferResult>,
    pub cut_players_count: usize,
    pub penalty_strokes_applied: usize,
    pub cut_penalty_score: i32,
    pub highest_non_cut_score: i32,
    pub valid_rounds: usize,
    pub round_details: BTreeMap<u8, RoundDetail>,
}

/// Output of one scoring pass over a leaderboard.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComputation {
    pub team_scores: Vec<TeamScoreResult>,
    pub round_id: Option<u8>,
    pub is_official_complete: bool,
    pub warnings: Vec<ScoreWarning>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSnapshot {
    pub tournament_id: String,
    pub team_scores: Vec<TeamScoreResult>,
    pub data_hash: String,
    pub calculated_at: DateTime<Utc>,
    pub round_id: Option<u8>,
    pub is_official_complete: bool,
    #[serde(default)]
    pub warnings: Vec<ScoreWarning>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoredScores {
    Found { snapshot: CalculationSnapshot },
    NoStoredScores { tournament_id: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub snapshot: CalculationSnapshot,
    pub from_storage: bool,
    /// Problems with the store itself; the snapshot is still usable.
    pub warnings: Vec<ScoreWarning>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitCounters {
    pub daily_calls: u32,
    pub monthly_calls: u32,
    pub daily_limit: u32,
    pub monthly_limit: u32,
    pub last_call_at: Option<DateTime<Utc>>,
    /// UTC day the counters were last rolled to.
    pub period_day: Option<NaiveDate>,
}

impl RateLimitCounters {
    #[must_use]
    pub fn zeroed(daily_limit: u32, monthly_limit: u32) -> Self {
        Self {
            daily_calls: 0,
            monthly_calls: 0,
            daily_limit,
            monthly_limit,
            last_call_at: None,
            period_day: None,
        }
    }

    #[must_use]
    pub fn remaining_daily(&self) -> u32 {
        self.daily_limit.saturating_sub(self.daily_calls)
    }

    #[must_use]
    pub fn remaining_monthly(&self) -> u32 {
        self.monthly_limit.saturating_sub(self.monthly_calls)
    }
}
