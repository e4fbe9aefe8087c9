use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitScope {
    Daily,
    Monthly,
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LimitScope::Daily => "daily",
            LimitScope::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("{scope} rate limit exceeded ({used}/{limit} calls used)")]
    RateLimitExceeded {
        scope: LimitScope,
        used: u32,
        limit: u32,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

/// Recoverable problems found while scoring. These travel with the result
/// instead of failing it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScoreWarning {
    #[error("malformed data for {golfer} (round {}): {detail}", .round.map_or_else(|| "-".to_string(), |r| r.to_string()))]
    #[serde(rename_all = "camelCase")]
    MalformedRoundData {
        golfer: String,
        round: Option<u8>,
        detail: String,
    },
    #[error("team {team} has {found} of {expected} golfers (missing: {})", .missing.join(", "))]
    #[serde(rename_all = "camelCase")]
    IncompleteTeamData {
        team: String,
        expected: usize,
        found: usize,
        missing: Vec<String>,
    },
    #[error("team {team} has no valid rounds to base a cut penalty on, using 0")]
    #[serde(rename_all = "camelCase")]
    NoPenaltyBaseline { team: String },
    #[error("team {team} could not be scored: {detail}")]
    #[serde(rename_all = "camelCase")]
    TeamFailed { team: String, detail: String },
    #[error("persistence failure: {detail}")]
    #[serde(rename_all = "camelCase")]
    Persistence { detail: String },
}
