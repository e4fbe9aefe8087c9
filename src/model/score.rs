use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROUNDS: usize = 4;

/// What the leaderboard says about one golfer-round, before it is flattened
/// into a [`RoundScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Observed(i32),
    Live(i32),
    Penalty(i32),
    Absent,
}

/// One golfer's score for one round, relative to par.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundScore {
    pub value: Option<i32>,
    pub is_live: bool,
    pub is_penalty: bool,
}

impl RoundScore {
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn observed(value: i32) -> Self {
        RoundOutcome::Observed(value).into()
    }

    #[must_use]
    pub fn live(value: i32) -> Self {
        RoundOutcome::Live(value).into()
    }

    #[must_use]
    pub fn penalty(value: i32) -> Self {
        RoundOutcome::Penalty(value).into()
    }

    #[must_use]
    pub fn outcome(&self) -> RoundOutcome {
        match self.value {
            None => RoundOutcome::Absent,
            Some(v) if self.is_penalty => RoundOutcome::Penalty(v),
            Some(v) if self.is_live => RoundOutcome::Live(v),
            Some(v) => RoundOutcome::Observed(v),
        }
    }

    /// A finished, real round: present, not live, not a penalty.
    #[must_use]
    pub fn completed_value(&self) -> Option<i32> {
        match self.outcome() {
            RoundOutcome::Observed(v) => Some(v),
            _ => None,
        }
    }
}

impl From<RoundOutcome> for RoundScore {
    fn from(outcome: RoundOutcome) -> Self {
        match outcome {
            RoundOutcome::Observed(v) => Self {
                value: Some(v),
                is_live: false,
                is_penalty: false,
            },
            RoundOutcome::Live(v) => Self {
                value: Some(v),
                is_live: true,
                is_penalty: false,
            },
            RoundOutcome::Penalty(v) => Self {
                value: Some(v),
                is_live: false,
                is_penalty: true,
            },
            RoundOutcome::Absent => Self::absent(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GolferStatus {
    Active,
    Cut,
    Withdrawn,
    Other,
}

impl GolferStatus {
    #[must_use]
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "active" | "complete" | "" => Self::Active,
            "cut" | "mc" => Self::Cut,
            "wd" | "withdrawn" => Self::Withdrawn,
            _ => Self::Other,
        }
    }

    /// Cut and withdrawn golfers are owed penalty rounds.
    #[must_use]
    pub fn is_eliminated(self) -> bool {
        matches!(self, Self::Cut | Self::Withdrawn)
    }
}

impl fmt::Display for GolferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Cut => "cut",
            Self::Withdrawn => "withdrawn",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GolferResult {
    pub name: String,
    pub player_id: Option<String>,
    pub status: GolferStatus,
    pub rounds: [RoundScore; ROUNDS],
    pub total: i32,
}

impl GolferResult {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        player_id: Option<String>,
        status: GolferStatus,
        rounds: [RoundScore; ROUNDS],
    ) -> Self {
        let mut golfer = Self {
            name: name.into(),
            player_id,
            status,
            rounds,
            total: 0,
        };
        golfer.recompute_total();
        golfer
    }

    /// Saturates instead of overflowing; the normalizer reports such rows.
    pub fn recompute_total(&mut self) {
        self.total = self
            .rounds
            .iter()
            .filter_map(|r| r.value)
            .fold(0i32, i32::saturating_add);
    }

    /// 1-based number of the last round with a real (non-penalty) value.
    #[must_use]
    pub fn last_played_round(&self) -> Option<usize> {
        self.rounds
            .iter()
            .rposition(|r| r.value.is_some() && !r.is_penalty)
            .map(|idx| idx + 1)
    }
}
