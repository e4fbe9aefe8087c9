pub mod args;
pub mod clock;
pub mod error;
pub mod model;
pub mod provider;
pub mod rate_limit;
pub mod score;
pub mod storage;

pub use error::{CoreError, ScoreWarning};
pub use score::{
    Deps, compute_team_scores, get_or_compute_snapshot, get_stored_scores, snapshot_or_stored,
};
