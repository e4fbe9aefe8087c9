pub mod aggregate;
pub mod gate;
pub mod normalize;
pub mod penalty;

pub use aggregate::*;
pub use gate::*;
pub use normalize::{data_hash, decode_int, normalize_leaderboard};
pub use penalty::*;
