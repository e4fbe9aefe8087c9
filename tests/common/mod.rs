#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;

use rusty_golf_teams::clock::ManualClock;
use rusty_golf_teams::model::Tournament;

pub const ALPHA_LEADERBOARD: &str = include_str!("../fixtures/alpha_leaderboard.json");
pub const TOURNAMENT: &str = include_str!("../fixtures/tournament.json");

pub fn leaderboard() -> Result<Value, serde_json::Error> {
    serde_json::from_str(ALPHA_LEADERBOARD)
}

pub fn tournament() -> Result<Tournament, serde_json::Error> {
    serde_json::from_str(TOURNAMENT)
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("valid test timestamp")
}

/// A clock parked at noon UTC on the Thursday of tournament week.
pub fn tournament_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(at(2025, 4, 10, 12, 0)))
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
