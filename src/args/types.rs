use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Tournament;

#[derive(Parser, Debug)]
#[command(author, version, about = "Team scores from live golf leaderboards", long_about = None)]
pub struct Cli {
    /// Optional TOML settings file. Command line values win over it.
    #[arg(long, global = true, value_name = "CONFIG_TOML")]
    pub config_toml: Option<PathBuf>,
    /// Directory holding stored snapshots and rate limit counters.
    #[arg(long, global = true, value_name = "STORE_DIR")]
    pub store_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "RAPIDAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, global = true)]
    pub daily_limit: Option<u32>,
    #[arg(long, global = true)]
    pub monthly_limit: Option<u32>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Calculate team scores, or serve the stored ones if the leaderboard is unchanged.
    Scores {
        #[arg(
            long,
            value_name = "TOURNAMENT_JSON",
            value_parser = crate::args::validation::check_readable_file_and_json
        )]
        tournament: Tournament,
        /// Score a leaderboard saved on disk instead of calling the provider.
        #[arg(long, value_name = "LEADERBOARD_JSON")]
        leaderboard: Option<PathBuf>,
        #[arg(long)]
        org_id: Option<String>,
        #[arg(long)]
        year: Option<String>,
        /// Recalculate even if the leaderboard has not changed.
        #[arg(long)]
        force: bool,
    },
    /// Print the stored snapshot for a tournament without calculating.
    Stored {
        #[arg(long)]
        tournament_id: String,
    },
    /// Print API budget usage and the suggested time until the next call.
    RateStatus,
}
