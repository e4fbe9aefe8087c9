use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::Value;
use std::fs;
use std::sync::Arc;

use rusty_golf_teams::CoreError;
use rusty_golf_teams::args::{AppConfig, Cli, Command, load_config};
use rusty_golf_teams::clock::{Clock, SystemClock};
use rusty_golf_teams::model::StoredScores;
use rusty_golf_teams::provider::{
    FetchDeps, LeaderboardCache, LeaderboardRequest, RapidApiClient, fetch_leaderboard_gated,
};
use rusty_golf_teams::rate_limit::RateLimiter;
use rusty_golf_teams::storage::FileStore;
use rusty_golf_teams::{Deps, get_stored_scores, snapshot_or_stored};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = FileStore::new(&config.store_dir);

    match cli.command {
        Command::Scores {
            tournament,
            leaderboard,
            org_id,
            year,
            force,
        } => {
            let fetched = match leaderboard {
                Some(path) => {
                    let contents = fs::read_to_string(&path)
                        .with_context(|| format!("read leaderboard {}", path.display()))?;
                    Ok(serde_json::from_str::<Value>(&contents)
                        .with_context(|| format!("parse leaderboard {}", path.display()))?)
                }
                None => {
                    let request = LeaderboardRequest::new(
                        org_id.unwrap_or_else(|| config.org_id.clone()),
                        tournament.id.clone(),
                        year.unwrap_or_else(|| config.year.clone()),
                    );
                    fetch_raw(&config, &store, clock.clone(), &request).await?
                }
            };

            let deps = Deps {
                store: &store,
                clock: &*clock,
            };
            let response = snapshot_or_stored(deps, &tournament, fetched, force)
                .await
                .with_context(|| format!("scores for {}", tournament.id))?;
            for warning in &response.warnings {
                log::warn!("{warning}");
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Stored { tournament_id } => {
            let stored = get_stored_scores(&store, &tournament_id).await?;
            if let StoredScores::NoStoredScores { .. } = &stored {
                log::info!("no stored scores for {tournament_id}");
            }
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Command::RateStatus => {
            let limiter = RateLimiter::restore(&store, config.rate_limit, clock).await;
            println!("{}", serde_json::to_string_pretty(&limiter.status())?);
            println!("{}", limiter.interval_hint());
        }
    }
    Ok(())
}

/// The outer error is a setup problem; the inner one is the fetch outcome,
/// which the caller may still recover from with stored scores.
async fn fetch_raw(
    config: &AppConfig,
    store: &FileStore,
    clock: Arc<dyn Clock>,
    request: &LeaderboardRequest,
) -> Result<Result<Value, CoreError>> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| anyhow!("missing --api-key (or RAPIDAPI_KEY) and no --leaderboard"))?;
    let mut client = RapidApiClient::with_host(api_key, config.api_host.clone());
    if let Some(base_url) = &config.api_base_url {
        client = client.base_url(base_url.clone());
    }

    let limiter = RateLimiter::restore(store, config.rate_limit, clock.clone()).await;
    let cache = LeaderboardCache::new(config.cache_ttl, clock);
    let deps = FetchDeps {
        provider: &client,
        limiter: &limiter,
        counters: store,
        cache: &cache,
    };
    let fetched = fetch_leaderboard_gated(deps, request).await;
    match &fetched {
        Ok(f) => log::info!("leaderboard for {} from {}", request.tourn_id, f.source),
        Err(e) => log::warn!("leaderboard for {} unavailable: {e}", request.tourn_id),
    }
    Ok(fetched.map(|f| f.payload))
}
