use anyhow::{Context, Result};
use chrono::{Duration, NaiveTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::Cli;
use crate::provider::{DEFAULT_ORG_ID, DEFAULT_YEAR, client::DEFAULT_API_HOST};
use crate::rate_limit::RateLimitConfig;

pub const DEFAULT_STORE_DIR: &str = "data";
pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 60;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
struct FileConfig {
    store_dir: Option<PathBuf>,
    api_key: Option<String>,
    api_host: Option<String>,
    api_base_url: Option<String>,
    org_id: Option<String>,
    year: Option<String>,
    daily_limit: Option<u32>,
    monthly_limit: Option<u32>,
    coverage_start: Option<NaiveTime>,
    coverage_end: Option<NaiveTime>,
    cache_ttl_minutes: Option<i64>,
}

/// Settings after merging the command line over the TOML file over defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_dir: PathBuf,
    pub api_key: Option<String>,
    pub api_host: String,
    pub api_base_url: Option<String>,
    pub org_id: String,
    pub year: String,
    pub rate_limit: RateLimitConfig,
    pub cache_ttl: Duration,
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config toml {}", path.display()))?;
    toml::from_str::<FileConfig>(&contents)
        .with_context(|| format!("parse config toml {}", path.display()))
}

/// Load config from CLI and optional TOML file.
///
/// # Errors
/// Returns an error if the config file is unreadable or invalid, or if the
/// coverage window is empty.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let file_config = match cli.config_toml.as_deref() {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    let defaults = RateLimitConfig::default();
    let rate_limit = RateLimitConfig {
        daily_limit: cli
            .daily_limit
            .or(file_config.daily_limit)
            .unwrap_or(defaults.daily_limit),
        monthly_limit: cli
            .monthly_limit
            .or(file_config.monthly_limit)
            .unwrap_or(defaults.monthly_limit),
        coverage_start: file_config.coverage_start.unwrap_or(defaults.coverage_start),
        coverage_end: file_config.coverage_end.unwrap_or(defaults.coverage_end),
    };
    if rate_limit.coverage_start >= rate_limit.coverage_end {
        anyhow::bail!(
            "coverage_start {} must be before coverage_end {}",
            rate_limit.coverage_start,
            rate_limit.coverage_end
        );
    }

    let ttl_minutes = file_config
        .cache_ttl_minutes
        .unwrap_or(DEFAULT_CACHE_TTL_MINUTES)
        .max(0);

    Ok(AppConfig {
        store_dir: cli
            .store_dir
            .clone()
            .or(file_config.store_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
        api_key: cli
            .api_key
            .clone()
            .or(file_config.api_key)
            .filter(|key| !key.trim().is_empty()),
        api_host: file_config
            .api_host
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
        api_base_url: file_config.api_base_url,
        org_id: file_config
            .org_id
            .unwrap_or_else(|| DEFAULT_ORG_ID.to_string()),
        year: file_config
            .year
            .unwrap_or_else(|| DEFAULT_YEAR.to_string()),
        rate_limit,
        cache_ttl: Duration::minutes(ttl_minutes),
    })
}
