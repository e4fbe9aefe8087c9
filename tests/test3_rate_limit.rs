mod common;

use chrono::Duration;

use rusty_golf_teams::CoreError;
use rusty_golf_teams::error::LimitScope;
use rusty_golf_teams::rate_limit::{IntervalHint, RateLimitConfig, RateLimiter};
use rusty_golf_teams::storage::{CounterStore, FileStore};

fn config(daily: u32) -> RateLimitConfig {
    RateLimitConfig {
        daily_limit: daily,
        ..RateLimitConfig::default()
    }
}

#[tokio::test]
async fn test3_daily_limit_resets_at_day_boundary() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path());
    let clock = common::tournament_clock();

    let limiter = RateLimiter::restore(&store, config(3), clock.clone()).await;
    for _ in 0..3 {
        limiter.try_acquire_api_call(&store).await?;
    }
    let err = limiter.try_acquire_api_call(&store).await.unwrap_err();
    assert_eq!(
        err,
        CoreError::RateLimitExceeded {
            scope: LimitScope::Daily,
            used: 3,
            limit: 3,
        }
    );
    assert_eq!(limiter.interval_hint(), IntervalHint::BudgetExhausted);

    clock.set(common::at(2025, 4, 11, 0, 0));
    let counters = limiter.try_acquire_api_call(&store).await?;
    assert_eq!(counters.daily_calls, 1);
    assert_eq!(counters.monthly_calls, 4);
    Ok(())
}

#[tokio::test]
async fn test3_counters_persist_across_restarts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let clock = common::tournament_clock();

    {
        let store = FileStore::new(dir.path());
        let limiter = RateLimiter::restore(&store, config(2), clock.clone()).await;
        limiter.try_acquire_api_call(&store).await?;
        limiter.try_acquire_api_call(&store).await?;
    }

    let store = FileStore::new(dir.path());
    let persisted = store.load_counters().await?.ok_or("no counters on disk")?;
    assert_eq!(persisted.daily_calls, 2);
    assert_eq!(persisted.last_call_at, Some(common::at(2025, 4, 10, 12, 0)));

    let limiter = RateLimiter::restore(&store, config(2), clock.clone()).await;
    assert!(limiter.try_acquire().unwrap_err().is_rate_limited());

    // raising the configured limit takes effect over the persisted one
    let limiter = RateLimiter::restore(&store, config(5), clock).await;
    assert_eq!(limiter.status().daily_limit, 5);
    assert!(limiter.try_acquire().is_ok());
    Ok(())
}

#[tokio::test]
async fn test3_unreadable_counters_start_from_zero() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path());
    let path = store.counters_path();
    std::fs::create_dir_all(path.parent().ok_or("no parent")?)?;
    std::fs::write(&path, "not json")?;

    let clock = common::tournament_clock();
    let limiter = RateLimiter::restore(&store, config(3), clock).await;
    assert_eq!(limiter.status().daily_calls, 0);
    assert_eq!(limiter.interval_hint(), IntervalHint::NoPriorCall);
    Ok(())
}

#[tokio::test]
async fn test3_interval_hint_after_a_call() -> Result<(), Box<dyn std::error::Error>> {
    let store = rusty_golf_teams::storage::MemoryStore::new();
    let clock = common::tournament_clock();
    let limiter = RateLimiter::restore(&store, config(12), clock.clone()).await;
    limiter.try_acquire_api_call(&store).await?;

    clock.advance(Duration::minutes(5));
    match limiter.interval_hint() {
        IntervalHint::Early { wait, target } => {
            assert!(wait < target);
            assert!(target > Duration::minutes(30));
        }
        other => return Err(format!("expected Early, got {other:?}").into()),
    }
    Ok(())
}
