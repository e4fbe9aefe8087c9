//! Budget gate for calls to the leaderboard provider.
//!
//! Counters are plain data ([`RateLimitCounters`]) held behind a mutex so the
//! check-and-increment is atomic within the process. Day and month rollover
//! is applied lazily, on the next touch after the boundary, using the
//! injected [`Clock`].

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::Clock;
use crate::error::{CoreError, LimitScope};
use crate::model::RateLimitCounters;
use crate::storage::CounterStore;

pub const DEFAULT_DAILY_LIMIT: u32 = 20;
pub const DEFAULT_MONTHLY_LIMIT: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub daily_limit: u32,
    pub monthly_limit: u32,
    /// UTC time of day live coverage starts.
    pub coverage_start: NaiveTime,
    /// UTC time of day after which no more calls are planned.
    pub coverage_end: NaiveTime,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            monthly_limit: DEFAULT_MONTHLY_LIMIT,
            coverage_start: NaiveTime::from_hms_opt(11, 0, 0).unwrap_or(NaiveTime::MIN),
            coverage_end: NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Advice on whether now is a good time to spend a call. Never blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalHint {
    NoPriorCall,
    BudgetExhausted,
    OutsideCoverage,
    Early { wait: Duration, target: Duration },
    OnTime { target: Duration },
    Late { by: Duration, target: Duration },
}

impl fmt::Display for IntervalHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalHint::NoPriorCall => write!(f, "no call made yet today"),
            IntervalHint::BudgetExhausted => write!(f, "no calls left in the budget"),
            IntervalHint::OutsideCoverage => write!(f, "outside the coverage window"),
            IntervalHint::Early { wait, target } => write!(
                f,
                "early: wait {}m (target interval {}m)",
                wait.num_minutes(),
                target.num_minutes()
            ),
            IntervalHint::OnTime { target } => {
                write!(f, "on time (target interval {}m)", target.num_minutes())
            }
            IntervalHint::Late { by, target } => write!(
                f,
                "late by {}m (target interval {}m)",
                by.num_minutes(),
                target.num_minutes()
            ),
        }
    }
}

pub struct RateLimiter {
    counters: Mutex<RateLimitCounters>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

fn roll_period(counters: &mut RateLimitCounters, now: DateTime<Utc>) {
    let today = now.date_naive();
    if let Some(day) = counters.period_day {
        if day != today {
            counters.daily_calls = 0;
            if (day.year(), day.month()) != (today.year(), today.month()) {
                counters.monthly_calls = 0;
            }
        }
    }
    counters.period_day = Some(today);
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_counters(None, config, clock)
    }

    /// Start from previously persisted counters. Configured limits win over
    /// the persisted ones.
    #[must_use]
    pub fn from_counters(
        counters: Option<RateLimitCounters>,
        config: RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut counters = counters
            .unwrap_or_else(|| RateLimitCounters::zeroed(config.daily_limit, config.monthly_limit));
        counters.daily_limit = config.daily_limit;
        counters.monthly_limit = config.monthly_limit;
        roll_period(&mut counters, clock.now());
        Self {
            counters: Mutex::new(counters),
            config,
            clock,
        }
    }

    /// Load counters from `store`, starting from zero if there are none or
    /// they cannot be read.
    pub async fn restore(
        store: &dyn CounterStore,
        config: RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let counters = match store.load_counters().await {
            Ok(counters) => counters,
            Err(e) => {
                log::warn!("could not load rate limit counters, starting from zero: {e}");
                None
            }
        };
        Self::from_counters(counters, config, clock)
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitCounters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Take one call from the budget.
    ///
    /// # Errors
    /// Returns `CoreError::RateLimitExceeded` when the daily or monthly
    /// budget is spent. Counters are left untouched in that case.
    pub fn try_acquire(&self) -> Result<RateLimitCounters, CoreError> {
        let now = self.clock.now();
        let mut counters = self.lock();
        roll_period(&mut counters, now);

        if counters.daily_calls >= counters.daily_limit {
            log::warn!(
                "daily API budget spent ({}/{})",
                counters.daily_calls,
                counters.daily_limit
            );
            return Err(CoreError::RateLimitExceeded {
                scope: LimitScope::Daily,
                used: counters.daily_calls,
                limit: counters.daily_limit,
            });
        }
        if counters.monthly_calls >= counters.monthly_limit {
            log::warn!(
                "monthly API budget spent ({}/{})",
                counters.monthly_calls,
                counters.monthly_limit
            );
            return Err(CoreError::RateLimitExceeded {
                scope: LimitScope::Monthly,
                used: counters.monthly_calls,
                limit: counters.monthly_limit,
            });
        }

        counters.daily_calls += 1;
        counters.monthly_calls += 1;
        counters.last_call_at = Some(now);
        log::info!(
            "API call {}/{} today, {}/{} this month",
            counters.daily_calls,
            counters.daily_limit,
            counters.monthly_calls,
            counters.monthly_limit
        );
        Ok(counters.clone())
    }

    /// [`try_acquire`](Self::try_acquire), then persist the counters. A
    /// failed write is logged; the call is still granted.
    ///
    /// # Errors
    /// Returns `CoreError::RateLimitExceeded` when the budget is spent.
    pub async fn try_acquire_api_call(
        &self,
        store: &dyn CounterStore,
    ) -> Result<RateLimitCounters, CoreError> {
        let counters = self.try_acquire()?;
        if let Err(e) = store.store_counters(&counters).await {
            log::warn!("could not persist rate limit counters: {e}");
        }
        Ok(counters)
    }

    /// Current counters, with any pending day/month rollover applied.
    #[must_use]
    pub fn status(&self) -> RateLimitCounters {
        let now = self.clock.now();
        let mut counters = self.lock();
        roll_period(&mut counters, now);
        counters.clone()
    }

    /// Compare the time since the last call against the even spacing of
    /// the remaining budget over the rest of today's coverage window.
    #[must_use]
    pub fn interval_hint(&self) -> IntervalHint {
        let now = self.clock.now();
        let counters = self.status();
        let remaining = counters
            .remaining_daily()
            .min(counters.remaining_monthly());
        if remaining == 0 {
            return IntervalHint::BudgetExhausted;
        }

        let time = now.time();
        if time >= self.config.coverage_end {
            return IntervalHint::OutsideCoverage;
        }
        let window_start = time.max(self.config.coverage_start);
        let window = self.config.coverage_end.signed_duration_since(window_start);
        let target = window / i32::try_from(remaining).unwrap_or(i32::MAX);

        let Some(last) = counters.last_call_at else {
            return IntervalHint::NoPriorCall;
        };
        let elapsed = now - last;
        if elapsed < target {
            IntervalHint::Early {
                wait: target - elapsed,
                target,
            }
        } else if elapsed <= target + target / 2 {
            IntervalHint::OnTime { target }
        } else {
            IntervalHint::Late {
                by: elapsed - target,
                target,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn limiter(daily: u32, monthly: u32, clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(
            RateLimitConfig {
                daily_limit: daily,
                monthly_limit: monthly,
                ..RateLimitConfig::default()
            },
            clock,
        )
    }

    #[test]
    fn daily_limit_then_reset() {
        let clock = Arc::new(ManualClock::new(at(2025, 4, 10, 12)));
        let limiter = limiter(3, 100, clock.clone());
        for _ in 0..3 {
            assert!(limiter.try_acquire().is_ok());
        }
        let err = limiter.try_acquire().unwrap_err();
        assert_eq!(
            err,
            CoreError::RateLimitExceeded {
                scope: LimitScope::Daily,
                used: 3,
                limit: 3
            }
        );
        assert_eq!(limiter.status().daily_calls, 3);

        clock.advance(Duration::days(1));
        let counters = limiter.try_acquire().unwrap();
        assert_eq!(counters.daily_calls, 1);
        assert_eq!(counters.monthly_calls, 4);
    }

    #[test]
    fn monthly_limit_survives_day_change_until_month_change() {
        let clock = Arc::new(ManualClock::new(at(2025, 4, 29, 12)));
        let limiter = limiter(10, 2, clock.clone());
        assert!(limiter.try_acquire().is_ok());
        clock.advance(Duration::days(1));
        assert!(limiter.try_acquire().is_ok());
        assert!(matches!(
            limiter.try_acquire(),
            Err(CoreError::RateLimitExceeded {
                scope: LimitScope::Monthly,
                ..
            })
        ));

        clock.set(at(2025, 5, 1, 0));
        let status = limiter.status();
        assert_eq!(status.monthly_calls, 0);
        assert_eq!(status.daily_calls, 0);
        assert!(limiter.try_acquire().is_ok());
    }

    #[test]
    fn configured_limits_override_persisted_ones() {
        let clock = Arc::new(ManualClock::new(at(2025, 4, 10, 12)));
        let mut persisted = RateLimitCounters::zeroed(1, 1);
        persisted.daily_calls = 1;
        persisted.monthly_calls = 1;
        persisted.period_day = Some(at(2025, 4, 10, 0).date_naive());
        let limiter =
            RateLimiter::from_counters(Some(persisted), RateLimitConfig::default(), clock);
        let status = limiter.status();
        assert_eq!(status.daily_limit, DEFAULT_DAILY_LIMIT);
        assert_eq!(status.daily_calls, 1);
        assert!(limiter.try_acquire().is_ok());
    }

    #[test]
    fn interval_hint_spreads_remaining_calls() {
        let clock = Arc::new(ManualClock::new(at(2025, 4, 10, 12)));
        let limiter = limiter(4, 100, clock.clone());
        assert_eq!(limiter.interval_hint(), IntervalHint::NoPriorCall);

        assert!(limiter.try_acquire().is_ok());
        // 12:30, 3 calls over ~11.5h left: target ~3h50m
        clock.advance(Duration::minutes(30));
        assert!(matches!(limiter.interval_hint(), IntervalHint::Early { .. }));

        // 15:30, target ~2h50m, 3h30m since the call
        clock.advance(Duration::hours(3));
        assert!(matches!(limiter.interval_hint(), IntervalHint::OnTime { .. }));

        clock.advance(Duration::hours(3));
        assert!(matches!(limiter.interval_hint(), IntervalHint::Late { .. }));
    }

    #[test]
    fn interval_hint_edges() {
        let clock = Arc::new(ManualClock::new(at(2025, 4, 10, 12)));
        let limiter = limiter(1, 100, clock.clone());
        assert!(limiter.try_acquire().is_ok());
        assert_eq!(limiter.interval_hint(), IntervalHint::BudgetExhausted);

        let late = Arc::new(ManualClock::new(
            at(2025, 4, 10, 23) + Duration::minutes(59) + Duration::seconds(59),
        ));
        let limiter = self::limiter(5, 100, late);
        assert_eq!(limiter.interval_hint(), IntervalHint::OutsideCoverage);
    }
}
