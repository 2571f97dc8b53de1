//! Pricing settings cache with a rate-limit circuit breaker
//!
//! The backend serves a small pricing settings object that finance-cost
//! quoting reads on nearly every render. This crate caches it behind an
//! explicit service object with three observable states:
//!
//! - **Fresh**: cached value younger than the TTL, served directly.
//! - **Stale**: older than the TTL; the cached value is served immediately
//!   and a single background refetch is triggered.
//! - **Rate limited**: a fetch hit the backend's rate limiter; retries are
//!   suspended for a backoff window. The cached value is served if one
//!   exists, otherwise callers get an explicit "try again in N seconds"
//!   error. Nothing retries silently inside the window.
//!
//! The backoff doubles per consecutive rate-limit response, capped at five
//! minutes, unless the server supplies `retry_after`, which wins. Concurrent
//! refreshes are deduplicated through a single-flight lock: late arrivals
//! wait for the in-flight fetch and share its result.
//!
//! The service is constructed once at startup and shared via `Arc`; it is
//! not a hidden module global. `reset()` exists for tests and operator
//! recovery. Time is `tokio::time::Instant`, so tests drive the TTL and
//! backoff with a paused clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use greenseal_utils::types::Submission;

/// First backoff window after a rate-limit response, in seconds.
pub const BASE_BACKOFF_SECS: u64 = 60;
/// Backoff ceiling, in seconds.
pub const MAX_BACKOFF_SECS: u64 = 300;
/// Default cache TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Pricing settings as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    pub base_fee_cents: u64,
    pub per_bag_fee_cents: u64,
    /// Multiplier applied to urgent submissions, in percent (150 = 1.5x).
    pub urgent_multiplier_percent: u64,
    pub currency: String,
}

/// Transport-level outcome of a settings fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("settings endpoint rate limited")]
    RateLimited { retry_after: Option<u64> },
    #[error("settings fetch failed: {0}")]
    Transport(String),
}

/// Errors surfaced to settings consumers.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings temporarily unavailable, try again in {retry_in_secs} second(s)")]
    RateLimited { retry_in_secs: u64 },
    #[error("settings fetch failed: {0}")]
    Fetch(String),
}

/// The settings endpoint, injected so tests and embedders control transport.
#[async_trait]
pub trait SettingsFetcher: Send + Sync {
    async fn fetch(&self) -> Result<PricingSettings, FetchError>;
}

#[derive(Debug)]
struct CachedSettings {
    value: PricingSettings,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    cached: Option<CachedSettings>,
    consecutive_rate_limits: u32,
    suspended_until: Option<Instant>,
    background_refresh_running: bool,
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn backoff_secs(consecutive: u32) -> u64 {
    let doubling = consecutive.saturating_sub(1).min(8);
    BASE_BACKOFF_SECS
        .saturating_mul(1 << doubling)
        .min(MAX_BACKOFF_SECS)
}

fn secs_until(deadline: Instant) -> u64 {
    deadline.saturating_duration_since(Instant::now()).as_secs().max(1)
}

enum ReadPlan {
    Serve(PricingSettings),
    ServeAndRefresh(PricingSettings),
    Suspended { retry_in_secs: u64 },
    Fetch,
}

/// Process-wide pricing settings service.
pub struct SettingsService<F> {
    fetcher: F,
    ttl: Duration,
    state: Mutex<CacheState>,
    // Single-flight guard: at most one fetch in flight; late arrivals wait
    // here and then re-read the refreshed cache.
    fetch_serial: tokio::sync::Mutex<()>,
}

impl<F> SettingsService<F>
where
    F: SettingsFetcher + 'static,
{
    pub fn new(fetcher: F) -> Arc<Self> {
        Self::with_ttl(fetcher, DEFAULT_TTL)
    }

    pub fn with_ttl(fetcher: F, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            ttl,
            state: Mutex::new(CacheState::default()),
            fetch_serial: tokio::sync::Mutex::new(()),
        })
    }

    /// Current settings, from cache when possible.
    ///
    /// Serves fresh values directly, serves stale values while refreshing in
    /// the background, and during a rate-limit window serves whatever is
    /// cached or reports the remaining wait.
    pub async fn get(self: &Arc<Self>) -> Result<PricingSettings, SettingsError> {
        let plan = {
            let mut state = lock(&self.state);
            let now = Instant::now();

            if let Some(until) = state.suspended_until
                && now < until
            {
                match &state.cached {
                    Some(cached) => ReadPlan::Serve(cached.value.clone()),
                    None => ReadPlan::Suspended {
                        retry_in_secs: secs_until(until),
                    },
                }
            } else {
                match &state.cached {
                    Some(cached) if now.duration_since(cached.fetched_at) <= self.ttl => {
                        ReadPlan::Serve(cached.value.clone())
                    }
                    Some(cached) => {
                        let value = cached.value.clone();
                        if state.background_refresh_running {
                            ReadPlan::Serve(value)
                        } else {
                            state.background_refresh_running = true;
                            ReadPlan::ServeAndRefresh(value)
                        }
                    }
                    None => ReadPlan::Fetch,
                }
            }
        };

        match plan {
            ReadPlan::Serve(value) => Ok(value),
            ReadPlan::ServeAndRefresh(value) => {
                let service = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(err) = service.refresh().await {
                        debug!(error = %err, "background settings refresh deferred");
                    }
                    lock(&service.state).background_refresh_running = false;
                });
                Ok(value)
            }
            ReadPlan::Suspended { retry_in_secs } => {
                Err(SettingsError::RateLimited { retry_in_secs })
            }
            ReadPlan::Fetch => self.refresh().await,
        }
    }

    /// Remaining rate-limit suspension, if any. Lets callers render the
    /// "try again in N seconds" hint without attempting a fetch.
    #[must_use]
    pub fn suspended_for(&self) -> Option<Duration> {
        let state = lock(&self.state);
        let until = state.suspended_until?;
        let now = Instant::now();
        (now < until).then(|| until.saturating_duration_since(now))
    }

    /// Operator/test escape hatch: drop the cache and clear the rate-limit
    /// window so the next `get()` fetches immediately.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.cached = None;
        state.consecutive_rate_limits = 0;
        state.suspended_until = None;
    }

    async fn refresh(self: &Arc<Self>) -> Result<PricingSettings, SettingsError> {
        let _serial = self.fetch_serial.lock().await;

        // Re-check under the serial lock: a fetch that completed while this
        // caller waited already refreshed the cache or opened a rate-limit
        // window, and its result is shared instead of refetching.
        {
            let state = lock(&self.state);
            if let Some(cached) = &state.cached
                && cached.fetched_at.elapsed() <= self.ttl
            {
                return Ok(cached.value.clone());
            }
            if let Some(until) = state.suspended_until
                && Instant::now() < until
            {
                return match &state.cached {
                    Some(cached) => Ok(cached.value.clone()),
                    None => Err(SettingsError::RateLimited {
                        retry_in_secs: secs_until(until),
                    }),
                };
            }
        }

        match self.fetcher.fetch().await {
            Ok(value) => {
                let mut state = lock(&self.state);
                state.cached = Some(CachedSettings {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                });
                state.consecutive_rate_limits = 0;
                state.suspended_until = None;
                Ok(value)
            }
            Err(FetchError::RateLimited { retry_after }) => {
                let mut state = lock(&self.state);
                state.consecutive_rate_limits += 1;
                let wait = retry_after.unwrap_or_else(|| backoff_secs(state.consecutive_rate_limits));
                state.suspended_until = Some(Instant::now() + Duration::from_secs(wait));
                warn!(
                    wait_secs = wait,
                    consecutive = state.consecutive_rate_limits,
                    "settings fetch rate limited, suspending retries"
                );
                match &state.cached {
                    Some(cached) => Ok(cached.value.clone()),
                    None => Err(SettingsError::RateLimited { retry_in_secs: wait }),
                }
            }
            Err(FetchError::Transport(message)) => Err(SettingsError::Fetch(message)),
        }
    }
}

/// A finance cost quote for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeQuote {
    pub total_cents: u64,
    pub currency: String,
}

/// Quote the processing fee for `submission` under `settings`.
///
/// Base fee plus a per-bag fee, with the urgent multiplier applied when the
/// submission is flagged urgent.
#[must_use]
pub fn quote(settings: &PricingSettings, submission: &Submission) -> FeeQuote {
    let subtotal =
        settings.base_fee_cents + settings.per_bag_fee_cents * submission.bags.len() as u64;
    let total_cents = if submission.is_urgent {
        subtotal * settings.urgent_multiplier_percent / 100
    } else {
        subtotal
    };
    FeeQuote {
        total_cents,
        currency: settings.currency.clone(),
    }
}
