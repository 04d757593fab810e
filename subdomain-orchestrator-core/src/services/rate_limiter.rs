//! Per-principal sliding-window rate limiting for mutating operations

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::warn;
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::services::LifecycleService;
use crate::traits::Clock;
use crate::types::{LifecycleOutcome, Principal, RateLimitPolicy, Subdomain};

/// Windows are pruned once this many principals are tracked.
const PRUNE_THRESHOLD: usize = 1024;

pub struct RateLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one operation for `principal_id`, or reject it with the number of
    /// seconds until the oldest hit in the window expires.
    pub async fn acquire(&self, principal_id: &str) -> CoreResult<()> {
        let now = self.clock.now();
        let window_start = now - self.policy.window;
        let mut windows = self.windows.lock().await;

        if windows.len() > PRUNE_THRESHOLD {
            windows.retain(|_, hits| hits.back().is_some_and(|t| *t > window_start));
        }

        let hits = windows.entry(principal_id.to_string()).or_default();
        while hits.front().is_some_and(|t| *t <= window_start) {
            hits.pop_front();
        }

        if hits.len() >= self.policy.max_operations as usize {
            let retry_after_secs = hits
                .front()
                .map_or(self.policy.window, |oldest| *oldest + self.policy.window - now)
                .num_seconds();
            let retry_after_secs = u64::try_from(retry_after_secs).unwrap_or(0).max(1);
            warn!("Rate limit hit for {principal_id}, retry after {retry_after_secs}s");
            return Err(CoreError::RateLimited { retry_after_secs });
        }

        hits.push_back(now);
        Ok(())
    }
}

/// [`LifecycleService`] with `claim` and `activate` behind a [`RateLimiter`].
///
/// Reads, releases and admin operations pass straight through via [`inner`](Self::inner).
pub struct RateLimitedLifecycle {
    inner: LifecycleService,
    limiter: Option<RateLimiter>,
}

impl RateLimitedLifecycle {
    #[must_use]
    pub fn new(inner: LifecycleService, limiter: RateLimiter) -> Self {
        Self {
            inner,
            limiter: Some(limiter),
        }
    }

    /// No limit on any operation.
    #[must_use]
    pub fn unlimited(inner: LifecycleService) -> Self {
        Self {
            inner,
            limiter: None,
        }
    }

    async fn acquire(&self, principal: &Principal) -> CoreResult<()> {
        match &self.limiter {
            Some(limiter) => limiter.acquire(&principal.id).await,
            None => Ok(()),
        }
    }

    pub fn inner(&self) -> &LifecycleService {
        &self.inner
    }

    pub async fn claim(&self, principal: &Principal, name: &str) -> CoreResult<Subdomain> {
        self.acquire(principal).await?;
        self.inner.claim(principal, name).await
    }

    pub async fn activate(
        &self,
        principal: &Principal,
        name: &str,
        ip: &str,
        port: u32,
    ) -> CoreResult<LifecycleOutcome> {
        self.acquire(principal).await?;
        self.inner.activate(principal, name, ip, port).await
    }
}
