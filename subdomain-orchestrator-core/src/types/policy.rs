use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// What happens to a released row once its cooldown has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Delete the stale row when the name is claimed again.
    #[default]
    UntilReclaim,
    /// Keep released rows for audit; a reclaim inserts a new row beside them.
    Indefinite,
}

/// Tunables of the lifecycle state machine.
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    pub cooldown: TimeDelta,
    /// Quota for principals without an override
    pub default_subdomain_limit: u32,
    pub retention: RetentionPolicy,
    pub dns_ttl: u32,
    /// Upper bound for any single DNS provider call
    pub dns_timeout: Duration,
    /// Port given to a freshly claimed row
    pub default_port: u16,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            cooldown: TimeDelta::days(30),
            default_subdomain_limit: 5,
            retention: RetentionPolicy::UntilReclaim,
            dns_ttl: subdomain_orchestrator_provider::DEFAULT_TTL,
            dns_timeout: Duration::from_secs(30),
            default_port: 80,
        }
    }
}

/// Sliding-window limit applied per principal to `claim` and `activate`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_operations: u32,
    pub window: TimeDelta,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_operations: 10,
            window: TimeDelta::seconds(60),
        }
    }
}
