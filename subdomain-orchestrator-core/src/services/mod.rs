//! Business logic service layer

mod lifecycle_service;
mod rate_limiter;
mod route_service;

pub use lifecycle_service::LifecycleService;
pub use rate_limiter::{RateLimitedLifecycle, RateLimiter};
pub use route_service::RouteService;

use std::future::Future;
use std::sync::Arc;

use subdomain_orchestrator_provider::{DnsProvider, ProviderError};

use crate::error::{CoreError, CoreResult};
use crate::traits::{Clock, RouteWriter, SubdomainRepository, SystemClock};
use crate::types::LifecyclePolicy;

/// Service context - holds every dependency
///
/// The hosting layer builds this once and injects its storage, DNS and routing
/// implementations. `dns_provider` and `route_writer` are optional: when absent
/// the matching side effects are skipped and the state machine still runs.
pub struct ServiceContext {
    pub subdomain_repository: Arc<dyn SubdomainRepository>,
    pub dns_provider: Option<Arc<dyn DnsProvider>>,
    pub route_writer: Option<Arc<dyn RouteWriter>>,
    pub clock: Arc<dyn Clock>,
    pub policy: LifecyclePolicy,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        subdomain_repository: Arc<dyn SubdomainRepository>,
        dns_provider: Option<Arc<dyn DnsProvider>>,
        route_writer: Option<Arc<dyn RouteWriter>>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            subdomain_repository,
            dns_provider,
            route_writer,
            clock: Arc::new(SystemClock),
            policy,
        }
    }

    /// Replace the wall clock (tests drive cooldowns with a manual clock).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one DNS provider call under the configured timeout.
    ///
    /// An elapsed timeout surfaces as [`ProviderError::Timeout`] so callers see
    /// a single failure shape for the DNS gate.
    pub(crate) async fn dns_call<T, F>(&self, provider: &dyn DnsProvider, call: F) -> CoreResult<T>
    where
        F: Future<Output = subdomain_orchestrator_provider::Result<T>>,
    {
        let timeout = self.policy.dns_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => Err(CoreError::Dns(ProviderError::Timeout {
                provider: provider.id().to_string(),
                detail: format!("no response within {}s", timeout.as_secs()),
            })),
        }
    }
}
