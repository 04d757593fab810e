//! Application bootstrap for the subdomain orchestrator.
//!
//! Provides `AppConfig` (file + environment configuration), `AppState`
//! (service container), `AppStateBuilder` (adapter injection), the SQLite
//! store and Traefik route writer adapters, and the background route sync job.

pub mod adapters;
pub mod config;
pub mod jobs;

use std::sync::Arc;

use subdomain_orchestrator_core::error::{CoreError, CoreResult};
use subdomain_orchestrator_core::services::{
    LifecycleService, RateLimitedLifecycle, RateLimiter, RouteService, ServiceContext,
};
use subdomain_orchestrator_core::traits::{Clock, RouteWriter, SubdomainRepository, SystemClock};
use subdomain_orchestrator_core::types::{LifecyclePolicy, RateLimitPolicy};
use subdomain_orchestrator_provider::DnsProvider;
use tokio_util::sync::CancellationToken;

pub use config::AppConfig;
pub use jobs::RouteSyncJob;

/// Application state.
///
/// Holds the `ServiceContext` and the services built on it. Every frontend
/// constructs this once at startup via `AppStateBuilder` or [`AppState::from_config`].
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Lifecycle operations, rate limited per principal when configured
    pub lifecycle: RateLimitedLifecycle,
    /// Route reconciliation
    pub route_service: Arc<RouteService>,
    /// Route sync period; `None` disables the background job
    pub sync_interval_secs: Option<u64>,
}

impl AppState {
    /// Wire every adapter from configuration: SQLite store, Hetzner DNS
    /// (when credentials are present) and Traefik routes (when a directory is set).
    #[cfg(feature = "sqlite-store")]
    pub async fn from_config(config: &AppConfig) -> CoreResult<Self> {
        let store = adapters::SqliteSubdomainStore::new(&config.database.path).await?;

        let route_writer: Option<Arc<dyn RouteWriter>> = match &config.routes.dir {
            Some(dir) => {
                log::info!("Routing enabled, writing Traefik files to {}", dir.display());
                let writer: Arc<dyn RouteWriter> = Arc::new(
                    adapters::TraefikFileRoutes::new(dir, config.dns.zone_name.clone())
                        .with_options(config.routes.traefik.clone()),
                );
                Some(writer)
            }
            None => {
                log::info!("Routing disabled: no routes directory configured");
                None
            }
        };

        let mut builder = AppStateBuilder::new()
            .subdomain_repository(Arc::new(store))
            .policy(config.lifecycle_policy())
            .rate_limit(config.rate_limit_policy())
            .sync_interval(config.sync.enabled.then_some(config.sync.interval_secs));
        if let Some(dns) = config.dns_provider()? {
            builder = builder.dns_provider(dns);
        }
        if let Some(writer) = route_writer {
            builder = builder.route_writer(writer);
        }
        builder.build()
    }

    /// The background reconciliation job, if routing and sync are both enabled.
    pub fn route_sync_job(&self, shutdown: CancellationToken) -> Option<RouteSyncJob> {
        let interval = self.sync_interval_secs?;
        if !self.route_service.is_enabled() {
            return None;
        }
        Some(
            RouteSyncJob::new(Arc::clone(&self.route_service))
                .with_interval(interval)
                .with_cancellation(shutdown),
        )
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `subdomain_repository`: where subdomain rows live
///
/// # Optional
/// - `dns_provider`: DNS side effects are skipped without one
/// - `route_writer`: routing side effects are skipped without one
/// - `clock`: defaults to `SystemClock`
/// - `rate_limit`: defaults to `RateLimitPolicy::default()`; `None` disables it
pub struct AppStateBuilder {
    subdomain_repository: Option<Arc<dyn SubdomainRepository>>,
    dns_provider: Option<Arc<dyn DnsProvider>>,
    route_writer: Option<Arc<dyn RouteWriter>>,
    clock: Option<Arc<dyn Clock>>,
    policy: LifecyclePolicy,
    rate_limit: Option<RateLimitPolicy>,
    sync_interval_secs: Option<u64>,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subdomain_repository: None,
            dns_provider: None,
            route_writer: None,
            clock: None,
            policy: LifecyclePolicy::default(),
            rate_limit: Some(RateLimitPolicy::default()),
            sync_interval_secs: Some(jobs::DEFAULT_SYNC_INTERVAL_SECS),
        }
    }

    #[must_use]
    pub fn subdomain_repository(mut self, repo: Arc<dyn SubdomainRepository>) -> Self {
        self.subdomain_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn dns_provider(mut self, provider: Arc<dyn DnsProvider>) -> Self {
        self.dns_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn route_writer(mut self, writer: Arc<dyn RouteWriter>) -> Self {
        self.route_writer = Some(writer);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn rate_limit(mut self, policy: Option<RateLimitPolicy>) -> Self {
        self.rate_limit = policy;
        self
    }

    #[must_use]
    pub fn sync_interval(mut self, interval_secs: Option<u64>) -> Self {
        self.sync_interval_secs = interval_secs;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let subdomain_repository = self.subdomain_repository.ok_or_else(|| {
            CoreError::ValidationError("subdomain_repository is required".to_string())
        })?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let ctx = Arc::new(
            ServiceContext::new(
                subdomain_repository,
                self.dns_provider,
                self.route_writer,
                self.policy,
            )
            .with_clock(Arc::clone(&clock)),
        );

        let service = LifecycleService::new(Arc::clone(&ctx));
        let lifecycle = match self.rate_limit {
            Some(policy) => RateLimitedLifecycle::new(service, RateLimiter::new(policy, clock)),
            None => RateLimitedLifecycle::unlimited(service),
        };
        let route_service = Arc::new(RouteService::new(Arc::clone(&ctx)));

        Ok(AppState {
            ctx,
            lifecycle,
            route_service,
            sync_interval_secs: self.sync_interval_secs,
        })
    }
}
