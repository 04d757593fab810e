use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use subdomain_orchestrator_core::error::CoreResult;
use subdomain_orchestrator_core::services::RouteService;
use subdomain_orchestrator_core::types::SyncReport;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

/// Background job that periodically reconciles route files with the store.
///
/// - `Arc<Self>` spawn so the job owns its state across ticks
/// - The first tick fires immediately, so stale routes are fixed at startup
/// - Stops when the cancellation token fires; an in-flight pass completes first
pub struct RouteSyncJob {
    routes: Arc<RouteService>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl RouteSyncJob {
    pub fn new(routes: Arc<RouteService>) -> Self {
        Self {
            routes,
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// One reconciliation pass against the active rows in the store.
    pub async fn run_once(&self) -> CoreResult<SyncReport> {
        self.routes.reconcile_from_store().await
    }

    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            "Starting route sync job (every {}s)",
            self.interval_secs
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = self.shutdown.cancelled() => {
                        info!("RouteSyncJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!("RouteSyncJob: reconciliation failed: {e}");
                        }
                    }
                }
            }
        })
    }
}
