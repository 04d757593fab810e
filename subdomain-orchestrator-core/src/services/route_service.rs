//! Routing artifact management and reconciliation

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::RouteWriter;
use crate::types::{RouteSpec, Subdomain, SubdomainStatus, SyncReport};

/// Keeps one routing artifact per active subdomain.
pub struct RouteService {
    ctx: Arc<ServiceContext>,
}

impl RouteService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn is_enabled(&self) -> bool {
        self.ctx.route_writer.is_some()
    }

    fn writer(&self) -> CoreResult<&Arc<dyn RouteWriter>> {
        self.ctx
            .route_writer
            .as_ref()
            .ok_or_else(|| CoreError::NotConfigured("Routing".to_string()))
    }

    /// Write (or overwrite) the artifact routing `name` to `ip:port`.
    pub async fn create_or_update_route(&self, name: &str, ip: &str, port: u16) -> CoreResult<()> {
        let route = RouteSpec {
            name: name.to_string(),
            ip: ip.to_string(),
            port,
        };
        self.writer()?.write_route(&route).await?;
        info!("Route for {name} now targets {ip}:{port}");
        Ok(())
    }

    /// Remove the artifact for `name`. Absent artifacts are not an error.
    pub async fn delete_route(&self, name: &str) -> CoreResult<bool> {
        let removed = self.writer()?.remove_route(name).await?;
        if removed {
            info!("Removed route for {name}");
        } else {
            debug!("No route to remove for {name}");
        }
        Ok(removed)
    }

    /// Bring the artifact set in line with `active`.
    ///
    /// Creates artifacts for active rows that have none, rewrites artifacts
    /// whose recorded target differs from the row, and removes artifacts with
    /// no active row. A failure on one artifact is counted and the pass
    /// continues.
    pub async fn sync_routes(&self, active: &[Subdomain]) -> CoreResult<SyncReport> {
        let writer = self.writer()?;

        let desired: BTreeMap<&str, RouteSpec> = active
            .iter()
            .filter(|s| s.status == SubdomainStatus::Active)
            .filter_map(|s| {
                let ip = s.ip_address.as_ref()?;
                Some((
                    s.name.as_str(),
                    RouteSpec {
                        name: s.name.clone(),
                        ip: ip.clone(),
                        port: s.port,
                    },
                ))
            })
            .collect();
        let existing = writer.list_routes().await?;

        let mut report = SyncReport::default();

        for (name, route) in &desired {
            let present = existing.contains(*name);
            if present {
                match writer.read_route(name).await {
                    Ok(Some(current)) if current == *route => continue,
                    Ok(_) => debug!("Route for {name} drifted, rewriting"),
                    Err(e) => {
                        warn!("Route sync could not read {name}: {e}");
                        report.failed += 1;
                        continue;
                    }
                }
            }
            match writer.write_route(route).await {
                Ok(()) if present => report.updated += 1,
                Ok(()) => report.created += 1,
                Err(e) => {
                    warn!("Route sync could not write {name}: {e}");
                    report.failed += 1;
                }
            }
        }

        for name in existing.iter().filter(|n| !desired.contains_key(n.as_str())) {
            match writer.remove_route(name).await {
                Ok(_) => report.deleted += 1,
                Err(e) => {
                    warn!("Route sync could not remove {name}: {e}");
                    report.failed += 1;
                }
            }
        }

        if report.is_noop() {
            debug!("Route sync: {} routes already in place", desired.len());
        } else {
            info!(
                "Route sync: {} created, {} updated, {} deleted, {} failed",
                report.created, report.updated, report.deleted, report.failed
            );
        }
        Ok(report)
    }

    /// Reconcile against the active rows currently in the store.
    pub async fn reconcile_from_store(&self) -> CoreResult<SyncReport> {
        let active = self
            .ctx
            .subdomain_repository
            .list_by_status(SubdomainStatus::Active)
            .await?;
        self.sync_routes(&active).await
    }
}
