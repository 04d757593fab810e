//! Subdomain lifecycle state machine
//!
//! ```text
//!            claim            activate / reactivate
//! (none) ──────────▶ reserved ──────────▶ active ◀─┐
//!                       │                   │  └─────┘
//!                       │ release           │ release
//!                       ▼                   ▼
//!                    released ◀──────── (any live state)
//! ```
//!
//! Admins can additionally suspend/unsuspend, force-release and hard-delete.
//!
//! Every mutation follows the same order: DNS gate first (when the operation
//! needs a record), then the authoritative row update, then best-effort
//! routing and DNS cleanup. Only the row decides the state; side-effect
//! failures are logged and reported through [`LifecycleOutcome::reconciled`].
//!
//! `release` therefore saves the `released` row before it removes the route
//! and DNS record, not after. A cleanup failure leaves an orphan that the
//! route sync or an operator removes, never a live row without its record.

use std::sync::Arc;

use log::{debug, error, info, warn};
use subdomain_orchestrator_provider::ProviderError;

use crate::error::{CoreError, CoreResult};
use crate::services::{RouteService, ServiceContext};
use crate::types::{
    DeleteMode, LifecycleOutcome, NewSubdomain, Principal, PropagationReport, RetentionPolicy,
    Subdomain, SubdomainStatus, SubdomainStatusReport,
};
use crate::validation::{
    ensure_not_reserved, normalize_name, validate_ipv4, validate_name, validate_port,
};

/// Claim, activate, inspect and release subdomains on behalf of a principal.
pub struct LifecycleService {
    ctx: Arc<ServiceContext>,
    routes: RouteService,
}

impl LifecycleService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        let routes = RouteService::new(ctx.clone());
        Self { ctx, routes }
    }

    /// Reserve `name` for `principal`.
    ///
    /// Checks run in order: verified email, name syntax, reserved words, an
    /// existing live or cooling-down row, then quota. Nothing is written until
    /// all of them pass. A released row whose cooldown has passed is removed
    /// first when retention is [`RetentionPolicy::UntilReclaim`].
    pub async fn claim(&self, principal: &Principal, name: &str) -> CoreResult<Subdomain> {
        if !principal.email_verified {
            return Err(CoreError::Forbidden(
                "Email address must be verified before claiming a subdomain".to_string(),
            ));
        }

        let name = normalize_name(name);
        validate_name(&name)?;
        ensure_not_reserved(&name)?;

        let repo = &self.ctx.subdomain_repository;
        let now = self.ctx.clock.now();

        let existing = repo.find_by_name(&name).await?;
        if let Some(existing) = &existing {
            if existing.is_live() {
                return Err(already_claimed(&name));
            }
            if let Some(until) = existing.cooldown_until.filter(|_| existing.in_cooldown(now)) {
                return Err(CoreError::Conflict(format!(
                    "Subdomain '{name}' was recently released and can be claimed again after {}",
                    until.to_rfc3339()
                )));
            }
        }

        self.ensure_quota(principal).await?;

        if let Some(stale) = existing {
            if self.ctx.policy.retention == RetentionPolicy::UntilReclaim {
                repo.delete(stale.id, DeleteMode::Hard).await?;
                debug!("Dropped stale released row {} for {name}", stale.id);
            }
        }

        let subdomain = repo
            .create(&NewSubdomain {
                name,
                owner_id: principal.id.clone(),
                port: self.ctx.policy.default_port,
                created_at: now,
            })
            .await?;

        info!(
            "Subdomain {} claimed by {} (id {})",
            subdomain.name, principal.id, subdomain.id
        );
        Ok(subdomain)
    }

    /// Point `name` at `ip:port`, creating or updating its A record.
    ///
    /// Works from `reserved` (first activation) and from `active` (retarget).
    /// A DNS failure aborts without touching the row.
    pub async fn activate(
        &self,
        principal: &Principal,
        name: &str,
        ip: &str,
        port: u32,
    ) -> CoreResult<LifecycleOutcome> {
        validate_ipv4(ip)?;
        let port = validate_port(port)?;

        let mut subdomain = self.find_live(name).await?;
        authorize(principal, &subdomain)?;
        if subdomain.status == SubdomainStatus::Suspended {
            return Err(CoreError::Forbidden("Subdomain is suspended".to_string()));
        }

        let previous_record = subdomain.dns_record_id.clone();
        let record_id = self.upsert_dns_record(&subdomain, ip).await?;
        let created_record = record_id.is_some() && record_id != previous_record;

        subdomain.ip_address = Some(ip.to_string());
        subdomain.port = port;
        subdomain.status = SubdomainStatus::Active;
        subdomain.dns_record_id = record_id;
        subdomain.updated_at = self.ctx.clock.now();

        let subdomain = match self.ctx.subdomain_repository.update(&subdomain).await {
            Ok(saved) => saved,
            Err(e) => {
                if created_record {
                    self.discard_record(&subdomain).await;
                }
                return Err(e);
            }
        };

        info!("Subdomain {} activated at {ip}:{port}", subdomain.name);

        let reconciled = self.apply_route(&subdomain).await;
        Ok(LifecycleOutcome {
            subdomain,
            reconciled,
        })
    }

    /// Current state of `name` plus a live propagation check when it has an address.
    pub async fn status(
        &self,
        principal: &Principal,
        name: &str,
    ) -> CoreResult<SubdomainStatusReport> {
        let subdomain = self.find_live(name).await?;
        authorize(principal, &subdomain)?;

        let propagation = match (&self.ctx.dns_provider, &subdomain.ip_address) {
            (Some(dns), Some(ip)) => dns.check_propagation(&subdomain.name, ip).await,
            _ => PropagationReport::new(),
        };

        Ok(SubdomainStatusReport {
            name: subdomain.name,
            ip_address: subdomain.ip_address,
            port: subdomain.port,
            status: subdomain.status,
            dns_record_id: subdomain.dns_record_id,
            propagation,
        })
    }

    /// Give `name` back. The row is retired first; route and DNS cleanup follow.
    pub async fn release(
        &self,
        principal: &Principal,
        name: &str,
    ) -> CoreResult<LifecycleOutcome> {
        let subdomain = self.find_live(name).await?;
        authorize(principal, &subdomain)?;

        let now = self.ctx.clock.now();
        let record_id = subdomain.dns_record_id.clone();
        let released = Subdomain {
            owner_id: None,
            ip_address: None,
            status: SubdomainStatus::Released,
            dns_record_id: None,
            released_at: Some(now),
            cooldown_until: Some(now + self.ctx.policy.cooldown),
            updated_at: now,
            ..subdomain
        };
        let released = self.ctx.subdomain_repository.update(&released).await?;

        info!(
            "Subdomain {} released by {}, cooldown until {}",
            released.name,
            principal.id,
            released
                .cooldown_until
                .map(|t| t.to_rfc3339())
                .unwrap_or_default()
        );

        let reconciled = self
            .cleanup_side_effects(&released.name, record_id.as_deref())
            .await;
        Ok(LifecycleOutcome {
            subdomain: released,
            reconciled,
        })
    }

    // ===== Admin operations =====

    /// Remove a row entirely, bypassing cooldown.
    pub async fn hard_delete(
        &self,
        principal: &Principal,
        id: i64,
    ) -> CoreResult<LifecycleOutcome> {
        require_admin(principal)?;

        let repo = &self.ctx.subdomain_repository;
        let subdomain = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Subdomain {id} not found")))?;
        repo.delete(id, DeleteMode::Hard).await?;

        warn!(
            "Subdomain {} (id {id}) hard-deleted by admin {}",
            subdomain.name, principal.id
        );

        let reconciled = if subdomain.is_live() {
            self.cleanup_side_effects(&subdomain.name, subdomain.dns_record_id.as_deref())
                .await
        } else {
            true
        };
        Ok(LifecycleOutcome {
            subdomain,
            reconciled,
        })
    }

    /// Retire `name` without a cooldown so it can be claimed again at once.
    pub async fn force_release(
        &self,
        principal: &Principal,
        name: &str,
    ) -> CoreResult<LifecycleOutcome> {
        require_admin(principal)?;

        let subdomain = self.find_live(name).await?;
        let repo = &self.ctx.subdomain_repository;
        repo.delete(
            subdomain.id,
            DeleteMode::Soft {
                at: self.ctx.clock.now(),
            },
        )
        .await?;

        warn!(
            "Subdomain {} force-released by admin {}",
            subdomain.name, principal.id
        );

        let reconciled = self
            .cleanup_side_effects(&subdomain.name, subdomain.dns_record_id.as_deref())
            .await;
        let subdomain = repo.find_by_id(subdomain.id).await?.unwrap_or(subdomain);
        Ok(LifecycleOutcome {
            subdomain,
            reconciled,
        })
    }

    /// Take `name` offline while keeping it with its owner.
    ///
    /// The A record and route are removed; `unsuspend` returns the row to
    /// `reserved` and the owner activates again.
    pub async fn suspend(
        &self,
        principal: &Principal,
        name: &str,
    ) -> CoreResult<LifecycleOutcome> {
        require_admin(principal)?;

        let subdomain = self.find_live(name).await?;
        if subdomain.status == SubdomainStatus::Suspended {
            return Ok(LifecycleOutcome {
                subdomain,
                reconciled: true,
            });
        }

        let record_id = subdomain.dns_record_id.clone();
        let suspended = Subdomain {
            ip_address: None,
            status: SubdomainStatus::Suspended,
            dns_record_id: None,
            updated_at: self.ctx.clock.now(),
            ..subdomain
        };
        let suspended = self.ctx.subdomain_repository.update(&suspended).await?;

        warn!(
            "Subdomain {} suspended by admin {}",
            suspended.name, principal.id
        );

        let reconciled = self
            .cleanup_side_effects(&suspended.name, record_id.as_deref())
            .await;
        Ok(LifecycleOutcome {
            subdomain: suspended,
            reconciled,
        })
    }

    pub async fn unsuspend(&self, principal: &Principal, name: &str) -> CoreResult<Subdomain> {
        require_admin(principal)?;

        let subdomain = self.find_live(name).await?;
        if subdomain.status != SubdomainStatus::Suspended {
            return Err(CoreError::Conflict(format!(
                "Subdomain '{}' is not suspended",
                subdomain.name
            )));
        }

        let restored = Subdomain {
            status: SubdomainStatus::Reserved,
            updated_at: self.ctx.clock.now(),
            ..subdomain
        };
        let restored = self.ctx.subdomain_repository.update(&restored).await?;
        info!(
            "Subdomain {} unsuspended by admin {}",
            restored.name, principal.id
        );
        Ok(restored)
    }

    // ===== Internals =====

    async fn ensure_quota(&self, principal: &Principal) -> CoreResult<()> {
        if principal.is_admin() {
            return Ok(());
        }
        let limit = principal
            .subdomain_limit
            .unwrap_or(self.ctx.policy.default_subdomain_limit);
        let owned = self
            .ctx
            .subdomain_repository
            .count_by_owner(&principal.id)
            .await?;
        if owned >= u64::from(limit) {
            return Err(CoreError::QuotaExceeded { limit });
        }
        Ok(())
    }

    /// The live row for `name`. Released rows are reported as not found.
    async fn find_live(&self, name: &str) -> CoreResult<Subdomain> {
        let name = normalize_name(name);
        self.ctx
            .subdomain_repository
            .find_by_name(&name)
            .await?
            .filter(Subdomain::is_live)
            .ok_or_else(|| CoreError::NotFound(format!("Subdomain '{name}' not found")))
    }

    /// Create or update the A record. Returns the record id to persist.
    ///
    /// A record that vanished at the provider is recreated.
    async fn upsert_dns_record(
        &self,
        subdomain: &Subdomain,
        ip: &str,
    ) -> CoreResult<Option<String>> {
        let Some(dns) = self.ctx.dns_provider.as_deref() else {
            debug!("DNS integration disabled, no record for {}", subdomain.name);
            return Ok(subdomain.dns_record_id.clone());
        };

        if let Some(record_id) = &subdomain.dns_record_id {
            match self
                .ctx
                .dns_call(dns, dns.update_record(record_id, ip))
                .await
            {
                Ok(()) => return Ok(Some(record_id.clone())),
                Err(CoreError::Dns(ProviderError::RecordNotFound { .. })) => {
                    warn!(
                        "DNS record {record_id} for {} is gone at the provider, recreating",
                        subdomain.name
                    );
                }
                Err(e) => {
                    error!("DNS update for {} failed: {e}", subdomain.name);
                    return Err(e);
                }
            }
        }

        let ttl = self.ctx.policy.dns_ttl;
        match self
            .ctx
            .dns_call(dns, dns.create_record(&subdomain.name, ip, ttl))
            .await
        {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                error!("DNS create for {} failed: {e}", subdomain.name);
                Err(e)
            }
        }
    }

    /// Compensate a record created for a row update that did not persist.
    async fn discard_record(&self, subdomain: &Subdomain) {
        let (Some(dns), Some(record_id)) = (
            self.ctx.dns_provider.as_deref(),
            subdomain.dns_record_id.as_deref(),
        ) else {
            return;
        };
        if let Err(e) = self.ctx.dns_call(dns, dns.delete_record(record_id)).await {
            error!(
                "Orphaned DNS record {record_id} for {} could not be removed: {e}",
                subdomain.name
            );
        }
    }

    async fn apply_route(&self, subdomain: &Subdomain) -> bool {
        if !self.routes.is_enabled() {
            return true;
        }
        let Some(ip) = subdomain.ip_address.as_deref() else {
            return true;
        };
        match self
            .routes
            .create_or_update_route(&subdomain.name, ip, subdomain.port)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Route for {} not written: {e}", subdomain.name);
                false
            }
        }
    }

    /// Route removal then DNS deletion. Both are best effort.
    async fn cleanup_side_effects(&self, name: &str, record_id: Option<&str>) -> bool {
        let mut reconciled = true;

        if self.routes.is_enabled() {
            if let Err(e) = self.routes.delete_route(name).await {
                warn!("Route for {name} not removed: {e}");
                reconciled = false;
            }
        }

        if let (Some(dns), Some(record_id)) = (self.ctx.dns_provider.as_deref(), record_id) {
            match self.ctx.dns_call(dns, dns.delete_record(record_id)).await {
                Ok(()) => debug!("Deleted DNS record {record_id} for {name}"),
                Err(CoreError::Dns(ProviderError::RecordNotFound { .. })) => {
                    debug!("DNS record {record_id} for {name} was already gone");
                }
                Err(e) => {
                    error!("DNS record {record_id} for {name} not deleted: {e}");
                    reconciled = false;
                }
            }
        }

        reconciled
    }
}

fn authorize(principal: &Principal, subdomain: &Subdomain) -> CoreResult<()> {
    if principal.is_admin() || subdomain.is_owned_by(&principal.id) {
        return Ok(());
    }
    Err(CoreError::Forbidden(format!(
        "You do not own subdomain '{}'",
        subdomain.name
    )))
}

fn require_admin(principal: &Principal) -> CoreResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Administrator role required".to_string(),
        ))
    }
}

fn already_claimed(name: &str) -> CoreError {
    CoreError::Conflict(format!("Subdomain '{name}' is already claimed"))
}
