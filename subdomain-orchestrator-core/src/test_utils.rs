//! Test helper module
//!
//! In-memory mocks for every service dependency plus a harness that wires
//! them into a [`ServiceContext`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use subdomain_orchestrator_provider::{
    DnsProvider, DnsRecord, PropagationReport, ProviderError, Result as ProviderResult,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::{LifecycleService, ServiceContext};
use crate::traits::{Clock, RouteWriter, SubdomainRepository};
use crate::types::{
    DeleteMode, LifecyclePolicy, NewSubdomain, RouteSpec, Subdomain, SubdomainStatus,
};

// ===== ManualClock =====

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            now: Mutex::new(start),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ===== MockSubdomainRepository =====

pub struct MockSubdomainRepository {
    rows: RwLock<Vec<Subdomain>>,
    /// Ids are never reused, even after a hard delete
    last_id: AtomicI64,
    /// If Some, `update` returns this error (used to test compensation paths)
    update_error: RwLock<Option<String>>,
}

impl MockSubdomainRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            last_id: AtomicI64::new(0),
            update_error: RwLock::new(None),
        }
    }

    pub async fn set_update_error(&self, err: Option<String>) {
        *self.update_error.write().await = err;
    }

    pub async fn insert(&self, subdomain: Subdomain) {
        self.last_id.fetch_max(subdomain.id, Ordering::SeqCst);
        self.rows.write().await.push(subdomain);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn by_name(&self, name: &str) -> Option<Subdomain> {
        lookup(&self.rows.read().await, name)
    }
}

fn lookup(rows: &[Subdomain], name: &str) -> Option<Subdomain> {
    let same_name = || rows.iter().filter(|r| r.name == name);
    same_name()
        .find(|r| r.is_live())
        .or_else(|| same_name().max_by_key(|r| (r.released_at, r.id)))
        .cloned()
}

#[async_trait]
impl SubdomainRepository for MockSubdomainRepository {
    async fn create(&self, new: &NewSubdomain) -> CoreResult<Subdomain> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = lookup(&rows, &new.name) {
            if existing.is_live() || existing.in_cooldown(new.created_at) {
                return Err(CoreError::Conflict(format!(
                    "Subdomain '{}' is already claimed",
                    new.name
                )));
            }
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = Subdomain {
            id,
            name: new.name.clone(),
            owner_id: Some(new.owner_id.clone()),
            ip_address: None,
            port: new.port,
            status: SubdomainStatus::Reserved,
            dns_record_id: None,
            released_at: None,
            cooldown_until: None,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Subdomain>> {
        Ok(lookup(&self.rows.read().await, name))
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Subdomain>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn update(&self, subdomain: &Subdomain) -> CoreResult<Subdomain> {
        if let Some(ref msg) = *self.update_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut rows = self.rows.write().await;
        let clash = rows.iter().any(|r| {
            r.id != subdomain.id && r.name == subdomain.name && r.is_live() && subdomain.is_live()
        });
        if clash {
            return Err(CoreError::Conflict(format!(
                "Subdomain '{}' is already claimed",
                subdomain.name
            )));
        }
        let row = rows
            .iter_mut()
            .find(|r| r.id == subdomain.id)
            .ok_or_else(|| CoreError::NotFound(format!("Subdomain {} not found", subdomain.id)))?;
        *row = subdomain.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64, mode: DeleteMode) -> CoreResult<()> {
        let mut rows = self.rows.write().await;
        let pos = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("Subdomain {id} not found")))?;
        match mode {
            DeleteMode::Hard => {
                rows.remove(pos);
            }
            DeleteMode::Soft { at } => {
                let row = &mut rows[pos];
                row.status = SubdomainStatus::Released;
                row.owner_id = None;
                row.ip_address = None;
                row.dns_record_id = None;
                row.released_at = Some(at);
                row.cooldown_until = None;
                row.updated_at = at;
            }
        }
        Ok(())
    }

    async fn count_by_owner(&self, owner_id: &str) -> CoreResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.is_live() && r.is_owned_by(owner_id))
            .count() as u64)
    }

    async fn list_by_status(&self, status: SubdomainStatus) -> CoreResult<Vec<Subdomain>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|r| r.status == status).cloned().collect())
    }
}

// ===== MockDnsProvider =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsCall {
    Create { name: String, ip: String, ttl: u32 },
    Update { id: String, ip: String },
    Delete { id: String },
}

#[derive(Default)]
struct DnsState {
    /// record id -> (name, ip)
    records: BTreeMap<String, (String, String)>,
    calls: Vec<DnsCall>,
    next_id: u32,
    fail_next: bool,
    delay: Option<Duration>,
}

pub struct MockDnsProvider {
    state: RwLock<DnsState>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(DnsState::default()),
        }
    }

    pub async fn calls(&self) -> Vec<DnsCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn record_ip(&self, id: &str) -> Option<String> {
        let state = self.state.read().await;
        state.records.get(id).map(|(_, ip)| ip.clone())
    }

    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Drop a record behind the caller's back.
    pub async fn forget(&self, id: &str) {
        self.state.write().await.records.remove(id);
    }

    /// Make the next mutating call fail with a network error.
    pub async fn fail_next(&self) {
        self.state.write().await.fail_next = true;
    }

    pub async fn set_delay(&self, delay: Duration) {
        self.state.write().await.delay = Some(delay);
    }

    async fn begin(&self, call: DnsCall) -> ProviderResult<()> {
        let delay = self.state.read().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.write().await;
        state.calls.push(call);
        if std::mem::take(&mut state.fail_next) {
            return Err(ProviderError::NetworkError {
                provider: "mock".to_string(),
                detail: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}

fn record_not_found(id: &str) -> ProviderError {
    ProviderError::RecordNotFound {
        provider: "mock".to_string(),
        record_id: id.to_string(),
        raw_message: None,
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn zone_name(&self) -> &str {
        "example.test"
    }

    async fn create_record(&self, subdomain: &str, ip: &str, ttl: u32) -> ProviderResult<String> {
        self.begin(DnsCall::Create {
            name: subdomain.to_string(),
            ip: ip.to_string(),
            ttl,
        })
        .await?;
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = format!("rec-{}", state.next_id);
        state
            .records
            .insert(id.clone(), (subdomain.to_string(), ip.to_string()));
        Ok(id)
    }

    async fn get_record(&self, record_id: &str) -> ProviderResult<DnsRecord> {
        let state = self.state.read().await;
        let (name, ip) = state
            .records
            .get(record_id)
            .ok_or_else(|| record_not_found(record_id))?;
        Ok(DnsRecord {
            id: record_id.to_string(),
            zone_id: "zone".to_string(),
            name: name.clone(),
            record_type: "A".to_string(),
            value: ip.clone(),
            ttl: Some(300),
        })
    }

    async fn update_record(&self, record_id: &str, ip: &str) -> ProviderResult<()> {
        self.begin(DnsCall::Update {
            id: record_id.to_string(),
            ip: ip.to_string(),
        })
        .await?;
        let mut state = self.state.write().await;
        let record = state
            .records
            .get_mut(record_id)
            .ok_or_else(|| record_not_found(record_id))?;
        record.1 = ip.to_string();
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> ProviderResult<()> {
        self.begin(DnsCall::Delete {
            id: record_id.to_string(),
        })
        .await?;
        self.state
            .write()
            .await
            .records
            .remove(record_id)
            .map(|_| ())
            .ok_or_else(|| record_not_found(record_id))
    }

    async fn check_propagation(&self, subdomain: &str, expected_ip: &str) -> PropagationReport {
        let state = self.state.read().await;
        let visible = state
            .records
            .values()
            .any(|(name, ip)| name == subdomain && ip == expected_ip);
        ["1.1.1.1", "8.8.8.8"]
            .into_iter()
            .map(|resolver| (resolver.to_string(), visible))
            .collect()
    }
}

// ===== MockRouteWriter =====

pub struct MockRouteWriter {
    routes: RwLock<BTreeMap<String, RouteSpec>>,
    failing: RwLock<HashSet<String>>,
}

impl MockRouteWriter {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(BTreeMap::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Pre-populate artifacts (targets are placeholders).
    pub async fn seed(&self, names: &[&str]) {
        let mut routes = self.routes.write().await;
        for name in names {
            routes.insert(
                (*name).to_string(),
                RouteSpec {
                    name: (*name).to_string(),
                    ip: "192.0.2.1".to_string(),
                    port: 80,
                },
            );
        }
    }

    pub async fn fail_writes_for(&self, name: &str) {
        self.failing.write().await.insert(name.to_string());
    }

    pub async fn names(&self) -> Vec<String> {
        self.routes.read().await.keys().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<RouteSpec> {
        self.routes.read().await.get(name).cloned()
    }
}

#[async_trait]
impl RouteWriter for MockRouteWriter {
    async fn write_route(&self, route: &RouteSpec) -> CoreResult<()> {
        if self.failing.read().await.contains(&route.name) {
            return Err(CoreError::RouteError(format!(
                "Failed to write route {}: read-only file system",
                route.name
            )));
        }
        self.routes
            .write()
            .await
            .insert(route.name.clone(), route.clone());
        Ok(())
    }

    async fn remove_route(&self, name: &str) -> CoreResult<bool> {
        Ok(self.routes.write().await.remove(name).is_some())
    }

    async fn read_route(&self, name: &str) -> CoreResult<Option<RouteSpec>> {
        Ok(self.get(name).await)
    }

    async fn list_routes(&self) -> CoreResult<BTreeSet<String>> {
        Ok(self.routes.read().await.keys().cloned().collect())
    }
}

// ===== Harness =====

pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub repo: Arc<MockSubdomainRepository>,
    pub dns: Arc<MockDnsProvider>,
    pub routes: Arc<MockRouteWriter>,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(LifecyclePolicy::default(), true, true)
    }

    pub fn with_policy(tweak: impl FnOnce(&mut LifecyclePolicy)) -> Self {
        let mut policy = LifecyclePolicy::default();
        tweak(&mut policy);
        Self::build(policy, true, true)
    }

    pub fn without_routes() -> Self {
        Self::build(LifecyclePolicy::default(), true, false)
    }

    /// Neither DNS nor routing configured.
    pub fn bare() -> Self {
        Self::build(LifecyclePolicy::default(), false, false)
    }

    fn build(policy: LifecyclePolicy, with_dns: bool, with_routes: bool) -> Self {
        let repo = Arc::new(MockSubdomainRepository::new());
        let dns = Arc::new(MockDnsProvider::new());
        let routes = Arc::new(MockRouteWriter::new());
        let clock = Arc::new(ManualClock::default());

        let dns_provider: Option<Arc<dyn DnsProvider>> = with_dns.then(|| dns.clone() as _);
        let route_writer: Option<Arc<dyn RouteWriter>> = with_routes.then(|| routes.clone() as _);
        let ctx = ServiceContext::new(repo.clone(), dns_provider, route_writer, policy)
            .with_clock(clock.clone());

        Self {
            ctx: Arc::new(ctx),
            repo,
            dns,
            routes,
            clock,
        }
    }

    pub fn service(&self) -> LifecycleService {
        LifecycleService::new(self.ctx.clone())
    }
}

/// An active row owned by `alice` targeting `ip:8080`.
pub fn active_subdomain(id: i64, name: &str, ip: &str) -> Subdomain {
    let now = Utc::now();
    Subdomain {
        id,
        name: name.to_string(),
        owner_id: Some("alice".to_string()),
        ip_address: Some(ip.to_string()),
        port: 8080,
        status: SubdomainStatus::Active,
        dns_record_id: None,
        released_at: None,
        cooldown_until: None,
        created_at: now,
        updated_at: now,
    }
}
