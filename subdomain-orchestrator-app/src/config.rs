//! Application configuration.
//!
//! Loaded from a TOML file (all sections optional) and then overridden by
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `HETZNER_DNS_API_TOKEN` | `dns.api_token` |
//! | `HETZNER_DNS_ZONE_ID` | `dns.zone_id` |
//! | `SUBDOMAIN_ZONE_NAME` | `dns.zone_name` |
//! | `TRAEFIK_ROUTES_DIR` | `routes.dir` |
//! | `SUBDOMAIN_DATABASE_PATH` | `database.path` |

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;

use subdomain_orchestrator_core::error::{CoreError, CoreResult};
use subdomain_orchestrator_core::types::{LifecyclePolicy, RateLimitPolicy, RetentionPolicy};
use subdomain_orchestrator_provider::{
    default_resolvers, DnsProvider, HetznerProvider, PropagationChecker, ProviderError,
    DEFAULT_PROPAGATION_TIMEOUT, DEFAULT_TTL,
};

use crate::adapters::TraefikRouteOptions;
use crate::jobs::DEFAULT_SYNC_INTERVAL_SECS;

pub const ENV_API_TOKEN: &str = "HETZNER_DNS_API_TOKEN";
pub const ENV_ZONE_ID: &str = "HETZNER_DNS_ZONE_ID";
pub const ENV_ZONE_NAME: &str = "SUBDOMAIN_ZONE_NAME";
pub const ENV_ROUTES_DIR: &str = "TRAEFIK_ROUTES_DIR";
pub const ENV_DATABASE_PATH: &str = "SUBDOMAIN_DATABASE_PATH";

const MAX_COOLDOWN_DAYS: i64 = 3650;
const MAX_RATE_WINDOW_SECS: i64 = 7 * 86_400;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub dns: DnsConfig,
    pub routes: RoutesConfig,
    pub policy: PolicyConfig,
    pub rate_limit: RateLimitConfig,
    pub sync: SyncConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/subdomains.db"),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DnsConfig {
    pub api_token: Option<String>,
    pub zone_id: Option<String>,
    /// Apex under which subdomains live, e.g. `example.com`
    pub zone_name: String,
    pub base_url: Option<String>,
    pub max_retries: u32,
    pub ttl: u32,
    /// Upper bound for one provider call, retries included
    pub timeout_secs: u64,
    /// Empty means the built-in public resolver set
    pub resolvers: Vec<IpAddr>,
    pub propagation_timeout_secs: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            zone_id: None,
            zone_name: String::new(),
            base_url: None,
            max_retries: 2,
            ttl: DEFAULT_TTL,
            timeout_secs: 30,
            resolvers: Vec::new(),
            propagation_timeout_secs: DEFAULT_PROPAGATION_TIMEOUT.as_secs(),
        }
    }
}

impl std::fmt::Debug for DnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("zone_id", &self.zone_id)
            .field("zone_name", &self.zone_name)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("ttl", &self.ttl)
            .field("timeout_secs", &self.timeout_secs)
            .field("resolvers", &self.resolvers)
            .field("propagation_timeout_secs", &self.propagation_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutesConfig {
    /// Directory watched by Traefik. Routing is disabled when unset.
    pub dir: Option<PathBuf>,
    pub traefik: TraefikRouteOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub cooldown_days: i64,
    pub default_subdomain_limit: u32,
    pub retention: RetentionPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            cooldown_days: 30,
            default_subdomain_limit: 5,
            retention: RetentionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_operations: u32,
    pub window_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_operations: 10,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load from `path` (or defaults), apply process environment overrides, validate.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> CoreResult<Self> {
        toml::from_str(contents).map_err(|e| CoreError::ConfigError(format!("Invalid config: {e}")))
    }

    /// Override fields from `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_API_TOKEN) {
            self.dns.api_token = Some(token);
        }
        if let Some(zone_id) = get(ENV_ZONE_ID) {
            self.dns.zone_id = Some(zone_id);
        }
        if let Some(zone_name) = get(ENV_ZONE_NAME) {
            self.dns.zone_name = zone_name;
        }
        if let Some(dir) = get(ENV_ROUTES_DIR) {
            self.routes.dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = get(ENV_DATABASE_PATH) {
            self.database.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        let needs_zone = self.dns_requested() || self.routes.dir.is_some();
        if needs_zone && self.dns.zone_name.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "dns.zone_name is required when DNS or routing is enabled".to_string(),
            ));
        }
        if !(0..=MAX_COOLDOWN_DAYS).contains(&self.policy.cooldown_days) {
            return Err(CoreError::ConfigError(format!(
                "policy.cooldown_days must be between 0 and {MAX_COOLDOWN_DAYS}"
            )));
        }
        let window = self.rate_limit.window_secs;
        if self.rate_limit.enabled && !(1..=MAX_RATE_WINDOW_SECS).contains(&window) {
            return Err(CoreError::ConfigError(format!(
                "rate_limit.window_secs must be between 1 and {MAX_RATE_WINDOW_SECS}"
            )));
        }
        if self.dns.timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "dns.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn dns_requested(&self) -> bool {
        self.dns.api_token.is_some() || self.dns.zone_id.is_some()
    }

    pub fn lifecycle_policy(&self) -> LifecyclePolicy {
        LifecyclePolicy {
            cooldown: TimeDelta::days(self.policy.cooldown_days),
            default_subdomain_limit: self.policy.default_subdomain_limit,
            retention: self.policy.retention,
            dns_ttl: self.dns.ttl,
            dns_timeout: Duration::from_secs(self.dns.timeout_secs),
            ..LifecyclePolicy::default()
        }
    }

    /// `None` when rate limiting is switched off. The window is clamped to
    /// the range `validate` accepts.
    pub fn rate_limit_policy(&self) -> Option<RateLimitPolicy> {
        self.rate_limit.enabled.then(|| RateLimitPolicy {
            max_operations: self.rate_limit.max_operations,
            window: TimeDelta::seconds(
                self.rate_limit.window_secs.clamp(1, MAX_RATE_WINDOW_SECS),
            ),
        })
    }

    /// Build the DNS provider, or `None` when credentials are absent.
    ///
    /// Half-configured credentials (token without zone or the reverse) are
    /// treated as disabled and logged.
    pub fn dns_provider(&self) -> CoreResult<Option<Arc<dyn DnsProvider>>> {
        let resolvers = if self.dns.resolvers.is_empty() {
            default_resolvers()
        } else {
            self.dns.resolvers.clone()
        };
        let checker = PropagationChecker::new(
            resolvers,
            Duration::from_secs(self.dns.propagation_timeout_secs),
        );

        let mut builder =
            HetznerProvider::builder(self.dns.api_token.clone(), self.dns.zone_id.clone())
                .zone_name(self.dns.zone_name.clone())
                .max_retries(self.dns.max_retries)
                .propagation(checker);
        if let Some(base_url) = &self.dns.base_url {
            builder = builder.base_url(base_url.clone());
        }

        match builder.build() {
            Ok(provider) => Ok(Some(Arc::new(provider))),
            Err(ProviderError::NotConfigured { missing, .. }) => {
                if self.dns_requested() {
                    log::warn!(
                        "DNS integration disabled: missing {}",
                        missing.join(", ")
                    );
                } else {
                    log::info!("DNS integration disabled: no credentials configured");
                }
                Ok(None)
            }
            Err(e) => Err(CoreError::ConfigError(format!(
                "Failed to build DNS provider: {e}"
            ))),
        }
    }
}
