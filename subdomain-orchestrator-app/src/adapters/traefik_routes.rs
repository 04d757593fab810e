//! Traefik file-provider routes, one TOML file per subdomain.
//!
//! Traefik watches the directory and hot-reloads. Each file holds a router
//! `subdomain-<name>` matching `Host(<name>.<zone>)` and a service of the same
//! name pointing at `http://<ip>:<port>`.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use subdomain_orchestrator_core::error::{CoreError, CoreResult};
use subdomain_orchestrator_core::traits::RouteWriter;
use subdomain_orchestrator_core::types::RouteSpec;

const ROUTE_EXTENSION: &str = "toml";
const ROUTER_PREFIX: &str = "subdomain-";

/// Router and service settings shared by every generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraefikRouteOptions {
    pub entry_points: Vec<String>,
    pub cert_resolver: String,
    pub middlewares: Vec<String>,
    pub health_check_path: String,
    pub health_check_interval: String,
    pub health_check_timeout: String,
}

impl Default for TraefikRouteOptions {
    fn default() -> Self {
        Self {
            entry_points: vec!["websecure".to_string()],
            cert_resolver: "letsencrypt-dns".to_string(),
            middlewares: vec!["security-headers".to_string(), "rate-limit".to_string()],
            health_check_path: "/".to_string(),
            health_check_interval: "30s".to_string(),
            health_check_timeout: "5s".to_string(),
        }
    }
}

// ===== Traefik dynamic configuration schema =====

#[derive(Debug, Serialize, Deserialize)]
struct DynamicConfig {
    http: HttpSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct HttpSection {
    routers: BTreeMap<String, Router>,
    services: BTreeMap<String, Service>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Router {
    rule: String,
    service: String,
    entry_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    middlewares: Vec<String>,
    tls: RouterTls,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouterTls {
    cert_resolver: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Service {
    load_balancer: LoadBalancer,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadBalancer {
    servers: Vec<Server>,
    health_check: HealthCheck,
}

#[derive(Debug, Serialize, Deserialize)]
struct Server {
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthCheck {
    path: String,
    interval: String,
    timeout: String,
}

// ===== Writer =====

/// Writes Traefik dynamic-configuration files into a watched directory.
pub struct TraefikFileRoutes {
    dir: PathBuf,
    zone_name: String,
    options: TraefikRouteOptions,
}

impl TraefikFileRoutes {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, zone_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            zone_name: zone_name.into(),
            options: TraefikRouteOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TraefikRouteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> CoreResult<PathBuf> {
        let safe = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !safe {
            return Err(CoreError::RouteError(format!(
                "Refusing to write route for unsafe name {name:?}"
            )));
        }
        Ok(self.dir.join(format!("{name}.{ROUTE_EXTENSION}")))
    }

    fn render(&self, route: &RouteSpec) -> CoreResult<String> {
        let key = format!("{ROUTER_PREFIX}{}", route.name);
        let router = Router {
            rule: format!("Host(`{}.{}`)", route.name, self.zone_name),
            service: key.clone(),
            entry_points: self.options.entry_points.clone(),
            middlewares: self.options.middlewares.clone(),
            tls: RouterTls {
                cert_resolver: self.options.cert_resolver.clone(),
            },
        };
        let service = Service {
            load_balancer: LoadBalancer {
                servers: vec![Server {
                    url: format!("http://{}:{}", route.ip, route.port),
                }],
                health_check: HealthCheck {
                    path: self.options.health_check_path.clone(),
                    interval: self.options.health_check_interval.clone(),
                    timeout: self.options.health_check_timeout.clone(),
                },
            },
        };
        let config = DynamicConfig {
            http: HttpSection {
                routers: BTreeMap::from([(key.clone(), router)]),
                services: BTreeMap::from([(key, service)]),
            },
        };

        toml::to_string_pretty(&config).map_err(|e| {
            CoreError::SerializationError(format!("Failed to render route {}: {e}", route.name))
        })
    }

    /// Recovers the target from a rendered file. Hand-edited files that no
    /// longer parse yield `None` so the caller rewrites them.
    fn parse_target(name: &str, raw: &str) -> Option<RouteSpec> {
        let config: DynamicConfig = match toml::from_str(raw) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Route file for {name} does not parse: {e}");
                return None;
            }
        };
        let service = config.http.services.get(&format!("{ROUTER_PREFIX}{name}"))?;
        let [server] = service.load_balancer.servers.as_slice() else {
            return None;
        };
        let (ip, port) = server.url.strip_prefix("http://")?.rsplit_once(':')?;
        Some(RouteSpec {
            name: name.to_string(),
            ip: ip.to_string(),
            port: port.parse().ok()?,
        })
    }

    async fn ensure_dir(&self) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CoreError::RouteError(format!(
                "Failed to create routes directory {}: {e}",
                self.dir.display()
            ))
        })
    }
}

#[async_trait]
impl RouteWriter for TraefikFileRoutes {
    async fn write_route(&self, route: &RouteSpec) -> CoreResult<()> {
        let path = self.path_for(&route.name)?;
        let contents = self.render(route)?;
        self.ensure_dir().await?;

        // Traefik ignores dotfiles, so the partial write is never picked up.
        let tmp = self
            .dir
            .join(format!(".{}.{ROUTE_EXTENSION}.tmp", route.name));
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| CoreError::RouteError(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            CoreError::RouteError(format!("Failed to move route into {}: {e}", path.display()))
        })?;

        log::debug!("Wrote route file {}", path.display());
        Ok(())
    }

    async fn remove_route(&self, name: &str) -> CoreResult<bool> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::RouteError(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    async fn read_route(&self, name: &str) -> CoreResult<Option<RouteSpec>> {
        let path = self.path_for(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Self::parse_target(name, &raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::RouteError(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn list_routes(&self) -> CoreResult<BTreeSet<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                return Err(CoreError::RouteError(format!(
                    "Failed to read routes directory {}: {e}",
                    self.dir.display()
                )))
            }
        };

        let mut names = BTreeSet::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            CoreError::RouteError(format!("Failed to read routes directory: {e}"))
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ROUTE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    names.insert(stem.to_string());
                }
            }
        }
        Ok(names)
    }
}
