//! Diagnostic DNS propagation check.
//!
//! Each configured public resolver is queried directly (not through the host's
//! resolver configuration) for the A record of a name, concurrently and with a
//! per-query timeout.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use futures::future::join_all;
use hickory_resolver::{
    TokioResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};

use crate::types::PropagationReport;

/// Per-resolver query timeout.
pub const DEFAULT_PROPAGATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Cloudflare, Google and Hetzner public resolvers.
pub fn default_resolvers() -> Vec<IpAddr> {
    vec![
        IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
        IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
        IpAddr::V4(Ipv4Addr::new(213, 133, 100, 98)),
    ]
}

#[derive(Debug, Clone)]
pub struct PropagationChecker {
    resolvers: Vec<IpAddr>,
    timeout: Duration,
}

impl Default for PropagationChecker {
    fn default() -> Self {
        Self::new(default_resolvers(), DEFAULT_PROPAGATION_TIMEOUT)
    }
}

impl PropagationChecker {
    pub fn new(resolvers: Vec<IpAddr>, timeout: Duration) -> Self {
        Self { resolvers, timeout }
    }

    pub fn resolvers(&self) -> &[IpAddr] {
        &self.resolvers
    }

    /// Returns one entry per resolver, keyed by its address.
    ///
    /// Never fails: lookup errors, timeouts and an unparsable `expected_ip` all
    /// report `false`.
    pub async fn check(&self, fqdn: &str, expected_ip: &str) -> PropagationReport {
        let expected = expected_ip.parse::<Ipv4Addr>().ok();
        let lookups = self.resolvers.iter().map(|server| async move {
            let matched = match expected {
                Some(want) => self.query(*server, fqdn, want).await,
                None => false,
            };
            (server.to_string(), matched)
        });
        join_all(lookups).await.into_iter().collect()
    }

    async fn query(&self, server: IpAddr, fqdn: &str, want: Ipv4Addr) -> bool {
        let resolver = resolver_for(server);
        match tokio::time::timeout(self.timeout, resolver.ipv4_lookup(fqdn)).await {
            Ok(Ok(answer)) => answer.iter().any(|a| a.0 == want),
            Ok(Err(e)) => {
                log::debug!("Propagation lookup of {fqdn} via {server} failed: {e}");
                false
            }
            Err(_) => {
                log::debug!(
                    "Propagation lookup of {fqdn} via {server} timed out after {:?}",
                    self.timeout
                );
                false
            }
        }
    }
}

fn resolver_for(server: IpAddr) -> TokioResolver {
    let config = ResolverConfig::from_parts(
        None,
        vec![],
        NameServerConfigGroup::from_ips_clear(&[server], 53, true),
    );
    TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
        .with_options(ResolverOpts::default())
        .build()
}
