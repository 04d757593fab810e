//! # subdomain-orchestrator-provider
//!
//! DNS provider adapter for the subdomain orchestrator. It manages the single
//! A record that backs each claimed subdomain inside one zone, and offers a
//! diagnostic propagation check against a fixed set of public resolvers.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [Hetzner DNS](https://dns.hetzner.com/) | `hetzner` | `Auth-API-Token` header |
//!
//! ## Feature Flags
//!
//! - **`hetzner`** *(default)*: Enable the Hetzner DNS provider.
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls instead.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use subdomain_orchestrator_provider::{DnsProvider, HetznerProvider, DEFAULT_TTL};
//!
//! # async fn example() -> subdomain_orchestrator_provider::Result<()> {
//! let provider = HetznerProvider::builder(Some("token".into()), Some("zone-id".into()))
//!     .zone_name("example.com")
//!     .build()?;
//!
//! let record_id = provider.create_record("myapp", "192.0.2.10", DEFAULT_TTL).await?;
//! provider.update_record(&record_id, "192.0.2.11").await?;
//!
//! let report = provider.check_propagation("myapp", "192.0.2.11").await;
//! for (resolver, ok) in &report {
//!     println!("{resolver}: {ok}");
//! }
//!
//! provider.delete_record(&record_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ProviderError>`](ProviderError). Transient
//! failures (`NetworkError`, `Timeout`, `RateLimited`) are retried with exponential
//! backoff; record creation is only retried when the provider rejected it with
//! HTTP 429. A provider that lacks credentials refuses to build and reports
//! [`ProviderError::NotConfigured`].

mod error;
mod http_client;
mod propagation;
mod providers;
mod traits;
mod types;

pub use error::{ProviderError, Result};

pub use propagation::{DEFAULT_PROPAGATION_TIMEOUT, PropagationChecker, default_resolvers};

pub use traits::DnsProvider;

pub use types::{DEFAULT_TTL, DnsRecord, PropagationReport};

pub use providers::common::fqdn;

#[cfg(feature = "hetzner")]
pub use providers::{HetznerProvider, HetznerProviderBuilder};
