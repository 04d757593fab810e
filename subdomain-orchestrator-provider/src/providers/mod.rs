//! DNS Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

#[cfg(feature = "hetzner")]
mod hetzner;

#[cfg(feature = "hetzner")]
pub use hetzner::{HetznerProvider, HetznerProviderBuilder};
