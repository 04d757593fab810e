//! Subdomain Orchestrator Core Library
//!
//! Business logic for handing out subdomains of one shared zone:
//! - Name, address and port validation
//! - The claim / activate / release lifecycle (`LifecycleService`)
//! - Routing artifact reconciliation (`RouteService`)
//! - Per-principal rate limiting of mutating calls
//!
//! The library is platform-independent: storage, routing artifacts and the
//! clock are abstracted behind traits, the DNS provider comes from
//! `subdomain-orchestrator-provider`.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    LifecycleService, RateLimitedLifecycle, RateLimiter, RouteService, ServiceContext,
};
pub use traits::{Clock, RouteWriter, SubdomainRepository, SystemClock};
