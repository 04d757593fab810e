//! Type definition module

mod policy;
mod principal;
mod route;
mod subdomain;

pub use policy::{LifecyclePolicy, RateLimitPolicy, RetentionPolicy};
pub use principal::{Principal, Role};
pub use route::{RouteSpec, SyncReport};
pub use subdomain::{
    DeleteMode, LifecycleOutcome, NewSubdomain, Subdomain, SubdomainStatus, SubdomainStatusReport,
};

// Re-export provider types used in reports
pub use subdomain_orchestrator_provider::PropagationReport;
