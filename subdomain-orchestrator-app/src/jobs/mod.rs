//! Background jobs.

mod route_sync;

pub use route_sync::{RouteSyncJob, DEFAULT_SYNC_INTERVAL_SECS};
