//! Storage and routing adapters for the core traits.

#[cfg(feature = "sqlite-store")]
mod sqlite;
mod traefik_routes;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteSubdomainStore;
pub use traefik_routes::{TraefikFileRoutes, TraefikRouteOptions};
