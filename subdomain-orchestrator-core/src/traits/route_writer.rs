use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::RouteSpec;

/// Materializes routing artifacts, one per subdomain name.
#[async_trait]
pub trait RouteWriter: Send + Sync {
    /// Write or overwrite the artifact for `route.name`.
    async fn write_route(&self, route: &RouteSpec) -> CoreResult<()>;

    /// Remove the artifact. Returns `false` when there was nothing to remove.
    async fn remove_route(&self, name: &str) -> CoreResult<bool>;

    /// Target recorded in the artifact for `name`.
    ///
    /// `None` when there is no artifact or it cannot be understood.
    async fn read_route(&self, name: &str) -> CoreResult<Option<RouteSpec>>;

    /// Names that currently have an artifact.
    async fn list_routes(&self) -> CoreResult<BTreeSet<String>>;
}
