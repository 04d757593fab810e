//! Reservation store abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{DeleteMode, NewSubdomain, Subdomain, SubdomainStatus};

/// Persistent record of every subdomain.
///
/// Names are stored and compared lowercase. At most one live (non-`released`)
/// row may exist per name.
///
/// Platform implementation:
/// - `SqliteSubdomainStore` (`SeaORM`)
#[async_trait]
pub trait SubdomainRepository: Send + Sync {
    /// Insert a `reserved` row.
    ///
    /// Fails with `Conflict` when a live row holds the name, or when the most
    /// recent released row is still inside its cooldown at `new.created_at`.
    async fn create(&self, new: &NewSubdomain) -> CoreResult<Subdomain>;

    /// Live row for `name`, else the most recently released one.
    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Subdomain>>;

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Subdomain>>;

    /// Persist every mutable field of `subdomain` (matched by id).
    ///
    /// Fails with `NotFound` if the row is gone and with `Conflict` if the
    /// change would produce a second live row for the name.
    async fn update(&self, subdomain: &Subdomain) -> CoreResult<Subdomain>;

    /// Fails with `NotFound` for an unknown id.
    async fn delete(&self, id: i64, mode: DeleteMode) -> CoreResult<()>;

    /// Live rows owned by the principal.
    async fn count_by_owner(&self, owner_id: &str) -> CoreResult<u64>;

    async fn list_by_status(&self, status: SubdomainStatus) -> CoreResult<Vec<Subdomain>>;
}
