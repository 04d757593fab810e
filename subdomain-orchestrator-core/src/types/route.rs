use serde::{Deserialize, Serialize};

/// Desired routing for one active subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub name: String,
    pub ip: String,
    pub port: u16,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: usize,
    /// Artifacts rewritten because they pointed at a stale target
    pub updated: usize,
    pub deleted: usize,
    /// Artifacts that could not be written or removed in this pass
    pub failed: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0 && self.failed == 0
    }
}
