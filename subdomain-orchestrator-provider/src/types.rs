use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// TTL used for subdomain A records (seconds).
pub const DEFAULT_TTL: u32 = 300;

/// Resolver address → whether it already answers with the expected IP.
pub type PropagationReport = BTreeMap<String, bool>;

/// A DNS record as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    pub id: String,
    pub zone_id: String,
    /// Relative name inside the zone
    pub name: String,
    pub record_type: String,
    pub value: String,
    pub ttl: Option<u32>,
}
