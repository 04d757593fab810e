//! Hetzner DNS API wire types

use serde::{Deserialize, Serialize};

use crate::types::DnsRecord;

/// `{"record": {...}}` wrapper used by create/get/update responses.
#[derive(Debug, Deserialize)]
pub struct RecordEnvelope {
    pub record: HetznerRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HetznerRecord {
    pub id: String,
    pub zone_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl From<HetznerRecord> for DnsRecord {
    fn from(r: HetznerRecord) -> Self {
        Self {
            id: r.id,
            zone_id: r.zone_id,
            name: r.name,
            record_type: r.record_type,
            value: r.value,
            ttl: r.ttl,
        }
    }
}

/// Body for `POST /records` and `PUT /records/{id}`.
#[derive(Debug, Serialize)]
pub struct RecordPayload<'a> {
    pub zone_id: &'a str,
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Error bodies come either as `{"error": {"message", "code"}}` or `{"message"}`.
#[derive(Debug, Default, Deserialize)]
pub struct HetznerErrorBody {
    #[serde(default)]
    pub error: Option<HetznerErrorDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HetznerErrorDetail {
    #[serde(default)]
    pub message: String,
}

impl HetznerErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
            .or(self.message.as_deref())
    }
}
