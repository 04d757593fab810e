use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::PropagationReport;

/// Lifecycle state of a subdomain row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubdomainStatus {
    Reserved,
    Active,
    Suspended,
    Released,
}

impl SubdomainStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Released => "released",
        }
    }

    /// Every state except `released` holds the name.
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Released)
    }
}

impl fmt::Display for SubdomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubdomainStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserved" => Ok(Self::Reserved),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "released" => Ok(Self::Released),
            other => Err(CoreError::SerializationError(format!(
                "Unknown subdomain status: {other}"
            ))),
        }
    }
}

/// A claimed name under the shared zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subdomain {
    pub id: i64,
    pub name: String,
    /// `None` only once released
    pub owner_id: Option<String>,
    /// Set exactly while active
    pub ip_address: Option<String>,
    pub port: u16,
    pub status: SubdomainStatus,
    /// Provider id of the live A record, if one exists
    pub dns_record_id: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subdomain {
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn is_owned_by(&self, principal_id: &str) -> bool {
        self.owner_id.as_deref() == Some(principal_id)
    }

    /// Released and still blocking reuse of the name at `now`.
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.status == SubdomainStatus::Released
            && self.cooldown_until.is_some_and(|until| until > now)
    }
}

/// Row inserted by `claim`. Status starts as `reserved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubdomain {
    pub name: String,
    pub owner_id: String,
    pub port: u16,
    pub created_at: DateTime<Utc>,
}

/// How a row leaves the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Retire the row as `released` without a cooldown window.
    Soft { at: DateTime<Utc> },
    /// Remove the row entirely.
    Hard,
}

/// Result of a mutating lifecycle operation.
///
/// `reconciled` reports whether every DNS/route side effect succeeded. The row's
/// status is authoritative either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleOutcome {
    pub subdomain: Subdomain,
    pub reconciled: bool,
}

/// Read-only view returned by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdomainStatusReport {
    pub name: String,
    pub ip_address: Option<String>,
    pub port: u16,
    pub status: SubdomainStatus,
    pub dns_record_id: Option<String>,
    pub propagation: PropagationReport,
}
