//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use subdomain_orchestrator_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Bad name, IP or port supplied by the caller
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Name already claimed or still cooling down
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Ownership, role, verification or suspension check failed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Subdomain limit of {limit} reached")]
    QuotaExceeded { limit: u32 },

    #[error("Too many requests, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// DNS provider call failed
    #[error("DNS error: {0}")]
    Dns(#[from] ProviderError),

    /// An optional integration (DNS, routing) is disabled
    #[error("{0} integration is not configured")]
    NotConfigured(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Route error: {0}")]
    RouteError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// `true` → `warn`, `false` → `error`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError(_)
            | Self::Conflict(_)
            | Self::NotFound(_)
            | Self::Forbidden(_)
            | Self::QuotaExceeded { .. }
            | Self::RateLimited { .. }
            | Self::NotConfigured(_) => true,
            Self::Dns(e) => e.is_expected(),
            _ => false,
        }
    }

    /// HTTP status a transport layer should answer with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::Forbidden(_) | Self::QuotaExceeded { .. } => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::RateLimited { .. } => 429,
            Self::Dns(_) => 502,
            Self::NotConfigured(_) => 503,
            Self::StorageError(_)
            | Self::RouteError(_)
            | Self::SerializationError(_)
            | Self::ConfigError(_) => 500,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::RateLimited { .. } => "rate_limited",
            Self::Dns(_) => "dns_error",
            Self::NotConfigured(_) => "not_configured",
            Self::StorageError(_) => "storage_error",
            Self::RouteError(_) => "route_error",
            Self::SerializationError(_) => "serialization_error",
            Self::ConfigError(_) => "config_error",
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Provider responses and internal failures are reduced to a generic reason;
    /// the full error only goes to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ValidationError(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::Forbidden(msg) => msg.clone(),
            Self::QuotaExceeded { limit } => {
                format!("Subdomain limit reached ({limit} subdomains maximum)")
            }
            Self::RateLimited { retry_after_secs } => {
                format!("Too many requests, retry after {retry_after_secs} seconds")
            }
            Self::Dns(_) => "Failed to update DNS record".to_string(),
            Self::NotConfigured(what) => format!("{what} integration is not available"),
            Self::StorageError(_)
            | Self::RouteError(_)
            | Self::SerializationError(_)
            | Self::ConfigError(_) => "Internal server error".to_string(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
