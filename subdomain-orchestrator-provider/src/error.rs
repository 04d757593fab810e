use serde::{Deserialize, Serialize};

/// Unified error type for DNS provider operations.
///
/// Every variant names the provider that produced it. The enum is serializable so
/// it can travel inside higher-level error payloads unchanged.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError)
/// - [`Timeout`](Self::Timeout)
/// - [`RateLimited`](Self::RateLimited)
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Connection refused, DNS failure, gateway errors (HTTP 502-504).
    #[error("[{provider}] Network error: {detail}")]
    NetworkError { provider: String, detail: String },

    /// The request did not complete in time.
    #[error("[{provider}] Request timeout: {detail}")]
    Timeout { provider: String, detail: String },

    /// HTTP 429. The provider did not process the request.
    #[error("[{provider}] Rate limited{}", retry_suffix(.retry_after.as_ref()))]
    RateLimited {
        provider: String,
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Invalid credentials{}", message_suffix(.raw_message.as_deref()))]
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Permission denied{}", message_suffix(.raw_message.as_deref()))]
    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Record '{record_id}' not found")]
    RecordNotFound {
        provider: String,
        record_id: String,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Record '{record_name}' already exists")]
    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Zone '{zone_id}' not found")]
    ZoneNotFound {
        provider: String,
        zone_id: String,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Invalid parameter '{param}': {detail}")]
    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    /// The provider answered with a body we could not decode.
    #[error("[{provider}] Parse error: {detail}")]
    ParseError { provider: String, detail: String },

    #[error("[{provider}] Serialization error: {detail}")]
    SerializationError { provider: String, detail: String },

    /// Credentials or zone id are absent. Callers treat this as "integration disabled".
    #[error("[{provider}] Not configured: missing {}", .missing.join(", "))]
    NotConfigured {
        provider: String,
        missing: Vec<String>,
    },

    /// Anything the error mapper has no dedicated variant for.
    #[error("[{provider}] {raw_message}")]
    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

fn retry_suffix(retry_after: Option<&u64>) -> String {
    retry_after.map_or_else(String::new, |secs| format!(" (retry after {secs}s)"))
}

fn message_suffix(raw_message: Option<&str>) -> String {
    raw_message.map_or_else(String::new, |msg| format!(": {msg}"))
}

impl ProviderError {
    /// 是否为预期行为（凭证、参数、资源不存在等），用于日志分级。
    ///
    /// `true` → `warn`，`false` → `error`。新增变体时请同步更新此方法。
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::RecordNotFound { .. }
                | Self::RecordExists { .. }
                | Self::ZoneNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::NotConfigured { .. }
        )
    }

    /// Transient failures that may succeed when the same request is sent again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Provider identifier carried by every variant.
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::RecordNotFound { provider, .. }
            | Self::RecordExists { provider, .. }
            | Self::ZoneNotFound { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::NotConfigured { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }
}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
