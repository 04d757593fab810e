use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{DnsRecord, PropagationReport};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP status or provider error code
    pub code: Option<String>,
    pub message: String,
}

impl RawApiError {
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra detail used when mapping a raw error to a [`ProviderError`] variant.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    pub record_name: Option<String>,
    pub record_id: Option<String>,
    pub zone_id: Option<String>,
}

/// Provider 错误映射 Trait（内部使用）
pub(crate) trait ProviderErrorMapper {
    fn provider_name(&self) -> &'static str;

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// A-record lifecycle for subdomains of a single zone.
///
/// Subdomain arguments are relative labels (`"myapp"`), never fully qualified names.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Zone the provider mints records under, e.g. `example.com`.
    fn zone_name(&self) -> &str;

    /// Creates an A record and returns the provider's record id.
    async fn create_record(&self, subdomain: &str, ip: &str, ttl: u32) -> Result<String>;

    async fn get_record(&self, record_id: &str) -> Result<DnsRecord>;

    /// Points an existing record at `ip`.
    ///
    /// The record is re-read first so its name, type and TTL are preserved.
    /// Fails with [`ProviderError::RecordNotFound`] when the record is gone.
    async fn update_record(&self, record_id: &str, ip: &str) -> Result<()>;

    async fn delete_record(&self, record_id: &str) -> Result<()>;

    /// Asks each public resolver whether `subdomain` resolves to `expected_ip`.
    ///
    /// Diagnostic only. A resolver that fails or times out reports `false`.
    async fn check_propagation(&self, subdomain: &str, expected_ip: &str) -> PropagationReport;
}
