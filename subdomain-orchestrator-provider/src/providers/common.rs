//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub(crate) fn create_http_client(provider: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// Joins a relative label and a zone into a fully qualified name.
///
/// `"myapp"` + `"example.com."` → `"myapp.example.com"`
pub fn fqdn(subdomain: &str, zone_name: &str) -> String {
    let zone = zone_name.trim_end_matches('.');
    if subdomain.is_empty() || subdomain == "@" {
        zone.to_string()
    } else {
        format!("{subdomain}.{zone}")
    }
}
