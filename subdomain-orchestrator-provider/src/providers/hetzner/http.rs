//! Hetzner HTTP 请求方法

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;

use crate::error::{ProviderError, Result};
use crate::http_client::{HttpUtils, RetryOn};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{HetznerErrorBody, HetznerProvider, HetznerRecord, RecordEnvelope, RecordPayload};

impl HetznerProvider {
    pub(crate) fn record_path(record_id: &str) -> String {
        format!("/records/{}", urlencoding::encode(record_id))
    }

    /// Sends an authenticated request and returns `(status, body)` for any status
    /// the shared HTTP layer did not already turn into an error.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&RecordPayload<'_>>,
        retry_on: RetryOn,
    ) -> Result<(u16, String)> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("Auth-API-Token", &self.api_token);

        if let Some(body) = body {
            let payload =
                serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                    provider: self.provider_name().to_string(),
                    detail: e.to_string(),
                })?;
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            method.as_str(),
            &url,
            self.max_retries,
            retry_on,
        )
        .await
    }

    /// Request whose success response is a `{"record": ..}` envelope.
    pub(crate) async fn record_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&RecordPayload<'_>>,
        ctx: ErrorContext,
        retry_on: RetryOn,
    ) -> Result<HetznerRecord> {
        let (status, text) = self.send(method, path, body, retry_on).await?;
        if !(200..300).contains(&status) {
            return Err(self.status_error(status, &text, ctx));
        }
        let envelope: RecordEnvelope = HttpUtils::parse_json(&text, self.provider_name())?;
        Ok(envelope.record)
    }

    /// Maps a non-2xx response through the provider's error table.
    pub(crate) fn status_error(&self, status: u16, body: &str, ctx: ErrorContext) -> ProviderError {
        let message = serde_json::from_str::<HetznerErrorBody>(body)
            .ok()
            .and_then(|b| b.message().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {status}"));
        log::warn!("[{}] API error (HTTP {status}): {message}", self.provider_name());
        self.map_error(RawApiError::with_code(status.to_string(), message), ctx)
    }
}
