//! Shared HTTP plumbing for provider adapters.
//!
//! Providers build their own `RequestBuilder` (URL, auth header, body) and hand it
//! to [`HttpUtils`], which sends it, logs the exchange with bodies truncated, maps
//! throttling and gateway failures to retryable errors, and retries with backoff.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ProviderError;

/// Maximum number of body bytes written to the log.
const LOG_BODY_LIMIT: usize = 256;
/// Upper bound for exponential backoff between attempts.
const MAX_BACKOFF_MS: u64 = 10_000;
/// Upper bound for a provider-supplied `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Which failures a request may be re-sent after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    /// Network errors, timeouts, HTTP 429 and 502-504. For idempotent requests.
    Transient,
    /// Only HTTP 429, where the provider guarantees nothing was processed.
    /// For requests that must not be applied twice, such as record creation.
    RateLimitOnly,
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Sends a request once and returns `(status, body)`.
    ///
    /// HTTP 429 becomes [`ProviderError::RateLimited`] and 502-504 become
    /// [`ProviderError::NetworkError`]; every other status is returned to the caller
    /// so the provider can map it with its own error table.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] {method_name} {url} -> {status}: {}",
            truncate_for_log(&body)
        );

        match status {
            429 => {
                log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
                Err(ProviderError::RateLimited {
                    provider: provider_name.to_string(),
                    retry_after,
                    raw_message: Some(truncate_for_log(&body)),
                })
            }
            502..=504 => {
                log::warn!("[{provider_name}] Upstream gateway failure (HTTP {status})");
                Err(ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: format!("HTTP {status}"),
                })
            }
            _ => Ok((status, body)),
        }
    }

    /// Decodes a JSON body, logging a truncated copy on failure.
    pub fn parse_json<T>(body: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!(
                "[{provider_name}] JSON parse failed: {e}; body: {}",
                truncate_for_log(body)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Sends a request, re-sending it up to `max_retries` times when the failure
    /// is covered by `retry_on`.
    ///
    /// Delay between attempts is `100ms * 2^attempt` capped at 10s, or the
    /// provider's `Retry-After` (capped at 30s) when one was sent with a 429.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
        max_retries: u32,
        retry_on: RetryOn,
    ) -> Result<(u16, String), ProviderError> {
        let mut attempt = 0;
        loop {
            let Some(request) = request_builder.try_clone() else {
                log::warn!("[{provider_name}] Request body is not cloneable, sending without retry");
                return Self::execute_request(request_builder, provider_name, method_name, url)
                    .await;
            };

            match Self::execute_request(request, provider_name, method_name, url).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && should_retry(&e, retry_on) => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{provider_name}] {method_name} {url} failed (attempt {}/{}), retrying in {:.1}s: {e}",
                        attempt + 1,
                        max_retries + 1,
                        delay.as_secs_f32(),
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn should_retry(error: &ProviderError, retry_on: RetryOn) -> bool {
    match retry_on {
        RetryOn::Transient => error.is_transient(),
        RetryOn::RateLimitOnly => matches!(error, ProviderError::RateLimited { .. }),
    }
}

fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    match error {
        ProviderError::RateLimited {
            retry_after: Some(secs),
            ..
        } => Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS)),
        _ => backoff_delay(attempt),
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << shift).min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}

/// Shortens a response body for logging without splitting a UTF-8 sequence.
pub(crate) fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_BODY_LIMIT {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|i| *i <= LOG_BODY_LIMIT)
        .last()
        .unwrap_or(0);
    format!("{}... [truncated, total {} bytes]", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited(retry_after: Option<u64>) -> ProviderError {
        ProviderError::RateLimited {
            provider: "test".into(),
            retry_after,
            raw_message: None,
        }
    }

    fn network() -> ProviderError {
        ProviderError::NetworkError {
            provider: "test".into(),
            detail: "reset".into(),
        }
    }

    #[test]
    fn transient_policy_retries_network_and_throttle() {
        assert!(should_retry(&network(), RetryOn::Transient));
        assert!(should_retry(&rate_limited(None), RetryOn::Transient));
        assert!(should_retry(
            &ProviderError::Timeout {
                provider: "test".into(),
                detail: "elapsed".into(),
            },
            RetryOn::Transient
        ));
    }

    #[test]
    fn rate_limit_only_policy_skips_network_errors() {
        assert!(!should_retry(&network(), RetryOn::RateLimitOnly));
        assert!(should_retry(&rate_limited(Some(1)), RetryOn::RateLimitOnly));
    }

    #[test]
    fn business_errors_never_retry() {
        let e = ProviderError::RecordNotFound {
            provider: "test".into(),
            record_id: "1".into(),
            raw_message: None,
        };
        assert!(!should_retry(&e, RetryOn::Transient));
        assert!(!should_retry(&e, RetryOn::RateLimitOnly));
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
        assert_eq!(backoff_delay(7), Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[test]
    fn retry_after_is_honoured_and_capped() {
        assert_eq!(retry_delay(&rate_limited(Some(4)), 0), Duration::from_secs(4));
        assert_eq!(
            retry_delay(&rate_limited(Some(600)), 0),
            Duration::from_secs(MAX_RETRY_AFTER_SECS)
        );
        assert_eq!(retry_delay(&rate_limited(None), 2), Duration::from_millis(400));
    }

    #[test]
    fn parse_json_reports_parse_error() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Body {
            id: String,
        }
        let ok: Result<Body, ProviderError> = HttpUtils::parse_json(r#"{"id":"r1"}"#, "test");
        assert!(matches!(&ok, Ok(Body { id }) if id == "r1"), "{ok:?}");

        let err: Result<Body, ProviderError> = HttpUtils::parse_json("<html>", "test");
        assert!(matches!(err, Err(ProviderError::ParseError { .. })));
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_for_log("{\"ok\":true}"), "{\"ok\":true}");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(400);
        let out = truncate_for_log(&body);
        assert!(out.ends_with("[truncated, total 800 bytes]"));
        assert!(out.len() < body.len());
    }
}
