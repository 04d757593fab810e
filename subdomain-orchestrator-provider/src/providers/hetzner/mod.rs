//! Hetzner DNS Provider

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::propagation::PropagationChecker;
use crate::providers::common::create_http_client;
use crate::traits::ProviderErrorMapper;

pub(crate) use types::{HetznerErrorBody, HetznerRecord, RecordEnvelope, RecordPayload};

pub(crate) const HETZNER_API_BASE: &str = "https://dns.hetzner.com/api/v1";

/// Hetzner DNS Provider
pub struct HetznerProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) zone_id: String,
    pub(crate) zone_name: String,
    pub(crate) base_url: String,
    pub(crate) max_retries: u32,
    pub(crate) propagation: PropagationChecker,
}

/// Hetzner Provider Builder
///
/// Credentials are optional here so that a missing token or zone id surfaces as
/// [`ProviderError::NotConfigured`] from [`build`](Self::build) rather than as a
/// failed request later.
pub struct HetznerProviderBuilder {
    api_token: Option<String>,
    zone_id: Option<String>,
    zone_name: String,
    base_url: String,
    max_retries: u32,
    propagation: PropagationChecker,
}

impl HetznerProviderBuilder {
    fn new(api_token: Option<String>, zone_id: Option<String>) -> Self {
        Self {
            api_token,
            zone_id,
            zone_name: String::new(),
            base_url: HETZNER_API_BASE.to_string(),
            max_retries: 2,
            propagation: PropagationChecker::default(),
        }
    }

    pub fn zone_name(mut self, zone_name: impl Into<String>) -> Self {
        self.zone_name = zone_name.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn propagation(mut self, checker: PropagationChecker) -> Self {
        self.propagation = checker;
        self
    }

    pub fn build(self) -> Result<HetznerProvider> {
        let api_token = self.api_token.filter(|s| !s.trim().is_empty());
        let zone_id = self.zone_id.filter(|s| !s.trim().is_empty());

        let (Some(api_token), Some(zone_id)) = (api_token.clone(), zone_id.clone()) else {
            let mut missing = Vec::new();
            if api_token.is_none() {
                missing.push("api_token".to_string());
            }
            if zone_id.is_none() {
                missing.push("zone_id".to_string());
            }
            return Err(ProviderError::NotConfigured {
                provider: PROVIDER_NAME.to_string(),
                missing,
            });
        };

        Ok(HetznerProvider {
            client: create_http_client(PROVIDER_NAME)?,
            api_token,
            zone_id,
            zone_name: self.zone_name,
            base_url: self.base_url,
            max_retries: self.max_retries,
            propagation: self.propagation,
        })
    }
}

pub(crate) const PROVIDER_NAME: &str = "hetzner";

impl HetznerProvider {
    pub fn builder(api_token: Option<String>, zone_id: Option<String>) -> HetznerProviderBuilder {
        HetznerProviderBuilder::new(api_token, zone_id)
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }
}

impl std::fmt::Debug for HetznerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerProvider")
            .field("provider", &self.provider_name())
            .field("zone_id", &self.zone_id)
            .field("zone_name", &self.zone_name)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_token_is_not_configured() {
        let result = HetznerProvider::builder(None, Some("zone".into())).build();
        assert!(matches!(
            result,
            Err(ProviderError::NotConfigured { ref missing, .. }) if missing == &["api_token"]
        ));
    }

    #[test]
    fn build_with_blank_values_reports_both_missing() {
        let result = HetznerProvider::builder(Some("  ".into()), Some(String::new())).build();
        assert!(matches!(
            result,
            Err(ProviderError::NotConfigured { ref missing, .. })
                if missing == &["api_token", "zone_id"]
        ));
    }

    #[test]
    fn build_trims_trailing_slash_from_base_url() {
        let provider = HetznerProvider::builder(Some("t".into()), Some("z".into()))
            .base_url("http://127.0.0.1:9/api/v1/")
            .zone_name("example.com")
            .build();
        assert!(
            matches!(&provider, Ok(p) if p.base_url == "http://127.0.0.1:9/api/v1"),
            "{provider:?}"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let provider = HetznerProvider::builder(Some("secret-token".into()), Some("z".into())).build();
        let Ok(provider) = provider else {
            unreachable!("builder with credentials must succeed");
        };
        assert!(!format!("{provider:?}").contains("secret-token"));
    }
}
