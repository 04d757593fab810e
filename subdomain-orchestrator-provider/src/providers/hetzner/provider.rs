//! Hetzner `DnsProvider` trait implementation

use async_trait::async_trait;
use reqwest::Method;

use crate::error::Result;
use crate::http_client::RetryOn;
use crate::providers::common::fqdn;
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{DnsRecord, PropagationReport};

use super::{HetznerProvider, PROVIDER_NAME, RecordPayload};

#[async_trait]
impl DnsProvider for HetznerProvider {
    fn id(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn zone_name(&self) -> &str {
        &self.zone_name
    }

    async fn create_record(&self, subdomain: &str, ip: &str, ttl: u32) -> Result<String> {
        let payload = RecordPayload {
            zone_id: &self.zone_id,
            record_type: "A",
            name: subdomain,
            value: ip,
            ttl: Some(ttl),
        };
        let ctx = ErrorContext {
            record_name: Some(subdomain.to_string()),
            record_id: None,
            zone_id: Some(self.zone_id.clone()),
        };

        // not idempotent; only re-sent when the provider throttled it
        let record = self
            .record_request(
                Method::POST,
                "/records",
                Some(&payload),
                ctx,
                RetryOn::RateLimitOnly,
            )
            .await?;

        log::info!(
            "[{}] Created A record {subdomain} -> {ip} (id {})",
            self.provider_name(),
            record.id
        );
        Ok(record.id)
    }

    async fn get_record(&self, record_id: &str) -> Result<DnsRecord> {
        let ctx = ErrorContext {
            record_id: Some(record_id.to_string()),
            zone_id: Some(self.zone_id.clone()),
            ..ErrorContext::default()
        };
        let record = self
            .record_request(
                Method::GET,
                &Self::record_path(record_id),
                None,
                ctx,
                RetryOn::Transient,
            )
            .await?;
        Ok(record.into())
    }

    async fn update_record(&self, record_id: &str, ip: &str) -> Result<()> {
        let existing = self.get_record(record_id).await?;

        let payload = RecordPayload {
            zone_id: &existing.zone_id,
            record_type: &existing.record_type,
            name: &existing.name,
            value: ip,
            ttl: existing.ttl,
        };
        let ctx = ErrorContext {
            record_name: Some(existing.name.clone()),
            record_id: Some(record_id.to_string()),
            zone_id: Some(existing.zone_id.clone()),
        };
        self.record_request(
            Method::PUT,
            &Self::record_path(record_id),
            Some(&payload),
            ctx,
            RetryOn::Transient,
        )
        .await?;

        log::info!(
            "[{}] Updated A record {} -> {ip} (id {record_id})",
            self.provider_name(),
            existing.name
        );
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let (status, body) = self
            .send(
                Method::DELETE,
                &Self::record_path(record_id),
                None,
                RetryOn::Transient,
            )
            .await?;

        if matches!(status, 200 | 204) {
            log::info!("[{}] Deleted record {record_id}", self.provider_name());
            return Ok(());
        }

        Err(self.status_error(
            status,
            &body,
            ErrorContext {
                record_id: Some(record_id.to_string()),
                zone_id: Some(self.zone_id.clone()),
                ..ErrorContext::default()
            },
        ))
    }

    async fn check_propagation(&self, subdomain: &str, expected_ip: &str) -> PropagationReport {
        self.propagation
            .check(&fqdn(subdomain, &self.zone_name), expected_ip)
            .await
    }
}
