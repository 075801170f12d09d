//! Cloudflare `DnsProvider` implementation.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::providers::common::{name_in_scope, parse_record_data, parse_record_type, record_content};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{ProviderRecord, RecordData, RecordSpec};

use super::types::{CloudflareCaaData, CloudflareSrvData};
use super::{CloudflareDnsRecord, CloudflareProvider, MAX_PAGE_SIZE_RECORDS, RecordPayload};

impl CloudflareProvider {
    fn cf_record_to_provider_record(
        &self,
        cf_record: CloudflareDnsRecord,
        zone_id: &str,
    ) -> Result<ProviderRecord> {
        let record_type = parse_record_type(&cf_record.record_type, self.provider_name())?;

        // SRV/CAA come back with a structured `data` object; prefer it over
        // the flattened content string when present.
        let data = match (&cf_record.data, record_type) {
            (Some(raw), crate::types::DnsRecordType::Srv) => {
                let srv: CloudflareSrvData =
                    serde_json::from_value(raw.clone()).map_err(|e| self.parse_error(e))?;
                RecordData::SRV {
                    priority: srv.priority,
                    weight: srv.weight,
                    port: srv.port,
                    target: srv.target,
                }
            }
            (Some(raw), crate::types::DnsRecordType::Caa) => {
                let caa: CloudflareCaaData =
                    serde_json::from_value(raw.clone()).map_err(|e| self.parse_error(e))?;
                RecordData::CAA {
                    flags: caa.flags,
                    tag: caa.tag,
                    value: caa.value,
                }
            }
            _ => parse_record_data(
                self.provider_name(),
                record_type,
                &cf_record.content,
                cf_record.priority,
            )?,
        };

        Ok(ProviderRecord {
            id: cf_record.id,
            zone_id: zone_id.to_string(),
            name: cf_record.name,
            ttl: cf_record.ttl,
            data,
            proxied: cf_record.proxied,
            comment: cf_record.comment,
            created_at: cf_record.created_on,
            modified_at: cf_record.modified_on,
        })
    }

    fn record_payload(spec: &RecordSpec) -> RecordPayload {
        let record_type = spec.data.record_type().to_string();
        let (content, data) = match &spec.data {
            RecordData::SRV {
                priority,
                weight,
                port,
                target,
            } => (
                None,
                Some(json!(CloudflareSrvData {
                    priority: *priority,
                    weight: *weight,
                    port: *port,
                    target: target.clone(),
                })),
            ),
            RecordData::CAA { flags, tag, value } => (
                None,
                Some(json!(CloudflareCaaData {
                    flags: *flags,
                    tag: tag.clone(),
                    value: value.clone(),
                })),
            ),
            other => (Some(record_content(other)), None),
        };

        RecordPayload {
            record_type,
            name: spec.name.clone(),
            content,
            ttl: spec.ttl,
            priority: spec.data.priority(),
            proxied: spec.proxied,
            comment: spec.comment.clone(),
            data,
        }
    }

    fn spec_context(spec: &RecordSpec) -> ErrorContext {
        ErrorContext {
            record_name: Some(spec.name.clone()),
            record_id: None,
            zone: Some(spec.zone_id.clone()),
        }
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn validate_credentials(&self) -> Result<bool> {
        #[derive(Deserialize)]
        struct VerifyResponse {
            status: String,
        }

        let result: Result<VerifyResponse> = self
            .request(
                Method::GET,
                "/user/tokens/verify",
                None,
                ErrorContext::default(),
            )
            .await;
        match result {
            Ok(resp) => Ok(resp.status == "active"),
            Err(_) => Ok(false),
        }
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name_scope: Option<&str>,
    ) -> Result<Vec<ProviderRecord>> {
        let mut records = Vec::new();
        let mut page = 1_u32;

        loop {
            let mut path = format!(
                "/zones/{zone_id}/dns_records?page={page}&per_page={MAX_PAGE_SIZE_RECORDS}"
            );
            if let Some(scope) = name_scope {
                // Server-side substring filter narrows the page; exact scope
                // matching happens below.
                path.push_str(&format!("&name.contains={}", urlencoding::encode(scope)));
            }

            let envelope: super::CloudflareResponse<Vec<CloudflareDnsRecord>> = self
                .request_envelope(
                    Method::GET,
                    &path,
                    None,
                    ErrorContext {
                        zone: Some(zone_id.to_string()),
                        ..ErrorContext::default()
                    },
                )
                .await?;

            let total_count = envelope.result_info.as_ref().map_or(0, |i| i.total_count);
            let page_records = envelope.result.unwrap_or_default();
            let page_len = page_records.len();

            for cf_record in page_records {
                if name_scope.is_none_or(|scope| name_in_scope(&cf_record.name, scope)) {
                    records.push(self.cf_record_to_provider_record(cf_record, zone_id)?);
                }
            }

            let fetched = u64::from(page) * u64::from(MAX_PAGE_SIZE_RECORDS);
            if page_len == 0 || fetched >= u64::from(total_count) {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    async fn create_record(&self, spec: &RecordSpec) -> Result<ProviderRecord> {
        let body = serde_json::to_value(Self::record_payload(spec))
            .map_err(|e| self.parse_error(e))?;
        let cf_record: CloudflareDnsRecord = self
            .request(
                Method::POST,
                &format!("/zones/{}/dns_records", spec.zone_id),
                Some(body),
                Self::spec_context(spec),
            )
            .await?;
        self.cf_record_to_provider_record(cf_record, &spec.zone_id)
    }

    async fn update_record(&self, record_id: &str, spec: &RecordSpec) -> Result<ProviderRecord> {
        let body = serde_json::to_value(Self::record_payload(spec))
            .map_err(|e| self.parse_error(e))?;
        let cf_record: CloudflareDnsRecord = self
            .request(
                Method::PATCH,
                &format!("/zones/{}/dns_records/{record_id}", spec.zone_id),
                Some(body),
                ErrorContext {
                    record_id: Some(record_id.to_string()),
                    ..Self::spec_context(spec)
                },
            )
            .await?;
        self.cf_record_to_provider_record(cf_record, &spec.zone_id)
    }

    async fn delete_record(&self, record_id: &str, zone_id: &str) -> Result<()> {
        let _: super::CloudflareResponse<serde_json::Value> = self
            .request_envelope(
                Method::DELETE,
                &format!("/zones/{zone_id}/dns_records/{record_id}"),
                None,
                ErrorContext {
                    record_id: Some(record_id.to_string()),
                    zone: Some(zone_id.to_string()),
                    ..ErrorContext::default()
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CloudflareProvider {
        CloudflareProvider::new(String::new())
    }

    fn cf_record(record_type: &str, content: &str) -> CloudflareDnsRecord {
        CloudflareDnsRecord {
            id: "cf-1".to_string(),
            record_type: record_type.to_string(),
            name: "app.example.com".to_string(),
            content: content.to_string(),
            ttl: 300,
            priority: None,
            proxied: Some(false),
            comment: None,
            created_on: None,
            modified_on: None,
            data: None,
        }
    }

    #[test]
    fn converts_a_record() {
        let record = provider()
            .cf_record_to_provider_record(cf_record("A", "1.2.3.4"), "zone-1")
            .unwrap();
        assert_eq!(record.zone_id, "zone-1");
        assert_eq!(
            record.data,
            RecordData::A {
                address: "1.2.3.4".to_string()
            }
        );
    }

    #[test]
    fn converts_srv_from_structured_data() {
        let mut record = cf_record("SRV", "");
        record.name = "_sip._tcp.app.example.com".to_string();
        record.data = Some(json!({
            "priority": 10,
            "weight": 5,
            "port": 5060,
            "target": "sip.app.example.com"
        }));
        let converted = provider()
            .cf_record_to_provider_record(record, "zone-1")
            .unwrap();
        assert_eq!(
            converted.data,
            RecordData::SRV {
                priority: 10,
                weight: 5,
                port: 5060,
                target: "sip.app.example.com".to_string(),
            }
        );
    }

    #[test]
    fn converts_mx_from_content_and_priority() {
        let mut record = cf_record("MX", "mail.app.example.com");
        record.priority = Some(10);
        let converted = provider()
            .cf_record_to_provider_record(record, "zone-1")
            .unwrap();
        assert_eq!(
            converted.data,
            RecordData::MX {
                priority: 10,
                exchange: "mail.app.example.com".to_string(),
            }
        );
    }

    #[test]
    fn unsupported_record_type_rejected() {
        let err = provider()
            .cf_record_to_provider_record(cf_record("NAPTR", "x"), "zone-1")
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ProviderError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn payload_for_plain_record_uses_content() {
        let spec = RecordSpec {
            zone_id: "zone-1".to_string(),
            name: "app.example.com".to_string(),
            ttl: 300,
            data: RecordData::CNAME {
                target: "pages.dev".to_string(),
            },
            proxied: Some(true),
            comment: Some("managed-by:subdns".to_string()),
        };
        let payload = CloudflareProvider::record_payload(&spec);
        assert_eq!(payload.record_type, "CNAME");
        assert_eq!(payload.content.as_deref(), Some("pages.dev"));
        assert!(payload.data.is_none());
        assert_eq!(payload.proxied, Some(true));
    }

    #[test]
    fn payload_for_srv_uses_structured_data() {
        let spec = RecordSpec {
            zone_id: "zone-1".to_string(),
            name: "_sip._tcp.app.example.com".to_string(),
            ttl: 300,
            data: RecordData::SRV {
                priority: 10,
                weight: 5,
                port: 5060,
                target: "sip.app.example.com".to_string(),
            },
            proxied: None,
            comment: None,
        };
        let payload = CloudflareProvider::record_payload(&spec);
        assert!(payload.content.is_none());
        let data = payload.data.expect("srv payload carries data");
        assert_eq!(data["port"], 5060);
        assert_eq!(data["target"], "sip.app.example.com");
        assert_eq!(payload.priority, Some(10));
    }

    #[test]
    fn payload_for_mx_carries_priority() {
        let spec = RecordSpec {
            zone_id: "zone-1".to_string(),
            name: "app.example.com".to_string(),
            ttl: 3600,
            data: RecordData::MX {
                priority: 20,
                exchange: "mail.app.example.com".to_string(),
            },
            proxied: None,
            comment: None,
        };
        let payload = CloudflareProvider::record_payload(&spec);
        assert_eq!(payload.content.as_deref(), Some("mail.app.example.com"));
        assert_eq!(payload.priority, Some(20));
    }
}
