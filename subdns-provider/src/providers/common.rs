//! Shared helpers for provider adapters.

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::types::{DnsRecordType, RecordData};

// ============ HTTP Client ============

/// Default connect timeout (seconds).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default per-request timeout (seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Creates an HTTP client with the crate's timeout configuration.
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

// ============ Record type conversion ============

/// Parses a wire-format record type string.
pub fn parse_record_type(record_type: &str, provider: &str) -> Result<DnsRecordType> {
    match record_type.to_uppercase().as_str() {
        "A" => Ok(DnsRecordType::A),
        "AAAA" => Ok(DnsRecordType::Aaaa),
        "CNAME" => Ok(DnsRecordType::Cname),
        "MX" => Ok(DnsRecordType::Mx),
        "TXT" => Ok(DnsRecordType::Txt),
        "NS" => Ok(DnsRecordType::Ns),
        "SRV" => Ok(DnsRecordType::Srv),
        "CAA" => Ok(DnsRecordType::Caa),
        _ => Err(ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "record_type".to_string(),
            detail: format!("unsupported record type: {record_type}"),
        }),
    }
}

// ============ Content string conversion ============

/// Renders record data as a provider wire-format content string.
///
/// SRV becomes `"weight port target"` (priority travels in its own field),
/// CAA becomes `"flags tag value"`; everything else is the primary value.
#[must_use]
pub fn record_content(data: &RecordData) -> String {
    match data {
        RecordData::SRV {
            weight,
            port,
            target,
            ..
        } => format!("{weight} {port} {target}"),
        RecordData::CAA { flags, tag, value } => format!("{flags} {tag} {value}"),
        other => other.display_value().to_string(),
    }
}

/// Parses a wire-format content string (plus the separate priority field)
/// back into typed record data.
pub fn parse_record_data(
    provider: &str,
    record_type: DnsRecordType,
    content: &str,
    priority: Option<u16>,
) -> Result<RecordData> {
    let parse_err = |detail: String| ProviderError::ParseError {
        provider: provider.to_string(),
        detail,
    };

    match record_type {
        DnsRecordType::A => Ok(RecordData::A {
            address: content.to_string(),
        }),
        DnsRecordType::Aaaa => Ok(RecordData::AAAA {
            address: content.to_string(),
        }),
        DnsRecordType::Cname => Ok(RecordData::CNAME {
            target: content.to_string(),
        }),
        DnsRecordType::Txt => Ok(RecordData::TXT {
            text: content.to_string(),
        }),
        DnsRecordType::Ns => Ok(RecordData::NS {
            nameserver: content.to_string(),
        }),
        DnsRecordType::Mx => Ok(RecordData::MX {
            priority: priority
                .ok_or_else(|| parse_err("MX record missing priority".to_string()))?,
            exchange: content.to_string(),
        }),
        DnsRecordType::Srv => {
            let parts: Vec<&str> = content.split_whitespace().collect();
            let [weight, port, target] = parts.as_slice() else {
                return Err(parse_err(format!(
                    "SRV content must be 'weight port target', got '{content}'"
                )));
            };
            Ok(RecordData::SRV {
                priority: priority
                    .ok_or_else(|| parse_err("SRV record missing priority".to_string()))?,
                weight: weight
                    .parse()
                    .map_err(|_| parse_err(format!("invalid SRV weight '{weight}'")))?,
                port: port
                    .parse()
                    .map_err(|_| parse_err(format!("invalid SRV port '{port}'")))?,
                target: (*target).to_string(),
            })
        }
        DnsRecordType::Caa => {
            let mut parts = content.splitn(3, ' ');
            let (Some(flags), Some(tag), Some(value)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(parse_err(format!(
                    "CAA content must be 'flags tag value', got '{content}'"
                )));
            };
            Ok(RecordData::CAA {
                flags: flags
                    .parse()
                    .map_err(|_| parse_err(format!("invalid CAA flags '{flags}'")))?,
                tag: tag.to_string(),
                value: value.trim_matches('"').to_string(),
            })
        }
    }
}

// ============ Domain name handling ============

/// Strips a trailing dot from a domain name.
#[must_use]
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// Whether `full_name` equals `scope` or is a subdomain of it.
#[must_use]
pub fn name_in_scope(full_name: &str, scope: &str) -> bool {
    let full = normalize_domain_name(full_name);
    let scope = normalize_domain_name(scope);
    full.eq_ignore_ascii_case(&scope)
        || full
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", scope.to_ascii_lowercase()))
}
