//! Request document validation.
//!
//! [`validate_document`] is a pure function from an untrusted
//! [`RequestDocument`] to a typed [`SubdomainRequest`]. Checks run in a fixed
//! order and stop at the first failure: owner syntax, label syntax, reserved
//! labels, zone match, per-record checks, record-count cap. Nothing here
//! performs I/O; ownership and conflict checks live in the services layer.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use subdns_provider::{DnsRecordType, RecordData};

use crate::config::RegistryConfig;
use crate::error::{ValidationCode, ValidationError};
use crate::types::{OwnerIdentity, RecordDocument, RequestDocument, RequestedRecord, SubdomainRequest};

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // GitHub usernames: alphanumeric with single interior hyphens.
    Regex::new(r"^[A-Za-z0-9]+(?:-[A-Za-z0-9]+)*$").expect("invalid username regex")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("invalid label regex")
});

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // DNS labels, underscores allowed for service names (_sip._tcp).
    Regex::new(r"^(?:[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9_])?\.)*[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9_])?$")
        .expect("invalid hostname regex")
});

const MAX_USERNAME_LEN: usize = 39;
const MAX_HOSTNAME_LEN: usize = 253;
const MAX_TXT_LEN: usize = 255;

fn is_hostname(value: &str) -> bool {
    let value = value.trim_end_matches('.');
    !value.is_empty() && value.len() <= MAX_HOSTNAME_LEN && HOSTNAME_RE.is_match(value)
}

/// Validates a request document against the registry configuration.
///
/// On success the returned request has a lowercased label and fully typed
/// records; the desired-state builder applies FQDN normalization and
/// defaults afterwards.
pub fn validate_document(
    doc: &RequestDocument,
    config: &RegistryConfig,
) -> Result<SubdomainRequest, ValidationError> {
    let owner = validate_owner(doc)?;
    let label = validate_label(doc, config)?;
    validate_zone(doc, config)?;

    if doc.records.is_empty() {
        return Err(ValidationError::new(
            ValidationCode::NoRecords,
            "records",
            "a request must carry at least one record",
        ));
    }

    let mut records = Vec::with_capacity(doc.records.len());
    for (i, record) in doc.records.iter().enumerate() {
        records.push(validate_record(record, i, config)?);
    }

    if records.len() > config.max_records_per_label {
        return Err(ValidationError::new(
            ValidationCode::TooManyRecords,
            "records",
            format!(
                "{} records exceed the per-label cap of {}",
                records.len(),
                config.max_records_per_label
            ),
        ));
    }

    Ok(SubdomainRequest {
        owner,
        label,
        zone: config.zone_name.clone(),
        records,
        submitted_at: Utc::now(),
        source: doc.source.clone(),
    })
}

fn validate_owner(doc: &RequestDocument) -> Result<OwnerIdentity, ValidationError> {
    let username = doc.owner.username.trim();
    if username.is_empty()
        || username.len() > MAX_USERNAME_LEN
        || !USERNAME_RE.is_match(username)
    {
        return Err(ValidationError::new(
            ValidationCode::InvalidOwner,
            "owner.username",
            format!("'{username}' is not a valid GitHub username"),
        ));
    }

    if let Some(email) = &doc.owner.email {
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::new(
                ValidationCode::InvalidOwner,
                "owner.email",
                format!("'{email}' is not a valid email address"),
            ));
        }
    }

    Ok(OwnerIdentity {
        username: username.to_string(),
        email: doc.owner.email.clone(),
    })
}

fn validate_label(
    doc: &RequestDocument,
    config: &RegistryConfig,
) -> Result<String, ValidationError> {
    let label = doc.subdomain.trim().to_lowercase();
    if !LABEL_RE.is_match(&label) {
        return Err(ValidationError::new(
            ValidationCode::InvalidLabel,
            "subdomain",
            format!(
                "'{}' is not a valid label (1-63 alphanumeric/hyphen characters, \
                 no leading or trailing hyphen)",
                doc.subdomain
            ),
        ));
    }
    if config.is_reserved(&label) {
        return Err(ValidationError::new(
            ValidationCode::ReservedLabel,
            "subdomain",
            format!("'{label}' is reserved"),
        ));
    }
    Ok(label)
}

fn validate_zone(doc: &RequestDocument, config: &RegistryConfig) -> Result<(), ValidationError> {
    if !doc.domain.eq_ignore_ascii_case(&config.zone_name) {
        return Err(ValidationError::new(
            ValidationCode::ZoneMismatch,
            "domain",
            format!(
                "this registry manages '{}', not '{}'",
                config.zone_name, doc.domain
            ),
        ));
    }
    Ok(())
}

fn validate_record(
    record: &RecordDocument,
    index: usize,
    config: &RegistryConfig,
) -> Result<RequestedRecord, ValidationError> {
    let field = |suffix: &str| format!("records[{index}].{suffix}");

    let record_type = parse_type(&record.record_type, &field("type"))?;
    validate_name(&record.name, &field("name"))?;
    let data = parse_value(record, record_type, index)?;

    if let Some(ttl) = record.ttl {
        if ttl < config.min_ttl || ttl > config.max_ttl {
            return Err(ValidationError::new(
                ValidationCode::TtlOutOfRange,
                field("ttl"),
                format!(
                    "TTL {ttl} outside the accepted range [{}, {}]",
                    config.min_ttl, config.max_ttl
                ),
            ));
        }
    }

    let proxiable = matches!(
        record_type,
        DnsRecordType::A | DnsRecordType::Aaaa | DnsRecordType::Cname
    );
    if record.proxied == Some(true) && !proxiable {
        return Err(ValidationError::new(
            ValidationCode::InvalidRecordValue,
            field("proxied"),
            format!("{record_type} records cannot be proxied"),
        ));
    }

    Ok(RequestedRecord {
        name: record.name.trim().to_lowercase(),
        ttl: record.ttl,
        data,
        proxied: record.proxied,
    })
}

fn parse_type(raw: &str, field: &str) -> Result<DnsRecordType, ValidationError> {
    match raw.to_uppercase().as_str() {
        "A" => Ok(DnsRecordType::A),
        "AAAA" => Ok(DnsRecordType::Aaaa),
        "CNAME" => Ok(DnsRecordType::Cname),
        "MX" => Ok(DnsRecordType::Mx),
        "TXT" => Ok(DnsRecordType::Txt),
        "NS" => Ok(DnsRecordType::Ns),
        "SRV" => Ok(DnsRecordType::Srv),
        "CAA" => Ok(DnsRecordType::Caa),
        _ => Err(ValidationError::new(
            ValidationCode::InvalidRecordType,
            field,
            format!("unsupported record type '{raw}'"),
        )),
    }
}

fn validate_name(name: &str, field: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name == "@" || is_hostname(name) {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationCode::InvalidRecordName,
            field,
            format!("'{name}' is not a valid record name"),
        ))
    }
}

fn parse_value(
    record: &RecordDocument,
    record_type: DnsRecordType,
    index: usize,
) -> Result<RecordData, ValidationError> {
    let value = record.value.trim();
    let value_field = format!("records[{index}].value");
    let invalid = |message: String| {
        ValidationError::new(ValidationCode::InvalidRecordValue, &value_field, message)
    };
    let priority = || {
        record.priority.ok_or_else(|| {
            ValidationError::new(
                ValidationCode::MissingPriority,
                format!("records[{index}].priority"),
                format!("{record_type} records require a priority"),
            )
        })
    };

    match record_type {
        DnsRecordType::A => {
            value
                .parse::<Ipv4Addr>()
                .map_err(|_| invalid(format!("'{value}' is not a valid IPv4 address")))?;
            Ok(RecordData::A {
                address: value.to_string(),
            })
        }
        DnsRecordType::Aaaa => {
            value
                .parse::<Ipv6Addr>()
                .map_err(|_| invalid(format!("'{value}' is not a valid IPv6 address")))?;
            Ok(RecordData::AAAA {
                address: value.to_string(),
            })
        }
        DnsRecordType::Cname => {
            if !is_hostname(value) {
                return Err(invalid(format!("'{value}' is not a valid hostname")));
            }
            Ok(RecordData::CNAME {
                target: value.trim_end_matches('.').to_lowercase(),
            })
        }
        DnsRecordType::Ns => {
            if !is_hostname(value) {
                return Err(invalid(format!("'{value}' is not a valid hostname")));
            }
            Ok(RecordData::NS {
                nameserver: value.trim_end_matches('.').to_lowercase(),
            })
        }
        DnsRecordType::Txt => {
            if value.is_empty() || value.len() > MAX_TXT_LEN {
                return Err(invalid(format!(
                    "TXT value must be 1-{MAX_TXT_LEN} characters"
                )));
            }
            Ok(RecordData::TXT {
                text: value.to_string(),
            })
        }
        DnsRecordType::Mx => {
            if !is_hostname(value) {
                return Err(invalid(format!("'{value}' is not a valid mail exchange")));
            }
            Ok(RecordData::MX {
                priority: priority()?,
                exchange: value.trim_end_matches('.').to_lowercase(),
            })
        }
        DnsRecordType::Srv => {
            let parts: Vec<&str> = value.split_whitespace().collect();
            let [weight, port, target] = parts.as_slice() else {
                return Err(invalid(format!(
                    "SRV value must be 'weight port target', got '{value}'"
                )));
            };
            if !is_hostname(target) {
                return Err(invalid(format!("'{target}' is not a valid SRV target")));
            }
            Ok(RecordData::SRV {
                priority: priority()?,
                weight: weight
                    .parse()
                    .map_err(|_| invalid(format!("invalid SRV weight '{weight}'")))?,
                port: port
                    .parse()
                    .map_err(|_| invalid(format!("invalid SRV port '{port}'")))?,
                target: target.trim_end_matches('.').to_lowercase(),
            })
        }
        DnsRecordType::Caa => {
            let mut parts = value.splitn(3, ' ');
            let (Some(flags), Some(tag), Some(tag_value)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid(format!(
                    "CAA value must be 'flags tag value', got '{value}'"
                )));
            };
            if !matches!(tag, "issue" | "issuewild" | "iodef") {
                return Err(invalid(format!(
                    "CAA tag must be issue, issuewild or iodef, got '{tag}'"
                )));
            }
            Ok(RecordData::CAA {
                flags: flags
                    .parse()
                    .map_err(|_| invalid(format!("invalid CAA flags '{flags}'")))?,
                tag: tag.to_string(),
                value: tag_value.trim_matches('"').to_string(),
            })
        }
    }
}
