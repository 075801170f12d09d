//! Desired-state construction.
//!
//! Pure derivation from a validated request to the full set of records the
//! zone should hold for the label: names become fully qualified, defaults
//! are applied, exact duplicates collapse, and CNAME coexistence is
//! rejected.

use std::collections::HashMap;

use subdns_provider::{DnsRecordType, RecordData};

use crate::config::RegistryConfig;
use crate::error::{ValidationCode, ValidationError};
use crate::types::{DesiredRecord, SubdomainRequest};

/// Builds the desired record set for a validated request.
///
/// Name normalization: `@` maps to `label.zone`, anything else to
/// `name.label.zone`. Records never escape the label's namespace.
pub fn build_desired_state(
    request: &SubdomainRequest,
    config: &RegistryConfig,
) -> Result<Vec<DesiredRecord>, ValidationError> {
    let apex = config.label_fqdn(&request.label);

    let mut desired: Vec<DesiredRecord> = Vec::with_capacity(request.records.len());
    for record in &request.records {
        let name = if record.name == "@" || record.name.is_empty() {
            apex.clone()
        } else {
            format!("{}.{apex}", record.name)
        };

        let proxiable = matches!(
            record.data.record_type(),
            DnsRecordType::A | DnsRecordType::Aaaa | DnsRecordType::Cname
        );
        let candidate = DesiredRecord {
            name,
            ttl: record.ttl.unwrap_or(config.default_ttl),
            data: record.data.clone(),
            proxied: if proxiable {
                Some(record.proxied.unwrap_or(false))
            } else {
                None
            },
        };

        // Exact duplicates collapse silently; the first occurrence wins.
        if !desired.contains(&candidate) {
            desired.push(candidate);
        }
    }

    check_cname_coexistence(&desired)?;
    Ok(desired)
}

/// A CNAME may not share a name with any other record, a second CNAME
/// included.
fn check_cname_coexistence(desired: &[DesiredRecord]) -> Result<(), ValidationError> {
    let mut by_name: HashMap<&str, (usize, usize)> = HashMap::new();
    for record in desired {
        let entry = by_name.entry(record.name.as_str()).or_insert((0, 0));
        if matches!(record.data, RecordData::CNAME { .. }) {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    for (name, (cnames, others)) in by_name {
        if cnames > 0 && (others > 0 || cnames > 1) {
            return Err(ValidationError::new(
                ValidationCode::RecordTypeConflict,
                "records",
                format!("'{name}' holds a CNAME alongside other records"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OwnerIdentity, RequestedRecord};
    use chrono::Utc;

    fn config() -> RegistryConfig {
        RegistryConfig::new("example.com", "zone-1")
    }

    fn request(records: Vec<RequestedRecord>) -> SubdomainRequest {
        SubdomainRequest {
            owner: OwnerIdentity {
                username: "alice".to_string(),
                email: None,
            },
            label: "app".to_string(),
            zone: "example.com".to_string(),
            records,
            submitted_at: Utc::now(),
            source: None,
        }
    }

    fn a(name: &str, address: &str) -> RequestedRecord {
        RequestedRecord {
            name: name.to_string(),
            ttl: None,
            data: RecordData::A {
                address: address.to_string(),
            },
            proxied: None,
        }
    }

    fn cname(name: &str, target: &str) -> RequestedRecord {
        RequestedRecord {
            name: name.to_string(),
            ttl: None,
            data: RecordData::CNAME {
                target: target.to_string(),
            },
            proxied: None,
        }
    }

    #[test]
    fn apex_and_subdomain_names_qualify() {
        let desired =
            build_desired_state(&request(vec![a("@", "1.2.3.4"), a("www", "1.2.3.4")]), &config())
                .unwrap();
        assert_eq!(desired[0].name, "app.example.com");
        assert_eq!(desired[1].name, "www.app.example.com");
    }

    #[test]
    fn default_ttl_applied_only_when_omitted() {
        let mut with_ttl = a("@", "1.2.3.4");
        with_ttl.ttl = Some(300);
        let desired =
            build_desired_state(&request(vec![with_ttl, a("www", "1.2.3.4")]), &config()).unwrap();
        assert_eq!(desired[0].ttl, 300);
        assert_eq!(desired[1].ttl, 3600);
    }

    #[test]
    fn proxied_defaults_false_for_proxiable_types() {
        let txt = RequestedRecord {
            name: "@".to_string(),
            ttl: None,
            data: RecordData::TXT {
                text: "v=spf1 -all".to_string(),
            },
            proxied: None,
        };
        let desired = build_desired_state(&request(vec![a("@", "1.2.3.4"), txt]), &config()).unwrap();
        assert_eq!(desired[0].proxied, Some(false));
        assert_eq!(desired[1].proxied, None);
    }

    #[test]
    fn exact_duplicates_collapse() {
        let desired =
            build_desired_state(&request(vec![a("@", "1.2.3.4"), a("@", "1.2.3.4")]), &config())
                .unwrap();
        assert_eq!(desired.len(), 1);
    }

    #[test]
    fn distinct_values_at_same_name_kept() {
        let desired =
            build_desired_state(&request(vec![a("@", "1.1.1.1"), a("@", "2.2.2.2")]), &config())
                .unwrap();
        assert_eq!(desired.len(), 2);
    }

    #[test]
    fn cname_with_other_record_rejected() {
        let err = build_desired_state(
            &request(vec![cname("www", "pages.dev"), a("www", "1.2.3.4")]),
            &config(),
        )
        .unwrap_err();
        assert_eq!(err.code, ValidationCode::RecordTypeConflict);
    }

    #[test]
    fn two_cnames_at_same_name_rejected() {
        let err = build_desired_state(
            &request(vec![cname("www", "a.dev"), cname("www", "b.dev")]),
            &config(),
        )
        .unwrap_err();
        assert_eq!(err.code, ValidationCode::RecordTypeConflict);
    }

    #[test]
    fn cname_alone_or_on_other_name_fine() {
        let desired = build_desired_state(
            &request(vec![cname("www", "pages.dev"), a("@", "1.2.3.4")]),
            &config(),
        )
        .unwrap();
        assert_eq!(desired.len(), 2);
    }
}
