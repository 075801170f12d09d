//! Request documents and their validated forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subdns_provider::RecordData;

// ============ Boundary types (untrusted input) ============

/// A user-submitted subdomain request, exactly as parsed from JSON.
///
/// Everything here is untrusted; [`validate_document`](crate::validation::validate_document)
/// turns it into a [`SubdomainRequest`] or rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDocument {
    pub owner: OwnerDocument,
    /// Requested label under the zone, e.g. `"app"`.
    pub subdomain: String,
    /// Zone the request targets; must match the registry's configured zone.
    pub domain: String,
    #[serde(default)]
    pub records: Vec<RecordDocument>,
    /// Where this document came from (file path, PR number, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Owner block of a request document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerDocument {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One record entry of a request document.
///
/// `value` is the type-specific payload: an address for A/AAAA, a hostname
/// for CNAME/NS/MX, text for TXT, `"weight port target"` for SRV and
/// `"flags tag value"` for CAA. MX and SRV carry their priority in the
/// separate `priority` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(rename = "type")]
    pub record_type: String,
    /// Name relative to the label: `"@"` for the label apex, `"www"` for a
    /// subdomain of it.
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

// ============ Validated types ============

/// A verified owner identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerIdentity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl OwnerIdentity {
    /// Username equality, case-insensitive per GitHub semantics.
    #[must_use]
    pub fn same_user(&self, other: &str) -> bool {
        self.username.eq_ignore_ascii_case(other)
    }
}

/// A validated subdomain request. Label is lowercased, every record has
/// typed data, and the zone matches the registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubdomainRequest {
    pub owner: OwnerIdentity,
    pub label: String,
    pub zone: String,
    pub records: Vec<RequestedRecord>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A validated record, still relative to the label and with defaults not yet
/// applied. The desired-state builder turns these into [`DesiredRecord`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedRecord {
    /// Name relative to the label (`"@"` or a subdomain like `"www"`).
    pub name: String,
    pub ttl: Option<u32>,
    pub data: RecordData,
    pub proxied: Option<bool>,
}

/// One record of the desired state: fully-qualified name, concrete TTL,
/// proxied resolved for proxiable types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// Fully-qualified name, e.g. `"www.app.example.com"`.
    pub name: String,
    pub ttl: u32,
    pub data: RecordData,
    /// `Some` for A/AAAA/CNAME, `None` for everything else.
    pub proxied: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_document_parses_minimal_json() {
        let json = r#"{
            "owner": { "username": "alice" },
            "subdomain": "app",
            "domain": "example.com",
            "records": [
                { "type": "A", "name": "@", "value": "1.2.3.4" }
            ]
        }"#;
        let doc: RequestDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.owner.username, "alice");
        assert!(doc.owner.email.is_none());
        assert_eq!(doc.records.len(), 1);
        assert!(doc.records[0].ttl.is_none());
    }

    #[test]
    fn request_document_parses_full_record() {
        let json = r#"{
            "owner": { "username": "alice", "email": "alice@example.net" },
            "subdomain": "app",
            "domain": "example.com",
            "records": [
                { "type": "MX", "name": "@", "value": "mail.example.net",
                  "ttl": 3600, "priority": 10, "proxied": false }
            ]
        }"#;
        let doc: RequestDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.records[0].priority, Some(10));
        assert_eq!(doc.records[0].proxied, Some(false));
    }

    #[test]
    fn same_user_is_case_insensitive() {
        let owner = OwnerIdentity {
            username: "Alice".to_string(),
            email: None,
        };
        assert!(owner.same_user("alice"));
        assert!(owner.same_user("ALICE"));
        assert!(!owner.same_user("bob"));
    }
}
