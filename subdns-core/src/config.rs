//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Static configuration for a registry managing one DNS zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The zone this registry hands out labels under, e.g. `example.com`.
    pub zone_name: String,
    /// Provider-side identifier of that zone.
    pub zone_id: String,
    /// Labels that may never be requested (compared case-insensitively).
    #[serde(default)]
    pub reserved_labels: Vec<String>,
    /// Per-label record cap.
    #[serde(default = "default_max_records_per_label")]
    pub max_records_per_label: usize,
    /// Per-owner label quota.
    #[serde(default = "default_max_labels_per_owner")]
    pub max_labels_per_owner: usize,
    /// TTL applied when a record omits one.
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,
    /// Lowest accepted TTL.
    #[serde(default = "default_min_ttl")]
    pub min_ttl: u32,
    /// Highest accepted TTL.
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,
    /// How many creates/updates may be in flight at once during apply.
    #[serde(default = "default_apply_concurrency")]
    pub apply_concurrency: usize,
    /// Comment stamped on every record this registry creates.
    #[serde(default = "default_managed_comment")]
    pub managed_comment: String,
}

fn default_max_records_per_label() -> usize {
    10
}
fn default_max_labels_per_owner() -> usize {
    3
}
fn default_ttl() -> u32 {
    3600
}
fn default_min_ttl() -> u32 {
    60
}
fn default_max_ttl() -> u32 {
    86_400
}
fn default_apply_concurrency() -> usize {
    1
}
fn default_managed_comment() -> String {
    "managed-by:subdns".to_string()
}

impl RegistryConfig {
    /// Configuration with default limits for the given zone.
    #[must_use]
    pub fn new(zone_name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            zone_id: zone_id.into(),
            reserved_labels: Vec::new(),
            max_records_per_label: default_max_records_per_label(),
            max_labels_per_owner: default_max_labels_per_owner(),
            default_ttl: default_ttl(),
            min_ttl: default_min_ttl(),
            max_ttl: default_max_ttl(),
            apply_concurrency: default_apply_concurrency(),
            managed_comment: default_managed_comment(),
        }
    }

    /// Whether `label` is reserved (case-insensitive).
    #[must_use]
    pub fn is_reserved(&self, label: &str) -> bool {
        self.reserved_labels
            .iter()
            .any(|r| r.eq_ignore_ascii_case(label))
    }

    /// The fully-qualified apex name of a label, `label.zone`.
    #[must_use]
    pub fn label_fqdn(&self, label: &str) -> String {
        format!("{label}.{}", self.zone_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RegistryConfig::new("example.com", "zone-1");
        assert_eq!(config.max_records_per_label, 10);
        assert_eq!(config.max_labels_per_owner, 3);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.min_ttl, 60);
        assert_eq!(config.max_ttl, 86_400);
        assert_eq!(config.apply_concurrency, 1);
    }

    #[test]
    fn reserved_is_case_insensitive() {
        let mut config = RegistryConfig::new("example.com", "zone-1");
        config.reserved_labels = vec!["www".to_string(), "Mail".to_string()];
        assert!(config.is_reserved("WWW"));
        assert!(config.is_reserved("mail"));
        assert!(!config.is_reserved("blog"));
    }

    #[test]
    fn label_fqdn_joins_zone() {
        let config = RegistryConfig::new("example.com", "zone-1");
        assert_eq!(config.label_fqdn("app"), "app.example.com");
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"zone_name":"example.com","zone_id":"zone-1"}"#).unwrap();
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.managed_comment, "managed-by:subdns");
    }
}
