//! Reconciliation plans and deployment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subdns_provider::{DnsRecordType, ProviderRecord, RecordSpec};
use uuid::Uuid;

/// One planned mutation against the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Create {
        spec: RecordSpec,
    },
    Update {
        record_id: String,
        spec: RecordSpec,
    },
    Delete {
        record_id: String,
        name: String,
        record_type: DnsRecordType,
        value: String,
    },
}

impl Operation {
    /// Sort key for deterministic ordering within an operation class.
    pub(crate) fn sort_key(&self) -> (String, DnsRecordType, String) {
        match self {
            Self::Create { spec } | Self::Update { spec, .. } => (
                spec.name.to_lowercase(),
                spec.data.record_type(),
                spec.data.display_value().to_string(),
            ),
            Self::Delete {
                name,
                record_type,
                value,
                ..
            } => (name.to_lowercase(), *record_type, value.clone()),
        }
    }

    /// Short human-readable form, e.g. `create A www.app.example.com -> 1.2.3.4`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Create { spec } => format!(
                "create {} {} -> {}",
                spec.data.record_type(),
                spec.name,
                spec.data.display_value()
            ),
            Self::Update { record_id, spec } => format!(
                "update {} {} -> {} ({record_id})",
                spec.data.record_type(),
                spec.name,
                spec.data.display_value()
            ),
            Self::Delete {
                record_id,
                name,
                record_type,
                value,
            } => format!("delete {record_type} {name} -> {value} ({record_id})"),
        }
    }

    /// Deletes are applied strictly after creates and updates.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// The ordered set of mutations that turns the current state into the
/// desired state. Transient; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Creates and updates first, deletes last; deterministic within each
    /// class.
    pub operations: Vec<Operation>,
}

impl ReconciliationPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// How a reconciliation attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentOutcome {
    /// Every planned operation applied (or the plan was empty).
    Complete,
    /// Some operations applied before a failure stopped the run.
    Partial,
    /// Nothing was applied.
    Failed,
}

/// An operation that did not apply, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedOperation {
    pub operation: String,
    pub reason: String,
}

/// Durable record of one reconciliation attempt.
///
/// Appended for every attempt that reaches the reconciler, including
/// terminal failures; the deployment log is the audit trail for a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: Uuid,
    pub label: String,
    pub zone: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: DeploymentOutcome,
    /// Operations that applied, in order.
    pub applied: Vec<String>,
    /// Operations that failed.
    pub failed: Vec<FailedOperation>,
    /// Operations never attempted because an earlier one failed.
    pub skipped: Vec<String>,
    /// Managed records observed after the run (re-listed on full success).
    pub final_records: Vec<ProviderRecord>,
}
