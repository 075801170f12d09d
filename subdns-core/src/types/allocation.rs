//! Label allocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OwnerIdentity;

/// A label granted to an owner in a zone.
///
/// At most one active allocation exists per label per zone; the label is the
/// unit of ownership, isolation and locking. An allocation is never silently
/// reassigned — it changes hands only by explicit removal and re-request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Lowercased label, e.g. `"app"`.
    pub label: String,
    pub zone: String,
    pub owner: OwnerIdentity,
    pub created_at: DateTime<Utc>,
    /// Last reconciliation that mutated the zone, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deployed_at: Option<DateTime<Utc>>,
    /// Provenance of the granting request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
