//! Deployment log abstraction.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::DeploymentRecord;

/// Append-only log of reconciliation attempts.
///
/// Platform implementations:
/// - CLI: `FileDeploymentStore` (JSONL, one line per record)
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Appends a deployment record. Records are never updated or removed.
    async fn append(&self, record: &DeploymentRecord) -> CoreResult<()>;

    /// Deployment history for a label, oldest first.
    async fn find_by_label(&self, label: &str) -> CoreResult<Vec<DeploymentRecord>>;
}
