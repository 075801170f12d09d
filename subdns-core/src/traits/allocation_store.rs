//! Allocation persistence abstraction.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Allocation;

/// Durable store of label allocations.
///
/// Implementations must treat labels and usernames case-insensitively;
/// callers pass labels already lowercased.
///
/// Platform implementations:
/// - CLI: `FileAllocationStore` (one JSON file per label)
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Looks up the allocation for a label.
    async fn find_by_label(&self, label: &str) -> CoreResult<Option<Allocation>>;

    /// All allocations held by an owner.
    async fn find_by_owner(&self, username: &str) -> CoreResult<Vec<Allocation>>;

    /// Saves an allocation (insert or update, keyed by label).
    async fn save(&self, allocation: &Allocation) -> CoreResult<()>;

    /// Removes the allocation for a label. Removing a missing label is not
    /// an error.
    async fn remove(&self, label: &str) -> CoreResult<()>;
}
