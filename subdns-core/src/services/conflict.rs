//! Identity and conflict checking.

use std::sync::Arc;

use crate::error::{AuthError, ConflictError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::IdentityStatus;
use crate::types::{Allocation, SubdomainRequest};

/// Decides whether a validated request may proceed to reconciliation.
///
/// Callers must hold the label lock across this check and the
/// reconciliation that follows; the check reads shared allocation state.
pub struct ConflictService {
    ctx: Arc<ServiceContext>,
}

impl ConflictService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Runs the identity check, label collision check and per-owner quota,
    /// in that order. Returns the existing allocation when the owner is
    /// re-deploying their own label.
    pub async fn authorize(&self, request: &SubdomainRequest) -> CoreResult<Option<Allocation>> {
        self.verify_identity(&request.owner.username).await?;

        let existing = self.ctx.allocations.find_by_label(&request.label).await?;
        if let Some(allocation) = &existing {
            if !allocation.owner.same_user(&request.owner.username) {
                log::warn!(
                    "label '{}' requested by '{}' but held by '{}'",
                    request.label,
                    request.owner.username,
                    allocation.owner.username
                );
                return Err(ConflictError::LabelTaken {
                    label: request.label.clone(),
                }
                .into());
            }
            // Re-deploying an owned label never hits the quota.
            return Ok(existing);
        }

        let held = self
            .ctx
            .allocations
            .find_by_owner(&request.owner.username)
            .await?;
        if held.len() >= self.ctx.config.max_labels_per_owner {
            return Err(ConflictError::QuotaExceeded {
                username: request.owner.username.clone(),
                limit: self.ctx.config.max_labels_per_owner,
            }
            .into());
        }

        Ok(None)
    }

    /// Owner equality check for operations on an existing allocation.
    pub fn check_owner(allocation: &Allocation, username: &str) -> CoreResult<()> {
        if allocation.owner.same_user(username) {
            Ok(())
        } else {
            Err(AuthError::NotOwner {
                label: allocation.label.clone(),
                username: username.to_string(),
            }
            .into())
        }
    }

    async fn verify_identity(&self, username: &str) -> CoreResult<()> {
        match self.ctx.identity.verify(username).await? {
            IdentityStatus::Active => Ok(()),
            IdentityStatus::Unknown => Err(AuthError::IdentityInvalid {
                username: username.to_string(),
                reason: "no such account".to_string(),
            }
            .into()),
            IdentityStatus::Rejected { reason } => Err(AuthError::IdentityInvalid {
                username: username.to_string(),
                reason,
            }
            .into()),
        }
    }
}
