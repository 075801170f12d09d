//! Registry orchestration: validate, authorize, reconcile, persist.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::builder::build_desired_state;
use crate::error::{CoreError, CoreResult};
use crate::services::{ConflictService, ReconcilerService, ServiceContext};
use crate::types::{Allocation, DeploymentOutcome, DeploymentRecord, RequestDocument};
use crate::validation::validate_document;

/// Allocation plus its deployment history.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub allocation: Allocation,
    /// Oldest first.
    pub deployments: Vec<DeploymentRecord>,
}

/// Front door of the registry. Every public operation takes the label lock
/// before touching allocation state or the provider.
pub struct RegistryService {
    ctx: Arc<ServiceContext>,
    conflicts: ConflictService,
    reconciler: ReconcilerService,
}

impl RegistryService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            conflicts: ConflictService::new(ctx.clone()),
            reconciler: ReconcilerService::new(ctx.clone()),
            ctx,
        }
    }

    /// Processes a subdomain request end to end.
    ///
    /// Rejections (validation, identity, conflicts) happen before any
    /// provider call. A reconciliation that runs always yields a
    /// [`DeploymentRecord`], whatever its outcome.
    pub async fn submit(&self, document: RequestDocument) -> CoreResult<DeploymentRecord> {
        let request = validate_document(&document, &self.ctx.config)?;

        let _guard = self.ctx.locks.acquire(&request.label).await;

        let existing = self.conflicts.authorize(&request).await?;
        let desired = build_desired_state(&request, &self.ctx.config)?;

        log::info!(
            "deploying '{}' for '{}' ({} desired records)",
            self.ctx.config.label_fqdn(&request.label),
            request.owner.username,
            desired.len()
        );
        let record = self.reconciler.reconcile(&request.label, &desired).await?;

        let deployed = record.outcome != DeploymentOutcome::Failed;
        if deployed || existing.is_some() {
            let now = Utc::now();
            let allocation = Allocation {
                label: request.label.clone(),
                zone: self.ctx.config.zone_name.clone(),
                owner: request.owner.clone(),
                created_at: existing.as_ref().map_or(now, |a| a.created_at),
                last_deployed_at: if deployed {
                    Some(now)
                } else {
                    existing.as_ref().and_then(|a| a.last_deployed_at)
                },
                source: request.source.clone(),
            };
            self.ctx.allocations.save(&allocation).await?;
        }

        self.ctx.deployments.append(&record).await?;
        Ok(record)
    }

    /// Current allocation and deployment history for a label.
    pub async fn status(&self, label: &str) -> CoreResult<RegistryStatus> {
        let allocation = self
            .ctx
            .allocations
            .find_by_label(label)
            .await?
            .ok_or_else(|| CoreError::AllocationNotFound(label.to_string()))?;
        let deployments = self.ctx.deployments.find_by_label(label).await?;
        Ok(RegistryStatus {
            allocation,
            deployments,
        })
    }

    /// Tears down a label: reconciles to an empty desired set and, once the
    /// zone is clean, drops the allocation. A partial teardown keeps the
    /// allocation so the owner can retry.
    pub async fn remove(&self, label: &str, username: &str) -> CoreResult<DeploymentRecord> {
        let _guard = self.ctx.locks.acquire(label).await;

        let allocation = self
            .ctx
            .allocations
            .find_by_label(label)
            .await?
            .ok_or_else(|| CoreError::AllocationNotFound(label.to_string()))?;
        ConflictService::check_owner(&allocation, username)?;

        log::info!(
            "removing '{}' for '{}'",
            self.ctx.config.label_fqdn(label),
            username
        );
        let record = self.reconciler.reconcile(label, &[]).await?;

        if record.outcome == DeploymentOutcome::Complete {
            self.ctx.allocations.remove(label).await?;
        }

        self.ctx.deployments.append(&record).await?;
        Ok(record)
    }
}
