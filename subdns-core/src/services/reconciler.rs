//! Zone reconciliation.
//!
//! Turns the desired record set for a label into the minimal ordered plan of
//! provider mutations, applies it, and records the attempt. The provider is
//! never assumed to be exclusively ours: only records inside the label's
//! namespace (`label.zone` and below) are ever touched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use subdns_provider::{DnsRecordType, ProviderError, ProviderRecord, RecordSpec};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{
    DeploymentOutcome, DeploymentRecord, DesiredRecord, FailedOperation, Operation,
    ReconciliationPlan,
};

/// Reconciles a label's desired state against the live zone.
pub struct ReconcilerService {
    ctx: Arc<ServiceContext>,
}

impl ReconcilerService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Runs one reconciliation attempt for `label`.
    ///
    /// Always returns a [`DeploymentRecord`], including for terminal
    /// failures (outcome [`Failed`](DeploymentOutcome::Failed) when nothing
    /// applied). Storage errors from the caller's persistence layer are the
    /// only way this surfaces `Err`.
    pub async fn reconcile(
        &self,
        label: &str,
        desired: &[DesiredRecord],
    ) -> CoreResult<DeploymentRecord> {
        let started_at = Utc::now();
        let scope = self.ctx.config.label_fqdn(label);
        let zone_id = self.ctx.config.zone_id.clone();

        let current = match self
            .ctx
            .provider
            .list_records(&zone_id, Some(&scope))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                log::error!("listing records for '{scope}' failed: {e}");
                return Ok(self.record(
                    label,
                    started_at,
                    DeploymentOutcome::Failed,
                    Vec::new(),
                    vec![FailedOperation {
                        operation: format!("list {scope}"),
                        reason: e.to_string(),
                    }],
                    Vec::new(),
                    Vec::new(),
                ));
            }
        };

        let plan = self.build_plan(&current, desired);
        if plan.is_empty() {
            log::info!("'{scope}' already converged ({} records)", current.len());
            return Ok(self.record(
                label,
                started_at,
                DeploymentOutcome::Complete,
                Vec::new(),
                Vec::new(),
                Vec::new(),
                current,
            ));
        }
        log::info!("applying {} operations to '{scope}'", plan.len());

        let (applied, failed, skipped) = self.apply(plan).await;

        let outcome = if failed.is_empty() {
            DeploymentOutcome::Complete
        } else if applied.is_empty() {
            DeploymentOutcome::Failed
        } else {
            DeploymentOutcome::Partial
        };

        let final_records = if outcome == DeploymentOutcome::Complete {
            match self.ctx.provider.list_records(&zone_id, Some(&scope)).await {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("post-apply listing for '{scope}' failed: {e}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(self.record(label, started_at, outcome, applied, failed, skipped, final_records))
    }

    /// Computes the minimal plan turning `current` into `desired`.
    ///
    /// Diff keying: multi-value types (TXT/MX/NS/SRV/CAA) match on
    /// (type, name, value); CNAME matches on (type, name) so a retarget is
    /// an update; A/AAAA pair positionally when a name holds exactly one
    /// record on both sides, so address or TTL changes update in place and
    /// never leave a resolution gap.
    #[must_use]
    pub fn build_plan(
        &self,
        current: &[ProviderRecord],
        desired: &[DesiredRecord],
    ) -> ReconciliationPlan {
        type GroupKey = (DnsRecordType, String);
        let mut groups: HashMap<GroupKey, (Vec<&ProviderRecord>, Vec<&DesiredRecord>)> =
            HashMap::new();

        for record in current {
            let key = (record.data.record_type(), record.name.to_lowercase());
            groups.entry(key).or_default().0.push(record);
        }
        for record in desired {
            let key = (record.data.record_type(), record.name.to_lowercase());
            groups.entry(key).or_default().1.push(record);
        }

        let mut upserts: Vec<Operation> = Vec::new();
        let mut deletes: Vec<Operation> = Vec::new();

        for ((record_type, _), (current_group, desired_group)) in groups {
            let paired = match record_type {
                DnsRecordType::Cname => true,
                DnsRecordType::A | DnsRecordType::Aaaa => {
                    current_group.len() == 1 && desired_group.len() == 1
                }
                _ => false,
            };

            if paired && !current_group.is_empty() && !desired_group.is_empty() {
                // In-place pairing: first current carries the desired state,
                // surplus currents go.
                let target = desired_group[0];
                let existing = current_group[0];
                if self.differs(existing, target) {
                    upserts.push(Operation::Update {
                        record_id: existing.id.clone(),
                        spec: self.to_spec(target),
                    });
                }
                for extra in &current_group[1..] {
                    deletes.push(Self::delete_op(extra));
                }
                for extra in &desired_group[1..] {
                    upserts.push(Operation::Create {
                        spec: self.to_spec(extra),
                    });
                }
                continue;
            }

            // Value-keyed matching.
            let mut unmatched: Vec<&ProviderRecord> = Vec::new();
            let mut by_value: HashMap<&str, Vec<&ProviderRecord>> = HashMap::new();
            for record in &current_group {
                by_value
                    .entry(record.data.display_value())
                    .or_default()
                    .push(record);
            }
            for target in &desired_group {
                match by_value
                    .get_mut(target.data.display_value())
                    .and_then(Vec::pop)
                {
                    Some(existing) => {
                        if self.differs(existing, target) {
                            upserts.push(Operation::Update {
                                record_id: existing.id.clone(),
                                spec: self.to_spec(target),
                            });
                        }
                    }
                    None => upserts.push(Operation::Create {
                        spec: self.to_spec(target),
                    }),
                }
            }
            unmatched.extend(by_value.into_values().flatten());
            for stale in unmatched {
                deletes.push(Self::delete_op(stale));
            }
        }

        upserts.sort_by_key(Operation::sort_key);
        deletes.sort_by_key(Operation::sort_key);
        upserts.extend(deletes);
        ReconciliationPlan {
            operations: upserts,
        }
    }

    /// Whether an existing record needs an in-place update to match.
    /// Comments are deliberately not compared; re-stamping them on every run
    /// would make converged zones churn.
    fn differs(&self, existing: &ProviderRecord, target: &DesiredRecord) -> bool {
        existing.data != target.data
            || existing.ttl != target.ttl
            || existing.proxied.unwrap_or(false) != target.proxied.unwrap_or(false)
    }

    fn to_spec(&self, record: &DesiredRecord) -> RecordSpec {
        RecordSpec {
            zone_id: self.ctx.config.zone_id.clone(),
            name: record.name.clone(),
            ttl: record.ttl,
            data: record.data.clone(),
            proxied: record.proxied,
            comment: Some(self.ctx.config.managed_comment.clone()),
        }
    }

    fn delete_op(record: &ProviderRecord) -> Operation {
        Operation::Delete {
            record_id: record.id.clone(),
            name: record.name.clone(),
            record_type: record.data.record_type(),
            value: record.data.display_value().to_string(),
        }
    }

    /// Applies the plan: creates/updates in bounded-concurrency chunks,
    /// deletes strictly after and one at a time. The first failure aborts
    /// everything not yet attempted.
    async fn apply(
        &self,
        plan: ReconciliationPlan,
    ) -> (Vec<String>, Vec<FailedOperation>, Vec<String>) {
        let (upserts, deletes): (Vec<Operation>, Vec<Operation>) =
            plan.operations.into_iter().partition(|op| !op.is_delete());

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        let mut skipped = Vec::new();
        let mut aborted = false;

        let concurrency = self.ctx.config.apply_concurrency.max(1);
        for chunk in upserts.chunks(concurrency) {
            if aborted {
                skipped.extend(chunk.iter().map(Operation::describe));
                continue;
            }
            let attempts = chunk.iter().map(|op| async move {
                let result = self.apply_op(op).await;
                (op, result)
            });
            for (op, result) in futures::future::join_all(attempts).await {
                match result {
                    Ok(()) => applied.push(op.describe()),
                    Err(e) => {
                        log::warn!("{} failed: {e}", op.describe());
                        failed.push(FailedOperation {
                            operation: op.describe(),
                            reason: e.to_string(),
                        });
                        aborted = true;
                    }
                }
            }
        }

        for op in &deletes {
            if aborted {
                skipped.push(op.describe());
                continue;
            }
            match self.apply_op(op).await {
                Ok(()) => applied.push(op.describe()),
                Err(e) => {
                    log::warn!("{} failed: {e}", op.describe());
                    failed.push(FailedOperation {
                        operation: op.describe(),
                        reason: e.to_string(),
                    });
                    aborted = true;
                }
            }
        }

        (applied, failed, skipped)
    }

    async fn apply_op(&self, op: &Operation) -> Result<(), ProviderError> {
        match op {
            Operation::Create { spec } => {
                self.ctx.provider.create_record(spec).await?;
            }
            Operation::Update { record_id, spec } => {
                self.ctx.provider.update_record(record_id, spec).await?;
            }
            Operation::Delete { record_id, .. } => {
                self.ctx
                    .provider
                    .delete_record(record_id, &self.ctx.config.zone_id)
                    .await?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        label: &str,
        started_at: chrono::DateTime<Utc>,
        outcome: DeploymentOutcome,
        applied: Vec<String>,
        failed: Vec<FailedOperation>,
        skipped: Vec<String>,
        final_records: Vec<ProviderRecord>,
    ) -> DeploymentRecord {
        DeploymentRecord {
            id: Uuid::new_v4(),
            label: label.to_string(),
            zone: self.ctx.config.zone_name.clone(),
            started_at,
            finished_at: Utc::now(),
            outcome,
            applied,
            failed,
            skipped,
            final_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{desired_a, desired_cname, test_context, TestContext};
    use subdns_provider::{RecordData, RecordSpec};

    fn seed_spec(name: &str, data: RecordData, ttl: u32) -> RecordSpec {
        RecordSpec {
            zone_id: "zone-1".to_string(),
            name: name.to_string(),
            ttl,
            data,
            proxied: Some(false),
            comment: Some("managed-by:subdns".to_string()),
        }
    }

    fn a_data(address: &str) -> RecordData {
        RecordData::A {
            address: address.to_string(),
        }
    }

    // ---- planning ----

    #[tokio::test]
    async fn converged_state_yields_empty_plan() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("app.example.com", a_data("1.2.3.4"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile("app", &[desired_a("app.example.com", "1.2.3.4", 3600)])
            .await
            .unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Complete);
        assert!(record.applied.is_empty());
        assert_eq!(provider.mutation_calls(), 0);
        assert_eq!(record.final_records.len(), 1);
    }

    #[tokio::test]
    async fn creates_missing_and_deletes_stale() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("old.app.example.com", a_data("9.9.9.9"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile("app", &[desired_a("new.app.example.com", "1.2.3.4", 3600)])
            .await
            .unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Complete);
        assert_eq!(record.applied.len(), 2);
        // Creates come before deletes.
        assert!(record.applied[0].starts_with("create"));
        assert!(record.applied[1].starts_with("delete"));

        let names: Vec<String> = provider
            .records_snapshot()
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["new.app.example.com"]);
    }

    #[tokio::test]
    async fn single_a_value_change_is_an_update() {
        let TestContext { ctx, provider, .. } = test_context();
        let id = provider
            .seed(&seed_spec("app.example.com", a_data("1.1.1.1"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile("app", &[desired_a("app.example.com", "2.2.2.2", 3600)])
            .await
            .unwrap();

        assert_eq!(record.applied.len(), 1);
        assert!(record.applied[0].starts_with("update"), "{:?}", record.applied);

        // Same provider-side identity, new value: no resolution gap.
        let snapshot = provider.records_snapshot().await;
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].data.display_value(), "2.2.2.2");
    }

    #[tokio::test]
    async fn ttl_change_is_an_update() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("app.example.com", a_data("1.1.1.1"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile("app", &[desired_a("app.example.com", "1.1.1.1", 300)])
            .await
            .unwrap();

        assert_eq!(record.applied.len(), 1);
        assert!(record.applied[0].starts_with("update"));
        assert_eq!(provider.records_snapshot().await[0].ttl, 300);
    }

    #[tokio::test]
    async fn multi_value_a_set_uses_create_and_delete() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("app.example.com", a_data("1.1.1.1"), 3600))
            .await;
        provider
            .seed(&seed_spec("app.example.com", a_data("2.2.2.2"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile(
                "app",
                &[
                    desired_a("app.example.com", "1.1.1.1", 3600),
                    desired_a("app.example.com", "3.3.3.3", 3600),
                ],
            )
            .await
            .unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Complete);
        let applied = record.applied.join("; ");
        assert!(applied.contains("create A app.example.com -> 3.3.3.3"));
        assert!(applied.contains("delete A app.example.com -> 2.2.2.2"));
        assert_eq!(record.applied.len(), 2);
    }

    #[tokio::test]
    async fn cname_retarget_is_an_update() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec(
                "www.app.example.com",
                RecordData::CNAME {
                    target: "old.pages.dev".to_string(),
                },
                3600,
            ))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile(
                "app",
                &[desired_cname("www.app.example.com", "new.pages.dev", 3600)],
            )
            .await
            .unwrap();

        assert_eq!(record.applied.len(), 1);
        assert!(record.applied[0].starts_with("update"));
    }

    #[tokio::test]
    async fn mx_priority_change_is_an_update() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec(
                "app.example.com",
                RecordData::MX {
                    priority: 10,
                    exchange: "mail.example.net".to_string(),
                },
                3600,
            ))
            .await;
        let service = ReconcilerService::new(ctx);

        let desired = DesiredRecord {
            name: "app.example.com".to_string(),
            ttl: 3600,
            data: RecordData::MX {
                priority: 20,
                exchange: "mail.example.net".to_string(),
            },
            proxied: None,
        };
        let record = service.reconcile("app", &[desired]).await.unwrap();

        assert_eq!(record.applied.len(), 1);
        assert!(record.applied[0].starts_with("update"));
    }

    #[tokio::test]
    async fn unmanaged_records_never_touched() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("other.example.com", a_data("8.8.8.8"), 3600))
            .await;
        // "myapp" shares a suffix substring with "app" but is a different label.
        provider
            .seed(&seed_spec("myapp.example.com", a_data("7.7.7.7"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service.reconcile("app", &[]).await.unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Complete);
        assert_eq!(provider.mutation_calls(), 0);
        assert_eq!(provider.records_snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn empty_desired_deletes_all_managed() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("app.example.com", a_data("1.1.1.1"), 3600))
            .await;
        provider
            .seed(&seed_spec("www.app.example.com", a_data("1.1.1.1"), 3600))
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service.reconcile("app", &[]).await.unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Complete);
        assert_eq!(record.applied.len(), 2);
        assert!(provider.records_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn deterministic_operation_order() {
        let TestContext { ctx, .. } = test_context();
        let service = ReconcilerService::new(ctx);

        let desired = vec![
            desired_a("b.app.example.com", "1.1.1.1", 3600),
            desired_a("a.app.example.com", "1.1.1.1", 3600),
            desired_a("a.app.example.com", "0.0.0.1", 3600),
        ];
        let plan = service.build_plan(&[], &desired);
        let described: Vec<String> = plan.operations.iter().map(Operation::describe).collect();
        assert_eq!(
            described,
            vec![
                "create A a.app.example.com -> 0.0.0.1",
                "create A a.app.example.com -> 1.1.1.1",
                "create A b.app.example.com -> 1.1.1.1",
            ]
        );
    }

    // ---- applying ----

    #[tokio::test]
    async fn failure_mid_plan_yields_partial_with_skipped() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .seed(&seed_spec("stale.app.example.com", a_data("9.9.9.9"), 3600))
            .await;
        provider
            .fail_mutation_at(
                2,
                ProviderError::NetworkError {
                    provider: "memory".to_string(),
                    detail: "connection reset".to_string(),
                },
            )
            .await;
        let service = ReconcilerService::new(ctx);

        // Plan: create a, create b, delete stale. Second create fails.
        let record = service
            .reconcile(
                "app",
                &[
                    desired_a("a.app.example.com", "1.1.1.1", 3600),
                    desired_a("b.app.example.com", "2.2.2.2", 3600),
                ],
            )
            .await
            .unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Partial);
        assert_eq!(record.applied.len(), 1);
        assert_eq!(record.failed.len(), 1);
        assert_eq!(record.skipped.len(), 1);
        assert!(record.skipped[0].starts_with("delete"));
        assert!(record.final_records.is_empty());

        // The stale record survived the abort.
        let names: Vec<String> = provider
            .records_snapshot()
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert!(names.contains(&"stale.app.example.com".to_string()));
    }

    #[tokio::test]
    async fn first_op_failure_yields_failed() {
        let TestContext { ctx, provider, .. } = test_context();
        provider
            .fail_mutation_at(
                1,
                ProviderError::QuotaExceeded {
                    provider: "memory".to_string(),
                    raw_message: None,
                },
            )
            .await;
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile("app", &[desired_a("app.example.com", "1.1.1.1", 3600)])
            .await
            .unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Failed);
        assert!(record.applied.is_empty());
        assert_eq!(record.failed.len(), 1);
    }

    #[tokio::test]
    async fn complete_outcome_relists_final_records() {
        let TestContext { ctx, provider, .. } = test_context();
        let service = ReconcilerService::new(ctx);

        let record = service
            .reconcile("app", &[desired_a("app.example.com", "1.1.1.1", 3600)])
            .await
            .unwrap();

        assert_eq!(record.outcome, DeploymentOutcome::Complete);
        assert_eq!(record.final_records.len(), 1);
        assert_eq!(record.final_records[0].name, "app.example.com");
        // Initial list + post-apply list.
        assert_eq!(provider.list_calls(), 2);
    }
}
