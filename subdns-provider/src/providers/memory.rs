//! In-memory provider fake for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::{ProviderError, Result};
use crate::providers::common::name_in_scope;
use crate::traits::DnsProvider;
use crate::types::{ProviderRecord, RecordSpec};

/// In-memory [`DnsProvider`] with call counting and failure injection.
///
/// Behaves like a well-behaved remote zone: IDs are stable, creating a
/// duplicate (name, type, data) fails with
/// [`RecordExists`](ProviderError::RecordExists), and mutating a missing ID
/// fails with [`RecordNotFound`](ProviderError::RecordNotFound). Never
/// rate-limits and never needs retries, so tests exercise reconciliation
/// logic in isolation.
#[derive(Default)]
pub struct MemoryProvider {
    records: RwLock<HashMap<String, ProviderRecord>>,
    next_id: AtomicU64,
    list_calls: AtomicU64,
    mutation_calls: AtomicU64,
    fail_at: Mutex<Option<(u64, ProviderError)>>,
}

impl MemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record directly, bypassing duplicate checks. Returns the
    /// assigned ID.
    pub async fn seed(&self, spec: &RecordSpec) -> String {
        let id = self.allocate_id();
        let record = Self::materialize(&id, spec);
        self.records.write().await.insert(id.clone(), record);
        id
    }

    /// Arranges for the `nth` mutation call (1-based, counting from now on
    /// across create/update/delete) to fail with `error`.
    pub async fn fail_mutation_at(&self, nth: u64, error: ProviderError) {
        *self.fail_at.lock().await = Some((self.mutation_calls.load(Ordering::SeqCst) + nth, error));
    }

    /// Number of `list_records` calls so far.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of create/update/delete calls so far, including injected
    /// failures.
    pub fn mutation_calls(&self) -> u64 {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of all records, sorted by (name, type, value) for stable
    /// assertions.
    pub async fn records_snapshot(&self) -> Vec<ProviderRecord> {
        let mut records: Vec<ProviderRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| {
            (
                a.name.as_str(),
                a.data.record_type(),
                a.data.display_value(),
            )
                .cmp(&(
                    b.name.as_str(),
                    b.data.record_type(),
                    b.data.display_value(),
                ))
        });
        records
    }

    fn allocate_id(&self) -> String {
        format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn materialize(id: &str, spec: &RecordSpec) -> ProviderRecord {
        let now = chrono::Utc::now();
        ProviderRecord {
            id: id.to_string(),
            zone_id: spec.zone_id.clone(),
            name: spec.name.clone(),
            ttl: spec.ttl,
            data: spec.data.clone(),
            proxied: spec.proxied,
            comment: spec.comment.clone(),
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    async fn count_mutation(&self) -> Result<()> {
        let calls = self.mutation_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_at = self.fail_at.lock().await;
        if let Some((nth, error)) = fail_at.as_ref() {
            if calls == *nth {
                return Err(error.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn validate_credentials(&self) -> Result<bool> {
        Ok(true)
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name_scope: Option<&str>,
    ) -> Result<Vec<ProviderRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read().await;
        let mut matched: Vec<ProviderRecord> = records
            .values()
            .filter(|r| r.zone_id == zone_id)
            .filter(|r| name_scope.is_none_or(|scope| name_in_scope(&r.name, scope)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            (
                a.name.as_str(),
                a.data.record_type(),
                a.data.display_value(),
            )
                .cmp(&(
                    b.name.as_str(),
                    b.data.record_type(),
                    b.data.display_value(),
                ))
        });
        Ok(matched)
    }

    async fn create_record(&self, spec: &RecordSpec) -> Result<ProviderRecord> {
        self.count_mutation().await?;
        let mut records = self.records.write().await;
        let duplicate = records.values().any(|r| {
            r.zone_id == spec.zone_id
                && r.name.eq_ignore_ascii_case(&spec.name)
                && r.data == spec.data
        });
        if duplicate {
            return Err(ProviderError::RecordExists {
                provider: "memory".to_string(),
                record_name: spec.name.clone(),
                raw_message: None,
            });
        }
        let id = self.allocate_id();
        let record = Self::materialize(&id, spec);
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn update_record(&self, record_id: &str, spec: &RecordSpec) -> Result<ProviderRecord> {
        self.count_mutation().await?;
        let mut records = self.records.write().await;
        let Some(existing) = records.get_mut(record_id) else {
            return Err(ProviderError::RecordNotFound {
                provider: "memory".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            });
        };
        let created_at = existing.created_at;
        *existing = Self::materialize(record_id, spec);
        existing.created_at = created_at;
        Ok(existing.clone())
    }

    async fn delete_record(&self, record_id: &str, _zone_id: &str) -> Result<()> {
        self.count_mutation().await?;
        let mut records = self.records.write().await;
        if records.remove(record_id).is_none() {
            return Err(ProviderError::RecordNotFound {
                provider: "memory".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            });
        }
        Ok(())
    }
}
