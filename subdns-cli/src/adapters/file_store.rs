//! File-backed allocation and deployment storage.
//!
//! Layout under the state directory:
//! - `allocations/<label>.json` — one file per allocation
//! - `deployments/<label>.jsonl` — append-only log, one record per line

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use subdns_core::traits::{AllocationStore, DeploymentStore};
use subdns_core::types::{Allocation, DeploymentRecord};
use subdns_core::{CoreError, CoreResult};

/// Guards against labels that would escape the state directory. Validated
/// labels always pass; raw CLI input may not.
fn check_label(label: &str) -> CoreResult<()> {
    if !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        Ok(())
    } else {
        Err(CoreError::StorageError(format!(
            "invalid label for storage: '{label}'"
        )))
    }
}

fn io_err(action: &str, e: &std::io::Error) -> CoreError {
    CoreError::StorageError(format!("{action}: {e}"))
}

/// One JSON file per allocation.
pub struct FileAllocationStore {
    dir: PathBuf,
}

impl FileAllocationStore {
    #[must_use]
    pub fn new(state_dir: &std::path::Path) -> Self {
        Self {
            dir: state_dir.join("allocations"),
        }
    }

    fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.json"))
    }
}

#[async_trait]
impl AllocationStore for FileAllocationStore {
    async fn find_by_label(&self, label: &str) -> CoreResult<Option<Allocation>> {
        let label = label.to_lowercase();
        check_label(&label)?;
        let content = match tokio::fs::read_to_string(self.path_for(&label)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err("reading allocation", &e)),
        };
        let allocation = serde_json::from_str(&content).map_err(|e| {
            CoreError::SerializationError(format!("invalid allocation file for '{label}': {e}"))
        })?;
        Ok(Some(allocation))
    }

    async fn find_by_owner(&self, username: &str) -> CoreResult<Vec<Allocation>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err("listing allocations", &e)),
        };

        let mut held = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_err("listing allocations", &e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| io_err("reading allocation", &e))?;
            let allocation: Allocation = serde_json::from_str(&content).map_err(|e| {
                CoreError::SerializationError(format!(
                    "invalid allocation file {}: {e}",
                    path.display()
                ))
            })?;
            if allocation.owner.same_user(username) {
                held.push(allocation);
            }
        }
        held.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(held)
    }

    async fn save(&self, allocation: &Allocation) -> CoreResult<()> {
        let label = allocation.label.to_lowercase();
        check_label(&label)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err("creating allocations directory", &e))?;
        let content = serde_json::to_string_pretty(allocation)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        tokio::fs::write(self.path_for(&label), content)
            .await
            .map_err(|e| io_err("writing allocation", &e))
    }

    async fn remove(&self, label: &str) -> CoreResult<()> {
        let label = label.to_lowercase();
        check_label(&label)?;
        match tokio::fs::remove_file(self.path_for(&label)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err("removing allocation", &e)),
        }
    }
}

/// Append-only JSONL deployment log, one file per label.
pub struct FileDeploymentStore {
    dir: PathBuf,
}

impl FileDeploymentStore {
    #[must_use]
    pub fn new(state_dir: &std::path::Path) -> Self {
        Self {
            dir: state_dir.join("deployments"),
        }
    }

    fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.jsonl"))
    }
}

#[async_trait]
impl DeploymentStore for FileDeploymentStore {
    async fn append(&self, record: &DeploymentRecord) -> CoreResult<()> {
        let label = record.label.to_lowercase();
        check_label(&label)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err("creating deployments directory", &e))?;
        let mut line = serde_json::to_string(record)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(&label))
            .await
            .map_err(|e| io_err("opening deployment log", &e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| io_err("appending deployment record", &e))
    }

    async fn find_by_label(&self, label: &str) -> CoreResult<Vec<DeploymentRecord>> {
        let label = label.to_lowercase();
        check_label(&label)?;
        let content = match tokio::fs::read_to_string(self.path_for(&label)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err("reading deployment log", &e)),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    CoreError::SerializationError(format!(
                        "invalid deployment record for '{label}': {e}"
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use subdns_core::types::{DeploymentOutcome, OwnerIdentity};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_state_dir() -> PathBuf {
        let seq = DIR_SEQ.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("subdns-store-test-{}-{seq}", std::process::id()))
    }

    fn allocation(label: &str, username: &str) -> Allocation {
        Allocation {
            label: label.to_string(),
            zone: "example.com".to_string(),
            owner: OwnerIdentity {
                username: username.to_string(),
                email: None,
            },
            created_at: Utc::now(),
            last_deployed_at: None,
            source: None,
        }
    }

    fn deployment(label: &str) -> DeploymentRecord {
        DeploymentRecord {
            id: uuid::Uuid::new_v4(),
            label: label.to_string(),
            zone: "example.com".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: DeploymentOutcome::Complete,
            applied: vec!["create A app.example.com -> 1.2.3.4".to_string()],
            failed: Vec::new(),
            skipped: Vec::new(),
            final_records: Vec::new(),
        }
    }

    #[tokio::test]
    async fn allocation_roundtrip_and_remove() {
        let store = FileAllocationStore::new(&temp_state_dir());

        assert!(store.find_by_label("app").await.unwrap().is_none());
        store.save(&allocation("app", "alice")).await.unwrap();

        let found = store.find_by_label("APP").await.unwrap().unwrap();
        assert_eq!(found.owner.username, "alice");

        store.remove("app").await.unwrap();
        assert!(store.find_by_label("app").await.unwrap().is_none());
        // Removing again is fine.
        store.remove("app").await.unwrap();
    }

    #[tokio::test]
    async fn find_by_owner_filters_case_insensitively() {
        let store = FileAllocationStore::new(&temp_state_dir());
        store.save(&allocation("one", "Alice")).await.unwrap();
        store.save(&allocation("two", "alice")).await.unwrap();
        store.save(&allocation("other", "bob")).await.unwrap();

        let held = store.find_by_owner("ALICE").await.unwrap();
        let labels: Vec<&str> = held.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn deployment_log_appends_in_order() {
        let store = FileDeploymentStore::new(&temp_state_dir());

        assert!(store.find_by_label("app").await.unwrap().is_empty());
        let first = deployment("app");
        let second = deployment("app");
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let history = store.find_by_label("app").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first.id);
        assert_eq!(history[1].id, second.id);
    }

    #[tokio::test]
    async fn path_traversal_labels_rejected() {
        let store = FileAllocationStore::new(&temp_state_dir());
        assert!(store.find_by_label("../etc/passwd").await.is_err());
        assert!(store.remove("a/b").await.is_err());
    }
}
