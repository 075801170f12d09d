//! Shared mocks and fixtures for service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use subdns_provider::{MemoryProvider, RecordData};
use tokio::sync::RwLock;

use crate::config::RegistryConfig;
use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::traits::{AllocationStore, DeploymentStore, IdentityStatus, IdentityVerifier};
use crate::types::{
    Allocation, DeploymentRecord, DesiredRecord, OwnerIdentity, RecordDocument, RequestDocument,
    SubdomainRequest,
};

#[derive(Default)]
pub struct MockAllocationStore {
    allocations: RwLock<HashMap<String, Allocation>>,
}

#[async_trait]
impl AllocationStore for MockAllocationStore {
    async fn find_by_label(&self, label: &str) -> CoreResult<Option<Allocation>> {
        Ok(self.allocations.read().await.get(&label.to_lowercase()).cloned())
    }

    async fn find_by_owner(&self, username: &str) -> CoreResult<Vec<Allocation>> {
        Ok(self
            .allocations
            .read()
            .await
            .values()
            .filter(|a| a.owner.same_user(username))
            .cloned()
            .collect())
    }

    async fn save(&self, allocation: &Allocation) -> CoreResult<()> {
        self.allocations
            .write()
            .await
            .insert(allocation.label.to_lowercase(), allocation.clone());
        Ok(())
    }

    async fn remove(&self, label: &str) -> CoreResult<()> {
        self.allocations.write().await.remove(&label.to_lowercase());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDeploymentStore {
    records: RwLock<Vec<DeploymentRecord>>,
}

#[async_trait]
impl DeploymentStore for MockDeploymentStore {
    async fn append(&self, record: &DeploymentRecord) -> CoreResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_label(&self, label: &str) -> CoreResult<Vec<DeploymentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.label.eq_ignore_ascii_case(label))
            .cloned()
            .collect())
    }
}

/// Identity verifier that treats every username as active unless told
/// otherwise.
#[derive(Default)]
pub struct MockIdentityVerifier {
    statuses: RwLock<HashMap<String, IdentityStatus>>,
}

impl MockIdentityVerifier {
    pub async fn set_status(&self, username: &str, status: IdentityStatus) {
        self.statuses
            .write()
            .await
            .insert(username.to_lowercase(), status);
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, username: &str) -> CoreResult<IdentityStatus> {
        Ok(self
            .statuses
            .read()
            .await
            .get(&username.to_lowercase())
            .cloned()
            .unwrap_or(IdentityStatus::Active))
    }
}

/// A fully wired service context plus handles to the mocks behind it.
pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub provider: Arc<MemoryProvider>,
    pub allocations: Arc<MockAllocationStore>,
    pub deployments: Arc<MockDeploymentStore>,
    pub identity: Arc<MockIdentityVerifier>,
}

/// Context for the `example.com` zone with default limits.
pub fn test_context() -> TestContext {
    let provider = Arc::new(MemoryProvider::new());
    let allocations = Arc::new(MockAllocationStore::default());
    let deployments = Arc::new(MockDeploymentStore::default());
    let identity = Arc::new(MockIdentityVerifier::default());
    let ctx = Arc::new(ServiceContext::new(
        provider.clone(),
        allocations.clone(),
        deployments.clone(),
        identity.clone(),
        RegistryConfig::new("example.com", "zone-1"),
    ));
    TestContext {
        ctx,
        provider,
        allocations,
        deployments,
        identity,
    }
}

/// A validated request carrying no records, enough for conflict checks.
pub fn request_for(username: &str, label: &str) -> SubdomainRequest {
    SubdomainRequest {
        owner: OwnerIdentity {
            username: username.to_string(),
            email: None,
        },
        label: label.to_string(),
        zone: "example.com".to_string(),
        records: Vec::new(),
        submitted_at: Utc::now(),
        source: None,
    }
}

/// A raw request document with a single apex A record.
pub fn document_for(username: &str, label: &str) -> RequestDocument {
    RequestDocument {
        owner: crate::types::OwnerDocument {
            username: username.to_string(),
            email: None,
        },
        subdomain: label.to_string(),
        domain: "example.com".to_string(),
        records: vec![RecordDocument {
            record_type: "A".to_string(),
            name: "@".to_string(),
            value: "1.2.3.4".to_string(),
            ttl: None,
            priority: None,
            proxied: None,
        }],
        source: None,
    }
}

pub fn desired_a(name: &str, address: &str, ttl: u32) -> DesiredRecord {
    DesiredRecord {
        name: name.to_string(),
        ttl,
        data: RecordData::A {
            address: address.to_string(),
        },
        proxied: Some(false),
    }
}

pub fn desired_cname(name: &str, target: &str, ttl: u32) -> DesiredRecord {
    DesiredRecord {
        name: name.to_string(),
        ttl,
        data: RecordData::CNAME {
            target: target.to_string(),
        },
        proxied: Some(false),
    }
}
