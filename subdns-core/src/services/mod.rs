//! Business logic services.

mod conflict;
mod reconciler;
mod registry;

pub use conflict::ConflictService;
pub use reconciler::ReconcilerService;
pub use registry::{RegistryService, RegistryStatus};

use std::sync::Arc;

use subdns_provider::DnsProvider;

use crate::config::RegistryConfig;
use crate::label_lock::LabelLocks;
use crate::traits::{AllocationStore, DeploymentStore, IdentityVerifier};

/// Service context — holds every dependency the services need.
///
/// The platform layer builds this once and injects its provider, storage and
/// identity implementations.
pub struct ServiceContext {
    /// DNS provider for the managed zone.
    pub provider: Arc<dyn DnsProvider>,
    /// Allocation persistence.
    pub allocations: Arc<dyn AllocationStore>,
    /// Deployment log.
    pub deployments: Arc<dyn DeploymentStore>,
    /// Identity collaborator.
    pub identity: Arc<dyn IdentityVerifier>,
    /// Registry configuration.
    pub config: RegistryConfig,
    /// Per-label locks serializing check + reconcile.
    pub locks: LabelLocks,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        allocations: Arc<dyn AllocationStore>,
        deployments: Arc<dyn DeploymentStore>,
        identity: Arc<dyn IdentityVerifier>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            provider,
            allocations,
            deployments,
            identity,
            config,
            locks: LabelLocks::new(),
        }
    }
}
