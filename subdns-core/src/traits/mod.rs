//! Storage and collaborator abstractions.

mod allocation_store;
mod deployment_store;
mod identity_verifier;

pub use allocation_store::AllocationStore;
pub use deployment_store::DeploymentStore;
pub use identity_verifier::{IdentityStatus, IdentityVerifier};
