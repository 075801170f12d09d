//! Platform adapters backing the core storage and identity traits.

mod file_store;
mod github;

pub use file_store::{FileAllocationStore, FileDeploymentStore};
pub use github::GithubIdentityVerifier;
