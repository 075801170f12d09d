//! Owner identity verification abstraction.

use async_trait::async_trait;

use crate::error::CoreResult;

/// Result of an identity lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    /// The account exists and is acceptable.
    Active,
    /// No such account.
    Unknown,
    /// The account exists but fails a policy check (too new, suspended, …).
    Rejected {
        reason: String,
    },
}

/// External identity collaborator.
///
/// Platform implementations:
/// - CLI: `GithubIdentityVerifier` (GitHub users API; 404 means unknown,
///   accounts younger than the configured minimum age are rejected)
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Checks whether `username` names an acceptable account.
    ///
    /// Transport failures are errors; a definitive "no such user" is
    /// [`IdentityStatus::Unknown`], not an error.
    async fn verify(&self, username: &str) -> CoreResult<IdentityStatus>;
}
