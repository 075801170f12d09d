//! GitHub-backed identity verification.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use subdns_core::traits::{IdentityStatus, IdentityVerifier};
use subdns_core::{CoreError, CoreResult};
use subdns_provider::ProviderError;

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("subdns/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GithubUser {
    created_at: DateTime<Utc>,
}

/// Verifies owners against the GitHub users API.
///
/// A 404 is a definitive "no such account". Accounts younger than the
/// configured minimum age are rejected, which keeps throwaway accounts from
/// claiming labels.
pub struct GithubIdentityVerifier {
    client: reqwest::Client,
    api_base: String,
    min_account_age_days: i64,
}

impl GithubIdentityVerifier {
    #[must_use]
    pub fn new(client: reqwest::Client, min_account_age_days: i64) -> Self {
        Self {
            client,
            api_base: GITHUB_API_BASE.to_string(),
            min_account_age_days,
        }
    }

    fn network_error(e: &reqwest::Error) -> CoreError {
        CoreError::Provider(if e.is_timeout() {
            ProviderError::Timeout {
                provider: "github".to_string(),
                detail: e.to_string(),
            }
        } else {
            ProviderError::NetworkError {
                provider: "github".to_string(),
                detail: e.to_string(),
            }
        })
    }

    fn age_policy(&self, created_at: DateTime<Utc>) -> IdentityStatus {
        let age = Utc::now() - created_at;
        if age >= Duration::days(self.min_account_age_days) {
            IdentityStatus::Active
        } else {
            IdentityStatus::Rejected {
                reason: format!(
                    "account is {} days old, minimum is {}",
                    age.num_days(),
                    self.min_account_age_days
                ),
            }
        }
    }
}

#[async_trait]
impl IdentityVerifier for GithubIdentityVerifier {
    async fn verify(&self, username: &str) -> CoreResult<IdentityStatus> {
        let url = format!("{}/users/{}", self.api_base, username);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| Self::network_error(&e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(IdentityStatus::Unknown);
        }
        if !response.status().is_success() {
            return Err(CoreError::Provider(ProviderError::NetworkError {
                provider: "github".to_string(),
                detail: format!("users API returned {}", response.status()),
            }));
        }

        let user: GithubUser = response.json().await.map_err(|e| {
            CoreError::SerializationError(format!("invalid GitHub user payload: {e}"))
        })?;
        Ok(self.age_policy(user.created_at))
    }
}
