//! Cloudflare DNS provider adapter.

mod error;
mod http;
mod provider;
mod types;

use std::sync::Arc;

use reqwest::Client;

use crate::providers::common::create_http_client;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, RecordPayload};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Maximum per-page size of the DNS records API.
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare adapter over the v4 API, authenticated with a bearer token.
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) retry: RetryPolicy,
    pub(crate) limiter: Option<Arc<RateLimiter>>,
}

impl CloudflareProvider {
    #[must_use]
    pub fn new(api_token: String) -> Self {
        Self {
            client: create_http_client(),
            api_token,
            retry: RetryPolicy::default(),
            limiter: None,
        }
    }

    /// Replaces the default retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attaches a shared outbound-call budget; one token is taken per HTTP
    /// attempt, retries included.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }
}
