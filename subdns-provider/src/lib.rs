//! # subdns-provider
//!
//! Rate-limit-aware DNS provider abstraction for the subdns reconciler.
//!
//! The [`DnsProvider`] trait exposes the four operations reconciliation
//! needs — list, create, update, delete — plus credential validation. Two
//! implementations ship with the crate:
//!
//! - [`CloudflareProvider`] — the production adapter over the Cloudflare v4
//!   API (bearer-token auth).
//! - [`MemoryProvider`] — an in-memory fake with call counting and failure
//!   injection, for tests and dry runs.
//!
//! ## Retry and rate limiting
//!
//! Every Cloudflare call runs under a [`RetryPolicy`]: transient failures
//! (network errors, timeouts, 5xx, rate limits) are retried with exponential
//! backoff, a server-sent `retry-after` hint is honored exactly, and the
//! budget ends in [`ProviderError::RetriesExhausted`]. A process-wide
//! [`RateLimiter`] token bucket can be attached with
//! [`CloudflareProvider::with_rate_limiter`] to bound outbound call volume
//! across concurrent reconciliations; one token is taken per attempt.
//!
//! ## Error handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError). The
//! taxonomy separates transient conditions from business failures:
//!
//! - [`ProviderError::RateLimited`], [`ProviderError::NetworkError`],
//!   [`ProviderError::Timeout`] — retryable
//! - [`ProviderError::RecordExists`], [`ProviderError::RecordNotFound`],
//!   [`ProviderError::ZoneNotFound`], [`ProviderError::InvalidCredentials`] —
//!   terminal, surfaced immediately

mod error;
mod providers;
mod rate_limit;
mod retry;
mod traits;
mod types;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export core trait only (internal traits are not exported)
pub use traits::DnsProvider;

// Re-export retry / rate-limit controls
pub use rate_limit::RateLimiter;
pub use retry::{RetryPolicy, with_retry};

// Re-export types
pub use types::{DnsRecordType, ProviderRecord, RecordData, RecordSpec};

// Re-export concrete providers
pub use providers::{CloudflareProvider, MemoryProvider};

// Shared helpers for name handling, reused by the reconciler
pub use providers::common::{name_in_scope, normalize_domain_name};
