//! Cloudflare HTTP transport.
//!
//! One entry point, [`CloudflareProvider::request_envelope`], wraps every API
//! call in the retry policy and takes a rate-limiter token per attempt.
//! Transport failures and 429/5xx statuses map to the retryable error
//! variants before the envelope is parsed; API-level failures (`success:
//! false`) map through the error-code table and are terminal.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::retry::with_retry;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CF_API_BASE, CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// Performs a request and returns the validated envelope.
    ///
    /// The returned envelope always has `success == true`; failures of any
    /// kind become `Err`.
    pub(crate) async fn request_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        with_retry(&self.retry, self.provider_name(), path, || {
            let method = method.clone();
            let body = body.clone();
            let context = context.clone();
            async move { self.send_once(method, path, body, context).await }
        })
        .await
    }

    /// Performs a request expecting a `result` payload.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        context: ErrorContext,
    ) -> Result<T> {
        let envelope: CloudflareResponse<T> =
            self.request_envelope(method, path, body, context).await?;
        envelope
            .result
            .ok_or_else(|| self.parse_error("response missing 'result' field"))
    }

    /// Single attempt: limiter token, HTTP exchange, envelope validation.
    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        let url = format!("{CF_API_BASE}{path}");
        log::debug!("{method} {url}");

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.api_token));
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: self.provider_name().to_string(),
                    detail: e.to_string(),
                }
            } else {
                self.network_error(e)
            }
        })?;

        let status = response.status();
        log::debug!("Response status: {status}");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after,
                raw_message: response.text().await.ok(),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| self.network_error(format!("failed to read response body: {e}")))?;

        if status.is_server_error() {
            return Err(self.network_error(format!("HTTP {status}: {response_text}")));
        }

        let envelope: CloudflareResponse<T> =
            serde_json::from_str(&response_text).map_err(|e| {
                log::error!("Failed to parse response: {e}");
                log::error!("Raw response: {response_text}");
                self.parse_error(e)
            })?;

        if !envelope.success {
            let (code, message) = envelope
                .errors
                .and_then(|errors| {
                    errors
                        .first()
                        .map(|e| (e.code.to_string(), e.message.clone()))
                })
                .unwrap_or_else(|| (String::new(), "Unknown error".to_string()));
            let mapped = self.map_error(RawApiError::with_code(code, message), context);
            if mapped.is_expected() {
                log::warn!("API error: {mapped}");
            } else {
                log::error!("API error: {mapped}");
            }
            return Err(mapped);
        }

        Ok(envelope)
    }

    fn network_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::NetworkError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }
}
