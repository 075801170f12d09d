use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{ProviderRecord, RecordSpec};

/// Raw API error (internal).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (format differs per provider).
    pub code: Option<String>,
    /// Raw error message.
    pub message: String,
}

impl RawApiError {
    #[cfg(test)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra context attached when mapping raw errors (internal).
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name, for `RecordExists`-class errors.
    pub record_name: Option<String>,
    /// Record ID, for `RecordNotFound`-class errors.
    pub record_id: Option<String>,
    /// Zone identifier, for `ZoneNotFound`-class errors.
    pub zone: Option<String>,
}

/// Maps a provider's raw API errors to the unified taxonomy (internal).
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier used in error messages.
    fn provider_name(&self) -> &'static str;

    /// Maps a raw API error to a [`ProviderError`].
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse error.
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback).
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// DNS provider abstraction.
///
/// Implementations wrap every outbound call in the crate's retry policy and
/// acquire the shared rate limiter before each attempt, so callers see at most
/// one failure per logical operation. Record IDs are provider-assigned and
/// stable across updates.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &'static str;

    /// Checks whether the configured credentials are usable.
    async fn validate_credentials(&self) -> Result<bool>;

    /// Lists records in a zone.
    ///
    /// `name_scope` narrows the listing to records whose fully-qualified name
    /// equals the scope or is a subdomain of it. `None` lists the whole zone.
    async fn list_records(
        &self,
        zone_id: &str,
        name_scope: Option<&str>,
    ) -> Result<Vec<ProviderRecord>>;

    /// Creates a record and returns it with its provider-assigned ID.
    async fn create_record(&self, spec: &RecordSpec) -> Result<ProviderRecord>;

    /// Replaces the contents of an existing record in place.
    async fn update_record(&self, record_id: &str, spec: &RecordSpec) -> Result<ProviderRecord>;

    /// Deletes a record by ID.
    async fn delete_record(&self, record_id: &str, zone_id: &str) -> Result<()>;
}
