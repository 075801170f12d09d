//! Unified error type definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export library error type
pub use subdns_provider::ProviderError;

/// Machine-readable reason for a validation rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// The document could not be parsed at all.
    MalformedDocument,
    /// Owner username or email is syntactically invalid.
    InvalidOwner,
    /// Label fails the subdomain syntax rules.
    InvalidLabel,
    /// Label is on the reserved list.
    ReservedLabel,
    /// The requested zone is not the zone this registry manages.
    ZoneMismatch,
    /// A request must carry at least one record.
    NoRecords,
    /// Unknown or unsupported record type.
    InvalidRecordType,
    /// Record name fails hostname syntax.
    InvalidRecordName,
    /// Record value does not parse for its type.
    InvalidRecordValue,
    /// MX/SRV record without a priority.
    MissingPriority,
    /// TTL outside the configured bounds.
    TtlOutOfRange,
    /// A CNAME shares a name with another record.
    RecordTypeConflict,
    /// More records than the per-label cap allows.
    TooManyRecords,
}

/// A validation rejection, tied to the offending field.
///
/// `field` is a path into the submitted document, e.g. `records[2].value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ValidationCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ownership / identity failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "code")]
pub enum AuthError {
    /// The requester does not own the allocation for this label.
    #[error("'{username}' does not own the allocation for '{label}'")]
    NotOwner { label: String, username: String },

    /// The owner's account failed verification with the identity collaborator.
    #[error("identity check failed for '{username}': {reason}")]
    IdentityInvalid { username: String, reason: String },
}

/// Registry-level conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "code")]
pub enum ConflictError {
    /// Another owner already holds this label (case-insensitive).
    #[error("label '{label}' is already allocated")]
    LabelTaken { label: String },

    /// The owner has reached the per-owner label quota.
    #[error("'{username}' already holds {limit} labels")]
    QuotaExceeded { username: String, limit: usize },
}

/// Core layer error type.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Request document rejected by the validator.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ownership or identity check failed.
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    /// Label collision or quota violation.
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// No allocation exists for the given label.
    #[error("Allocation not found: {0}")]
    AllocationNotFound(String),

    /// Storage layer error.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Provider error (converted from the provider library).
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether this is expected behavior (user input, missing resource, …),
    /// used for log levelling.
    ///
    /// Level `warn` should be used when returning `true`, level `error`
    /// otherwise. **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::Auth(_)
            | Self::Conflict(_)
            | Self::AllocationNotFound(_) => true,
            Self::Provider(e) => e.is_expected(),
            Self::StorageError(_) | Self::SerializationError(_) => false,
        }
    }
}

/// Core layer Result type alias.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
