//! Core logic of the subdomain registry.
//!
//! The flow for a request is: parse a [`RequestDocument`](types::RequestDocument),
//! [`validate_document`] it into a typed request, authorize it against the
//! allocation state, build the desired record set and reconcile it against
//! the live zone through a [`DnsProvider`](subdns_provider::DnsProvider).
//!
//! Platform layers (the CLI, a bot, a web service) implement the storage and
//! identity traits in [`traits`] and drive everything through
//! [`RegistryService`](services::RegistryService).

pub mod builder;
pub mod config;
pub mod error;
pub mod label_lock;
pub mod services;
pub mod traits;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use builder::build_desired_state;
pub use config::RegistryConfig;
pub use error::{AuthError, ConflictError, CoreError, CoreResult, ValidationError};
pub use services::{ConflictService, ReconcilerService, RegistryService, RegistryStatus, ServiceContext};
pub use traits::{AllocationStore, DeploymentStore, IdentityStatus, IdentityVerifier};
pub use validation::validate_document;
