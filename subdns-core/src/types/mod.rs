//! Core data types.

mod allocation;
mod deployment;
mod request;

pub use allocation::Allocation;
pub use deployment::{
    DeploymentOutcome, DeploymentRecord, FailedOperation, Operation, ReconciliationPlan,
};
pub use request::{
    DesiredRecord, OwnerDocument, OwnerIdentity, RecordDocument, RequestDocument, RequestedRecord,
    SubdomainRequest,
};
