//! Patient cache and optimistic write ledger

pub mod patient_store;
pub mod pending;

pub use patient_store::PatientStore;
pub use pending::{OperationId, OperationKind, OperationStatus, PendingLedger, PendingOperation};
