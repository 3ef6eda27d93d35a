//! Storage seams for tramita.
//!
//! The engine talks to storage through the traits in [`traits`]; the
//! append-only character of the audit log is guaranteed by construction
//! (the only write path is [`traits::EntityStore::commit_transition`],
//! which couples a state change to its record). [`memory::InMemoryStore`]
//! is the deterministic reference adapter used across the test suites.

#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use traits::{
    AuditLog, CorrectionStore, EntityStore, Lease, LeaseStore, QueryWindow, TramitaStore,
};
