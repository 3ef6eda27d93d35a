//! Domain types for tramita.
//!
//! A *variant* is one independently defined approval state machine: a
//! closed state catalog plus a role-gated transition table, declared at
//! process start and immutable thereafter. Entities move through a
//! variant only via the transition engine, and every accepted transition
//! lands in the append-only audit log as a [`TransitionRecord`].
//!
//! This crate holds data and validation only; no I/O.

#![deny(unsafe_code)]

pub mod deadline;
pub mod entity;
pub mod error;
pub mod ids;
pub mod record;
pub mod round;
pub mod variant;

pub use deadline::{Deadline, DeadlineRule};
pub use entity::EntityRecord;
pub use error::{
    DefinitionError, DefinitionResult, GuardViolation, TramitaResult, TransitionError,
};
pub use ids::{Actor, ActorId, EffectId, EntityId, RoleId, StateId, TransitionId, VariantId, SYSTEM_ROLE};
pub use record::{AttachmentRef, TransitionPayload, TransitionRecord};
pub use round::{CorrectionRound, RoundOutcome};
pub use variant::{CorrectionHook, StateDef, TransitionDef, VariantDefinition};
