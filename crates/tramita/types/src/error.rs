//! Error taxonomies for definition time and transition time.
//!
//! Rejected transitions are expected, frequent outcomes: they are typed
//! results carrying enough detail for precise caller-side messaging,
//! never unchecked crashes.

use crate::{EffectId, EntityId, RoleId, RoundOutcome, StateId, TransitionId, VariantId};
use thiserror::Error;

/// Result alias for definition-time validation.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result alias for transition application.
pub type TramitaResult<T> = Result<T, TransitionError>;

/// Errors raised while declaring or validating a variant definition.
///
/// These are configuration mistakes: the process should fail at startup,
/// not at the first request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("variant '{0}' declares no states")]
    EmptyStates(VariantId),

    #[error("variant '{variant}' references undeclared state '{state}'")]
    UnknownState { variant: VariantId, state: StateId },

    #[error("variant '{variant}' declares state '{state}' more than once")]
    DuplicateState { variant: VariantId, state: StateId },

    #[error("variant '{variant}' declares transition '{transition}' more than once")]
    DuplicateTransition {
        variant: VariantId,
        transition: TransitionId,
    },

    #[error("transition '{transition}' of variant '{variant}' has an empty source set")]
    EmptySources {
        variant: VariantId,
        transition: TransitionId,
    },

    #[error("initial state '{state}' of variant '{variant}' has no outgoing transition")]
    DeadInitialState { variant: VariantId, state: StateId },

    #[error("variant '{0}' has no terminal state")]
    NoTerminalState(VariantId),

    #[error("invalid definition: {0}")]
    Invalid(String),
}

/// Why a transition-specific guard rejected the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardViolation {
    #[error("a correction round is already open for entity '{0}'")]
    RoundAlreadyOpen(EntityId),

    #[error("no correction round is open for entity '{0}' to close as {1:?}")]
    NoOpenRound(EntityId, RoundOutcome),
}

/// Errors returned by `apply` and the read surfaces.
///
/// Precedence when several checks would fail at once: unknown transition,
/// then invalid source state, then unauthorized role, then guard. In
/// particular `InvalidTransition` wins over `Forbidden` — callers learn
/// that the action is unavailable before they learn who could perform it.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("variant '{0}' is not registered")]
    UnknownVariant(VariantId),

    #[error("variant '{variant}' has no transition '{transition}'")]
    UnknownTransition {
        variant: VariantId,
        transition: TransitionId,
    },

    #[error("transition '{transition}' is not legal from state '{current_state}' (sources: {})",
        .sources.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", "))]
    InvalidTransition {
        transition: TransitionId,
        current_state: StateId,
        sources: Vec<StateId>,
    },

    #[error("role '{role}' may not apply transition '{transition}' (allowed: {})",
        .allowed_roles.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", "))]
    Forbidden {
        transition: TransitionId,
        role: RoleId,
        allowed_roles: Vec<RoleId>,
    },

    #[error("guard rejected transition '{transition}': {violation}")]
    GuardFailed {
        transition: TransitionId,
        violation: GuardViolation,
    },

    #[error("entity '{entity_id}' changed concurrently: expected state '{expected}', found '{found}'")]
    Conflict {
        entity_id: EntityId,
        expected: StateId,
        found: StateId,
    },

    #[error("side effect '{effect}' failed during transition '{transition}'")]
    EffectFailed {
        transition: TransitionId,
        effect: EffectId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("entity '{0}' not found")]
    EntityNotFound(EntityId),

    #[error("storage error: {0}")]
    Store(String),
}

impl TransitionError {
    /// Whether the caller can recover by re-reading the entity and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_names_sources() {
        let err = TransitionError::InvalidTransition {
            transition: TransitionId::new("codae_autoriza"),
            current_state: StateId::new("RASCUNHO"),
            sources: vec![StateId::new("DRE_VALIDADO")],
        };
        let msg = err.to_string();
        assert!(msg.contains("codae_autoriza"));
        assert!(msg.contains("RASCUNHO"));
        assert!(msg.contains("DRE_VALIDADO"));
    }

    #[test]
    fn test_forbidden_message_names_allowed_roles() {
        let err = TransitionError::Forbidden {
            transition: TransitionId::new("dre_valida"),
            role: RoleId::new("ESCOLA"),
            allowed_roles: vec![RoleId::new("DRE")],
        };
        let msg = err.to_string();
        assert!(msg.contains("ESCOLA"));
        assert!(msg.contains("DRE"));
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        let conflict = TransitionError::Conflict {
            entity_id: EntityId::new("e-1"),
            expected: StateId::new("A"),
            found: StateId::new("B"),
        };
        assert!(conflict.is_retryable());
        assert!(!TransitionError::EntityNotFound(EntityId::new("e-1")).is_retryable());
    }
}
