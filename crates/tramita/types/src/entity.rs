//! The workflowable entity record.
//!
//! This is the narrow capability the core needs from domain entities:
//! identity, variant membership and the current state. Business payload
//! fields live with the surrounding application and are composed around
//! this record, never inside it.

use crate::{ActorId, EntityId, StateId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of one entity, mutated only through the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub variant: VariantId,
    pub current_state: StateId,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityRecord {
    /// Create an entity in the given initial state. Callers go through
    /// `TransitionEngine::create_entity`, which picks the state from the
    /// registered definition.
    pub fn new(variant: VariantId, initial_state: StateId, created_by: ActorId) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            variant,
            current_state: initial_state,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_starts_in_given_state() {
        let record = EntityRecord::new(
            VariantId::new("dieta-especial"),
            StateId::new("RASCUNHO"),
            ActorId::new("escola-1"),
        );
        assert_eq!(record.current_state, StateId::new("RASCUNHO"));
        assert_eq!(record.created_at, record.updated_at);
        assert!(!record.id.0.is_empty());
    }

    #[test]
    fn test_with_id_overrides_generated() {
        let record = EntityRecord::new(
            VariantId::new("v"),
            StateId::new("A"),
            ActorId::new("a"),
        )
        .with_id(EntityId::new("pedido-42"));
        assert_eq!(record.id, EntityId::new("pedido-42"));
    }
}
