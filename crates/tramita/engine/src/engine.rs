//! The transition engine: the single entry point through which entities
//! change state.
//!
//! Interactive callers and the deadline scanner both go through
//! [`TransitionEngine::apply`], so the legality rules are enforced (and
//! proven) once. Validation is fail-fast, in a documented order:
//!
//! 1. entity exists and its variant is registered;
//! 2. the transition exists for the variant — else `UnknownTransition`;
//! 3. the current state is a legal source — else `InvalidTransition`;
//! 4. the actor's role is allowed — else `Forbidden`;
//! 5. the correction-hook guard holds — else `GuardFailed`;
//! 6. declared side effects run in order — a failure aborts as
//!    `EffectFailed` with nothing written;
//! 7. the state change, its audit record and the declared round change
//!    are committed as one compare-and-swap unit — a stale read
//!    surfaces as `Conflict`, and a guard invalidated since step 5
//!    (for example by a side effect touching the tracker) still
//!    rejects as `GuardFailed` with nothing written.
//!
//! State validity is deliberately checked before role authorization:
//! when both would fail, callers see `InvalidTransition`. The action is
//! unavailable; who could perform it elsewhere is irrelevant noise.

use crate::correction::{CorrectionTracker, TrackerError};
use crate::effects::{EffectContext, EffectRegistry};
use crate::registry::VariantRegistry;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tramita_store::{AuditLog, EntityStore, QueryWindow, StoreError, TramitaStore};
use tramita_types::{
    Actor, CorrectionHook, EntityId, EntityRecord, GuardViolation, StateId, TramitaResult,
    TransitionError, TransitionId, TransitionPayload, TransitionRecord, VariantId,
};

/// Validates and applies named transitions on behalf of actors.
#[derive(Clone)]
pub struct TransitionEngine {
    registry: Arc<VariantRegistry>,
    store: Arc<dyn TramitaStore>,
    effects: EffectRegistry,
    tracker: CorrectionTracker,
}

impl TransitionEngine {
    pub fn new<S: TramitaStore + 'static>(
        registry: Arc<VariantRegistry>,
        store: Arc<S>,
        effects: EffectRegistry,
    ) -> Self {
        Self {
            registry,
            store: store.clone(),
            effects,
            tracker: CorrectionTracker::new(store),
        }
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &CorrectionTracker {
        &self.tracker
    }

    // ── Entity lifecycle ─────────────────────────────────────────────

    /// Create an entity in the variant's initial state.
    pub async fn create_entity(
        &self,
        variant: &VariantId,
        created_by: &Actor,
    ) -> TramitaResult<EntityRecord> {
        let definition = self.registry.get(variant)?;
        let record = EntityRecord::new(
            variant.clone(),
            definition.initial_state.clone(),
            created_by.id.clone(),
        );
        self.store
            .create_entity(record.clone())
            .await
            .map_err(|e| store_error(&record.id, e))?;

        tracing::info!(
            entity_id = %record.id,
            variant = %variant,
            state = %record.current_state,
            "entity created"
        );
        Ok(record)
    }

    /// Load an entity's workflow record.
    pub async fn entity(&self, entity_id: &EntityId) -> TramitaResult<EntityRecord> {
        self.store
            .get_entity(entity_id)
            .await
            .map_err(|e| store_error(entity_id, e))?
            .ok_or_else(|| TransitionError::EntityNotFound(entity_id.clone()))
    }

    /// Whether the entity has reached a terminal state of its variant.
    pub async fn is_retired(&self, entity_id: &EntityId) -> TramitaResult<bool> {
        let entity = self.entity(entity_id).await?;
        let definition = self.registry.get(&entity.variant)?;
        Ok(definition.is_terminal(&entity.current_state))
    }

    // ── Transition application ───────────────────────────────────────

    /// Attempt a named transition on behalf of an actor.
    ///
    /// On success the new state is returned and exactly one audit
    /// record has been appended. On any error the entity is guaranteed
    /// to remain in its pre-call state. `Conflict` means the read was
    /// stale: re-read and retry.
    pub async fn apply(
        &self,
        entity_id: &EntityId,
        transition_id: &TransitionId,
        actor: &Actor,
        payload: TransitionPayload,
    ) -> TramitaResult<StateId> {
        let entity = self.entity(entity_id).await?;
        let definition = self.registry.get(&entity.variant)?;

        let transition = definition.get_transition(transition_id).ok_or_else(|| {
            TransitionError::UnknownTransition {
                variant: entity.variant.clone(),
                transition: transition_id.clone(),
            }
        })?;

        if !transition.has_source(&entity.current_state) {
            return Err(TransitionError::InvalidTransition {
                transition: transition_id.clone(),
                current_state: entity.current_state.clone(),
                sources: transition.sources.clone(),
            });
        }

        if !transition.allows(&actor.role) {
            return Err(TransitionError::Forbidden {
                transition: transition_id.clone(),
                role: actor.role.clone(),
                allowed_roles: transition.allowed_roles.clone(),
            });
        }

        self.check_correction_guard(entity_id, transition_id, transition.correction)
            .await?;

        for effect_id in &transition.effects {
            let effect = self.effects.get(effect_id).ok_or_else(|| {
                TransitionError::EffectFailed {
                    transition: transition_id.clone(),
                    effect: effect_id.clone(),
                    source: "no implementation registered for declared effect".into(),
                }
            })?;
            effect
                .invoke(EffectContext {
                    entity: &entity,
                    transition,
                    actor,
                    payload: &payload,
                })
                .await
                .map_err(|source| TransitionError::EffectFailed {
                    transition: transition_id.clone(),
                    effect: effect_id.clone(),
                    source,
                })?;
        }

        let record = TransitionRecord {
            entity_id: entity_id.clone(),
            variant: entity.variant.clone(),
            transition: transition_id.clone(),
            from_state: entity.current_state.clone(),
            to_state: transition.target.clone(),
            actor: actor.id.clone(),
            role: actor.role.clone(),
            timestamp: Utc::now(),
            justification: payload.justification.clone(),
            attachments: payload.attachments.clone(),
        };
        let new_state = record.to_state.clone();

        // The round change rides inside the commit, so a guard that was
        // invalidated after the pre-check still rejects cleanly with
        // nothing written.
        self.store
            .commit_transition(&entity.current_state, record, transition.correction)
            .await
            .map_err(|e| commit_error(entity_id, transition_id, transition.correction, e))?;

        tracing::info!(
            entity_id = %entity_id,
            transition = %transition_id,
            from = %entity.current_state,
            to = %new_state,
            role = %actor.role,
            "transition applied"
        );
        Ok(new_state)
    }

    // ── Read surfaces ────────────────────────────────────────────────

    /// Per-entity audit history, oldest first.
    pub async fn history(
        &self,
        entity_id: &EntityId,
        window: QueryWindow,
    ) -> TramitaResult<Vec<TransitionRecord>> {
        self.store
            .history(entity_id, window)
            .await
            .map_err(|e| store_error(entity_id, e))
    }

    /// Latest audit record per entity, one batched read.
    pub async fn latest_for_many(
        &self,
        entity_ids: &[EntityId],
    ) -> TramitaResult<HashMap<EntityId, TransitionRecord>> {
        self.store
            .latest_for_many(entity_ids)
            .await
            .map_err(|e| TransitionError::Store(e.to_string()))
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn check_correction_guard(
        &self,
        entity_id: &EntityId,
        transition_id: &TransitionId,
        hook: Option<CorrectionHook>,
    ) -> TramitaResult<()> {
        match hook {
            Some(CorrectionHook::Opens) => {
                if self
                    .tracker
                    .open_round(entity_id)
                    .await
                    .map_err(|e| tracker_error(transition_id, e))?
                    .is_some()
                {
                    return Err(TransitionError::GuardFailed {
                        transition: transition_id.clone(),
                        violation: GuardViolation::RoundAlreadyOpen(entity_id.clone()),
                    });
                }
            }
            Some(CorrectionHook::Closes(outcome)) => {
                if self
                    .tracker
                    .open_round(entity_id)
                    .await
                    .map_err(|e| tracker_error(transition_id, e))?
                    .is_none()
                {
                    return Err(TransitionError::GuardFailed {
                        transition: transition_id.clone(),
                        violation: GuardViolation::NoOpenRound(entity_id.clone(), outcome),
                    });
                }
            }
            None => {}
        }
        Ok(())
    }

}

/// Maps commit failures back to transition errors. The hook
/// disambiguates the store's round-guard errors: entities are never
/// deleted, so `NotFound` under a closing hook can only mean the open
/// round vanished.
fn commit_error(
    entity_id: &EntityId,
    transition_id: &TransitionId,
    hook: Option<CorrectionHook>,
    err: StoreError,
) -> TransitionError {
    match (hook, err) {
        (Some(CorrectionHook::Opens), StoreError::AlreadyExists(_)) => {
            TransitionError::GuardFailed {
                transition: transition_id.clone(),
                violation: GuardViolation::RoundAlreadyOpen(entity_id.clone()),
            }
        }
        (Some(CorrectionHook::Closes(outcome)), StoreError::NotFound(_)) => {
            TransitionError::GuardFailed {
                transition: transition_id.clone(),
                violation: GuardViolation::NoOpenRound(entity_id.clone(), outcome),
            }
        }
        (_, err) => store_error(entity_id, err),
    }
}

fn store_error(entity_id: &EntityId, err: StoreError) -> TransitionError {
    match err {
        StoreError::NotFound(_) => TransitionError::EntityNotFound(entity_id.clone()),
        StoreError::Conflict {
            expected, found, ..
        } => TransitionError::Conflict {
            entity_id: entity_id.clone(),
            expected: StateId::new(expected),
            found: StateId::new(found),
        },
        other => TransitionError::Store(other.to_string()),
    }
}

fn tracker_error(transition_id: &TransitionId, err: TrackerError) -> TransitionError {
    match err {
        TrackerError::Guard(violation) => TransitionError::GuardFailed {
            transition: transition_id.clone(),
            violation,
        },
        TrackerError::Store(err) => TransitionError::Store(err.to_string()),
    }
}
