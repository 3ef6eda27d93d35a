//! Correction-cycle tracker.
//!
//! Tracks bounded reviewer/submitter back-and-forth rounds. The engine
//! consults it as a guard before transitions carrying a correction hook;
//! the round change itself rides inside the transition commit, so a
//! "send back for correction" transition opens a round and a "resubmit"
//! or "escalate" transition closes it atomically with the state change.
//! At most one round is open per entity. [`CorrectionTracker::open`] and
//! [`CorrectionTracker::close`] write directly, for bookkeeping outside
//! a transition.

use std::sync::Arc;
use thiserror::Error;
use tramita_store::{CorrectionStore, StoreError};
use tramita_types::{CorrectionRound, EntityId, GuardViolation, RoundOutcome};

/// Tracker failures, interpreted by the engine: guard violations become
/// `GuardFailed` on the transition being applied, the rest pass through.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Guard(GuardViolation),

    #[error(transparent)]
    Store(StoreError),
}

/// Tracks correction rounds on top of a [`CorrectionStore`].
#[derive(Clone)]
pub struct CorrectionTracker {
    store: Arc<dyn CorrectionStore>,
}

impl CorrectionTracker {
    pub fn new(store: Arc<dyn CorrectionStore>) -> Self {
        Self { store }
    }

    /// Open a round for the entity.
    pub async fn open(&self, entity_id: &EntityId) -> Result<CorrectionRound, TrackerError> {
        match self.store.open_round(entity_id).await {
            Ok(round) => Ok(round),
            Err(StoreError::AlreadyExists(_)) => Err(TrackerError::Guard(
                GuardViolation::RoundAlreadyOpen(entity_id.clone()),
            )),
            Err(err) => Err(TrackerError::Store(err)),
        }
    }

    /// Close the open round with the given outcome.
    pub async fn close(
        &self,
        entity_id: &EntityId,
        outcome: RoundOutcome,
    ) -> Result<CorrectionRound, TrackerError> {
        match self.store.close_round(entity_id, outcome).await {
            Ok(round) => Ok(round),
            Err(StoreError::NotFound(_)) => Err(TrackerError::Guard(
                GuardViolation::NoOpenRound(entity_id.clone(), outcome),
            )),
            Err(err) => Err(TrackerError::Store(err)),
        }
    }

    /// The currently open round, if any.
    pub async fn open_round(
        &self,
        entity_id: &EntityId,
    ) -> Result<Option<CorrectionRound>, TrackerError> {
        self.store
            .open_round_for(entity_id)
            .await
            .map_err(TrackerError::Store)
    }

    /// Full round history for an entity, oldest first.
    pub async fn rounds(
        &self,
        entity_id: &EntityId,
    ) -> Result<Vec<CorrectionRound>, TrackerError> {
        self.store
            .rounds_for(entity_id)
            .await
            .map_err(TrackerError::Store)
    }
}
