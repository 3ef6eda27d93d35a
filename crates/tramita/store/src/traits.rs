//! Storage seams consumed by the transition engine and the scanner.
//!
//! The engine owns the invariants; the store provides the primitives:
//! a compare-and-swap commit that couples the state change to its audit
//! record, paged append-only reads, correction rounds and scan leases.
//! Adapters must be `Send + Sync`; the in-memory one in [`crate::memory`]
//! is the deterministic reference.

use crate::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tramita_types::{
    CorrectionHook, CorrectionRound, EntityId, EntityRecord, RoundOutcome, StateId,
    TransitionRecord, VariantId,
};

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    /// Maximum records to return; 0 means no limit.
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn page(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }
}

/// Storage interface for entity workflow state.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a newly created entity in its initial state.
    async fn create_entity(&self, record: EntityRecord) -> StoreResult<()>;

    /// Get one entity by id.
    async fn get_entity(&self, entity_id: &EntityId) -> StoreResult<Option<EntityRecord>>;

    /// List entities of a variant currently in the given state,
    /// oldest-updated first. Used by the deadline scanner.
    async fn list_in_state(
        &self,
        variant: &VariantId,
        state: &StateId,
    ) -> StoreResult<Vec<EntityRecord>>;

    /// Commit one transition as an all-or-nothing unit: compare the
    /// entity's persisted state against `expected_from`, set it to
    /// `record.to_state`, append `record` to the audit log, and apply
    /// the correction-round change `round` declares, if any.
    ///
    /// A state mismatch returns [`crate::StoreError::Conflict`].
    /// [`CorrectionHook::Opens`] while a round is already open returns
    /// [`crate::StoreError::AlreadyExists`]; [`CorrectionHook::Closes`]
    /// with no open round returns [`crate::StoreError::NotFound`]. On
    /// any error nothing is written — no entity ever carries a state
    /// without its record, or a record without its round change.
    async fn commit_transition(
        &self,
        expected_from: &StateId,
        record: TransitionRecord,
        round: Option<CorrectionHook>,
    ) -> StoreResult<()>;
}

/// Storage interface for the append-only audit log.
///
/// Writes happen only through [`EntityStore::commit_transition`]; this
/// trait is the read side.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Per-entity history, oldest first. Restartable and finite: callers
    /// page through with `window` and may resume from any offset.
    async fn history(
        &self,
        entity_id: &EntityId,
        window: QueryWindow,
    ) -> StoreResult<Vec<TransitionRecord>>;

    /// The most recent record for one entity.
    async fn latest(&self, entity_id: &EntityId) -> StoreResult<Option<TransitionRecord>>;

    /// The most recent record for each of N entities in one batched
    /// read. Entities with no history are absent from the map.
    async fn latest_for_many(
        &self,
        entity_ids: &[EntityId],
    ) -> StoreResult<HashMap<EntityId, TransitionRecord>>;
}

/// Storage interface for correction rounds.
#[async_trait]
pub trait CorrectionStore: Send + Sync {
    /// Open a round. Fails with [`crate::StoreError::AlreadyExists`]
    /// when one is already open for the entity.
    async fn open_round(&self, entity_id: &EntityId) -> StoreResult<CorrectionRound>;

    /// Close the open round with the given outcome. Fails with
    /// [`crate::StoreError::NotFound`] when none is open.
    async fn close_round(
        &self,
        entity_id: &EntityId,
        outcome: RoundOutcome,
    ) -> StoreResult<CorrectionRound>;

    /// The currently open round, if any.
    async fn open_round_for(&self, entity_id: &EntityId) -> StoreResult<Option<CorrectionRound>>;

    /// All rounds for an entity, oldest first.
    async fn rounds_for(&self, entity_id: &EntityId) -> StoreResult<Vec<CorrectionRound>>;
}

/// Scan-level mutual exclusion.
///
/// Leases expire by TTL so a crashed holder cannot wedge a rule forever.
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Try to acquire the lease. Returns false when another live holder
    /// has it; re-acquiring an expired lease succeeds.
    async fn acquire_lease(&self, key: &str, holder: &str, ttl: Duration) -> StoreResult<bool>;

    /// Release the lease if still held by `holder`.
    async fn release_lease(&self, key: &str, holder: &str) -> StoreResult<()>;
}

/// Lease bookkeeping record, shared by adapters. Serializable so
/// external backends can persist it as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lease {
    pub holder: String,
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Unified storage bundle used by the engine and the scanner.
pub trait TramitaStore: EntityStore + AuditLog + CorrectionStore + LeaseStore + Send + Sync {}

impl<T> TramitaStore for T where T: EntityStore + AuditLog + CorrectionStore + LeaseStore + Send + Sync
{}
