//! In-memory reference implementation of the tramita storage seams.
//!
//! Deterministic and test-friendly. Production deployments should use a
//! transactional backend as the source of truth; the commit contract
//! (state change and audit append as one unit) must hold there too.

use crate::traits::{AuditLog, CorrectionStore, EntityStore, Lease, LeaseStore, QueryWindow};
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tramita_types::{
    CorrectionHook, CorrectionRound, EntityId, EntityRecord, RoundOutcome, StateId,
    TransitionRecord, VariantId,
};

/// In-memory tramita storage adapter.
#[derive(Default)]
pub struct InMemoryStore {
    entities: RwLock<HashMap<EntityId, EntityRecord>>,
    audits: RwLock<Vec<TransitionRecord>>,
    rounds: RwLock<HashMap<EntityId, Vec<CorrectionRound>>>,
    leases: RwLock<HashMap<String, Lease>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(what: &str) -> StoreError {
    StoreError::Backend(format!("{what} lock poisoned"))
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn create_entity(&self, record: EntityRecord) -> StoreResult<()> {
        let mut guard = self.entities.write().map_err(|_| poisoned("entities"))?;
        if guard.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(format!(
                "entity {}",
                record.id
            )));
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_entity(&self, entity_id: &EntityId) -> StoreResult<Option<EntityRecord>> {
        let guard = self.entities.read().map_err(|_| poisoned("entities"))?;
        Ok(guard.get(entity_id).cloned())
    }

    async fn list_in_state(
        &self,
        variant: &VariantId,
        state: &StateId,
    ) -> StoreResult<Vec<EntityRecord>> {
        let guard = self.entities.read().map_err(|_| poisoned("entities"))?;
        let mut matches: Vec<EntityRecord> = guard
            .values()
            .filter(|e| &e.variant == variant && &e.current_state == state)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        Ok(matches)
    }

    async fn commit_transition(
        &self,
        expected_from: &StateId,
        record: TransitionRecord,
        round: Option<CorrectionHook>,
    ) -> StoreResult<()> {
        // Lock order: entities, audits, rounds. All held for the whole
        // commit so the state change, its record and the round change
        // land together or not at all.
        let mut entities = self.entities.write().map_err(|_| poisoned("entities"))?;
        let mut audits = self.audits.write().map_err(|_| poisoned("audits"))?;
        let mut rounds = self.rounds.write().map_err(|_| poisoned("rounds"))?;

        let entity = entities.get_mut(&record.entity_id).ok_or_else(|| {
            StoreError::NotFound(format!("entity {}", record.entity_id))
        })?;

        if &entity.current_state != expected_from {
            return Err(StoreError::Conflict {
                key: record.entity_id.to_string(),
                expected: expected_from.to_string(),
                found: entity.current_state.to_string(),
            });
        }

        // Round guard is the last fallible step; after it every write
        // below goes through.
        match round {
            Some(CorrectionHook::Opens) => {
                let entity_rounds = rounds.entry(record.entity_id.clone()).or_default();
                if entity_rounds.iter().any(|r| r.is_open()) {
                    return Err(StoreError::AlreadyExists(format!(
                        "open correction round for entity {}",
                        record.entity_id
                    )));
                }
                entity_rounds.push(CorrectionRound::open(record.entity_id.clone()));
            }
            Some(CorrectionHook::Closes(outcome)) => {
                let open = rounds
                    .get_mut(&record.entity_id)
                    .and_then(|rs| rs.iter_mut().find(|r| r.is_open()))
                    .ok_or_else(|| {
                        StoreError::NotFound(format!(
                            "open correction round for entity {}",
                            record.entity_id
                        ))
                    })?;
                open.close(outcome);
            }
            None => {}
        }

        entity.current_state = record.to_state.clone();
        entity.updated_at = record.timestamp;
        audits.push(record);
        Ok(())
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn history(
        &self,
        entity_id: &EntityId,
        window: QueryWindow,
    ) -> StoreResult<Vec<TransitionRecord>> {
        let guard = self.audits.read().map_err(|_| poisoned("audits"))?;
        let iter = guard
            .iter()
            .filter(|r| &r.entity_id == entity_id)
            .skip(window.offset);
        let records = if window.limit == 0 {
            iter.cloned().collect()
        } else {
            iter.take(window.limit).cloned().collect()
        };
        Ok(records)
    }

    async fn latest(&self, entity_id: &EntityId) -> StoreResult<Option<TransitionRecord>> {
        let guard = self.audits.read().map_err(|_| poisoned("audits"))?;
        Ok(guard
            .iter()
            .rev()
            .find(|r| &r.entity_id == entity_id)
            .cloned())
    }

    async fn latest_for_many(
        &self,
        entity_ids: &[EntityId],
    ) -> StoreResult<HashMap<EntityId, TransitionRecord>> {
        let guard = self.audits.read().map_err(|_| poisoned("audits"))?;
        let mut latest: HashMap<EntityId, TransitionRecord> = HashMap::new();
        for record in guard.iter() {
            if entity_ids.contains(&record.entity_id) {
                // Later records overwrite earlier ones; the log is
                // append-ordered.
                latest.insert(record.entity_id.clone(), record.clone());
            }
        }
        Ok(latest)
    }
}

#[async_trait]
impl CorrectionStore for InMemoryStore {
    async fn open_round(&self, entity_id: &EntityId) -> StoreResult<CorrectionRound> {
        let mut guard = self.rounds.write().map_err(|_| poisoned("rounds"))?;
        let rounds = guard.entry(entity_id.clone()).or_default();
        if rounds.iter().any(|r| r.is_open()) {
            return Err(StoreError::AlreadyExists(format!(
                "open correction round for entity {entity_id}"
            )));
        }
        let round = CorrectionRound::open(entity_id.clone());
        rounds.push(round.clone());
        Ok(round)
    }

    async fn close_round(
        &self,
        entity_id: &EntityId,
        outcome: RoundOutcome,
    ) -> StoreResult<CorrectionRound> {
        let mut guard = self.rounds.write().map_err(|_| poisoned("rounds"))?;
        let rounds = guard.get_mut(entity_id).ok_or_else(|| {
            StoreError::NotFound(format!("correction rounds for entity {entity_id}"))
        })?;
        let round = rounds
            .iter_mut()
            .find(|r| r.is_open())
            .ok_or_else(|| {
                StoreError::NotFound(format!("open correction round for entity {entity_id}"))
            })?;
        round.close(outcome);
        Ok(round.clone())
    }

    async fn open_round_for(&self, entity_id: &EntityId) -> StoreResult<Option<CorrectionRound>> {
        let guard = self.rounds.read().map_err(|_| poisoned("rounds"))?;
        Ok(guard
            .get(entity_id)
            .and_then(|rounds| rounds.iter().find(|r| r.is_open()).cloned()))
    }

    async fn rounds_for(&self, entity_id: &EntityId) -> StoreResult<Vec<CorrectionRound>> {
        let guard = self.rounds.read().map_err(|_| poisoned("rounds"))?;
        Ok(guard.get(entity_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LeaseStore for InMemoryStore {
    async fn acquire_lease(&self, key: &str, holder: &str, ttl: Duration) -> StoreResult<bool> {
        let mut guard = self.leases.write().map_err(|_| poisoned("leases"))?;
        match guard.get(key) {
            Some(lease) if !lease.is_expired() && lease.holder != holder => Ok(false),
            _ => {
                guard.insert(
                    key.to_string(),
                    Lease {
                        holder: holder.to_string(),
                        expires_at: Utc::now() + ttl,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn release_lease(&self, key: &str, holder: &str) -> StoreResult<()> {
        let mut guard = self.leases.write().map_err(|_| poisoned("leases"))?;
        if guard.get(key).is_some_and(|l| l.holder == holder) {
            guard.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramita_types::{Actor, ActorId, RoleId, TransitionId};

    fn make_entity(state: &str) -> EntityRecord {
        EntityRecord::new(
            VariantId::new("pedido-escola"),
            StateId::new(state),
            ActorId::new("diretor-1"),
        )
    }

    fn make_record(entity: &EntityRecord, from: &str, to: &str) -> TransitionRecord {
        let actor = Actor::new("diretor-1", RoleId::new("ESCOLA"));
        TransitionRecord {
            entity_id: entity.id.clone(),
            variant: entity.variant.clone(),
            transition: TransitionId::new("inicia_fluxo"),
            from_state: StateId::new(from),
            to_state: StateId::new(to),
            actor: actor.id,
            role: actor.role,
            timestamp: Utc::now(),
            justification: None,
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_entity() {
        let store = InMemoryStore::new();
        let entity = make_entity("RASCUNHO");
        store.create_entity(entity.clone()).await.unwrap();

        let loaded = store.get_entity(&entity.id).await.unwrap().unwrap();
        assert_eq!(loaded, entity);

        let result = store.create_entity(entity).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_commit_transition_changes_state_and_appends() {
        let store = InMemoryStore::new();
        let entity = make_entity("RASCUNHO");
        store.create_entity(entity.clone()).await.unwrap();

        let record = make_record(&entity, "RASCUNHO", "DRE_A_VALIDAR");
        store
            .commit_transition(&StateId::new("RASCUNHO"), record.clone(), None)
            .await
            .unwrap();

        let loaded = store.get_entity(&entity.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_state, StateId::new("DRE_A_VALIDAR"));

        let latest = store.latest(&entity.id).await.unwrap().unwrap();
        assert_eq!(latest, record);
    }

    #[tokio::test]
    async fn test_commit_transition_stale_read_conflicts() {
        let store = InMemoryStore::new();
        let entity = make_entity("RASCUNHO");
        store.create_entity(entity.clone()).await.unwrap();
        store
            .commit_transition(
                &StateId::new("RASCUNHO"),
                make_record(&entity, "RASCUNHO", "DRE_A_VALIDAR"),
                None,
            )
            .await
            .unwrap();

        // Second writer still believes the entity is in RASCUNHO.
        let result = store
            .commit_transition(
                &StateId::new("RASCUNHO"),
                make_record(&entity, "RASCUNHO", "ESCOLA_CANCELOU"),
                None,
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));

        // The losing write left no trace.
        let history = store.history(&entity.id, QueryWindow::all()).await.unwrap();
        assert_eq!(history.len(), 1);
        let loaded = store.get_entity(&entity.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_state, StateId::new("DRE_A_VALIDAR"));
    }

    #[tokio::test]
    async fn test_commit_transition_unknown_entity() {
        let store = InMemoryStore::new();
        let entity = make_entity("RASCUNHO");
        let result = store
            .commit_transition(
                &StateId::new("RASCUNHO"),
                make_record(&entity, "RASCUNHO", "DRE_A_VALIDAR"),
                None,
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_commit_transition_opens_and_closes_rounds() {
        let store = InMemoryStore::new();
        let entity = make_entity("DRE_A_VALIDAR");
        store.create_entity(entity.clone()).await.unwrap();

        store
            .commit_transition(
                &StateId::new("DRE_A_VALIDAR"),
                make_record(&entity, "DRE_A_VALIDAR", "DRE_PEDIU_ESCOLA_REVISAR"),
                Some(CorrectionHook::Opens),
            )
            .await
            .unwrap();
        assert!(store.open_round_for(&entity.id).await.unwrap().is_some());

        store
            .commit_transition(
                &StateId::new("DRE_PEDIU_ESCOLA_REVISAR"),
                make_record(&entity, "DRE_PEDIU_ESCOLA_REVISAR", "DRE_A_VALIDAR"),
                Some(CorrectionHook::Closes(RoundOutcome::Resubmitted)),
            )
            .await
            .unwrap();
        assert!(store.open_round_for(&entity.id).await.unwrap().is_none());

        let rounds = store.rounds_for(&entity.id).await.unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].outcome, Some(RoundOutcome::Resubmitted));
    }

    #[tokio::test]
    async fn test_commit_transition_rejects_second_open_round_atomically() {
        let store = InMemoryStore::new();
        let entity = make_entity("DRE_A_VALIDAR");
        store.create_entity(entity.clone()).await.unwrap();
        store.open_round(&entity.id).await.unwrap();

        let result = store
            .commit_transition(
                &StateId::new("DRE_A_VALIDAR"),
                make_record(&entity, "DRE_A_VALIDAR", "DRE_PEDIU_ESCOLA_REVISAR"),
                Some(CorrectionHook::Opens),
            )
            .await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));

        // The failed commit wrote nothing: no state change, no record.
        let loaded = store.get_entity(&entity.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_state, StateId::new("DRE_A_VALIDAR"));
        assert!(store.latest(&entity.id).await.unwrap().is_none());
        assert_eq!(store.rounds_for(&entity.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_transition_close_without_open_round_writes_nothing() {
        let store = InMemoryStore::new();
        let entity = make_entity("DRE_PEDIU_ESCOLA_REVISAR");
        store.create_entity(entity.clone()).await.unwrap();

        let result = store
            .commit_transition(
                &StateId::new("DRE_PEDIU_ESCOLA_REVISAR"),
                make_record(&entity, "DRE_PEDIU_ESCOLA_REVISAR", "DRE_A_VALIDAR"),
                Some(CorrectionHook::Closes(RoundOutcome::Resubmitted)),
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let loaded = store.get_entity(&entity.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_state, StateId::new("DRE_PEDIU_ESCOLA_REVISAR"));
        assert!(store.latest(&entity.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_transition_conflict_leaves_rounds_untouched() {
        let store = InMemoryStore::new();
        let entity = make_entity("DRE_A_VALIDAR");
        store.create_entity(entity.clone()).await.unwrap();

        // Stale reader: believes the entity is still in RASCUNHO.
        let result = store
            .commit_transition(
                &StateId::new("RASCUNHO"),
                make_record(&entity, "RASCUNHO", "DRE_PEDIU_ESCOLA_REVISAR"),
                Some(CorrectionHook::Opens),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        assert!(store.rounds_for(&entity.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_paging_is_restartable() {
        let store = InMemoryStore::new();
        let entity = make_entity("A");
        store.create_entity(entity.clone()).await.unwrap();
        for (from, to) in [("A", "B"), ("B", "C"), ("C", "D")] {
            store
                .commit_transition(&StateId::new(from), make_record(&entity, from, to), None)
                .await
                .unwrap();
        }

        let first = store
            .history(&entity.id, QueryWindow::page(2, 0))
            .await
            .unwrap();
        let rest = store
            .history(&entity.id, QueryWindow::page(2, 2))
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(rest.len(), 1);
        assert_eq!(first[0].to_state, StateId::new("B"));
        assert_eq!(rest[0].to_state, StateId::new("D"));
    }

    #[tokio::test]
    async fn test_latest_for_many_batches() {
        let store = InMemoryStore::new();
        let a = make_entity("A");
        let b = make_entity("A");
        let untouched = make_entity("A");
        for e in [&a, &b, &untouched] {
            store.create_entity((*e).clone()).await.unwrap();
        }
        store
            .commit_transition(&StateId::new("A"), make_record(&a, "A", "B"), None)
            .await
            .unwrap();
        store
            .commit_transition(&StateId::new("A"), make_record(&b, "A", "B"), None)
            .await
            .unwrap();
        store
            .commit_transition(&StateId::new("B"), make_record(&b, "B", "C"), None)
            .await
            .unwrap();

        let ids = vec![a.id.clone(), b.id.clone(), untouched.id.clone()];
        let latest = store.latest_for_many(&ids).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&a.id].to_state, StateId::new("B"));
        assert_eq!(latest[&b.id].to_state, StateId::new("C"));
        assert!(!latest.contains_key(&untouched.id));
    }

    #[tokio::test]
    async fn test_list_in_state() {
        let store = InMemoryStore::new();
        let a = make_entity("DRE_A_VALIDAR");
        let b = make_entity("RASCUNHO");
        store.create_entity(a.clone()).await.unwrap();
        store.create_entity(b).await.unwrap();

        let waiting = store
            .list_in_state(&VariantId::new("pedido-escola"), &StateId::new("DRE_A_VALIDAR"))
            .await
            .unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, a.id);
    }

    #[tokio::test]
    async fn test_round_at_most_one_open() {
        let store = InMemoryStore::new();
        let id = EntityId::new("pedido-1");

        let round = store.open_round(&id).await.unwrap();
        assert!(round.is_open());

        let result = store.open_round(&id).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));

        let closed = store
            .close_round(&id, RoundOutcome::Resubmitted)
            .await
            .unwrap();
        assert!(!closed.is_open());

        // A new cycle may begin once the previous one is closed.
        store.open_round(&id).await.unwrap();
        assert_eq!(store.rounds_for(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_close_round_without_open_fails() {
        let store = InMemoryStore::new();
        let result = store
            .close_round(&EntityId::new("pedido-1"), RoundOutcome::Escalated)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lease_mutual_exclusion_and_expiry() {
        let store = InMemoryStore::new();
        let key = "scan:pedido-escola:DRE_A_VALIDAR:cancelamento_automatico";

        assert!(store
            .acquire_lease(key, "scanner-1", Duration::minutes(5))
            .await
            .unwrap());
        assert!(!store
            .acquire_lease(key, "scanner-2", Duration::minutes(5))
            .await
            .unwrap());
        // Same holder may refresh its own lease.
        assert!(store
            .acquire_lease(key, "scanner-1", Duration::minutes(5))
            .await
            .unwrap());

        store.release_lease(key, "scanner-1").await.unwrap();
        assert!(store
            .acquire_lease(key, "scanner-2", Duration::minutes(5))
            .await
            .unwrap());

        // Expired leases are reclaimable.
        store.release_lease(key, "scanner-2").await.unwrap();
        assert!(store
            .acquire_lease(key, "scanner-3", Duration::seconds(-1))
            .await
            .unwrap());
        assert!(store
            .acquire_lease(key, "scanner-4", Duration::minutes(5))
            .await
            .unwrap());
    }
}
