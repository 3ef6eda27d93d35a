//! Deadline scanner.
//!
//! Periodically sweeps entities sitting in a watched state past a
//! configured deadline and fires the rule's transition as the system
//! actor, through the same [`crate::TransitionEngine::apply`] path as
//! interactive callers. A per-rule lease keeps concurrent scanner
//! replicas from double-firing; an entity that raced out of the state
//! between listing and applying fails its individual apply and the
//! sweep moves on.

use crate::calendar::BusinessCalendar;
use crate::engine::TransitionEngine;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tramita_store::{EntityStore, LeaseStore, QueryWindow, TramitaStore};
use tramita_types::{
    Actor, DeadlineRule, EntityId, EntityRecord, TramitaResult, TransitionError, TransitionPayload,
};

/// Default lease ttl: generously longer than a sweep, short enough that
/// a crashed holder does not block the rule for long.
const DEFAULT_LEASE_TTL_SECS: i64 = 300;

/// Outcome of one sweep of one rule.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Entities found past their deadline.
    pub attempted: usize,
    /// Transitions applied.
    pub succeeded: usize,
    /// Entities whose apply failed, with the per-entity error.
    pub failed: Vec<(EntityId, TransitionError)>,
    /// True when another scanner held the rule's lease and nothing ran.
    pub skipped: bool,
}

impl ScanReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Sweeps deadline rules against the store and fires overdue transitions.
pub struct DeadlineScanner {
    engine: TransitionEngine,
    store: Arc<dyn TramitaStore>,
    calendar: Arc<dyn BusinessCalendar>,
    holder: String,
    lease_ttl: Duration,
}

impl DeadlineScanner {
    pub fn new<S: TramitaStore + 'static>(
        engine: TransitionEngine,
        store: Arc<S>,
        calendar: Arc<dyn BusinessCalendar>,
        holder: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            store,
            calendar,
            holder: holder.into(),
            lease_ttl: Duration::seconds(DEFAULT_LEASE_TTL_SECS),
        }
    }

    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.lease_ttl = ttl;
        self
    }

    /// Sweep every rule, in order. A skipped rule (lease held elsewhere)
    /// does not stop the others.
    pub async fn scan_all(&self, rules: &[DeadlineRule]) -> TramitaResult<Vec<ScanReport>> {
        let mut reports = Vec::with_capacity(rules.len());
        for rule in rules {
            reports.push(self.scan(rule).await?);
        }
        Ok(reports)
    }

    /// Sweep one rule: list entities in the watched state, work out when
    /// each entered it from its latest audit record, and fire the rule's
    /// transition on every entity past its deadline.
    pub async fn scan(&self, rule: &DeadlineRule) -> TramitaResult<ScanReport> {
        let key = rule.lease_key();
        let acquired = self
            .store
            .acquire_lease(&key, &self.holder, self.lease_ttl)
            .await
            .map_err(|e| TransitionError::Store(e.to_string()))?;
        if !acquired {
            tracing::debug!(lease = %key, "lease held elsewhere, skipping sweep");
            return Ok(ScanReport::skipped());
        }

        let result = self.sweep(rule).await;

        // Best effort: an expired lease releases itself anyway.
        if let Err(err) = self.store.release_lease(&key, &self.holder).await {
            tracing::warn!(lease = %key, error = %err, "failed to release scan lease");
        }
        result
    }

    async fn sweep(&self, rule: &DeadlineRule) -> TramitaResult<ScanReport> {
        let entities = self
            .store
            .list_in_state(&rule.variant, &rule.watched_state)
            .await
            .map_err(|e| TransitionError::Store(e.to_string()))?;

        let ids: Vec<EntityId> = entities.iter().map(|e| e.id.clone()).collect();
        let latest = self.engine.latest_for_many(&ids).await?;

        let now = Utc::now();
        let mut report = ScanReport::default();
        for entity in &entities {
            // An entity with no audit record yet has sat in the initial
            // state since creation.
            let entered_at = latest
                .get(&entity.id)
                .map(|record| record.timestamp)
                .unwrap_or(entity.created_at);
            if now < self.calendar.due_after(entered_at, rule.deadline) {
                continue;
            }

            report.attempted += 1;
            match self.fire(rule, entity).await {
                Ok(()) => {
                    tracing::debug!(
                        entity = %entity.id.short(),
                        transition = %rule.target_transition,
                        "deadline transition applied"
                    );
                    report.succeeded += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        entity_id = %entity.id,
                        transition = %rule.target_transition,
                        error = %err,
                        "deadline transition failed"
                    );
                    report.failed.push((entity.id.clone(), err));
                }
            }
        }

        tracing::info!(
            variant = %rule.variant,
            state = %rule.watched_state,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "deadline sweep finished"
        );
        Ok(report)
    }

    async fn fire(&self, rule: &DeadlineRule, entity: &EntityRecord) -> TramitaResult<()> {
        self.engine
            .apply(
                &entity.id,
                &rule.target_transition,
                &Actor::system(),
                TransitionPayload::new().with_justification("prazo vencido"),
            )
            .await?;
        Ok(())
    }

    /// Per-entity audit history, exposed for operators inspecting a sweep.
    pub async fn history(
        &self,
        entity_id: &EntityId,
        window: QueryWindow,
    ) -> TramitaResult<Vec<tramita_types::TransitionRecord>> {
        self.engine.history(entity_id, window).await
    }
}
