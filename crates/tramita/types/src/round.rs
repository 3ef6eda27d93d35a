//! Correction rounds: bounded reviewer/submitter back-and-forth cycles.

use crate::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an open correction round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The submitter corrected and resubmitted the request.
    Resubmitted,
    /// The cycle was escalated past the reviewer.
    Escalated,
}

/// One reviewer/submitter cycle. At most one round is open per entity
/// at any time; the tracker enforces it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRound {
    pub entity_id: EntityId,
    pub opened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RoundOutcome>,
}

impl CorrectionRound {
    pub fn open(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            opened_at: Utc::now(),
            closed_at: None,
            outcome: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    pub fn close(&mut self, outcome: RoundOutcome) {
        self.closed_at = Some(Utc::now());
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_lifecycle() {
        let mut round = CorrectionRound::open(EntityId::new("pedido-1"));
        assert!(round.is_open());
        assert!(round.outcome.is_none());

        round.close(RoundOutcome::Resubmitted);
        assert!(!round.is_open());
        assert_eq!(round.outcome, Some(RoundOutcome::Resubmitted));
        assert!(round.closed_at.unwrap() >= round.opened_at);
    }
}
