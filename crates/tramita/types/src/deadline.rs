//! Deadline rules for the scanner.
//!
//! A rule watches one state of one variant and names the transition the
//! scanner drives when an entity overstays. Several rules may watch the
//! same state with different deadlines.

use crate::{StateId, TransitionId, VariantId};
use serde::{Deserialize, Serialize};

/// How long an entity may stay in the watched state.
///
/// Business days follow the original administration calendars: weekends
/// and configured holidays do not count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deadline {
    BusinessDays(u32),
    Hours(u32),
}

/// Drives entities overdue in `watched_state` through `target_transition`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineRule {
    pub variant: VariantId,
    pub watched_state: StateId,
    pub deadline: Deadline,
    pub target_transition: TransitionId,
}

impl DeadlineRule {
    pub fn new(
        variant: impl Into<String>,
        watched_state: impl Into<String>,
        deadline: Deadline,
        target_transition: impl Into<String>,
    ) -> Self {
        Self {
            variant: VariantId::new(variant),
            watched_state: StateId::new(watched_state),
            deadline,
            target_transition: TransitionId::new(target_transition),
        }
    }

    /// Key under which the scanner leases this rule. One lease per
    /// (variant, state, transition) triple: two rules with different
    /// deadlines on the same state still scan independently.
    pub fn lease_key(&self) -> String {
        format!(
            "scan:{}:{}:{}",
            self.variant, self.watched_state, self.target_transition
        )
    }
}
