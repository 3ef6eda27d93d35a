//! Variant definitions: the closed state catalog and role-gated
//! transition table of one approval process.
//!
//! A variant is declared once at process start and immutable thereafter.
//! It is a flat transition table, not a graph: each transition names the
//! set of legal source states, one target state and the roles allowed to
//! drive it. States with no outgoing transition are terminal.

use crate::{
    DefinitionError, DefinitionResult, EffectId, RoleId, RoundOutcome, StateId, TransitionId,
    VariantId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ── States ───────────────────────────────────────────────────────────

/// A named member of a variant's state set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDef {
    pub id: StateId,
    /// Human-readable caption, shown in histories and dashboards.
    pub label: String,
}

impl StateDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: StateId::new(id),
            label: label.into(),
        }
    }
}

// ── Transitions ──────────────────────────────────────────────────────

/// Interaction between a transition and the correction-cycle tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionHook {
    /// The transition opens a reviewer/submitter round. Guarded: fails
    /// when a round is already open for the entity.
    Opens,
    /// The transition closes the open round with the given outcome.
    /// Guarded: fails when no round is open.
    Closes(RoundOutcome),
}

/// A named, directed edge from a set of legal source states to one
/// target state, gated by role.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionDef {
    pub id: TransitionId,
    /// Legal source states. Must be non-empty.
    pub sources: Vec<StateId>,
    pub target: StateId,
    /// Roles allowed to drive this transition.
    pub allowed_roles: Vec<RoleId>,
    /// Declared side effects, invoked in order by the engine on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectId>,
    /// Correction-round guard/effect, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<CorrectionHook>,
}

impl TransitionDef {
    pub fn new<S, I>(id: impl Into<String>, sources: I, target: impl Into<String>) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            id: TransitionId::new(id),
            sources: sources.into_iter().map(StateId::new).collect(),
            target: StateId::new(target),
            allowed_roles: Vec::new(),
            effects: Vec::new(),
            correction: None,
        }
    }

    /// Allow a role to drive this transition.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.allowed_roles.push(RoleId::new(role));
        self
    }

    /// Declare a side effect, invoked in declaration order.
    pub fn effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(EffectId::new(effect));
        self
    }

    /// Mark this transition as opening a correction round.
    pub fn opens_round(mut self) -> Self {
        self.correction = Some(CorrectionHook::Opens);
        self
    }

    /// Mark this transition as closing the open correction round.
    pub fn closes_round(mut self, outcome: RoundOutcome) -> Self {
        self.correction = Some(CorrectionHook::Closes(outcome));
        self
    }

    pub fn allows(&self, role: &RoleId) -> bool {
        self.allowed_roles.contains(role)
    }

    pub fn has_source(&self, state: &StateId) -> bool {
        self.sources.contains(state)
    }
}

// ── Variant Definition ───────────────────────────────────────────────

/// One independently defined state machine, declared at startup and
/// immutable once registered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariantDefinition {
    pub id: VariantId,
    pub description: String,
    pub initial_state: StateId,
    pub states: Vec<StateDef>,
    pub transitions: Vec<TransitionDef>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl VariantDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: VariantId::new(id),
            description: String::new(),
            initial_state: StateId::new(""),
            states: Vec::new(),
            transitions: Vec::new(),
            created_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Declare a state.
    pub fn state(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.states.push(StateDef::new(id, label));
        self
    }

    /// Declare the initial state. Must also be declared with [`state`].
    pub fn initial(mut self, id: impl Into<String>) -> Self {
        self.initial_state = StateId::new(id);
        self
    }

    /// Declare a transition.
    pub fn transition(mut self, transition: TransitionDef) -> Self {
        self.transitions.push(transition);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn contains_state(&self, state: &StateId) -> bool {
        self.states.iter().any(|s| &s.id == state)
    }

    pub fn get_state(&self, state: &StateId) -> Option<&StateDef> {
        self.states.iter().find(|s| &s.id == state)
    }

    pub fn get_transition(&self, id: &TransitionId) -> Option<&TransitionDef> {
        self.transitions.iter().find(|t| &t.id == id)
    }

    /// Transitions legal from the given state.
    pub fn outgoing(&self, state: &StateId) -> Vec<&TransitionDef> {
        self.transitions
            .iter()
            .filter(|t| t.has_source(state))
            .collect()
    }

    /// A state is terminal when no transition leaves it.
    pub fn is_terminal(&self, state: &StateId) -> bool {
        self.contains_state(state) && self.outgoing(state).is_empty()
    }

    pub fn terminal_states(&self) -> Vec<&StateId> {
        self.states
            .iter()
            .map(|s| &s.id)
            .filter(|id| self.outgoing(id).is_empty())
            .collect()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Validate the definition for structural correctness.
    ///
    /// Checked: non-empty state set, unique state ids, unique transition
    /// ids, declared initial state, every source and target declared,
    /// non-empty source sets, at least one outgoing transition from the
    /// initial state (unless the variant is single-state), and at least
    /// one terminal state.
    pub fn validate(&self) -> DefinitionResult<()> {
        if self.states.is_empty() {
            return Err(DefinitionError::EmptyStates(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for state in &self.states {
            if !seen.insert(&state.id) {
                return Err(DefinitionError::DuplicateState {
                    variant: self.id.clone(),
                    state: state.id.clone(),
                });
            }
        }

        if !self.contains_state(&self.initial_state) {
            return Err(DefinitionError::UnknownState {
                variant: self.id.clone(),
                state: self.initial_state.clone(),
            });
        }

        let mut seen_transitions = HashSet::new();
        for transition in &self.transitions {
            if !seen_transitions.insert(&transition.id) {
                return Err(DefinitionError::DuplicateTransition {
                    variant: self.id.clone(),
                    transition: transition.id.clone(),
                });
            }
            if transition.sources.is_empty() {
                return Err(DefinitionError::EmptySources {
                    variant: self.id.clone(),
                    transition: transition.id.clone(),
                });
            }
            for source in &transition.sources {
                if !self.contains_state(source) {
                    return Err(DefinitionError::UnknownState {
                        variant: self.id.clone(),
                        state: source.clone(),
                    });
                }
            }
            if !self.contains_state(&transition.target) {
                return Err(DefinitionError::UnknownState {
                    variant: self.id.clone(),
                    state: transition.target.clone(),
                });
            }
        }

        if self.states.len() > 1 && self.outgoing(&self.initial_state).is_empty() {
            return Err(DefinitionError::DeadInitialState {
                variant: self.id.clone(),
                state: self.initial_state.clone(),
            });
        }

        if self.terminal_states().is_empty() && self.states.len() > 1 {
            return Err(DefinitionError::NoTerminalState(self.id.clone()));
        }

        Ok(())
    }
}
