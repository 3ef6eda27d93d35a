//! Side-effect seam.
//!
//! Transitions declare an ordered list of effect ids; the surrounding
//! application implements them (notification fan-out, document
//! generation, read-model refresh…) and registers them here. The engine
//! only sequences the calls: a failing effect aborts the transition
//! before anything is committed, surfaced as `EffectFailed`. No implicit
//! retries. Effects should therefore be idempotent or defer real work
//! until after `apply` returns.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tramita_types::{Actor, EffectId, EntityRecord, TransitionDef, TransitionPayload};

/// Everything an effect may look at. Effects never mutate workflow
/// state; they observe the transition being applied.
#[derive(Clone, Debug)]
pub struct EffectContext<'a> {
    pub entity: &'a EntityRecord,
    pub transition: &'a TransitionDef,
    pub actor: &'a Actor,
    pub payload: &'a TransitionPayload,
}

/// Boxed error type for effect implementations.
pub type EffectError = Box<dyn std::error::Error + Send + Sync>;

/// One application-owned side effect.
#[async_trait]
pub trait SideEffect: Send + Sync {
    async fn invoke(&self, ctx: EffectContext<'_>) -> Result<(), EffectError>;
}

/// Registry mapping declared effect ids to implementations.
#[derive(Default, Clone)]
pub struct EffectRegistry {
    effects: HashMap<EffectId, Arc<dyn SideEffect>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: impl Into<String>, effect: Arc<dyn SideEffect>) -> Self {
        self.effects.insert(EffectId::new(id), effect);
        self
    }

    pub fn get(&self, id: &EffectId) -> Option<&Arc<dyn SideEffect>> {
        self.effects.get(id)
    }

    pub fn contains(&self, id: &EffectId) -> bool {
        self.effects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
