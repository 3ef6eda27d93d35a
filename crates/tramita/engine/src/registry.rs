//! Variant registry: stores validated variant definitions.
//!
//! Definitions are registered once per process start and immutable
//! thereafter. There is no versioning: recorded state and transition
//! names must stay stable for the audit log, so catalogs evolve by
//! adding, never by renaming.

use std::collections::HashMap;
use std::sync::RwLock;
use tramita_types::{
    DefinitionError, DefinitionResult, TransitionError, VariantDefinition, VariantId,
};

/// Registry of variant definitions.
#[derive(Default)]
pub struct VariantRegistry {
    definitions: RwLock<HashMap<VariantId, VariantDefinition>>,
}

impl VariantRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant definition.
    ///
    /// Validates the definition before storing. Re-registering an id is
    /// a configuration error.
    pub fn register(&self, definition: VariantDefinition) -> DefinitionResult<VariantId> {
        definition.validate()?;

        let id = definition.id.clone();
        let mut guard = self
            .definitions
            .write()
            .map_err(|_| DefinitionError::Invalid("registry lock poisoned".into()))?;
        if guard.contains_key(&id) {
            return Err(DefinitionError::Invalid(format!(
                "variant '{id}' is already registered"
            )));
        }
        guard.insert(id.clone(), definition);

        tracing::info!(variant = %id, "variant registered");
        Ok(id)
    }

    /// Register several definitions, stopping at the first invalid one.
    pub fn register_all(
        &self,
        definitions: impl IntoIterator<Item = VariantDefinition>,
    ) -> DefinitionResult<Vec<VariantId>> {
        definitions.into_iter().map(|d| self.register(d)).collect()
    }

    /// Get a definition by id. Clones: definitions are small and
    /// immutable, and callers must not hold the registry lock across
    /// await points.
    pub fn get(&self, id: &VariantId) -> Result<VariantDefinition, TransitionError> {
        let guard = self
            .definitions
            .read()
            .map_err(|_| TransitionError::Store("registry lock poisoned".into()))?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| TransitionError::UnknownVariant(id.clone()))
    }

    pub fn contains(&self, id: &VariantId) -> bool {
        self.definitions
            .read()
            .map(|g| g.contains_key(id))
            .unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.definitions.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Ids of all registered variants.
    pub fn variant_ids(&self) -> Vec<VariantId> {
        self.definitions
            .read()
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default()
    }
}
