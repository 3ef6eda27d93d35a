//! Built-in workflow catalog.
//!
//! The production approval state machines of the school meals
//! administration, expressed with the `tramita-types` definition
//! builder. State and transition ids are the persisted production ids:
//! audit records refer to them, so they are never renamed, only
//! deprecated alongside their variant.
//!
//! Each builder returns a definition that passes
//! [`VariantDefinition::validate`]; [`register_all`] loads the whole
//! catalog into a registry at startup.

#![deny(unsafe_code)]

pub mod dieta;
pub mod medicao;
pub mod pedido;
pub mod produto;
pub mod remessa;
pub mod roles;

pub use dieta::dieta_especial;
pub use medicao::medicao_inicial;
pub use pedido::{informativo_escola, pedido_dre, pedido_escola};
pub use produto::{cadastro_produto, homologacao_produto, reclamacao_produto};
pub use remessa::{guia_remessa, solicitacao_alteracao_remessa, solicitacao_remessa};

use tramita_engine::VariantRegistry;
use tramita_types::{DefinitionResult, VariantDefinition};

/// Every built-in definition, in registration order.
pub fn catalog() -> Vec<VariantDefinition> {
    vec![
        pedido_escola(),
        pedido_dre(),
        informativo_escola(),
        dieta_especial(),
        homologacao_produto(),
        reclamacao_produto(),
        cadastro_produto(),
        solicitacao_remessa(),
        solicitacao_alteracao_remessa(),
        guia_remessa(),
        medicao_inicial(),
    ]
}

/// Register the whole catalog. Fails on the first invalid or duplicate
/// definition, which in practice means a programming error in this crate.
pub fn register_all(registry: &VariantRegistry) -> DefinitionResult<()> {
    registry.register_all(catalog())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_definition_validates() {
        for def in catalog() {
            def.validate()
                .unwrap_or_else(|e| panic!("{} failed validation: {e}", def.id));
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let defs = catalog();
        let ids: HashSet<_> = defs.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids.len(), defs.len());
    }

    #[test]
    fn test_register_all() {
        let registry = VariantRegistry::new();
        register_all(&registry).unwrap();
        assert_eq!(registry.count(), catalog().len());
    }

    #[test]
    fn test_every_transition_names_at_least_one_role() {
        for def in catalog() {
            for transition in &def.transitions {
                assert!(
                    !transition.allowed_roles.is_empty(),
                    "{}/{} has no allowed roles",
                    def.id,
                    transition.id
                );
            }
        }
    }
}
