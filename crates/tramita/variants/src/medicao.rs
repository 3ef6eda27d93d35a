//! Monthly measurement report workflow.
//!
//! The school (UE) fills in and sends the report, the DRE reviews with a
//! bounded correction loop, then CODAE gives the final approval with its
//! own correction loop. Compared to the production machine the
//! re-request self-loops are folded away: a reviewer sends the report
//! back once per round, and the round must be closed by a correction
//! before it can be sent back again.

use crate::roles;
use tramita_types::{RoundOutcome, TransitionDef, VariantDefinition};

pub fn medicao_inicial() -> VariantDefinition {
    VariantDefinition::new("medicao-inicial")
        .with_description("Solicitação de medição inicial")
        .state(
            "MEDICAO_EM_ABERTO_PARA_PREENCHIMENTO_UE",
            "Em aberto para preenchimento pela UE",
        )
        .state("MEDICAO_ENVIADA_PELA_UE", "Enviado pela UE")
        .state("MEDICAO_CORRECAO_SOLICITADA", "Correção solicitada DRE")
        .state(
            "MEDICAO_CORRECAO_SOLICITADA_CODAE",
            "Correção solicitada CODAE",
        )
        .state("MEDICAO_CORRIGIDA_PELA_UE", "Corrigido para DRE")
        .state("MEDICAO_CORRIGIDA_PARA_CODAE", "Corrigido para CODAE")
        .state("MEDICAO_APROVADA_PELA_DRE", "Aprovado pela DRE")
        .state("MEDICAO_APROVADA_PELA_CODAE", "Aprovado por CODAE")
        .initial("MEDICAO_EM_ABERTO_PARA_PREENCHIMENTO_UE")
        .transition(
            TransitionDef::new(
                "ue_envia",
                ["MEDICAO_EM_ABERTO_PARA_PREENCHIMENTO_UE"],
                "MEDICAO_ENVIADA_PELA_UE",
            )
            .role(roles::ESCOLA)
            .effect("notifica_dre"),
        )
        .transition(
            TransitionDef::new(
                "dre_pede_correcao",
                ["MEDICAO_ENVIADA_PELA_UE", "MEDICAO_CORRIGIDA_PELA_UE"],
                "MEDICAO_CORRECAO_SOLICITADA",
            )
            .role(roles::DRE)
            .effect("notifica_escola")
            .opens_round(),
        )
        .transition(
            TransitionDef::new(
                "ue_corrige",
                ["MEDICAO_CORRECAO_SOLICITADA"],
                "MEDICAO_CORRIGIDA_PELA_UE",
            )
            .role(roles::ESCOLA)
            .closes_round(RoundOutcome::Resubmitted),
        )
        .transition(
            TransitionDef::new(
                "dre_aprova",
                ["MEDICAO_ENVIADA_PELA_UE", "MEDICAO_CORRIGIDA_PELA_UE"],
                "MEDICAO_APROVADA_PELA_DRE",
            )
            .role(roles::DRE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "codae_pede_correcao_medicao",
                ["MEDICAO_APROVADA_PELA_DRE", "MEDICAO_CORRIGIDA_PARA_CODAE"],
                "MEDICAO_CORRECAO_SOLICITADA_CODAE",
            )
            .role(roles::CODAE)
            .effect("notifica_escola")
            .opens_round(),
        )
        .transition(
            TransitionDef::new(
                "ue_corrige_medicao_para_codae",
                ["MEDICAO_CORRECAO_SOLICITADA_CODAE"],
                "MEDICAO_CORRIGIDA_PARA_CODAE",
            )
            .role(roles::ESCOLA)
            .closes_round(RoundOutcome::Resubmitted),
        )
        .transition(
            TransitionDef::new(
                "codae_aprova_medicao",
                ["MEDICAO_APROVADA_PELA_DRE", "MEDICAO_CORRIGIDA_PARA_CODAE"],
                "MEDICAO_APROVADA_PELA_CODAE",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramita_types::StateId;

    #[test]
    fn test_medicao_is_valid() {
        let def = medicao_inicial();
        def.validate().unwrap();
        assert_eq!(
            def.terminal_states(),
            vec![&StateId::new("MEDICAO_APROVADA_PELA_CODAE")]
        );
    }

    #[test]
    fn test_both_correction_loops_carry_hooks() {
        let def = medicao_inicial();
        for id in [
            "dre_pede_correcao",
            "ue_corrige",
            "codae_pede_correcao_medicao",
            "ue_corrige_medicao_para_codae",
        ] {
            assert!(
                def.get_transition(&id.into()).unwrap().correction.is_some(),
                "{id} should carry a correction hook"
            );
        }
    }
}
