//! Product lifecycle workflows.
//!
//! Homologation is the largest machine in the catalog: a product goes
//! through central review, optional sensory analysis, suspension and a
//! complaint-driven re-review before it can be bought. Complaints about
//! an already homologated product and registration requests from the
//! supplier run as separate, smaller machines.

use crate::roles;
use tramita_types::{RoundOutcome, TransitionDef, VariantDefinition};

/// Product homologation.
///
/// The correction round is the CODAE questioning loop: `codae_questiona`
/// opens it, the supplier's answer (or CODAE withdrawing the question)
/// closes it.
pub fn homologacao_produto() -> VariantDefinition {
    const RECLAMACAO_SOURCES: [&str; 3] = [
        "CODAE_PEDIU_ANALISE_RECLAMACAO",
        "ESCOLA_OU_NUTRICIONISTA_RECLAMOU",
        "TERCEIRIZADA_RESPONDEU_RECLAMACAO",
    ];

    VariantDefinition::new("homologacao-produto")
        .with_description("Homologação de produto")
        .state("RASCUNHO", "Rascunho")
        .state("CODAE_PENDENTE_HOMOLOGACAO", "Pendente homologação da CODAE")
        .state("CODAE_HOMOLOGADO", "CODAE homologou")
        .state("CODAE_NAO_HOMOLOGADO", "CODAE não homologou")
        .state("CODAE_QUESTIONADO", "CODAE pediu correção")
        .state("CODAE_PEDIU_ANALISE_SENSORIAL", "CODAE pediu análise sensorial")
        .state(
            "CODAE_CANCELOU_ANALISE_SENSORIAL",
            "CODAE cancelou análise sensorial",
        )
        .state("CODAE_SUSPENDEU", "CODAE suspendeu o produto")
        .state(
            "ESCOLA_OU_NUTRICIONISTA_RECLAMOU",
            "Escola/Nutricionista reclamou do produto",
        )
        .state(
            "CODAE_PEDIU_ANALISE_RECLAMACAO",
            "CODAE pediu análise da reclamação",
        )
        .state(
            "TERCEIRIZADA_RESPONDEU_RECLAMACAO",
            "Terceirizada respondeu a reclamação",
        )
        .state("CODAE_AUTORIZOU_RECLAMACAO", "CODAE autorizou reclamação")
        .state(
            "TERCEIRIZADA_CANCELOU_SOLICITACAO_HOMOLOGACAO",
            "Terceirizada cancelou solicitação de homologação de produto",
        )
        .state("INATIVA", "Homologação inativada")
        .initial("RASCUNHO")
        .transition(
            TransitionDef::new(
                "inicia_fluxo",
                [
                    "RASCUNHO",
                    "CODAE_NAO_HOMOLOGADO",
                    "CODAE_HOMOLOGADO",
                    "CODAE_SUSPENDEU",
                    "TERCEIRIZADA_CANCELOU_SOLICITACAO_HOMOLOGACAO",
                    "CODAE_AUTORIZOU_RECLAMACAO",
                    "CODAE_CANCELOU_ANALISE_SENSORIAL",
                ],
                "CODAE_PENDENTE_HOMOLOGACAO",
            )
            .role(roles::TERCEIRIZADA)
            .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new(
                "codae_homologa",
                [
                    "CODAE_PENDENTE_HOMOLOGACAO",
                    "CODAE_PEDIU_ANALISE_SENSORIAL",
                    "TERCEIRIZADA_RESPONDEU_RECLAMACAO",
                    "CODAE_SUSPENDEU",
                    "ESCOLA_OU_NUTRICIONISTA_RECLAMOU",
                    "CODAE_CANCELOU_ANALISE_SENSORIAL",
                ],
                "CODAE_HOMOLOGADO",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_nao_homologa",
                ["CODAE_PENDENTE_HOMOLOGACAO", "CODAE_PEDIU_ANALISE_SENSORIAL"],
                "CODAE_NAO_HOMOLOGADO",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_questiona",
                ["CODAE_PENDENTE_HOMOLOGACAO"],
                "CODAE_QUESTIONADO",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada")
            .opens_round(),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde_questionamento",
                ["CODAE_QUESTIONADO"],
                "CODAE_PENDENTE_HOMOLOGACAO",
            )
            .role(roles::TERCEIRIZADA)
            .closes_round(RoundOutcome::Resubmitted),
        )
        .transition(
            TransitionDef::new(
                "codae_cancela_solicitacao_correcao",
                ["CODAE_QUESTIONADO"],
                "CODAE_PENDENTE_HOMOLOGACAO",
            )
            .role(roles::CODAE)
            .closes_round(RoundOutcome::Escalated),
        )
        .transition(
            TransitionDef::new(
                "codae_pede_analise_sensorial",
                [
                    "CODAE_PENDENTE_HOMOLOGACAO",
                    "CODAE_HOMOLOGADO",
                    "ESCOLA_OU_NUTRICIONISTA_RECLAMOU",
                    "TERCEIRIZADA_RESPONDEU_RECLAMACAO",
                    "CODAE_PEDIU_ANALISE_RECLAMACAO",
                ],
                "CODAE_PEDIU_ANALISE_SENSORIAL",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_cancela_analise_sensorial",
                ["CODAE_PEDIU_ANALISE_SENSORIAL"],
                "CODAE_CANCELOU_ANALISE_SENSORIAL",
            )
            .role(roles::CODAE),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde_analise_sensorial",
                ["CODAE_PEDIU_ANALISE_SENSORIAL"],
                "CODAE_PENDENTE_HOMOLOGACAO",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "codae_suspende",
                ["CODAE_PENDENTE_HOMOLOGACAO", "CODAE_HOMOLOGADO"],
                "CODAE_SUSPENDEU",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_ativa",
                ["CODAE_SUSPENDEU", "CODAE_AUTORIZOU_RECLAMACAO"],
                "CODAE_HOMOLOGADO",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "escola_ou_nutricionista_reclamou",
                ["CODAE_HOMOLOGADO", "CODAE_CANCELOU_ANALISE_SENSORIAL"],
                "ESCOLA_OU_NUTRICIONISTA_RECLAMOU",
            )
            .role(roles::ESCOLA)
            .role(roles::NUTRICIONISTA)
            .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new(
                "codae_pediu_analise_reclamacao",
                [
                    "ESCOLA_OU_NUTRICIONISTA_RECLAMOU",
                    "TERCEIRIZADA_RESPONDEU_RECLAMACAO",
                ],
                "CODAE_PEDIU_ANALISE_RECLAMACAO",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde_reclamacao",
                ["CODAE_PEDIU_ANALISE_RECLAMACAO"],
                "TERCEIRIZADA_RESPONDEU_RECLAMACAO",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "codae_autorizou_reclamacao",
                RECLAMACAO_SOURCES,
                "CODAE_AUTORIZOU_RECLAMACAO",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_recusou_reclamacao",
                RECLAMACAO_SOURCES,
                "CODAE_HOMOLOGADO",
            )
            .role(roles::CODAE),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_cancelou_solicitacao_homologacao",
                ["CODAE_PENDENTE_HOMOLOGACAO"],
                "TERCEIRIZADA_CANCELOU_SOLICITACAO_HOMOLOGACAO",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "inativa_homologacao",
                [
                    "CODAE_SUSPENDEU",
                    "CODAE_HOMOLOGADO",
                    "CODAE_NAO_HOMOLOGADO",
                    "CODAE_AUTORIZOU_RECLAMACAO",
                    "TERCEIRIZADA_CANCELOU_SOLICITACAO_HOMOLOGACAO",
                ],
                "INATIVA",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
}

/// Complaint about a homologated product.
pub fn reclamacao_produto() -> VariantDefinition {
    const AVALIACAO_SOURCES: [&str; 5] = [
        "AGUARDANDO_AVALIACAO",
        "ANALISE_SENSORIAL_RESPONDIDA",
        "RESPONDIDO_TERCEIRIZADA",
        "RESPONDIDO_NUTRISUPERVISOR",
        "RESPONDIDO_UE",
    ];
    const DECISAO_SOURCES: [&str; 8] = [
        "AGUARDANDO_AVALIACAO",
        "AGUARDANDO_RESPOSTA_TERCEIRIZADA",
        "RESPONDIDO_TERCEIRIZADA",
        "RESPONDIDO_NUTRISUPERVISOR",
        "AGUARDANDO_ANALISE_SENSORIAL",
        "ANALISE_SENSORIAL_RESPONDIDA",
        "AGUARDANDO_RESPOSTA_UE",
        "RESPONDIDO_UE",
    ];

    VariantDefinition::new("reclamacao-produto")
        .with_description("Reclamação de produto")
        .state("AGUARDANDO_AVALIACAO", "Aguardando avaliação da CODAE")
        .state(
            "AGUARDANDO_RESPOSTA_TERCEIRIZADA",
            "Aguardando resposta da terceirizada",
        )
        .state("AGUARDANDO_RESPOSTA_UE", "Aguardando resposta da U.E")
        .state(
            "AGUARDANDO_RESPOSTA_NUTRISUPERVISOR",
            "Aguardando resposta do nutrisupervisor",
        )
        .state("AGUARDANDO_ANALISE_SENSORIAL", "Aguardando análise sensorial")
        .state("ANALISE_SENSORIAL_RESPONDIDA", "Análise sensorial respondida")
        .state("RESPONDIDO_TERCEIRIZADA", "Respondido pela terceirizada")
        .state("RESPONDIDO_UE", "Respondido pela U.E")
        .state("RESPONDIDO_NUTRISUPERVISOR", "Respondido pelo nutrisupervisor")
        .state("CODAE_ACEITOU", "CODAE aceitou")
        .state("CODAE_RECUSOU", "CODAE recusou")
        .state("CODAE_RESPONDEU", "CODAE respondeu ao reclamante")
        .initial("AGUARDANDO_AVALIACAO")
        .transition(
            TransitionDef::new(
                "codae_questiona_terceirizada",
                AVALIACAO_SOURCES,
                "AGUARDANDO_RESPOSTA_TERCEIRIZADA",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde",
                ["AGUARDANDO_RESPOSTA_TERCEIRIZADA"],
                "RESPONDIDO_TERCEIRIZADA",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "codae_questiona_ue",
                AVALIACAO_SOURCES,
                "AGUARDANDO_RESPOSTA_UE",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new("ue_responde", ["AGUARDANDO_RESPOSTA_UE"], "RESPONDIDO_UE")
                .role(roles::ESCOLA),
        )
        .transition(
            TransitionDef::new(
                "codae_questiona_nutrisupervisor",
                AVALIACAO_SOURCES,
                "AGUARDANDO_RESPOSTA_NUTRISUPERVISOR",
            )
            .role(roles::CODAE),
        )
        .transition(
            TransitionDef::new(
                "nutrisupervisor_responde",
                ["AGUARDANDO_RESPOSTA_NUTRISUPERVISOR"],
                "RESPONDIDO_NUTRISUPERVISOR",
            )
            .role(roles::NUTRICIONISTA),
        )
        .transition(
            TransitionDef::new(
                "codae_pede_analise_sensorial",
                AVALIACAO_SOURCES,
                "AGUARDANDO_ANALISE_SENSORIAL",
            )
            .role(roles::CODAE)
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_cancela_analise_sensorial",
                ["AGUARDANDO_ANALISE_SENSORIAL"],
                "AGUARDANDO_AVALIACAO",
            )
            .role(roles::CODAE),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde_analise_sensorial",
                ["AGUARDANDO_ANALISE_SENSORIAL"],
                "ANALISE_SENSORIAL_RESPONDIDA",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new("codae_aceita", DECISAO_SOURCES, "CODAE_ACEITOU")
                .role(roles::CODAE)
                .effect("notifica_escola")
                .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_recusa",
                [
                    "AGUARDANDO_AVALIACAO",
                    "AGUARDANDO_RESPOSTA_TERCEIRIZADA",
                    "RESPONDIDO_TERCEIRIZADA",
                    "RESPONDIDO_NUTRISUPERVISOR",
                    "AGUARDANDO_ANALISE_SENSORIAL",
                    "ANALISE_SENSORIAL_RESPONDIDA",
                    "AGUARDANDO_RESPOSTA_UE",
                    "AGUARDANDO_RESPOSTA_NUTRISUPERVISOR",
                    "RESPONDIDO_UE",
                ],
                "CODAE_RECUSOU",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new("codae_responde", AVALIACAO_SOURCES, "CODAE_RESPONDEU")
                .role(roles::CODAE)
                .effect("notifica_escola"),
        )
}

/// Product registration request: the supplier either fulfils it or not.
pub fn cadastro_produto() -> VariantDefinition {
    VariantDefinition::new("cadastro-produto")
        .with_description("Solicitação de cadastro de produto")
        .state("AGUARDANDO_CONFIRMACAO", "Aguardando confirmação")
        .state("CONFIRMADA", "Confirmada")
        .initial("AGUARDANDO_CONFIRMACAO")
        .transition(
            TransitionDef::new(
                "terceirizada_atende_solicitacao",
                ["AGUARDANDO_CONFIRMACAO"],
                "CONFIRMADA",
            )
            .role(roles::TERCEIRIZADA)
            .effect("notifica_codae"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramita_types::StateId;

    #[test]
    fn test_homologacao_is_valid() {
        let def = homologacao_produto();
        def.validate().unwrap();
        assert_eq!(def.terminal_states(), vec![&StateId::new("INATIVA")]);
    }

    #[test]
    fn test_homologacao_question_loop_carries_hooks() {
        let def = homologacao_produto();
        assert!(def
            .get_transition(&"codae_questiona".into())
            .unwrap()
            .correction
            .is_some());
        assert!(def
            .get_transition(&"terceirizada_responde_questionamento".into())
            .unwrap()
            .correction
            .is_some());
        assert!(def
            .get_transition(&"codae_cancela_solicitacao_correcao".into())
            .unwrap()
            .correction
            .is_some());
    }

    #[test]
    fn test_homologacao_resubmission_after_rejection() {
        let def = homologacao_produto();
        let inicia = def.get_transition(&"inicia_fluxo".into()).unwrap();
        assert!(inicia.has_source(&StateId::new("CODAE_NAO_HOMOLOGADO")));
    }

    #[test]
    fn test_reclamacao_is_valid() {
        let def = reclamacao_produto();
        def.validate().unwrap();
        for id in ["CODAE_ACEITOU", "CODAE_RECUSOU", "CODAE_RESPONDEU"] {
            assert!(def.is_terminal(&StateId::new(id)), "{id} should be terminal");
        }
    }

    #[test]
    fn test_cadastro_is_valid() {
        let def = cadastro_produto();
        def.validate().unwrap();
        assert_eq!(def.state_count(), 2);
    }
}
