//! Meal request workflows.
//!
//! Three related machines: requests initiated by a school, requests
//! initiated by a regional office (DRE), and the lighter informational
//! notice a school files without needing approval. State and transition
//! ids are the production ids and must never be renamed: persisted audit
//! records refer to them.

use crate::roles;
use tramita_types::{RoundOutcome, TransitionDef, VariantDefinition};

/// School-initiated meal request.
///
/// The school drafts and submits, the DRE validates (possibly sending
/// the request back in a correction round), then CODAE authorizes or
/// denies, optionally questioning the contracted supplier first. The
/// scanner cancels requests the DRE or CODAE sat on past the deadline.
pub fn pedido_escola() -> VariantDefinition {
    VariantDefinition::new("pedido-escola")
        .with_description("Solicitação de alimentação partindo da escola")
        .state("RASCUNHO", "Rascunho")
        .state("DRE_A_VALIDAR", "DRE a validar")
        .state("DRE_VALIDADO", "DRE validado")
        .state("DRE_PEDIU_ESCOLA_REVISAR", "Escola tem que revisar o pedido")
        .state(
            "DRE_NAO_VALIDOU_PEDIDO_ESCOLA",
            "DRE não validou pedido da escola",
        )
        .state("CODAE_AUTORIZADO", "CODAE autorizou pedido")
        .state(
            "CODAE_QUESTIONADO",
            "CODAE questionou terceirizada se é possível atender a solicitação",
        )
        .state("CODAE_NEGOU_PEDIDO", "CODAE negou pedido")
        .state(
            "TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO",
            "Terceirizada respondeu se é possível atender a solicitação",
        )
        .state("TERCEIRIZADA_TOMOU_CIENCIA", "Terceirizada tomou ciência")
        .state("ESCOLA_CANCELOU", "Escola cancelou")
        .state("CANCELADO_AUTOMATICAMENTE", "Cancelamento automático")
        .initial("RASCUNHO")
        .transition(
            TransitionDef::new("inicia_fluxo", ["RASCUNHO"], "DRE_A_VALIDAR")
                .role(roles::ESCOLA)
                .effect("notifica_dre"),
        )
        .transition(
            TransitionDef::new("dre_valida", ["DRE_A_VALIDAR"], "DRE_VALIDADO").role(roles::DRE),
        )
        .transition(
            TransitionDef::new(
                "dre_pede_revisao",
                ["DRE_A_VALIDAR"],
                "DRE_PEDIU_ESCOLA_REVISAR",
            )
            .role(roles::DRE)
            .effect("notifica_escola")
            .opens_round(),
        )
        .transition(
            TransitionDef::new(
                "dre_nao_valida",
                ["DRE_A_VALIDAR"],
                "DRE_NAO_VALIDOU_PEDIDO_ESCOLA",
            )
            .role(roles::DRE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "escola_revisa",
                ["DRE_PEDIU_ESCOLA_REVISAR"],
                "DRE_A_VALIDAR",
            )
            .role(roles::ESCOLA)
            .closes_round(RoundOutcome::Resubmitted),
        )
        .transition(
            TransitionDef::new("codae_autoriza", ["DRE_VALIDADO"], "CODAE_AUTORIZADO")
                .role(roles::CODAE)
                .effect("notifica_escola")
                .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new("codae_questiona", ["DRE_VALIDADO"], "CODAE_QUESTIONADO")
                .role(roles::CODAE)
                .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_autoriza_questionamento",
                ["DRE_VALIDADO", "TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO"],
                "CODAE_AUTORIZADO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola")
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_nega_questionamento",
                ["TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO"],
                "CODAE_NEGOU_PEDIDO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "codae_nega",
                ["DRE_VALIDADO", "CODAE_QUESTIONADO"],
                "CODAE_NEGOU_PEDIDO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde_questionamento",
                ["CODAE_QUESTIONADO"],
                "TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_toma_ciencia",
                ["CODAE_AUTORIZADO"],
                "TERCEIRIZADA_TOMOU_CIENCIA",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "escola_cancela",
                ["DRE_A_VALIDAR", "DRE_VALIDADO", "CODAE_AUTORIZADO"],
                "ESCOLA_CANCELOU",
            )
            .role(roles::ESCOLA)
            .effect("notifica_dre"),
        )
        .transition(
            TransitionDef::new(
                "cancela_automaticamente",
                ["DRE_A_VALIDAR", "DRE_VALIDADO"],
                "CANCELADO_AUTOMATICAMENTE",
            )
            .role(roles::SISTEMA)
            .effect("notifica_escola"),
        )
}

/// Regional-office-initiated request: CODAE reviews directly, with its
/// own correction round back to the DRE.
pub fn pedido_dre() -> VariantDefinition {
    VariantDefinition::new("pedido-dre")
        .with_description("Solicitação de alimentação partindo da diretoria regional")
        .state("RASCUNHO", "Rascunho")
        .state("CODAE_A_AUTORIZAR", "CODAE a autorizar")
        // The revision state persists under its legacy value, which differs
        // from the name callers know it by in production.
        .state("DRE_PEDE_ESCOLA_REVISAR", "DRE tem que revisar o pedido")
        .state("CODAE_NEGOU_PEDIDO", "CODAE negou o pedido da DRE")
        .state("CODAE_AUTORIZADO", "CODAE autorizou")
        .state(
            "CODAE_QUESTIONADO",
            "CODAE questionou terceirizada se é possível atender a solicitação",
        )
        .state("TERCEIRIZADA_TOMOU_CIENCIA", "Terceirizada tomou ciência")
        .state(
            "TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO",
            "Terceirizada respondeu se é possível atender a solicitação",
        )
        .state("CANCELAMENTO_AUTOMATICO", "Cancelamento automático")
        .state("DRE_CANCELOU", "DRE cancelou")
        .initial("RASCUNHO")
        .transition(
            TransitionDef::new("inicia_fluxo", ["RASCUNHO"], "CODAE_A_AUTORIZAR")
                .role(roles::DRE)
                .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new(
                "codae_pede_revisao",
                ["CODAE_A_AUTORIZAR"],
                "DRE_PEDE_ESCOLA_REVISAR",
            )
            .role(roles::CODAE)
            .effect("notifica_dre")
            .opens_round(),
        )
        .transition(
            TransitionDef::new(
                "dre_revisa",
                ["DRE_PEDE_ESCOLA_REVISAR"],
                "CODAE_A_AUTORIZAR",
            )
            .role(roles::DRE)
            .closes_round(RoundOutcome::Resubmitted),
        )
        .transition(
            TransitionDef::new(
                "codae_nega",
                ["CODAE_A_AUTORIZAR", "CODAE_QUESTIONADO"],
                "CODAE_NEGOU_PEDIDO",
            )
            .role(roles::CODAE)
            .effect("notifica_dre"),
        )
        .transition(
            TransitionDef::new("codae_autoriza", ["CODAE_A_AUTORIZAR"], "CODAE_AUTORIZADO")
                .role(roles::CODAE)
                .effect("notifica_dre")
                .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new("codae_questiona", ["CODAE_A_AUTORIZAR"], "CODAE_QUESTIONADO")
                .role(roles::CODAE)
                .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_autoriza_questionamento",
                ["TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO"],
                "CODAE_AUTORIZADO",
            )
            .role(roles::CODAE)
            .effect("notifica_dre")
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "codae_nega_questionamento",
                ["TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO"],
                "CODAE_NEGOU_PEDIDO",
            )
            .role(roles::CODAE)
            .effect("notifica_dre"),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_toma_ciencia",
                ["CODAE_AUTORIZADO"],
                "TERCEIRIZADA_TOMOU_CIENCIA",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_responde_questionamento",
                ["CODAE_QUESTIONADO"],
                "TERCEIRIZADA_RESPONDEU_QUESTIONAMENTO",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "dre_cancela",
                ["CODAE_A_AUTORIZAR", "CODAE_AUTORIZADO"],
                "DRE_CANCELOU",
            )
            .role(roles::DRE)
            .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new(
                "cancela_automaticamente",
                ["CODAE_A_AUTORIZAR"],
                "CANCELAMENTO_AUTOMATICO",
            )
            .role(roles::SISTEMA)
            .effect("notifica_dre"),
        )
}

/// School notice: no approval, the contracted supplier just acknowledges.
pub fn informativo_escola() -> VariantDefinition {
    VariantDefinition::new("informativo-escola")
        .with_description("Informativo partindo da escola")
        .state("RASCUNHO", "Rascunho")
        .state("INFORMADO", "Informado")
        .state("TERCEIRIZADA_TOMOU_CIENCIA", "Terceirizada toma ciência")
        .state("ESCOLA_CANCELOU", "Escola cancelou")
        .initial("RASCUNHO")
        .transition(
            TransitionDef::new("informa", ["RASCUNHO"], "INFORMADO")
                .role(roles::ESCOLA)
                .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_toma_ciencia",
                ["INFORMADO"],
                "TERCEIRIZADA_TOMOU_CIENCIA",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "escola_cancela",
                ["INFORMADO", "TERCEIRIZADA_TOMOU_CIENCIA"],
                "ESCOLA_CANCELOU",
            )
            .role(roles::ESCOLA)
            .effect("notifica_terceirizada"),
        )
}
