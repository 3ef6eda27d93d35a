//! Special-diet authorization workflow.
//!
//! A school requests a special diet for a student; CODAE authorizes or
//! denies; the contracted supplier acknowledges. An authorized diet can
//! later be inactivated through its own request/decision loop, cancelled
//! when the student moves or leaves the network, or terminated by the
//! scheduler when its end date passes.

use crate::roles;
use tramita_types::{TransitionDef, VariantDefinition};

pub fn dieta_especial() -> VariantDefinition {
    VariantDefinition::new("dieta-especial")
        .with_description("Dieta especial partindo da escola")
        .state("RASCUNHO", "Rascunho")
        .state("CODAE_A_AUTORIZAR", "CODAE a autorizar")
        .state("CODAE_NEGOU_PEDIDO", "CODAE negou a solicitação")
        .state("CODAE_AUTORIZADO", "CODAE autorizou")
        .state("TERCEIRIZADA_TOMOU_CIENCIA", "Terceirizada toma ciência")
        .state("ESCOLA_CANCELOU", "Escola cancelou")
        .state("CODAE_NEGOU_CANCELAMENTO", "CODAE negou o cancelamento")
        .state("ESCOLA_SOLICITOU_INATIVACAO", "Escola solicitou cancelamento")
        .state("CODAE_NEGOU_INATIVACAO", "CODAE negou a inativação")
        .state("CODAE_AUTORIZOU_INATIVACAO", "CODAE autorizou o cancelamento")
        .state(
            "TERCEIRIZADA_TOMOU_CIENCIA_INATIVACAO",
            "Terceirizada tomou ciência do cancelamento",
        )
        .state(
            "TERMINADA_AUTOMATICAMENTE_SISTEMA",
            "Data de término atingida",
        )
        .state(
            "CANCELADO_ALUNO_MUDOU_ESCOLA",
            "Cancelamento por alteração de unidade educacional",
        )
        .state(
            "CANCELADO_ALUNO_NAO_PERTENCE_REDE",
            "Cancelamento para aluno não matriculado na rede municipal",
        )
        .initial("RASCUNHO")
        .transition(
            TransitionDef::new("inicia_fluxo", ["RASCUNHO"], "CODAE_A_AUTORIZAR")
                .role(roles::ESCOLA)
                .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new("codae_nega", ["CODAE_A_AUTORIZAR"], "CODAE_NEGOU_PEDIDO")
                .role(roles::CODAE)
                .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "codae_autoriza",
                ["RASCUNHO", "CODAE_A_AUTORIZAR"],
                "CODAE_AUTORIZADO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola")
            .effect("notifica_terceirizada"),
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
                "cancelar_pedido",
                [
                    "CODAE_A_AUTORIZAR",
                    "ESCOLA_SOLICITOU_INATIVACAO",
                    "CODAE_AUTORIZADO",
                ],
                "ESCOLA_CANCELOU",
            )
            .role(roles::ESCOLA)
            .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new(
                "negar_cancelamento_pedido",
                ["CODAE_A_AUTORIZAR", "ESCOLA_SOLICITOU_INATIVACAO"],
                "CODAE_NEGOU_CANCELAMENTO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "inicia_fluxo_inativacao",
                ["CODAE_AUTORIZADO", "TERCEIRIZADA_TOMOU_CIENCIA"],
                "ESCOLA_SOLICITOU_INATIVACAO",
            )
            .role(roles::ESCOLA)
            .effect("notifica_codae"),
        )
        .transition(
            TransitionDef::new(
                "codae_nega_inativacao",
                ["ESCOLA_SOLICITOU_INATIVACAO"],
                "CODAE_NEGOU_INATIVACAO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "codae_autoriza_inativacao",
                ["ESCOLA_SOLICITOU_INATIVACAO"],
                "CODAE_AUTORIZOU_INATIVACAO",
            )
            .role(roles::CODAE)
            .effect("notifica_escola")
            .effect("notifica_terceirizada"),
        )
        .transition(
            TransitionDef::new(
                "terceirizada_toma_ciencia_inativacao",
                ["CODAE_AUTORIZOU_INATIVACAO"],
                "TERCEIRIZADA_TOMOU_CIENCIA_INATIVACAO",
            )
            .role(roles::TERCEIRIZADA),
        )
        .transition(
            TransitionDef::new(
                "cancelar_aluno_mudou_escola",
                ["CODAE_AUTORIZADO", "TERCEIRIZADA_TOMOU_CIENCIA"],
                "CANCELADO_ALUNO_MUDOU_ESCOLA",
            )
            .role(roles::CODAE)
            .role(roles::SISTEMA),
        )
        .transition(
            TransitionDef::new(
                "cancelar_aluno_nao_pertence_rede",
                ["CODAE_AUTORIZADO", "TERCEIRIZADA_TOMOU_CIENCIA"],
                "CANCELADO_ALUNO_NAO_PERTENCE_REDE",
            )
            .role(roles::CODAE)
            .role(roles::SISTEMA),
        )
        .transition(
            TransitionDef::new(
                "termina_automaticamente",
                ["CODAE_AUTORIZADO", "TERCEIRIZADA_TOMOU_CIENCIA"],
                "TERMINADA_AUTOMATICAMENTE_SISTEMA",
            )
            .role(roles::SISTEMA)
            .effect("notifica_escola"),
        )
}
