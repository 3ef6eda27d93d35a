//! Supply logistics workflows.
//!
//! Shipment requests travel between the central logistics office (DILOG)
//! and the contracted distributor; each shipment fans out into delivery
//! slips the receiving school checks off. Change requests raised by the
//! distributor get their own tiny accept/deny machine.

use crate::roles;
use tramita_types::{TransitionDef, VariantDefinition};

/// Shipment request: DILOG sends, the distributor confirms or asks for
/// changes, cancellation may need the distributor's confirmation.
pub fn solicitacao_remessa() -> VariantDefinition {
    VariantDefinition::new("solicitacao-remessa")
        .with_description("Solicitação de remessa de insumos")
        .state("AGUARDANDO_ENVIO", "Aguardando envio")
        .state("DILOG_ENVIA", "Enviada")
        .state("AGUARDANDO_CANCELAMENTO", "Aguardando cancelamento")
        .state("CANCELADA", "Cancelada")
        .state("DISTRIBUIDOR_CONFIRMA", "Confirmada")
        .state("DISTRIBUIDOR_SOLICITA_ALTERACAO", "Em análise")
        .state("DILOG_ACEITA_ALTERACAO", "Alterada")
        .initial("AGUARDANDO_ENVIO")
        .transition(
            TransitionDef::new("inicia_fluxo", ["AGUARDANDO_ENVIO"], "DILOG_ENVIA")
                .role(roles::DILOG)
                .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new("empresa_atende", ["DILOG_ENVIA"], "DISTRIBUIDOR_CONFIRMA")
                .role(roles::DISTRIBUIDOR),
        )
        .transition(
            TransitionDef::new(
                "solicita_alteracao",
                ["DILOG_ENVIA"],
                "DISTRIBUIDOR_SOLICITA_ALTERACAO",
            )
            .role(roles::DISTRIBUIDOR)
            .effect("notifica_dilog"),
        )
        .transition(
            TransitionDef::new(
                "cancela_solicitacao",
                [
                    "AGUARDANDO_ENVIO",
                    "DILOG_ENVIA",
                    "DILOG_ACEITA_ALTERACAO",
                ],
                "CANCELADA",
            )
            .role(roles::DILOG)
            .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new(
                "dilog_aceita_alteracao",
                ["DISTRIBUIDOR_SOLICITA_ALTERACAO"],
                "DILOG_ACEITA_ALTERACAO",
            )
            .role(roles::DILOG)
            .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new(
                "dilog_nega_alteracao",
                ["DISTRIBUIDOR_SOLICITA_ALTERACAO"],
                "DILOG_ENVIA",
            )
            .role(roles::DILOG)
            .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new(
                "aguarda_confirmacao_de_cancelamento",
                ["DISTRIBUIDOR_CONFIRMA", "DISTRIBUIDOR_SOLICITA_ALTERACAO"],
                "AGUARDANDO_CANCELAMENTO",
            )
            .role(roles::DILOG)
            .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new(
                "distribuidor_confirma_cancelamento",
                ["AGUARDANDO_CANCELAMENTO"],
                "CANCELADA",
            )
            .role(roles::DISTRIBUIDOR)
            .effect("notifica_dilog"),
        )
}

/// Distributor-raised change request against a sent shipment.
pub fn solicitacao_alteracao_remessa() -> VariantDefinition {
    VariantDefinition::new("solicitacao-alteracao-remessa")
        .with_description("Solicitação de alteração de remessa")
        .state("EM_ANALISE", "Em análise")
        .state("ACEITA", "Aceita")
        .state("NEGADA", "Negada")
        .initial("EM_ANALISE")
        .transition(
            TransitionDef::new("dilog_aceita", ["EM_ANALISE"], "ACEITA")
                .role(roles::DILOG)
                .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new("dilog_nega", ["EM_ANALISE"], "NEGADA")
                .role(roles::DILOG)
                .effect("notifica_distribuidor"),
        )
}

/// Delivery slip: confirmed by the distributor, then checked off by the
/// receiving school. Receipt outcomes can be revised until the
/// reposition loop settles; only cancellation is final.
pub fn guia_remessa() -> VariantDefinition {
    const CONFERENCIA_SOURCES: [&str; 7] = [
        "PENDENTE_DE_CONFERENCIA",
        "DISTRIBUIDOR_REGISTRA_INSUCESSO",
        "NAO_RECEBIDA",
        "RECEBIMENTO_PARCIAL",
        "RECEBIDA",
        "REPOSICAO_PARCIAL",
        "REPOSICAO_TOTAL",
    ];
    const REPOSICAO_SOURCES: [&str; 4] = [
        "NAO_RECEBIDA",
        "RECEBIMENTO_PARCIAL",
        "REPOSICAO_PARCIAL",
        "REPOSICAO_TOTAL",
    ];

    VariantDefinition::new("guia-remessa")
        .with_description("Guia de remessa de insumos")
        .state("AGUARDANDO_ENVIO", "Aguardando envio")
        .state("AGUARDANDO_CONFIRMACAO", "Aguardando confirmação")
        .state("PENDENTE_DE_CONFERENCIA", "Pendente de conferência")
        .state("DISTRIBUIDOR_REGISTRA_INSUCESSO", "Insucesso de entrega")
        .state("RECEBIDA", "Recebida")
        .state("NAO_RECEBIDA", "Não recebida")
        .state("RECEBIMENTO_PARCIAL", "Recebimento parcial")
        .state("REPOSICAO_TOTAL", "Reposição total")
        .state("REPOSICAO_PARCIAL", "Reposição parcial")
        .state("CANCELADA", "Cancelada")
        .initial("AGUARDANDO_ENVIO")
        .transition(
            TransitionDef::new(
                "dilog_envia_guia",
                ["AGUARDANDO_ENVIO"],
                "AGUARDANDO_CONFIRMACAO",
            )
            .role(roles::DILOG)
            .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new(
                "distribuidor_confirma_guia",
                ["AGUARDANDO_CONFIRMACAO"],
                "PENDENTE_DE_CONFERENCIA",
            )
            .role(roles::DISTRIBUIDOR)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new(
                "distribuidor_registra_insucesso",
                ["PENDENTE_DE_CONFERENCIA"],
                "DISTRIBUIDOR_REGISTRA_INSUCESSO",
            )
            .role(roles::DISTRIBUIDOR)
            .effect("notifica_escola"),
        )
        .transition(
            TransitionDef::new("escola_recebe", CONFERENCIA_SOURCES, "RECEBIDA")
                .role(roles::ESCOLA),
        )
        .transition(
            TransitionDef::new("escola_nao_recebe", CONFERENCIA_SOURCES, "NAO_RECEBIDA")
                .role(roles::ESCOLA)
                .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new(
                "escola_recebe_parcial",
                CONFERENCIA_SOURCES,
                "RECEBIMENTO_PARCIAL",
            )
            .role(roles::ESCOLA)
            .effect("notifica_distribuidor"),
        )
        .transition(
            TransitionDef::new("reposicao_parcial", REPOSICAO_SOURCES, "REPOSICAO_PARCIAL")
                .role(roles::DISTRIBUIDOR),
        )
        .transition(
            TransitionDef::new("reposicao_total", REPOSICAO_SOURCES, "REPOSICAO_TOTAL")
                .role(roles::DISTRIBUIDOR),
        )
        .transition(
            TransitionDef::new(
                "cancela_guia",
                [
                    "AGUARDANDO_ENVIO",
                    "AGUARDANDO_CONFIRMACAO",
                    "PENDENTE_DE_CONFERENCIA",
                ],
                "CANCELADA",
            )
            .role(roles::DILOG)
            .effect("notifica_distribuidor"),
        )
}
