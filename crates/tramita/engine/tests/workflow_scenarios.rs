//! End-to-end scenarios driving the built-in catalog through the
//! engine, the correction tracker and the deadline scanner.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use tramita_engine::{
    DeadlineScanner, EffectContext, EffectError, EffectRegistry, SideEffect, TransitionEngine,
    VariantRegistry, WeekdayCalendar,
};
use tramita_store::{InMemoryStore, QueryWindow};
use tramita_types::{
    Actor, Deadline, DeadlineRule, EntityId, RoleId, StateId, TramitaResult, TransitionError,
    TransitionId, TransitionPayload, VariantId,
};
use tramita_variants::roles;

/// Records which transition triggered each notification.
#[derive(Clone, Default)]
struct Recorder {
    fired: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SideEffect for Recorder {
    async fn invoke(&self, ctx: EffectContext<'_>) -> Result<(), EffectError> {
        self.fired
            .lock()
            .map_err(|_| "recorder lock poisoned")?
            .push(ctx.transition.id.to_string());
        Ok(())
    }
}

fn notification_effects(recorder: &Recorder) -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    for id in [
        "notifica_escola",
        "notifica_dre",
        "notifica_codae",
        "notifica_terceirizada",
        "notifica_distribuidor",
        "notifica_dilog",
    ] {
        registry = registry.register(id, Arc::new(recorder.clone()));
    }
    registry
}

struct Fixture {
    engine: TransitionEngine,
    scanner: DeadlineScanner,
    recorder: Recorder,
}

fn fixture() -> Fixture {
    let registry = Arc::new(VariantRegistry::new());
    tramita_variants::register_all(&registry).unwrap();
    let store = Arc::new(InMemoryStore::new());
    let recorder = Recorder::default();
    let engine = TransitionEngine::new(registry, store.clone(), notification_effects(&recorder));
    let scanner = DeadlineScanner::new(
        engine.clone(),
        store,
        Arc::new(WeekdayCalendar::new()),
        "scanner-teste",
    );
    Fixture {
        engine,
        scanner,
        recorder,
    }
}

fn escola() -> Actor {
    Actor::new("diretor-emef-1", RoleId::new(roles::ESCOLA))
}

fn dre() -> Actor {
    Actor::new("cogestor-dre-1", RoleId::new(roles::DRE))
}

fn codae() -> Actor {
    Actor::new("gestao-codae-1", RoleId::new(roles::CODAE))
}

fn terceirizada() -> Actor {
    Actor::new("fornecedor-1", RoleId::new(roles::TERCEIRIZADA))
}

async fn apply(
    engine: &TransitionEngine,
    id: &EntityId,
    transition: &str,
    actor: &Actor,
) -> TramitaResult<StateId> {
    engine
        .apply(
            id,
            &TransitionId::new(transition),
            actor,
            TransitionPayload::new(),
        )
        .await
}

#[tokio::test]
async fn test_pedido_escola_full_approval_path() {
    let f = fixture();
    let entity = f
        .engine
        .create_entity(&VariantId::new("pedido-escola"), &escola())
        .await
        .unwrap();

    let state = apply(&f.engine, &entity.id, "inicia_fluxo", &escola())
        .await
        .unwrap();
    assert_eq!(state, StateId::new("DRE_A_VALIDAR"));

    // Submitting twice is a state error, not a permission error.
    let again = apply(&f.engine, &entity.id, "inicia_fluxo", &escola()).await;
    assert!(matches!(
        again,
        Err(TransitionError::InvalidTransition { .. })
    ));

    // The school cannot validate its own request.
    let wrong_role = apply(&f.engine, &entity.id, "dre_valida", &escola()).await;
    assert!(matches!(wrong_role, Err(TransitionError::Forbidden { .. })));

    apply(&f.engine, &entity.id, "dre_valida", &dre())
        .await
        .unwrap();
    apply(&f.engine, &entity.id, "codae_autoriza", &codae())
        .await
        .unwrap();
    let terminal = apply(&f.engine, &entity.id, "terceirizada_toma_ciencia", &terceirizada())
        .await
        .unwrap();
    assert_eq!(terminal, StateId::new("TERCEIRIZADA_TOMOU_CIENCIA"));
    assert!(f.engine.is_retired(&entity.id).await.unwrap());

    // A retired entity accepts nothing further.
    let after_terminal = apply(&f.engine, &entity.id, "escola_cancela", &escola()).await;
    assert!(matches!(
        after_terminal,
        Err(TransitionError::InvalidTransition { .. })
    ));

    let history = f
        .engine
        .history(&entity.id, QueryWindow::all())
        .await
        .unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].from_state, StateId::new("RASCUNHO"));
    assert_eq!(
        history.last().unwrap().to_state,
        StateId::new("TERCEIRIZADA_TOMOU_CIENCIA")
    );
    // Consecutive records chain: each from_state is the previous to_state.
    for pair in history.windows(2) {
        assert_eq!(pair[1].from_state, pair[0].to_state);
    }

    let fired = f.recorder.fired.lock().unwrap();
    // inicia_fluxo notifies the DRE, codae_autoriza notifies school and vendor.
    assert_eq!(
        fired.iter().filter(|t| *t == "codae_autoriza").count(),
        2
    );
    assert!(fired.contains(&"inicia_fluxo".to_string()));
}

#[tokio::test]
async fn test_correction_round_via_revision_loop() {
    let f = fixture();
    let entity = f
        .engine
        .create_entity(&VariantId::new("pedido-escola"), &escola())
        .await
        .unwrap();
    apply(&f.engine, &entity.id, "inicia_fluxo", &escola())
        .await
        .unwrap();

    apply(&f.engine, &entity.id, "dre_pede_revisao", &dre())
        .await
        .unwrap();
    let open = f.engine.tracker().open_round(&entity.id).await.unwrap();
    assert!(open.is_some());

    apply(&f.engine, &entity.id, "escola_revisa", &escola())
        .await
        .unwrap();
    assert!(f
        .engine
        .tracker()
        .open_round(&entity.id)
        .await
        .unwrap()
        .is_none());

    // A stray open round blocks the next send-back as a guard failure.
    f.engine.tracker().open(&entity.id).await.unwrap();
    let blocked = apply(&f.engine, &entity.id, "dre_pede_revisao", &dre()).await;
    assert!(matches!(blocked, Err(TransitionError::GuardFailed { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_applies_decide_exactly_one_winner() {
    let f = fixture();
    let entity = f
        .engine
        .create_entity(&VariantId::new("pedido-escola"), &escola())
        .await
        .unwrap();
    apply(&f.engine, &entity.id, "inicia_fluxo", &escola())
        .await
        .unwrap();

    let validate = {
        let engine = f.engine.clone();
        let id = entity.id.clone();
        tokio::spawn(async move { apply(&engine, &id, "dre_valida", &dre()).await })
    };
    let reject = {
        let engine = f.engine.clone();
        let id = entity.id.clone();
        tokio::spawn(async move { apply(&engine, &id, "dre_nao_valida", &dre()).await })
    };

    let results = [validate.await.unwrap(), reject.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser,
        Err(TransitionError::Conflict { .. }) | Err(TransitionError::InvalidTransition { .. })
    ));

    // Exactly two records total: creation leaves none, each accepted
    // apply appends one.
    let history = f
        .engine
        .history(&entity.id, QueryWindow::all())
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_scanner_cancels_overdue_pedido_as_system() {
    let f = fixture();
    let entity = f
        .engine
        .create_entity(&VariantId::new("pedido-escola"), &escola())
        .await
        .unwrap();
    apply(&f.engine, &entity.id, "inicia_fluxo", &escola())
        .await
        .unwrap();

    let rule = DeadlineRule::new(
        "pedido-escola",
        "DRE_A_VALIDAR",
        Deadline::Hours(0),
        "cancela_automaticamente",
    );

    // Only the scheduler may drive the automatic cancellation.
    let as_escola = apply(&f.engine, &entity.id, "cancela_automaticamente", &escola()).await;
    assert!(matches!(as_escola, Err(TransitionError::Forbidden { .. })));

    let report = f.scanner.scan(&rule).await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert!(report.failed.is_empty());

    let record = f
        .engine
        .latest_for_many(std::slice::from_ref(&entity.id))
        .await
        .unwrap()
        .remove(&entity.id)
        .unwrap();
    assert!(record.is_system());
    assert_eq!(record.to_state, StateId::new("CANCELADO_AUTOMATICAMENTE"));

    // Nothing left in the watched state: the second sweep is a no-op.
    let second = f.scanner.scan(&rule).await.unwrap();
    assert_eq!(second.attempted, 0);
}

#[tokio::test]
async fn test_scanner_respects_business_day_deadlines() {
    let registry = Arc::new(VariantRegistry::new());
    tramita_variants::register_all(&registry).unwrap();
    let store = Arc::new(InMemoryStore::new());
    let engine = TransitionEngine::new(
        registry,
        store.clone(),
        notification_effects(&Recorder::default()),
    );
    let scanner = DeadlineScanner::new(
        engine.clone(),
        store,
        Arc::new(WeekdayCalendar::new()),
        "scanner-teste",
    )
    .with_lease_ttl(Duration::minutes(1));

    let entity = engine
        .create_entity(&VariantId::new("dieta-especial"), &escola())
        .await
        .unwrap();
    apply(&engine, &entity.id, "inicia_fluxo", &escola())
        .await
        .unwrap();
    apply(&engine, &entity.id, "codae_autoriza", &codae())
        .await
        .unwrap();

    // Two business days have not elapsed since the authorization.
    let rule = DeadlineRule::new(
        "dieta-especial",
        "CODAE_AUTORIZADO",
        Deadline::BusinessDays(2),
        "termina_automaticamente",
    );
    let report = scanner.scan(&rule).await.unwrap();
    assert_eq!(report.attempted, 0);
    assert_eq!(
        engine.entity(&entity.id).await.unwrap().current_state,
        StateId::new("CODAE_AUTORIZADO")
    );
}

#[tokio::test]
async fn test_catalog_variants_create_in_their_initial_states() {
    let f = fixture();
    for (variant, initial) in [
        ("pedido-dre", "RASCUNHO"),
        ("informativo-escola", "RASCUNHO"),
        ("homologacao-produto", "RASCUNHO"),
        ("reclamacao-produto", "AGUARDANDO_AVALIACAO"),
        ("cadastro-produto", "AGUARDANDO_CONFIRMACAO"),
        ("solicitacao-remessa", "AGUARDANDO_ENVIO"),
        ("medicao-inicial", "MEDICAO_EM_ABERTO_PARA_PREENCHIMENTO_UE"),
    ] {
        let entity = f
            .engine
            .create_entity(&VariantId::new(variant), &escola())
            .await
            .unwrap();
        assert_eq!(entity.current_state, StateId::new(initial), "{variant}");
    }
}

#[tokio::test]
async fn test_unknown_variant_is_rejected_at_creation() {
    let f = fixture();
    let result = f
        .engine
        .create_entity(&VariantId::new("nao-existe"), &escola())
        .await;
    assert!(matches!(result, Err(TransitionError::UnknownVariant(_))));
}
