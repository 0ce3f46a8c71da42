//! End-to-end tests for the consultation loop with a scripted gateway.

use async_trait::async_trait;
use consulta_core::{ConsultationContext, CoreError, Cpf, Record, RecordStatus};
use consulta_gateway::{GatewayError, LookupGateway, LookupResponse};
use consulta_queue::{Consultation, ConsultationError, QueuePolicy};
use consulta_store::{KeyValueStore, MemoryKvStore, RecordStore};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const KEY: &str = "clients";
const INTERVAL: Duration = Duration::from_millis(3000);

/// Gateway answering from a script, then `{ "success": true }` once it runs out.
#[derive(Default)]
struct ScriptedGateway {
    script: Mutex<VecDeque<Option<Value>>>,
    calls: Mutex<Vec<(Instant, String)>>,
    always_pending: bool,
}

impl ScriptedGateway {
    fn with_script(answers: Vec<Option<Value>>) -> Self {
        Self {
            script: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    fn always_pending() -> Self {
        Self {
            always_pending: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(Instant, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl LookupGateway for ScriptedGateway {
    async fn lookup(&self, cpf: &Cpf) -> Result<LookupResponse, GatewayError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((Instant::now(), cpf.as_str().to_string()));

        if self.always_pending {
            return Ok(LookupResponse::new(json!({ "pending": true })));
        }

        match self.script.lock().expect("script lock").pop_front() {
            Some(Some(value)) => Ok(LookupResponse::new(value)),
            Some(None) => Err(GatewayError::ApiError {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            None => Ok(LookupResponse::new(json!({ "success": true }))),
        }
    }

    fn gateway_id(&self) -> &str {
        "scripted"
    }
}

fn policy() -> QueuePolicy {
    QueuePolicy {
        interval: INTERVAL,
        max_retries: 5,
    }
}

async fn setup(gateway: Arc<ScriptedGateway>) -> (Consultation, Arc<MemoryKvStore>) {
    let kv = Arc::new(MemoryKvStore::new());
    let store = RecordStore::load(kv.clone(), KEY).await.expect("load store");
    (Consultation::new(store, gateway, policy()), kv)
}

fn cpf(raw: &str) -> Cpf {
    Cpf::parse(raw).expect("valid CPF")
}

#[tokio::test(start_paused = true)]
async fn test_success_scenario_persists_result() {
    let gateway = Arc::new(ScriptedGateway::with_script(vec![Some(
        json!({ "success": true, "name": "Maria", "bank": "X" }),
    )]));
    let (mut consultation, kv) = setup(gateway.clone()).await;

    let submitted = consultation
        .submit("123.456.789-09", ConsultationContext::Individual)
        .await
        .expect("submit");
    assert_eq!(submitted.identifier.as_str(), "12345678909");

    let summary = consultation.run().await.expect("run");
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(!summary.stopped);

    let reloaded = RecordStore::load(kv as Arc<dyn KeyValueStore>, KEY)
        .await
        .expect("reload");
    let record = reloaded.get(&submitted.id).expect("record persisted");
    assert_eq!(record.status, RecordStatus::Success);
    assert_eq!(record.name.as_deref(), Some("Maria"));
    assert_eq!(record.bank.as_deref(), Some("X"));
    assert_eq!(record.retry_count, 1);
    assert_eq!(reloaded.records(), consultation.store().records());
}

#[tokio::test(start_paused = true)]
async fn test_fifo_order_and_pacing() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    for raw in ["11111111111", "22222222222", "33333333333"] {
        consultation
            .submit(raw, ConsultationContext::Individual)
            .await
            .expect("submit");
    }

    let summary = consultation.run().await.expect("run");
    assert_eq!(summary.processed, 3);

    let calls = gateway.calls();
    let order: Vec<&str> = calls.iter().map(|(_, cpf)| cpf.as_str()).collect();
    assert_eq!(order, ["11111111111", "22222222222", "33333333333"]);

    for pair in calls.windows(2) {
        assert!(pair[1].0.duration_since(pair[0].0) >= INTERVAL);
    }
    assert!(consultation.queue().is_empty());
    assert!(!consultation.queue().is_processing());
}

#[tokio::test(start_paused = true)]
async fn test_second_run_waits_for_remaining_interval() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    consultation
        .submit("11111111111", ConsultationContext::Individual)
        .await
        .expect("submit");
    consultation.run().await.expect("first run");

    consultation
        .submit("22222222222", ConsultationContext::Individual)
        .await
        .expect("submit");
    consultation.run().await.expect("second run");

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].0.duration_since(calls[0].0) >= INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_pending_stops_at_retry_cap() {
    let gateway = Arc::new(ScriptedGateway::always_pending());
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    let submitted = consultation
        .submit("12345678909", ConsultationContext::Individual)
        .await
        .expect("submit");
    let summary = consultation.run().await.expect("run");

    assert_eq!(gateway.calls().len(), 5);
    assert_eq!(summary.requeued, 4);
    assert_eq!(summary.exhausted, 1);

    let record = consultation.store().get(&submitted.id).expect("record");
    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.retry_count, 5);
    assert!(consultation.queue().is_empty());

    // Nothing left to resume once the cap is reached.
    assert_eq!(consultation.resume_pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pending_record_goes_to_back_of_queue() {
    let gateway = Arc::new(ScriptedGateway::with_script(vec![Some(
        json!({ "pending": true }),
    )]));
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    let first = consultation
        .submit("11111111111", ConsultationContext::Individual)
        .await
        .expect("submit");
    let second = consultation
        .submit("22222222222", ConsultationContext::Individual)
        .await
        .expect("submit");

    let summary = consultation.run().await.expect("run");
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.requeued, 1);
    assert_eq!(summary.succeeded, 2);

    let calls = gateway.calls();
    let order: Vec<&str> = calls.iter().map(|(_, cpf)| cpf.as_str()).collect();
    assert_eq!(order, ["11111111111", "22222222222", "11111111111"]);
    for pair in calls.windows(2) {
        assert!(pair[1].0.duration_since(pair[0].0) >= INTERVAL);
    }

    let first = consultation.store().get(&first.id).expect("first record");
    assert_eq!(first.status, RecordStatus::Success);
    assert_eq!(first.retry_count, 2);
    let second = consultation.store().get(&second.id).expect("second record");
    assert_eq!(second.retry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_gateway_failure_is_not_requeued() {
    let gateway = Arc::new(ScriptedGateway::with_script(vec![None]));
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    let submitted = consultation
        .submit("12345678909", ConsultationContext::Individual)
        .await
        .expect("submit");
    let summary = consultation.run().await.expect("run never fails on gateway errors");

    assert_eq!(summary.gateway_failures, 1);
    assert_eq!(gateway.calls().len(), 1);

    let record = consultation.store().get(&submitted.id).expect("record");
    assert_eq!(record.status, RecordStatus::Error);
    assert_eq!(record.retry_count, 1);
    assert!(record
        .error_message
        .as_deref()
        .is_some_and(|m| m.contains("bad gateway")));
}

#[tokio::test]
async fn test_invalid_identifier_creates_nothing() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (mut consultation, _kv) = setup(gateway).await;

    let err = consultation
        .submit("123456789012", ConsultationContext::Individual)
        .await
        .expect_err("too many digits");

    assert!(matches!(
        err,
        ConsultationError::Core(CoreError::InvalidIdentifier { .. })
    ));
    assert!(consultation.store().is_empty());
    assert!(consultation.queue().is_empty());
}

#[tokio::test]
async fn test_resubmission_reuses_record() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (mut consultation, _kv) = setup(gateway).await;

    let first = consultation
        .submit("12345678909", ConsultationContext::Individual)
        .await
        .expect("submit");
    let second = consultation
        .submit("123.456.789-09", ConsultationContext::Individual)
        .await
        .expect("resubmit");

    assert_eq!(first.id, second.id);
    assert_eq!(consultation.store().len(), 1);
    assert_eq!(consultation.queue().len(), 1);

    // A batch submission of the same CPF is a separate record.
    consultation
        .submit("12345678909", ConsultationContext::Batch)
        .await
        .expect("batch submit");
    assert_eq!(consultation.store().len(), 2);
}

#[tokio::test]
async fn test_batch_reconsultation_resets_error_record() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = RecordStore::load(kv.clone(), KEY).await.expect("load");

    let mut failed = Record::new(cpf("12345678909"), ConsultationContext::Batch);
    failed.status = RecordStatus::Error;
    failed.retry_count = 3;
    failed.error_message = Some("CPF não encontrado na base de dados.".to_string());
    store.upsert(failed.clone()).await.expect("seed");

    let mut consultation = Consultation::new(store, Arc::new(ScriptedGateway::default()), policy());
    let report = consultation
        .import_batch(vec![
            Record::batch_candidate(cpf("123.456.789-09"), None),
            Record::batch_candidate(cpf("98765432100"), Some("Ana".to_string())),
        ])
        .await
        .expect("import");

    assert_eq!(report.reconsulted, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(consultation.store().len(), 2);

    let record = consultation.store().get(&failed.id).expect("same record");
    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.retry_count, 0);
    assert_eq!(record.consultation_context, ConsultationContext::Batch);
    assert!(consultation.queue().contains(&failed.id));
    assert_eq!(consultation.queue().len(), 2);
}

#[tokio::test]
async fn test_batch_prefers_batch_record_and_collapses_duplicates() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = RecordStore::load(kv.clone(), KEY).await.expect("load");

    let individual = Record::new(cpf("12345678909"), ConsultationContext::Individual);
    let batch = Record::new(cpf("12345678909"), ConsultationContext::Batch);
    store.upsert(individual.clone()).await.expect("seed individual");
    store.upsert(batch.clone()).await.expect("seed batch");

    let mut consultation = Consultation::new(store, Arc::new(ScriptedGateway::default()), policy());
    let report = consultation
        .import_batch(vec![
            Record::batch_candidate(cpf("12345678909"), None),
            Record::batch_candidate(cpf("12345678909"), None),
        ])
        .await
        .expect("import");

    assert_eq!(report.reconsulted, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.queued(), 1);
    assert_eq!(consultation.store().len(), 2);
    assert!(consultation.queue().contains(&batch.id));
    assert!(!consultation.queue().contains(&individual.id));
}

#[tokio::test]
async fn test_batch_import_of_individual_record_moves_it_to_batch() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = RecordStore::load(kv.clone(), KEY).await.expect("load");
    let individual = Record::new(cpf("12345678909"), ConsultationContext::Individual);
    store.upsert(individual.clone()).await.expect("seed");

    let mut consultation = Consultation::new(store, Arc::new(ScriptedGateway::default()), policy());
    consultation
        .import_batch(vec![Record::batch_candidate(cpf("12345678909"), None)])
        .await
        .expect("import");

    let record = consultation.store().get(&individual.id).expect("record");
    assert_eq!(record.consultation_context, ConsultationContext::Batch);
    assert_eq!(consultation.store().len(), 1);
}

#[tokio::test]
async fn test_resume_pending_queues_unfinished_work() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = RecordStore::load(kv.clone(), KEY).await.expect("load");

    let waiting = Record::new(cpf("11111111111"), ConsultationContext::Individual);
    let mut exhausted = Record::new(cpf("22222222222"), ConsultationContext::Individual);
    exhausted.retry_count = 5;
    let mut done = Record::new(cpf("33333333333"), ConsultationContext::Batch);
    done.status = RecordStatus::Success;

    for record in [&waiting, &exhausted, &done] {
        store.upsert(record.clone()).await.expect("seed");
    }

    let mut consultation = Consultation::new(store, Arc::new(ScriptedGateway::default()), policy());
    assert_eq!(consultation.resume_pending(), 1);
    assert!(consultation.queue().contains(&waiting.id));

    // Resuming twice does not double-queue.
    assert_eq!(consultation.resume_pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_scheduled_resumption() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    for raw in ["11111111111", "22222222222"] {
        consultation
            .submit(raw, ConsultationContext::Individual)
            .await
            .expect("submit");
    }

    let token = consultation.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let start = Instant::now();
    let summary = consultation.run().await.expect("run");

    assert!(summary.stopped);
    assert_eq!(summary.processed, 1);
    assert_eq!(gateway.calls().len(), 1);
    assert!(start.elapsed() < INTERVAL);
    assert_eq!(consultation.queue().len(), 1);

    // The unprocessed record is still stored as pending for a later resume.
    let pending = consultation
        .store()
        .records()
        .iter()
        .filter(|r| r.is_pending())
        .count();
    assert_eq!(pending, 1);
}

#[tokio::test]
async fn test_stop_before_run_returns_immediately() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (mut consultation, _kv) = setup(gateway.clone()).await;

    consultation
        .submit("11111111111", ConsultationContext::Individual)
        .await
        .expect("submit");
    consultation.stop();

    let summary = consultation.run().await.expect("run");
    assert!(summary.stopped);
    assert!(gateway.calls().is_empty());
}
