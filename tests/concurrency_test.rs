use async_trait::async_trait;
use payflow::application::engine::LifecycleEngine;
use payflow::domain::lifecycle::ProcessingOutcome;
use payflow::domain::money::Money;
use payflow::domain::payment::{Payment, TransactionId};
use payflow::domain::ports::PaymentStore;
use payflow::domain::state::PaymentState;
use payflow::error::{ErrorKind, Result};
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
use payflow::infrastructure::processor::FixedOutcomeProcessor;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::Notify;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refunds_never_overdraw() {
    let engine = Arc::new(common::approving_engine());
    let id = TransactionId::new("tx-1");
    engine
        .create_payment(common::new_payment("tx-1", dec!(100.00)))
        .await
        .unwrap();
    engine.process_payment(&id).await.unwrap();

    // 25 refunds of 10.00 race against a 100.00 charge.
    let mut handles = Vec::new();
    for _ in 0..25 {
        let engine = Arc::clone(&engine);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            engine.refund(&id, Some(dec!(10.00))).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert!(matches!(e.kind(), ErrorKind::State | ErrorKind::Amount)),
        }
    }

    assert_eq!(accepted, 10);
    let payment = engine.get_payment(&id).await.unwrap();
    assert_eq!(payment.status, PaymentState::Refunded);
    assert_eq!(payment.current_ledger(), Money::new(dec!(100.00)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_payments_progress_in_parallel() {
    let engine = Arc::new(common::approving_engine());

    let mut handles = Vec::new();
    for i in 0..50 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let tx = format!("tx-{i}");
            let payment = engine
                .create_payment(common::new_payment(&tx, dec!(20.00)))
                .await?;
            engine.process_payment(&payment.transaction_id).await?;
            engine.refund(&payment.transaction_id, Some(dec!(5.00))).await
        }));
    }

    for handle in handles {
        let payment = handle.await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentState::PartiallyRefunded);
        assert_eq!(payment.current_ledger(), Money::new(dec!(5.00)));
    }

    let partially = engine
        .payments_by_status(PaymentState::PartiallyRefunded)
        .await
        .unwrap();
    assert_eq!(partially.len(), 50);
}

/// Shares the wrapped store, but parks every `load` until released.
struct ParkedLoadStore {
    inner: InMemoryPaymentStore,
    loaded: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl PaymentStore for ParkedLoadStore {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        self.inner.insert(payment).await
    }

    async fn load(&self, id: &TransactionId) -> Result<Option<Payment>> {
        let payment = self.inner.load(id).await?;
        self.loaded.notify_one();
        self.release.notified().await;
        Ok(payment)
    }

    async fn save(&self, payment: Payment) -> Result<Payment> {
        self.inner.save(payment).await
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        self.inner.all().await
    }
}

#[tokio::test]
async fn test_engines_sharing_a_store_surface_conflict() {
    let shared = InMemoryPaymentStore::new();
    let loaded = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let fast = LifecycleEngine::new(
        Box::new(shared.clone()),
        Box::new(FixedOutcomeProcessor::new(ProcessingOutcome::Approved)),
    );
    let slow = Arc::new(LifecycleEngine::new(
        Box::new(ParkedLoadStore {
            inner: shared.clone(),
            loaded: Arc::clone(&loaded),
            release: Arc::clone(&release),
        }),
        Box::new(FixedOutcomeProcessor::new(ProcessingOutcome::Approved)),
    ));

    let id = TransactionId::new("tx-1");
    fast.create_payment(common::new_payment("tx-1", dec!(100.00)))
        .await
        .unwrap();
    fast.process_payment(&id).await.unwrap();

    // The slow engine reads the completed payment, then stalls before saving.
    let stale = {
        let slow = Arc::clone(&slow);
        let id = id.clone();
        tokio::spawn(async move { slow.refund(&id, Some(dec!(70.00))).await })
    };
    loaded.notified().await;

    fast.refund(&id, Some(dec!(60.00))).await.unwrap();
    release.notify_one();

    let err = stale.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let stored = fast.get_payment(&id).await.unwrap();
    assert_eq!(stored.status, PaymentState::PartiallyRefunded);
    assert_eq!(stored.current_ledger(), Money::new(dec!(60.00)));
}
