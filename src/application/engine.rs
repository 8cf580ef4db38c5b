use crate::domain::lifecycle::{self, ProcessingOutcome};
use crate::domain::payment::{MerchantId, NewPayment, Payment, TransactionId};
use crate::domain::ports::{OutcomeProviderBox, PaymentStoreBox};
use crate::domain::state::PaymentState;
use crate::error::{PaymentError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Entry point for every lifecycle action.
///
/// `LifecycleEngine` never keeps payment state of its own: each action loads
/// the durable record, validates the transition against it and saves the
/// result. Actions on the same transaction id are serialized through a
/// per-id lock, actions on different ids run independently.
pub struct LifecycleEngine {
    store: PaymentStoreBox,
    processor: OutcomeProviderBox,
    locks: Mutex<HashMap<TransactionId, Arc<Mutex<()>>>>,
}

impl LifecycleEngine {
    /// Creates a new `LifecycleEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable storage for payment records.
    /// * `processor` - Decides the outcome of `process_payment`.
    pub fn new(store: PaymentStoreBox, processor: OutcomeProviderBox) -> Self {
        Self {
            store,
            processor,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Admits a new payment in `Pending`.
    pub async fn create_payment(&self, request: NewPayment) -> Result<Payment> {
        let payment = Payment::create(request, Utc::now())?;
        let payment = self.store.insert(payment).await?;
        info!(
            transaction_id = %payment.transaction_id,
            amount = %payment.amount,
            currency = %payment.currency,
            merchant_id = ?payment.merchant_id.as_ref().map(MerchantId::as_str),
            "payment created"
        );
        Ok(payment)
    }

    pub async fn advance_to_processing(&self, id: &TransactionId) -> Result<Payment> {
        self.apply(id, "process", |payment| {
            lifecycle::advance_to_processing(payment, Utc::now())
        })
        .await
    }

    pub async fn settle_processing_outcome(
        &self,
        id: &TransactionId,
        outcome: ProcessingOutcome,
    ) -> Result<Payment> {
        self.apply(id, "settle", |payment| {
            lifecycle::settle_processing_outcome(payment, &outcome, Utc::now())
        })
        .await
    }

    /// Moves a pending payment to processing, asks the processor for the
    /// outcome and settles it.
    ///
    /// The per-id lock is released while the processor decides, so the two
    /// halves are separate atomic actions.
    pub async fn process_payment(&self, id: &TransactionId) -> Result<Payment> {
        let processing = self.advance_to_processing(id).await?;
        let outcome = self.processor.decide(&processing).await;
        if !outcome.is_approved() {
            warn!(transaction_id = %id, ?outcome, "payment declined by processor");
        }
        self.settle_processing_outcome(id, outcome).await
    }

    /// Refunds `amount`, or the remaining balance when `amount` is `None`.
    pub async fn refund(&self, id: &TransactionId, amount: Option<Decimal>) -> Result<Payment> {
        self.apply(id, "refund", |payment| lifecycle::apply_refund(payment, amount))
            .await
    }

    pub async fn get_payment(&self, id: &TransactionId) -> Result<Payment> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(id.clone()))
    }

    pub async fn payments_by_status(&self, status: PaymentState) -> Result<Vec<Payment>> {
        self.store.by_status(status).await
    }

    /// Payments taken on behalf of `merchant_id`, ordered by creation time.
    pub async fn payments_for_merchant(&self, merchant_id: &MerchantId) -> Result<Vec<Payment>> {
        let mut payments = self.store.by_merchant(merchant_id).await?;
        payments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        Ok(payments)
    }

    /// Consumes the engine and returns every stored payment ordered by id.
    pub async fn into_results(self) -> Result<Vec<Payment>> {
        let mut payments = self.store.all().await?;
        payments.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));
        Ok(payments)
    }

    async fn lock_for(&self, id: &TransactionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id.clone()).or_default().clone()
    }

    /// Drops the registry entry for `id` once no other action holds or awaits it.
    async fn release(&self, id: &TransactionId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks
            .get(id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(id);
        }
    }

    /// Runs one load-validate-save cycle while holding the id's lock.
    async fn apply<F>(&self, id: &TransactionId, action: &'static str, step: F) -> Result<Payment>
    where
        F: FnOnce(&Payment) -> Result<Payment> + Send,
    {
        let lock = self.lock_for(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply_locked(id, action, step).await
        };
        self.release(id, lock).await;
        result
    }

    async fn apply_locked<F>(
        &self,
        id: &TransactionId,
        action: &'static str,
        step: F,
    ) -> Result<Payment>
    where
        F: FnOnce(&Payment) -> Result<Payment> + Send,
    {
        let current = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(id.clone()))?;

        let next = match step(&current) {
            Ok(next) => next,
            Err(e) => {
                warn!(
                    transaction_id = %id,
                    state = %current.status,
                    action,
                    error = %e,
                    "lifecycle action rejected"
                );
                return Err(e);
            }
        };

        let saved = self.store.save(next).await?;
        info!(
            transaction_id = %id,
            from = %current.status,
            to = %saved.status,
            refunded = %saved.refunded_amount,
            action,
            "payment transitioned"
        );
        Ok(saved)
    }
}
