use crate::domain::payment::{Payment, TransactionId};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payments.
///
/// Uses `Arc<RwLock<HashMap<TransactionId, Payment>>>` to allow shared concurrent access.
/// Clones share the same map. Ideal for testing or runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<TransactionId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.transaction_id) {
            return Err(PaymentError::Duplicate(payment.transaction_id));
        }
        payments.insert(payment.transaction_id.clone(), payment.clone());
        Ok(payment)
    }

    async fn load(&self, id: &TransactionId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn save(&self, mut payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        let stored = payments
            .get_mut(&payment.transaction_id)
            .ok_or_else(|| PaymentError::NotFound(payment.transaction_id.clone()))?;

        if stored.version != payment.version {
            return Err(PaymentError::Conflict {
                transaction_id: payment.transaction_id,
                expected: payment.version,
                found: stored.version,
            });
        }

        payment.version += 1;
        *stored = payment.clone();
        Ok(payment)
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }
}
