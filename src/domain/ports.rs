use super::lifecycle::ProcessingOutcome;
use super::payment::{MerchantId, Payment, TransactionId};
use super::state::PaymentState;
use crate::error::Result;
use async_trait::async_trait;

/// Durable storage for payment records.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Stores a brand new record. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, payment: Payment) -> Result<Payment>;
    async fn load(&self, id: &TransactionId) -> Result<Option<Payment>>;
    /// Replaces the stored record if its version still matches `payment.version`.
    ///
    /// Returns the record as stored, with the version bumped. A version
    /// mismatch fails with `Conflict` and leaves storage untouched.
    async fn save(&self, payment: Payment) -> Result<Payment>;
    async fn all(&self) -> Result<Vec<Payment>>;
    async fn by_status(&self, status: PaymentState) -> Result<Vec<Payment>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|p| p.status == status)
            .collect())
    }
    async fn by_merchant(&self, merchant_id: &MerchantId) -> Result<Vec<Payment>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|p| p.merchant_id.as_ref() == Some(merchant_id))
            .collect())
    }
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type PaymentStoreFactory = Box<dyn Fn() -> PaymentStoreBox + Send + Sync>;

/// External decision on whether a payment in `Processing` went through.
#[async_trait]
pub trait ProcessingOutcomeProvider: Send + Sync {
    async fn decide(&self, payment: &Payment) -> ProcessingOutcome;
}

pub type OutcomeProviderBox = Box<dyn ProcessingOutcomeProvider>;
