//! Lifecycle actions for a single payment.
//!
//! Every function takes the current durable record by reference and returns
//! the next record. Nothing is mutated on failure, so a rejected action
//! leaves the caller's copy exactly as it was loaded.

use super::ledger::RefundLedger;
use super::payment::Payment;
use super::state::{PaymentEvent, attempt};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FAILURE_REASON: &str = "Insufficient funds";

/// Decision handed back by the processing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingOutcome {
    Approved,
    Declined { reason: Option<String> },
}

impl ProcessingOutcome {
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined {
            reason: Some(reason.into()),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl From<bool> for ProcessingOutcome {
    fn from(success: bool) -> Self {
        if success {
            Self::Approved
        } else {
            Self::Declined { reason: None }
        }
    }
}

/// PENDING -> PROCESSING, stamping `processed_at`.
pub fn advance_to_processing(payment: &Payment, now: DateTime<Utc>) -> Result<Payment> {
    let transition = attempt(payment.status, PaymentEvent::Process)?;

    let mut next = payment.clone();
    next.status = transition.to;
    next.processed_at = Some(now);
    Ok(next)
}

/// PROCESSING -> COMPLETED or FAILED depending on `outcome`.
pub fn settle_processing_outcome(
    payment: &Payment,
    outcome: &ProcessingOutcome,
    now: DateTime<Utc>,
) -> Result<Payment> {
    let mut next = payment.clone();
    match outcome {
        ProcessingOutcome::Approved => {
            next.status = attempt(payment.status, PaymentEvent::Complete)?.to;
            next.completed_at = Some(now);
        }
        ProcessingOutcome::Declined { reason } => {
            next.status = attempt(payment.status, PaymentEvent::Fail)?.to;
            let reason = reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_FAILURE_REASON);
            next.failure_reason = Some(reason.to_string());
        }
    }
    Ok(next)
}

/// Refunds `requested` (or the remaining balance) and moves the state with it.
///
/// The ledger total and the state are replaced together on the returned copy.
pub fn apply_refund(payment: &Payment, requested: Option<Decimal>) -> Result<Payment> {
    if !payment.status.is_refundable() {
        return Err(PaymentError::NotRefundable {
            transaction_id: payment.transaction_id.clone(),
            state: payment.status,
        });
    }

    let decision = RefundLedger::decide(payment.amount, payment.refunded_amount, requested)?;
    let transition = attempt(payment.status, decision.event)?;

    let mut next = payment.clone();
    next.refunded_amount = decision.new_total;
    next.status = transition.to;
    Ok(next)
}
