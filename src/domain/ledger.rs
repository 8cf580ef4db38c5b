//! Refund arithmetic, kept apart from the transition table.
//!
//! The ledger decides how much is refunded and whether the refund settles the
//! whole charge. The caller feeds the resulting event to [`attempt`](super::state::attempt).

use super::money::{Amount, Money};
use super::state::PaymentEvent;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Refund amount must be greater than 0, got {0}")]
    NonPositive(Decimal),
    #[error(
        "Refund amount exceeds payment amount: requested {requested}, already refunded {already_refunded}, charged {charge}"
    )]
    ExceedsCharge {
        requested: Decimal,
        already_refunded: Decimal,
        charge: Decimal,
    },
}

/// Outcome of a refund request that passed the ledger rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundDecision {
    /// The amount refunded by this request.
    pub refund: Money,
    /// Cumulative refunded amount after this request.
    pub new_total: Money,
    /// `Refund` when `new_total` reaches the charge, `PartialRefund` otherwise.
    pub event: PaymentEvent,
}

impl RefundDecision {
    pub fn is_full(&self) -> bool {
        self.event == PaymentEvent::Refund
    }
}

pub struct RefundLedger;

impl RefundLedger {
    /// Applies the refund rule to `(charge, already_refunded, requested)`.
    ///
    /// A missing `requested` amount means "refund whatever is left".
    pub fn decide(
        charge: Amount,
        already_refunded: Money,
        requested: Option<Decimal>,
    ) -> Result<RefundDecision, LedgerError> {
        let charge = Money::from(charge);
        let refund = match requested {
            Some(value) => Money::new(value),
            None => charge.checked_sub(already_refunded).unwrap_or(Money::ZERO),
        };

        if !refund.is_positive() {
            return Err(LedgerError::NonPositive(refund.value()));
        }

        let new_total = already_refunded
            .checked_add(refund)
            .filter(|total| *total <= charge)
            .ok_or(LedgerError::ExceedsCharge {
                requested: refund.value(),
                already_refunded: already_refunded.value(),
                charge: charge.value(),
            })?;

        let event = if new_total == charge {
            PaymentEvent::Refund
        } else {
            PaymentEvent::PartialRefund
        };

        Ok(RefundDecision {
            refund,
            new_total,
            event,
        })
    }
}
