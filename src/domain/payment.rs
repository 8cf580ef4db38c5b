use super::money::{Amount, Money};
use super::state::PaymentState;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Public, opaque identifier of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `TXN_` followed by 16 upper-case hex characters.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(format!("TXN_{}", uuid[..16].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of the merchant a payment is taken on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(String);

impl MerchantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MerchantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Everything needed to admit a new payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Generated when absent.
    pub transaction_id: Option<TransactionId>,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub card_number: String,
    pub card_holder_name: String,
    pub description: Option<String>,
    pub merchant_id: Option<MerchantId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction_id: TransactionId,
    pub amount: Amount,
    pub currency: String,
    /// Masked, only the last four digits are kept.
    pub card_number: String,
    pub card_holder_name: String,
    pub description: Option<String>,
    /// Owning merchant, if the payment was taken on behalf of one.
    #[serde(default)]
    pub merchant_id: Option<MerchantId>,
    pub refunded_amount: Money,
    pub status: PaymentState,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful save.
    #[serde(default)]
    pub version: u64,
}

impl Payment {
    /// Validates the request and builds a `Pending` payment with an empty ledger.
    pub fn create(request: NewPayment, now: DateTime<Utc>) -> Result<Self> {
        let amount = Amount::new(request.amount)?;
        let card_number = mask_card_number(&request.card_number)?;

        let card_holder_name = request.card_holder_name.trim().to_string();
        if card_holder_name.is_empty() {
            return Err(PaymentError::ValidationError(
                "Card holder name is required".to_string(),
            ));
        }

        let currency = match request.currency.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_CURRENCY.to_string(),
            Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                code.to_ascii_uppercase()
            }
            Some(code) => {
                return Err(PaymentError::ValidationError(format!(
                    "Invalid currency code: {code}"
                )));
            }
        };

        let transaction_id = match request.transaction_id {
            Some(id) if id.as_str().trim().is_empty() => TransactionId::generate(),
            Some(id) => id,
            None => TransactionId::generate(),
        };

        let merchant_id = request
            .merchant_id
            .map(|id| MerchantId::new(id.as_str().trim()))
            .filter(|id| !id.as_str().is_empty());

        Ok(Self {
            transaction_id,
            amount,
            currency,
            card_number,
            card_holder_name,
            description: request.description.filter(|d| !d.trim().is_empty()),
            merchant_id,
            refunded_amount: Money::ZERO,
            status: PaymentState::Pending,
            failure_reason: None,
            created_at: now,
            processed_at: None,
            completed_at: None,
            version: 0,
        })
    }

    pub fn current_state(&self) -> PaymentState {
        self.status
    }

    pub fn current_ledger(&self) -> Money {
        self.refunded_amount
    }

    pub fn remaining_refundable(&self) -> Money {
        Money::from(self.amount) - self.refunded_amount
    }
}

fn mask_card_number(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PaymentError::ValidationError(
            "Card number must contain 12 to 19 digits".to_string(),
        ));
    }
    Ok(format!("**** **** **** {}", &digits[digits.len() - 4..]))
}
