use crate::application::engine::LifecycleEngine;
use crate::domain::lifecycle::ProcessingOutcome;
use crate::domain::payment::{MerchantId, NewPayment, Payment, TransactionId};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Create,
    /// Start processing and settle with the configured processor.
    Process,
    Start,
    Complete,
    Fail,
    Refund,
}

/// One raw CSV row. Columns not used by an action may be left empty or omitted.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ActionRecord {
    pub action: ActionType,
    #[serde(default)]
    pub tx: Option<String>,
    /// Parsed from the raw text so no digits are lost on the way in.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub holder: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
}

/// A validated lifecycle request.
#[derive(Debug, PartialEq, Clone)]
pub enum Action {
    Create(NewPayment),
    Process(TransactionId),
    Start(TransactionId),
    Settle(TransactionId, ProcessingOutcome),
    Refund(TransactionId, Option<Decimal>),
}

impl TryFrom<ActionRecord> for Action {
    type Error = PaymentError;

    fn try_from(record: ActionRecord) -> Result<Self> {
        let tx = record.tx.filter(|tx| !tx.is_empty()).map(TransactionId::new);
        let require_tx = |tx: Option<TransactionId>| tx.ok_or_else(|| missing("tx", "lifecycle"));

        Ok(match record.action {
            ActionType::Create => Action::Create(NewPayment {
                transaction_id: tx,
                amount: record.amount.ok_or_else(|| missing("amount", "create"))?,
                currency: record.currency,
                card_number: record.card.ok_or_else(|| missing("card", "create"))?,
                card_holder_name: record.holder.ok_or_else(|| missing("holder", "create"))?,
                description: record.description,
                merchant_id: record.merchant.filter(|m| !m.is_empty()).map(MerchantId::new),
            }),
            ActionType::Process => Action::Process(require_tx(tx)?),
            ActionType::Start => Action::Start(require_tx(tx)?),
            ActionType::Complete => Action::Settle(require_tx(tx)?, ProcessingOutcome::Approved),
            ActionType::Fail => Action::Settle(
                require_tx(tx)?,
                ProcessingOutcome::Declined {
                    reason: record.description,
                },
            ),
            ActionType::Refund => Action::Refund(require_tx(tx)?, record.amount),
        })
    }
}

fn missing(column: &str, action: &str) -> PaymentError {
    PaymentError::ValidationError(format!("Column '{column}' is required for {action} rows"))
}

impl Action {
    /// Runs the action against `engine`, returning the updated payment.
    pub async fn apply(self, engine: &LifecycleEngine) -> Result<Payment> {
        match self {
            Action::Create(request) => engine.create_payment(request).await,
            Action::Process(id) => engine.process_payment(&id).await,
            Action::Start(id) => engine.advance_to_processing(&id).await,
            Action::Settle(id, outcome) => engine.settle_processing_outcome(&id, outcome).await,
            Action::Refund(id, amount) => engine.refund(&id, amount).await,
        }
    }
}

/// Reads lifecycle actions from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing optional columns can be omitted.
pub struct ActionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ActionReader<R> {
    /// Creates a new `ActionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads, deserializes and validates one action per row.
    pub fn actions(self) -> impl Iterator<Item = Result<Action>> {
        self.reader
            .into_deserialize::<ActionRecord>()
            .map(|result| result.map_err(PaymentError::from).and_then(Action::try_from))
    }
}
