use crate::domain::ledger::LedgerError;
use crate::domain::payment::TransactionId;
use crate::domain::state::{PaymentState, Rejected};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Coarse classification used by callers to map errors onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    State,
    Amount,
    NotFound,
    Conflict,
    Validation,
    Infrastructure,
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid state transition: {0}")]
    InvalidTransition(#[from] Rejected),
    #[error("Payment {transaction_id} must be COMPLETED or PARTIALLY_REFUNDED to refund, found {state}")]
    NotRefundable {
        transaction_id: TransactionId,
        state: PaymentState,
    },
    #[error("Invalid refund amount: {0}")]
    InvalidAmount(#[from] LedgerError),
    #[error("Payment not found: {0}")]
    NotFound(TransactionId),
    #[error("Payment already exists: {0}")]
    Duplicate(TransactionId),
    #[error("Concurrent modification of {transaction_id}: expected version {expected}, found {found}")]
    Conflict {
        transaction_id: TransactionId,
        expected: u64,
        found: u64,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition(_) | Self::NotRefundable { .. } => ErrorKind::State,
            Self::InvalidAmount(_) => ErrorKind::Amount,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Duplicate(_) | Self::ValidationError(_) => ErrorKind::Validation,
            _ => ErrorKind::Infrastructure,
        }
    }

    pub fn is_state_error(&self) -> bool {
        self.kind() == ErrorKind::State
    }

    pub fn is_amount_error(&self) -> bool {
        self.kind() == ErrorKind::Amount
    }
}
