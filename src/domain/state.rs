use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle states of a payment.
///
/// `Pending` is the only initial state. `Failed` and `Refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl PaymentState {
    pub const ALL: [PaymentState; 6] = [
        PaymentState::Pending,
        PaymentState::Processing,
        PaymentState::Completed,
        PaymentState::Failed,
        PaymentState::Refunded,
        PaymentState::PartiallyRefunded,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Refunded)
    }

    pub fn is_refundable(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyRefunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
            Self::PartiallyRefunded => "PARTIALLY_REFUNDED",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown payment state: {s}"))
    }
}

/// Triggers that move a payment between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentEvent {
    Process,
    Complete,
    Fail,
    Refund,
    PartialRefund,
}

impl PaymentEvent {
    pub const ALL: [PaymentEvent; 5] = [
        PaymentEvent::Process,
        PaymentEvent::Complete,
        PaymentEvent::Fail,
        PaymentEvent::Refund,
        PaymentEvent::PartialRefund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "PROCESS",
            Self::Complete => "COMPLETE",
            Self::Fail => "FAIL",
            Self::Refund => "REFUND",
            Self::PartialRefund => "PARTIAL_REFUND",
        }
    }
}

impl fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a transition leaves the source state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    External,
    /// Source and target are the same state; only the ledger moves.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PaymentState,
    pub event: PaymentEvent,
    pub to: PaymentState,
    pub kind: TransitionKind,
}

/// An `(state, event)` pair that has no edge in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot transition from {state} with event {event}")]
pub struct Rejected {
    pub state: PaymentState,
    pub event: PaymentEvent,
}

/// Looks up the edge for `(state, event)`.
///
/// The table is fixed: pairs that are not listed are rejected, never defaulted.
pub fn attempt(state: PaymentState, event: PaymentEvent) -> Result<Transition, Rejected> {
    use PaymentEvent as E;
    use PaymentState as S;
    use TransitionKind::{External, Internal};

    let (to, kind) = match (state, event) {
        (S::Pending, E::Process) => (S::Processing, External),
        (S::Processing, E::Complete) => (S::Completed, External),
        (S::Processing, E::Fail) => (S::Failed, External),
        (S::Completed, E::Refund) => (S::Refunded, External),
        (S::Completed, E::PartialRefund) => (S::PartiallyRefunded, External),
        (S::PartiallyRefunded, E::PartialRefund) => (S::PartiallyRefunded, Internal),
        (S::PartiallyRefunded, E::Refund) => (S::Refunded, External),
        _ => return Err(Rejected { state, event }),
    };

    Ok(Transition {
        from: state,
        event,
        to,
        kind,
    })
}
