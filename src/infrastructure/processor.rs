use crate::domain::lifecycle::{DEFAULT_FAILURE_REASON, ProcessingOutcome};
use crate::domain::payment::Payment;
use crate::domain::ports::ProcessingOutcomeProvider;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Stand-in for a card network.
///
/// Declines cards whose last four digits are `0000` and approves the rest,
/// after an optional artificial delay.
#[derive(Debug, Clone, Default)]
pub struct SimulatedProcessor {
    latency: Duration,
}

impl SimulatedProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ProcessingOutcomeProvider for SimulatedProcessor {
    async fn decide(&self, payment: &Payment) -> ProcessingOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!(transaction_id = %payment.transaction_id, "simulated processor deciding");

        if payment.card_number.ends_with("0000") {
            ProcessingOutcome::declined(DEFAULT_FAILURE_REASON)
        } else {
            ProcessingOutcome::Approved
        }
    }
}

/// Returns the same outcome for every payment.
#[derive(Debug, Clone)]
pub struct FixedOutcomeProcessor {
    outcome: ProcessingOutcome,
}

impl FixedOutcomeProcessor {
    pub fn new(outcome: ProcessingOutcome) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl ProcessingOutcomeProvider for FixedOutcomeProcessor {
    async fn decide(&self, _payment: &Payment) -> ProcessingOutcome {
        self.outcome.clone()
    }
}
