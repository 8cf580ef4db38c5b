#![allow(dead_code)]

use payflow::application::engine::LifecycleEngine;
use payflow::domain::lifecycle::ProcessingOutcome;
use payflow::domain::payment::NewPayment;
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
use payflow::infrastructure::processor::FixedOutcomeProcessor;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 8] = [
    "action",
    "tx",
    "amount",
    "currency",
    "card",
    "holder",
    "description",
    "merchant",
];

pub fn approving_engine() -> LifecycleEngine {
    LifecycleEngine::new(
        Box::new(InMemoryPaymentStore::new()),
        Box::new(FixedOutcomeProcessor::new(ProcessingOutcome::Approved)),
    )
}

pub fn new_payment(id: &str, amount: Decimal) -> NewPayment {
    NewPayment {
        transaction_id: Some(id.into()),
        amount,
        currency: None,
        card_number: "4111111111111111".to_string(),
        card_holder_name: "Test Holder".to_string(),
        description: None,
        merchant_id: None,
    }
}

/// Writes `rows` under the standard header.
pub fn write_actions(path: &Path, rows: &[&[&str]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(*row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Creates, processes and partially refunds `payments` payments.
///
/// Cards ending in 0000 are declined by the simulated processor, so every
/// tenth payment fails and its refund row is rejected.
pub fn generate_lifecycle_csv(path: &Path, payments: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    wtr.write_record(HEADER)?;

    for i in 1..=payments {
        let tx = format!("tx-{i:08}");
        let card = if i % 10 == 0 {
            "4111111111110000"
        } else {
            "4111111111111111"
        };
        wtr.write_record(["create", tx.as_str(), "10.00", "USD", card, "Load Test", ""])?;
        wtr.write_record(["process", tx.as_str()])?;
        wtr.write_record(["refund", tx.as_str(), "2.50"])?;
    }

    wtr.flush()?;
    Ok(())
}
