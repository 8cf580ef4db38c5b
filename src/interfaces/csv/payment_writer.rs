use crate::domain::payment::Payment;
use crate::domain::state::PaymentState;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Flat CSV view of a payment.
#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    tx: &'a str,
    status: PaymentState,
    amount: Decimal,
    refunded: Decimal,
    currency: &'a str,
    card: &'a str,
    failure_reason: Option<&'a str>,
}

impl<'a> From<&'a Payment> for PaymentRow<'a> {
    fn from(payment: &'a Payment) -> Self {
        Self {
            tx: payment.transaction_id.as_str(),
            status: payment.status,
            amount: payment.amount.value().normalize(),
            refunded: payment.refunded_amount.value().normalize(),
            currency: &payment.currency,
            card: &payment.card_number,
            failure_reason: payment.failure_reason.as_deref(),
        }
    }
}

const HEADER: [&str; 7] = [
    "tx",
    "status",
    "amount",
    "refunded",
    "currency",
    "card",
    "failure_reason",
];

/// Writes the final state of payments as CSV.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    /// Writes a header followed by one row per payment, then flushes.
    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a Payment>,
    ) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for payment in payments {
            self.writer.serialize(PaymentRow::from(payment))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::payment::NewPayment;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn payment(id: &str) -> Payment {
        Payment::create(
            NewPayment {
                transaction_id: Some(id.into()),
                amount: dec!(100.00),
                currency: None,
                card_number: "4111111111110000".to_string(),
                card_holder_name: "Ada Lovelace".to_string(),
                description: None,
                merchant_id: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_write_empty_still_has_header() {
        let mut out = Vec::new();
        PaymentWriter::new(&mut out)
            .write_payments(Vec::<&Payment>::new())
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "tx,status,amount,refunded,currency,card,failure_reason\n"
        );
    }

    #[test]
    fn test_write_payments() {
        let mut refunded = payment("tx-1");
        refunded.status = PaymentState::PartiallyRefunded;
        refunded.refunded_amount = Money::new(dec!(40.50));

        let mut failed = payment("tx-2");
        failed.status = PaymentState::Failed;
        failed.failure_reason = Some("Insufficient funds".to_string());

        let mut out = Vec::new();
        PaymentWriter::new(&mut out)
            .write_payments([&refunded, &failed])
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "tx,status,amount,refunded,currency,card,failure_reason",
                "tx-1,PARTIALLY_REFUNDED,100,40.5,USD,**** **** **** 0000,",
                "tx-2,FAILED,100,0,USD,**** **** **** 0000,Insufficient funds",
            ]
        );
    }
}
