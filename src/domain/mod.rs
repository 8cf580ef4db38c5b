//! Payment vocabulary, the transition table, the refund ledger and the
//! storage/processing ports the application layer depends on.

pub mod ledger;
pub mod lifecycle;
pub mod money;
pub mod payment;
pub mod ports;
pub mod state;
