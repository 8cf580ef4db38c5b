//! Card payment lifecycle engine.
//!
//! Payments move through a fixed transition table
//! (`PENDING -> PROCESSING -> COMPLETED/FAILED`, then full or partial
//! refunds) while a per-payment refund ledger guarantees that refunds never
//! exceed the original charge.
//!
//! - [`domain`] - states, events, the transition table, the refund ledger and ports
//! - [`application`] - the `LifecycleEngine` orchestrating load, validate and save
//! - [`infrastructure`] - in-memory and RocksDB stores, processing outcome providers
//! - [`interfaces`] - CSV input and output for the command line tool

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
