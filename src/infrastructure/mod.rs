//! Adapters for the domain ports: payment stores and outcome providers.

pub mod in_memory;
pub mod processor;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
