//! Application layer orchestrating lifecycle actions.
//!
//! This module defines the `LifecycleEngine`, the entry point for creating,
//! processing and refunding payments. It loads the durable record for every
//! action and serializes actions per transaction id.

pub mod engine;
