//! CSV boundary of the command line tool.

pub mod action_reader;
pub mod payment_writer;
