//! Logharbor CLI library.
//!
//! Exposes argument parsing, command handlers and output formatting so
//! they can be exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
