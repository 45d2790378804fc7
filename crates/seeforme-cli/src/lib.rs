//! Command-line host for seeforme.
//!
//! The binary is the composition root: it loads settings, wires the real
//! adapters (file store, snapshot camera, llama-server, espeak-ng) into the
//! coordination core, and drives the scan controller from the terminal.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used only by the binary entry point
use dotenvy as _;
use tracing_subscriber as _;

pub mod adapters;
pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod paths;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
