//! CLI layer for bytearray-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! reading byte streams in chunks and assembling byte arrays.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
