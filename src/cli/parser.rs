//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::io::DEFAULT_CHUNK_SIZE;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Read byte streams in chunks and assemble byte arrays.
#[derive(Parser, Debug)]
#[command(name = "bytearray-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a file or stdin to the end in fixed-size chunks.
    ///
    /// Reports the bytes read, the number of chunk requests, and why
    /// reading stopped. A read that fails part way still reports the
    /// bytes obtained before the failure.
    Read {
        /// File to read; stdin when omitted or `-`.
        path: Option<PathBuf>,

        /// Bytes requested per chunk.
        #[arg(long, env = "BYTEARRAY_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Cancel the read after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Include a text view of the contents.
        #[arg(long)]
        show_text: bool,

        /// Maximum bytes of text to show.
        #[arg(long, default_value = "3000")]
        max_text: usize,
    },

    /// Build a byte array from a JSON list of parts.
    ///
    /// Each part is a string (appended as UTF-8) or an array of integers
    /// in 0..=255 (appended as raw bytes).
    Concat {
        /// JSON file to read; stdin when omitted or `-`.
        path: Option<PathBuf>,
    },
}

/// Returns the path to read, or `None` for stdin.
#[must_use]
pub fn input_path(path: Option<&PathBuf>) -> Option<&Path> {
    path.map(PathBuf::as_path)
        .filter(|p| p.as_os_str() != "-")
}
