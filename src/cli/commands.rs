//! CLI command implementations.
//!
//! Contains the logic for each CLI command.

use crate::cli::output::{
    ConcatReport, OutputFormat, ReadReport, format_concat_report, format_read_report,
};
use crate::cli::parser::{Cli, Commands, input_path};
use crate::core::ByteArray;
use crate::error::{CommandError, Result};
use crate::io::{
    ByteSource, ChunkedReader, DEFAULT_CHUNK_SIZE, FileSource, ReadOutcome, StreamSource,
    read_all, sanitize_utf8, truncate_at_boundary,
};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Read {
            path,
            chunk_size,
            timeout_ms,
            show_text,
            max_text,
        } => {
            let options = ReadOptions {
                chunk_size: *chunk_size,
                timeout: timeout_ms.map(Duration::from_millis),
                show_text: *show_text,
                max_text: *max_text,
            };
            cmd_read(input_path(path.as_ref()), &options, format).await
        }
        Commands::Concat { path } => cmd_concat(input_path(path.as_ref()), format).await,
    }
}

/// Options for the `read` command.
#[derive(Debug, Clone)]
struct ReadOptions {
    chunk_size: usize,
    timeout: Option<Duration>,
    show_text: bool,
    max_text: usize,
}

async fn cmd_read(
    path: Option<&Path>,
    options: &ReadOptions,
    format: OutputFormat,
) -> Result<String> {
    let (label, outcome) = match path {
        Some(path) => {
            let mut source = FileSource::open(path).await?;
            let label = source.path().to_string();
            (label, read_with_timeout(&mut source, options).await?)
        }
        None => {
            let mut source = StreamSource::new(tokio::io::stdin());
            ("stdin".to_string(), read_with_timeout(&mut source, options).await?)
        }
    };

    let (text, replacements) = if options.show_text {
        let sanitized = sanitize_utf8(&outcome.bytes);
        let text = truncate_at_boundary(&sanitized.text, options.max_text).to_string();
        (Some(text), Some(sanitized.replacements))
    } else {
        (None, None)
    };

    let report = ReadReport {
        source: label,
        bytes: outcome.bytes.len(),
        reads: outcome.reads,
        chunk_size: options.chunk_size,
        stop: outcome.stop,
        error: outcome.error.as_ref().map(ToString::to_string),
        text,
        replacements,
    };
    Ok(format_read_report(&report, format))
}

/// Runs a chunked read, cancelling it once `options.timeout` elapses.
async fn read_with_timeout<S>(source: &mut S, options: &ReadOptions) -> Result<ReadOutcome>
where
    S: ByteSource + ?Sized,
{
    let reader = ChunkedReader::new(source).chunk_size(options.chunk_size);
    let Some(timeout) = options.timeout else {
        return reader.read_all().await;
    };

    let (tx, rx) = watch::channel(false);
    let timer = tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        debug!(?timeout, "read timeout elapsed; cancelling");
        let _ = tx.send(true);
    });
    let outcome = reader.cancel_on(rx).read_all().await;
    timer.abort();
    outcome
}

async fn cmd_concat(path: Option<&Path>, format: OutputFormat) -> Result<String> {
    let outcome = match path {
        Some(path) => read_all(&mut FileSource::open(path).await?, DEFAULT_CHUNK_SIZE).await?,
        None => {
            let mut source = StreamSource::new(tokio::io::stdin());
            read_all(&mut source, DEFAULT_CHUNK_SIZE).await?
        }
    };
    let input = outcome.into_result().map_err(|partial| partial.error)?;

    let parts: Value = serde_json::from_slice(&input)?;
    let Value::Array(parts) = parts else {
        return Err(CommandError::InvalidArgument(
            "expected a JSON array of parts".to_string(),
        )
        .into());
    };

    let mut array = ByteArray::from_values(&parts)?;
    let bytes = array.freeze()?;
    let sanitized = sanitize_utf8(&bytes);
    let report = ConcatReport {
        parts: parts.len(),
        bytes: bytes.len(),
        text: sanitized.text.into_owned(),
        replacements: sanitized.replacements,
    };
    Ok(format_concat_report(&report, format))
}
