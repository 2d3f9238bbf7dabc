//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::error::Error;
use crate::io::StopReason;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Summary of a chunked read.
#[derive(Debug, Clone, Serialize)]
pub struct ReadReport {
    /// Where the bytes came from (a path or `stdin`).
    pub source: String,
    /// Number of bytes accumulated.
    pub bytes: usize,
    /// Number of chunk requests issued.
    pub reads: usize,
    /// Chunk size used.
    pub chunk_size: usize,
    /// Why reading stopped.
    pub stop: StopReason,
    /// Error that ended the read early, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Sanitized text view, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Number of invalid UTF-8 sequences replaced in `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacements: Option<usize>,
}

/// Summary of a concatenation.
#[derive(Debug, Clone, Serialize)]
pub struct ConcatReport {
    /// Number of parts appended.
    pub parts: usize,
    /// Resulting length in bytes.
    pub bytes: usize,
    /// Sanitized text view of the result.
    pub text: String,
    /// Number of invalid UTF-8 sequences replaced in `text`.
    pub replacements: usize,
}

/// Formats a read report.
#[must_use]
pub fn format_read_report(report: &ReadReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_read_report_text(report),
        OutputFormat::Json => format_json(report),
    }
}

fn format_read_report_text(report: &ReadReport) -> String {
    let mut output = String::new();
    if report.error.is_some() {
        output.push_str("Read stopped early\n");
    } else {
        output.push_str("Read complete\n");
    }
    let _ = writeln!(output, "  Source:      {}", report.source);
    let _ = writeln!(
        output,
        "  Bytes:       {} ({})",
        report.bytes,
        format_size(report.bytes)
    );
    let _ = writeln!(output, "  Reads:       {}", report.reads);
    let _ = writeln!(output, "  Chunk size:  {}", report.chunk_size);
    let _ = writeln!(output, "  Stopped by:  {}", report.stop);
    if let Some(error) = &report.error {
        let _ = writeln!(output, "  Error:       {error}");
    }
    if let Some(text) = &report.text {
        if let Some(count) = report.replacements.filter(|&n| n > 0) {
            let _ = writeln!(output, "  Replaced:    {count} invalid sequence(s)");
        }
        output.push_str("\n--- text ---\n");
        output.push_str(text);
        if !text.ends_with('\n') {
            output.push('\n');
        }
    }
    output
}

/// Formats a concatenation report.
#[must_use]
pub fn format_concat_report(report: &ConcatReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(
                output,
                "Concatenated {} part(s) into {} byte(s)",
                report.parts, report.bytes
            );
            if report.replacements > 0 {
                let _ = writeln!(
                    output,
                    "  Replaced:    {} invalid sequence(s)",
                    report.replacements
                );
            }
            output.push_str(&report.text);
            output.push('\n');
            output
        }
        OutputFormat::Json => format_json(report),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => err.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorBody {
                error: String,
                kind: &'static str,
            }
            let kind = match err {
                Error::Buffer(_) => "buffer",
                Error::Read(_) => "read",
                Error::Io(_) => "io",
                Error::Command(_) => "command",
            };
            format_json(&ErrorBody {
                error: err.to_string(),
                kind,
            })
        }
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
