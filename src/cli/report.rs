//! Report formatting and printing utilities.
//!
//! Messages go to stdout, so that `--format json` output stays parseable;
//! diagnostics and the summary go to stderr in cargo style.

use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use colored::Colorize;

use super::args::OutputFormat;
use crate::{
    core::{context::UnreadableFile, data::CandidateMessage},
    issues::{Diagnostic, Severity},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print_messages(messages: &[CandidateMessage], format: OutputFormat) -> Result<()> {
    print_messages_to(messages, format, &mut io::stdout().lock())
}

pub fn print_messages_to<W: Write>(
    messages: &[CandidateMessage],
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for message in messages {
                writeln!(writer, "{}", message)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, messages)
                .context("Failed to serialize messages")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Print diagnostics sorted by location, with the offending source line
/// when `source_line` can supply it.
pub fn print_diagnostics<F>(diagnostics: &[Diagnostic], source_line: F)
where
    F: Fn(&Path, usize) -> Option<String>,
{
    print_diagnostics_to(diagnostics, source_line, &mut io::stderr().lock());
}

pub fn print_diagnostics_to<W, F>(diagnostics: &[Diagnostic], source_line: F, writer: &mut W)
where
    W: Write,
    F: Fn(&Path, usize) -> Option<String>,
{
    let mut sorted: Vec<&Diagnostic> = diagnostics.iter().collect();
    sorted.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));

    let width = sorted
        .iter()
        .map(|d| d.line.to_string().len())
        .max()
        .unwrap_or(1);

    for diagnostic in sorted {
        let severity = match diagnostic.severity() {
            Severity::Error => "error".bold().red(),
            Severity::Warning => "warning".bold().yellow(),
        };
        let _ = writeln!(
            writer,
            "{}: {}  {}",
            severity,
            diagnostic.message,
            diagnostic.kind.to_string().dimmed().cyan()
        );
        let _ = writeln!(
            writer,
            "  {} {}:{}",
            "-->".blue(),
            diagnostic.file.display(),
            diagnostic.line
        );
        if let Some(line) = source_line(&diagnostic.file, diagnostic.line) {
            let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = width);
            let _ = writeln!(
                writer,
                "{:>width$} {} {}",
                diagnostic.line.to_string().blue(),
                "|".blue(),
                line,
                width = width
            );
        }
        let _ = writeln!(writer);
    }
}

pub fn print_unreadable(files: &[UnreadableFile]) {
    print_unreadable_to(files, &mut io::stderr().lock());
}

pub fn print_unreadable_to<W: Write>(files: &[UnreadableFile], writer: &mut W) {
    for file in files {
        let _ = writeln!(writer, "{} {}", "error:".bold().red(), file.error);
    }
}

/// Counts shown at the end of an extraction run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractSummary {
    pub message_count: usize,
    pub file_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

pub fn print_summary(summary: &ExtractSummary) {
    print_summary_to(summary, &mut io::stderr().lock());
}

pub fn print_summary_to<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    let files = format!(
        "{} {}",
        summary.file_count,
        if summary.file_count == 1 { "file" } else { "files" }
    );
    let messages = format!(
        "{} {}",
        summary.message_count,
        if summary.message_count == 1 { "message" } else { "messages" }
    );

    if summary.error_count == 0 && summary.warning_count == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Extracted {} from {}", messages, files).green()
        );
        return;
    }

    let mark = if summary.error_count > 0 {
        FAILURE_MARK.red()
    } else {
        SUCCESS_MARK.yellow()
    };
    let _ = writeln!(
        writer,
        "{} Extracted {} from {} ({} {}, {} {})",
        mark,
        messages,
        files,
        summary.error_count,
        if summary.error_count == 1 { "error" } else { "errors" },
        summary.warning_count,
        if summary.warning_count == 1 { "warning" } else { "warnings" }
    );
}
