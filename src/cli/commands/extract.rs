use anyhow::Result;

use super::super::{
    args::ExtractCommand,
    exit_status::ExitStatus,
    report::{ExtractSummary, print_diagnostics, print_messages, print_summary, print_unreadable},
};
use crate::{core::context::ExtractContext, issues::Severity};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let ctx = ExtractContext::new(&cmd.common)?;

    let sources = ctx.sources();
    let report = ctx.report();

    print_messages(&report.messages, cmd.format)?;
    print_unreadable(&sources.unreadable);
    print_diagnostics(&report.diagnostics, |path, line| {
        ctx.source_line(path, line).map(String::from)
    });

    let error_count = report
        .diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Error)
        .count()
        + sources.unreadable.len();
    let warning_count = report.diagnostics.len() + sources.unreadable.len() - error_count;

    let summary = ExtractSummary {
        message_count: report.messages.len(),
        file_count: sources.inputs.len(),
        error_count,
        warning_count,
    };
    print_summary(&summary);

    Ok(ExitStatus::from(&summary))
}
