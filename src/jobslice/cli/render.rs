//! Terminal output. Everything here writes to stdout; diagnostics go through
//! `tracing` to stderr instead.

use colored::*;
use jobslice::api::{CmdMessage, MessageLevel};
use jobslice::commands::{StatusReport, SubmitReport};
use jobslice::launcher::LaunchOutcome;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", format_message(message));
    }
}

fn format_message(message: &CmdMessage) -> ColoredString {
    match message.level {
        MessageLevel::Info => message.content.dimmed(),
        MessageLevel::Success => message.content.green(),
        MessageLevel::Warning => message.content.yellow(),
        MessageLevel::Error => message.content.red(),
    }
}

/// One line per chunk: `[outcome] command`.
pub fn print_submit_report(report: &SubmitReport) {
    for chunk in &report.chunks {
        let tag = format!("[{}]", chunk.outcome);
        let tag = match chunk.outcome {
            LaunchOutcome::Success => tag.green(),
            LaunchOutcome::Skipped => tag.cyan(),
            _ => tag.red(),
        };
        println!("{} {}", tag, chunk.invocation);
    }
}

pub fn print_status(report: &StatusReport) {
    for (label, value) in status_lines(report) {
        println!("{} {}", format!("{:<10}", label).bold(), value);
    }
}

fn status_lines(report: &StatusReport) -> Vec<(&'static str, String)> {
    let manifest = match (report.manifest_present, report.total) {
        (false, _) => "missing".to_string(),
        (true, None) => "empty".to_string(),
        (true, Some(total)) => format!("{} item(s)", total),
    };
    let script = if report.script_present {
        "present"
    } else {
        "missing"
    };
    vec![
        ("manifest", manifest),
        ("script", script.to_string()),
        ("input", report.input_items.to_string()),
        ("output", report.output_items.to_string()),
        ("errors", report.failed_items.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let report = StatusReport {
            manifest_present: true,
            total: Some(12),
            script_present: false,
            input_items: 12,
            output_items: 3,
            failed_items: 1,
        };
        let lines = status_lines(&report);
        assert_eq!(lines[0], ("manifest", "12 item(s)".to_string()));
        assert_eq!(lines[1], ("script", "missing".to_string()));
        assert_eq!(lines[4], ("errors", "1".to_string()));
    }

    #[test]
    fn test_status_lines_unprepared() {
        let lines = status_lines(&StatusReport::default());
        assert_eq!(lines[0].1, "missing");
    }
}
