//! Output formatting utilities

use console::{style, Style};
use herald_tasks::{DispatchReport, TaskEvent, TaskReporter, TaskResult, TaskStatus};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Style for tags
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// One line per task result
pub fn task_line(result: &TaskResult) -> String {
    let name = format!("{:<8}", result.kind.name());
    match &result.status {
        TaskStatus::Success => format!(
            "{} {} {}",
            style("✓").green().bold(),
            style(name).bold(),
            result.detail.as_deref().unwrap_or_default()
        ),
        TaskStatus::Failed(reason) => format!(
            "{} {} {}",
            style("✗").red().bold(),
            style(name).bold(),
            style(reason).red()
        ),
        TaskStatus::Skipped(reason) => format!(
            "{} {} {}",
            style("-").dim(),
            style(name).dim(),
            style(reason).dim()
        ),
    }
}

/// Print a dispatch report as text
pub fn report(report: &DispatchReport) {
    for result in &report.results {
        println!("{}", task_line(result));
    }

    let failed = report.failed().len();
    let attempted = report
        .results
        .iter()
        .filter(|r| !r.status.is_skipped())
        .count();

    println!();
    if failed == 0 {
        success(&format!(
            "Release {} dispatched ({} task(s))",
            tag_style().apply_to(&report.tag),
            attempted
        ));
    } else {
        error(&format!(
            "{} of {} task(s) failed for {}",
            failed,
            attempted,
            tag_style().apply_to(&report.tag)
        ));
    }
}

/// Prints dispatch progress as tasks start
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl TaskReporter for ConsoleReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::DispatchStarted { tag, .. } => {
                info(&format!("Dispatching release {}", tag_style().apply_to(tag)));
            }
            TaskEvent::Started { kind } => {
                println!("  {} {}", style("started").dim(), kind);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_tasks::TaskKind;
    use std::time::Duration;

    #[test]
    fn test_task_line_mentions_kind_and_detail() {
        console::set_colors_enabled(false);

        let ok = TaskResult::success(TaskKind::Image, Duration::ZERO, "pushed cl-notebook:v2.0.0");
        assert_eq!(task_line(&ok), "✓ image    pushed cl-notebook:v2.0.0");

        let failed = TaskResult::failed(TaskKind::Announce, Duration::ZERO, "401");
        assert_eq!(task_line(&failed), "✗ announce 401");

        let skipped = TaskResult::skipped(TaskKind::Website, "not selected");
        assert_eq!(task_line(&skipped), "- website  not selected");
    }
}
