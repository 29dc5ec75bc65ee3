//! CLI commands

mod announce;
mod dispatch;
mod image;
mod init;
mod website;
mod workflow;

pub use announce::AnnounceCommand;
pub use dispatch::{DispatchCommand, TaskArg};
pub use image::ImageCommand;
pub use init::InitCommand;
pub use website::WebsiteCommand;
pub use workflow::WorkflowCommand;

use std::time::Instant;

use herald_core::ReleaseEvent;
use herald_tasks::{ReleaseTask, TaskContext, TaskResult};
use tracing::info;

use crate::cli::{output, Cli, OutputFormat};

/// Run one task on its own, outside the dispatcher
fn run_single(
    cli: &Cli,
    task: &dyn ReleaseTask,
    tag: &str,
    repository: Option<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let kind = task.kind();
    info!(task = %kind, tag, dry_run, "executing task command");

    let config = cli.load_config()?;
    let event = ReleaseEvent::from_ref(tag, repository)?;
    let ctx = TaskContext::new(event, config)?.with_dry_run(dry_run);

    if cli.shows_progress() {
        output::info(&format!(
            "Running {} for {}{}",
            kind,
            output::tag_style().apply_to(ctx.event.tag()),
            if dry_run { " (dry run)" } else { "" }
        ));
    }

    let rt = tokio::runtime::Runtime::new()?;
    let start = Instant::now();
    let outcome = rt.block_on(task.run(&ctx));
    let duration = start.elapsed();

    let result = match &outcome {
        Ok(detail) => TaskResult::success(kind, duration, detail.clone()),
        Err(e) => TaskResult::failed(kind, duration, e.to_string()),
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text if !cli.quiet && outcome.is_ok() => {
            println!("{}", output::task_line(&result))
        }
        OutputFormat::Text => {}
    }

    outcome.map(|_| ()).map_err(Into::into)
}
