//! Dispatch command

use std::sync::Arc;
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::Args;
use herald_core::{HeraldError, ReleaseEvent, ValidationError};
use herald_tasks::{
    builtin_tasks, DispatchOptions, Dispatcher, TaskContext, TaskKind, TaskReporterRegistry,
};
use tracing::info;

use crate::cli::output::{self, ConsoleReporter};
use crate::cli::{Cli, OutputFormat};

/// Task selector for `--only`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TaskArg {
    Website,
    Image,
    Announce,
}

impl From<TaskArg> for TaskKind {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Website => TaskKind::Website,
            TaskArg::Image => TaskKind::Image,
            TaskArg::Announce => TaskKind::Announce,
        }
    }
}

/// Run every release task for a pushed tag
#[derive(Debug, Args)]
pub struct DispatchCommand {
    /// Pushed ref, e.g. refs/tags/v1.2.3
    #[arg(long = "ref", env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// Repository slug (owner/name)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Tagged commit
    #[arg(long, env = "GITHUB_SHA", hide = true)]
    pub sha: Option<String>,

    /// Go through the motions without publishing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only run these tasks
    #[arg(long, value_name = "KIND")]
    pub only: Vec<TaskArg>,

    /// Maximum tasks running at once
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub concurrency: Option<usize>,

    /// Per-task timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = RangedU64ValueParser::<u64>::new().range(1..))]
    pub timeout: Option<u64>,
}

impl DispatchCommand {
    /// Execute the dispatch command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;

        let git_ref = self
            .git_ref
            .as_deref()
            .ok_or_else(|| HeraldError::from(ValidationError::MissingRef))?;
        let mut event = ReleaseEvent::from_ref(git_ref, self.repository.clone())?;
        if let Some(sha) = &self.sha {
            event = event.with_sha(sha.as_str());
        }

        let ctx = TaskContext::new(event, config)?.with_dry_run(self.dry_run);
        info!(event = %ctx.event, dry_run = self.dry_run, "executing dispatch command");

        let mut options = DispatchOptions::from_config(&ctx.config.dispatch)
            .with_only(self.only.iter().copied().map(TaskKind::from).collect());
        if let Some(concurrency) = self.concurrency {
            options = options.with_concurrency(concurrency);
        }
        if let Some(secs) = self.timeout {
            options = options.with_timeout(Duration::from_secs(secs));
        }

        let mut reporters = TaskReporterRegistry::new();
        if cli.shows_progress() {
            reporters.register(Arc::new(ConsoleReporter));
        }

        let cwd = std::env::current_dir()?;
        let dispatcher = builtin_tasks(&cwd)
            .into_iter()
            .fold(Dispatcher::new(options, Arc::new(reporters)), |d, task| {
                d.with_task(task)
            });

        let pattern = ctx.pattern.to_string();
        let rt = tokio::runtime::Runtime::new()?;
        let report = rt.block_on(dispatcher.dispatch(ctx));

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text if cli.quiet => {}
            OutputFormat::Text if !report.triggered => output::info(&format!(
                "Tag {} does not match '{}', not triggered",
                output::tag_style().apply_to(&report.tag),
                pattern
            )),
            OutputFormat::Text => output::report(&report),
        }

        let failed = report.failed();
        if !failed.is_empty() {
            let names: Vec<_> = failed.iter().map(|r| r.kind.name()).collect();
            anyhow::bail!("release tasks failed: {}", names.join(", "));
        }

        Ok(())
    }
}
