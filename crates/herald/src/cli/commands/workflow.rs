//! Workflow command

use std::path::PathBuf;

use clap::Args;
use herald_core::{CITemplate, GitHubActionsTemplate, TemplateOptions};
use tracing::info;

use crate::cli::output;
use crate::cli::Cli;

/// Generate the GitHub Actions workflow that runs on release tags
#[derive(Debug, Args)]
pub struct WorkflowCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, conflicts_with = "write")]
    pub output: Option<PathBuf>,

    /// Write to .github/workflows/release.yml in the working directory
    #[arg(long)]
    pub write: bool,

    /// Overwrite an existing workflow file
    #[arg(long)]
    pub force: bool,

    /// Runner label for every job
    #[arg(long)]
    pub runner: Option<String>,
}

impl WorkflowCommand {
    /// Execute the workflow command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let template = GitHubActionsTemplate::new();

        let mut options = TemplateOptions::new()
            .with_tag_pattern(&config.trigger.tag_pattern)
            .with_jobs(
                config.website.enabled,
                config.image.enabled,
                config.announce.enabled,
            );
        if let Some(runner) = &self.runner {
            options = options.with_runner(runner);
        }

        let cwd = std::env::current_dir()?;
        let target = match (&self.output, self.write) {
            (Some(path), _) => path.clone(),
            (None, true) => cwd.join(template.config_path()),
            (None, false) => {
                print!("{}", template.generate(&options)?);
                return Ok(());
            }
        };

        if target.exists() && !self.force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite.",
                target.display()
            );
        }

        info!(path = %target.display(), platform = template.platform_name(), "writing workflow");

        let written = if self.write {
            template.write_to(&cwd, &options)?
        } else {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, template.generate(&options)?)?;
            target
        };

        if !cli.quiet {
            output::success(&format!(
                "Wrote {} workflow to {}",
                template.platform_name(),
                output::path_style().apply_to(written.display())
            ));
        }

        Ok(())
    }
}
