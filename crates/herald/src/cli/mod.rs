//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use herald_core::config::{load_config, load_config_or_default};
use herald_core::Config;
use tracing::debug;

use commands::{
    AnnounceCommand, DispatchCommand, ImageCommand, InitCommand, WebsiteCommand, WorkflowCommand,
};

/// Herald - publish a release to the website, the registry and social media
#[derive(Debug, Parser)]
#[command(name = "herald")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search upwards from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every release task for a pushed tag
    Dispatch(DispatchCommand),

    /// Update the website for a tag
    Website(WebsiteCommand),

    /// Build and push the container image for a tag
    Image(ImageCommand),

    /// Post the release announcement for a tag
    Announce(AnnounceCommand),

    /// Generate the CI workflow that triggers on release tags
    Workflow(WorkflowCommand),

    /// Write a default configuration file
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Dispatch(ref cmd) => cmd.execute(&self),
            Commands::Website(ref cmd) => cmd.execute(&self),
            Commands::Image(ref cmd) => cmd.execute(&self),
            Commands::Announce(ref cmd) => cmd.execute(&self),
            Commands::Workflow(ref cmd) => cmd.execute(&self),
            Commands::Init(ref cmd) => cmd.execute(&self),
        }
    }

    /// Load the configuration named by `--config`, or search for one
    pub fn load_config(&self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            return Ok(load_config(path)?);
        }

        let cwd = std::env::current_dir()?;
        let (config, path) = load_config_or_default(&cwd)?;
        match path {
            Some(path) => debug!(path = %path.display(), "loaded configuration"),
            None if !self.quiet && self.format == OutputFormat::Text => {
                output::warning("No herald configuration found, using defaults")
            }
            None => {}
        }
        Ok(config)
    }

    /// Whether human-readable progress should be printed
    pub fn shows_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
