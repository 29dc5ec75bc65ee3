//! CI templates - generate the workflow that runs the release pipeline on tag pushes

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::event::DEFAULT_TAG_PATTERN;

mod github;

pub use github::GitHubActionsTemplate;

/// Template generation options
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Workflow name
    pub workflow_name: String,
    /// Tag glob that triggers the workflow
    pub tag_pattern: String,
    /// Runner label
    pub runner: String,
    /// Shell command that installs the herald binary
    pub install_command: String,
    /// Include the website job
    pub include_website: bool,
    /// Include the image job
    pub include_image: bool,
    /// Include the announce job
    pub include_announce: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateOptions {
    /// Create new template options with defaults
    pub fn new() -> Self {
        Self {
            workflow_name: "Release".to_string(),
            tag_pattern: DEFAULT_TAG_PATTERN.to_string(),
            runner: "ubuntu-latest".to_string(),
            install_command: "cargo install herald --locked".to_string(),
            include_website: true,
            include_image: true,
            include_announce: true,
        }
    }

    /// Set the trigger pattern
    pub fn with_tag_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.tag_pattern = pattern.into();
        self
    }

    /// Set the runner label
    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        self.runner = runner.into();
        self
    }

    /// Select which jobs are emitted
    pub fn with_jobs(mut self, website: bool, image: bool, announce: bool) -> Self {
        self.include_website = website;
        self.include_image = image;
        self.include_announce = announce;
        self
    }
}

/// CI template generator trait
pub trait CITemplate: Send + Sync {
    /// Get the CI platform name
    fn platform_name(&self) -> &'static str;

    /// Get the configuration file path (relative to repo root)
    fn config_path(&self) -> &'static str;

    /// Generate the template content
    fn generate(&self, options: &TemplateOptions) -> Result<String>;

    /// Write the template below `base_dir`, returning the written path
    fn write_to(&self, base_dir: &Path, options: &TemplateOptions) -> Result<PathBuf> {
        let content = self.generate(options)?;
        let path = base_dir.join(self.config_path());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, content)?;
        Ok(path)
    }
}
