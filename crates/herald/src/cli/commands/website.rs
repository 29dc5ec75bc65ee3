//! Website command

use clap::Args;
use herald_adapters::{Credential, CredentialProvider, WEBSITE};
use herald_tasks::WebsiteTask;

use super::run_single;
use crate::cli::Cli;

/// Update the website for a tag
#[derive(Debug, Args)]
pub struct WebsiteCommand {
    /// Release tag or ref
    pub tag: String,

    /// Content API token
    #[arg(long, env = "HERALD_WEBSITE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository slug (owner/name)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Fetch and rewrite the page without committing it
    #[arg(long)]
    pub dry_run: bool,
}

impl WebsiteCommand {
    /// Execute the website command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut credentials = CredentialProvider::new();
        if let Some(token) = &self.token {
            credentials = credentials.with_credential(WEBSITE, Credential::Token(token.clone()));
        }

        let task = WebsiteTask::new(credentials);
        run_single(cli, &task, &self.tag, self.repository.clone(), self.dry_run)
    }
}
