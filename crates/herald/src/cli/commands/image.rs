//! Image command

use clap::Args;
use herald_adapters::{Credential, CredentialProvider, REGISTRY};
use herald_core::{AuthError, HeraldError};
use herald_tasks::ImageTask;

use super::run_single;
use crate::cli::Cli;

/// Build and push the container image for a tag
#[derive(Debug, Args)]
pub struct ImageCommand {
    /// Release tag or ref
    pub tag: String,

    /// Registry username
    #[arg(long, env = "HERALD_REGISTRY_USERNAME")]
    pub username: Option<String>,

    /// Registry password, passed to docker on stdin
    #[arg(long, env = "HERALD_REGISTRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Repository slug (owner/name)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Docker client binary
    #[arg(long, default_value = "docker")]
    pub docker: String,

    /// Build without logging in or pushing
    #[arg(long)]
    pub dry_run: bool,
}

impl ImageCommand {
    /// Execute the image command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut credentials = CredentialProvider::new();
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                credentials = credentials.with_credential(
                    REGISTRY,
                    Credential::UsernamePassword {
                        username: username.clone(),
                        password: password.clone(),
                    },
                );
            }
            (None, None) => {}
            _ => {
                return Err(HeraldError::from(AuthError::MissingCredential {
                    service: REGISTRY.to_string(),
                    hint: "both --username and --password".to_string(),
                })
                .into());
            }
        }

        let task = ImageTask::new(credentials)
            .with_docker_binary(&self.docker)
            .with_working_dir(std::env::current_dir()?);
        run_single(cli, &task, &self.tag, self.repository.clone(), self.dry_run)
    }
}
