//! Announce command

use clap::Args;
use herald_adapters::{Credential, CredentialProvider, OAuth1Keys, TWITTER};
use herald_core::{AuthError, HeraldError};
use herald_tasks::AnnounceTask;

use super::run_single;
use crate::cli::Cli;

/// Post the release announcement for a tag
#[derive(Debug, Args)]
pub struct AnnounceCommand {
    /// Release tag or ref
    pub tag: String,

    #[arg(long, env = "HERALD_TWITTER_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    #[arg(long, env = "HERALD_TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    #[arg(long, env = "HERALD_TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "HERALD_TWITTER_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: Option<String>,

    /// Repository slug (owner/name)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Compose and print the message without posting it
    #[arg(long)]
    pub dry_run: bool,
}

impl AnnounceCommand {
    fn keys(&self) -> Result<Option<OAuth1Keys>, HeraldError> {
        match (
            &self.consumer_key,
            &self.consumer_secret,
            &self.access_token,
            &self.access_token_secret,
        ) {
            (Some(ck), Some(cs), Some(at), Some(ats)) => Ok(Some(OAuth1Keys {
                consumer_key: ck.clone(),
                consumer_secret: cs.clone(),
                access_token: at.clone(),
                access_token_secret: ats.clone(),
            })),
            (None, None, None, None) => Ok(None),
            _ => Err(AuthError::MissingCredential {
                service: TWITTER.to_string(),
                hint: "all of --consumer-key, --consumer-secret, --access-token and --access-token-secret"
                    .to_string(),
            }
            .into()),
        }
    }

    /// Execute the announce command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut credentials = CredentialProvider::new();
        if let Some(keys) = self.keys()? {
            credentials = credentials.with_credential(TWITTER, Credential::OAuth1(keys));
        }

        let task = AnnounceTask::new(credentials);
        run_single(cli, &task, &self.tag, self.repository.clone(), self.dry_run)
    }
}
