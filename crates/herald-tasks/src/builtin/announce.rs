//! Announcer: composes the release post and publishes it

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use herald_adapters::{CredentialProvider, TWITTER};
use herald_core::config::{AnnounceConfig, MAX_ANNOUNCEMENT_LENGTH};
use herald_core::{ReleaseEvent, Result, ValidationError};
use herald_stores::{OAuth1Signer, SocialPoster, TwitterClient, TwitterConfig};
use tracing::{info, instrument};

use super::lock;
use crate::task::{ReleaseTask, TaskContext, TaskKind};

const PRERELEASE_SUFFIX: &str = " (pre-release)";

/// Render the announcement for an event.
///
/// Pre-releases get a marker after the first mention of the tag. The
/// result must mention the tag and fit in `max_length` characters, capped
/// at 280.
pub fn compose_announcement(
    event: &ReleaseEvent,
    config: &AnnounceConfig,
    name: &str,
) -> Result<String> {
    let template = if event.is_prerelease() {
        config
            .template
            .replacen("{tag}", &format!("{{tag}}{}", PRERELEASE_SUFFIX), 1)
    } else {
        config.template.clone()
    };

    let message = event.render(&template, name).trim().to_string();

    if !message.contains(event.tag()) {
        return Err(ValidationError::InvalidMessage(format!(
            "message does not mention {}",
            event.tag()
        ))
        .into());
    }

    ensure_fits(&message, config.max_length.min(MAX_ANNOUNCEMENT_LENGTH))?;
    Ok(message)
}

fn ensure_fits(message: &str, limit: usize) -> Result<()> {
    let length = message.chars().count();
    if length > limit {
        return Err(ValidationError::InvalidMessage(format!(
            "{} characters, limit is {}",
            length, limit
        ))
        .into());
    }
    Ok(())
}

/// Posts the release announcement
pub struct AnnounceTask {
    credentials: Mutex<CredentialProvider>,
    poster: Option<Arc<dyn SocialPoster>>,
}

impl AnnounceTask {
    pub fn new(credentials: CredentialProvider) -> Self {
        Self {
            credentials: Mutex::new(credentials),
            poster: None,
        }
    }

    /// Use a specific poster instead of the Twitter client
    pub fn with_poster(mut self, poster: Arc<dyn SocialPoster>) -> Self {
        self.poster = Some(poster);
        self
    }

    fn poster(&self, config: &AnnounceConfig) -> Result<Arc<dyn SocialPoster>> {
        let keys = lock(&self.credentials)?.require_oauth1(TWITTER)?;

        if let Some(poster) = &self.poster {
            return Ok(poster.clone());
        }

        let signer = OAuth1Signer::new(
            keys.consumer_key,
            keys.consumer_secret,
            keys.access_token,
            keys.access_token_secret,
        );
        let twitter = TwitterConfig::new()
            .with_api_url(&config.api_url)
            .with_max_length(config.max_length);
        let client = TwitterClient::new(twitter, signer).map_err(|e| e.into_herald(TWITTER))?;
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl ReleaseTask for AnnounceTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Announce
    }

    #[instrument(skip(self, ctx), fields(tag = %ctx.event.tag()))]
    async fn run(&self, ctx: &TaskContext) -> Result<String> {
        ctx.event.ensure_matches(&ctx.pattern)?;

        let config = &ctx.config.announce;
        let message = compose_announcement(&ctx.event, config, &ctx.project_name())?;

        if ctx.dry_run {
            info!(message = %message, "dry run, announcement not posted");
            return Ok(format!("would post: {}", message));
        }

        let poster = self.poster(config)?;
        ensure_fits(&message, poster.max_length())?;
        let posted = poster
            .post(&message)
            .await
            .map_err(|e| e.into_herald(TWITTER))?;

        Ok(format!("posted {} to {}", posted.id, poster.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{Config, HeraldError};
    use herald_stores::{PostedMessage, StoreError};
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakePoster {
        fail_with: Option<u16>,
        limit: Option<usize>,
        posts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SocialPoster for FakePoster {
        fn name(&self) -> &str {
            "fake"
        }

        fn max_length(&self) -> usize {
            self.limit.unwrap_or(280)
        }

        async fn post(&self, text: &str) -> herald_stores::error::Result<PostedMessage> {
            if let Some(status) = self.fail_with {
                return Err(StoreError::from_status(status, "nope"));
            }
            self.posts.lock().unwrap().push(text.to_string());
            Ok(PostedMessage {
                id: "42".to_string(),
                text: text.to_string(),
            })
        }
    }

    fn keys() -> CredentialProvider {
        CredentialProvider::from_vars(HashMap::from([
            ("TWITTER_CONSUMER_KEY".to_string(), "ck".to_string()),
            ("TWITTER_CONSUMER_SECRET".to_string(), "cs".to_string()),
            ("TWITTER_ACCESS_TOKEN".to_string(), "at".to_string()),
            ("TWITTER_ACCESS_TOKEN_SECRET".to_string(), "ats".to_string()),
        ]))
    }

    fn event(tag: &str) -> ReleaseEvent {
        ReleaseEvent::from_ref(tag, Some("inaimathi/cl-notebook".into())).unwrap()
    }

    fn context(tag: &str) -> TaskContext {
        TaskContext::new(event(tag), Config::default()).unwrap()
    }

    #[test]
    fn test_compose_default() {
        let message =
            compose_announcement(&event("v2.0.0"), &AnnounceConfig::default(), "cl-notebook")
                .unwrap();
        assert_eq!(
            message,
            "cl-notebook v2.0.0 has been released! https://github.com/inaimathi/cl-notebook/releases/tag/v2.0.0"
        );
    }

    #[test]
    fn test_compose_prerelease() {
        let message =
            compose_announcement(&event("v2.1.0-rc.1"), &AnnounceConfig::default(), "cl-notebook")
                .unwrap();
        assert!(message.starts_with("cl-notebook v2.1.0-rc.1 (pre-release) has been released!"));
        assert!(message.ends_with("/releases/tag/v2.1.0-rc.1"));
    }

    #[test]
    fn test_compose_too_long() {
        let config = AnnounceConfig {
            template: format!("{{tag}} {}", "x".repeat(300)),
            ..Default::default()
        };
        let err = compose_announcement(&event("v2.0.0"), &config, "n").unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Validation(ValidationError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_compose_caps_configured_limit() {
        let config = AnnounceConfig {
            template: format!("{{tag}} {}", "x".repeat(300)),
            max_length: 500,
            ..Default::default()
        };
        let err = compose_announcement(&event("v2.0.0"), &config, "n").unwrap_err();
        match err {
            HeraldError::Validation(ValidationError::InvalidMessage(reason)) => {
                assert_eq!(reason, "307 characters, limit is 280");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_compose_counts_characters_not_bytes() {
        let config = AnnounceConfig {
            template: format!("{{tag}} {}", "é".repeat(270)),
            ..Default::default()
        };
        assert!(compose_announcement(&event("v2.0.0"), &config, "n").is_ok());
    }

    #[tokio::test]
    async fn test_posts_message_with_tag() {
        let poster = Arc::new(FakePoster::default());
        let task = AnnounceTask::new(keys()).with_poster(poster.clone());

        let detail = task.run(&context("refs/tags/v2.0.0")).await.unwrap();
        assert_eq!(detail, "posted 42 to fake");

        let posts = poster.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].contains("v2.0.0"));
    }

    #[tokio::test]
    async fn test_poster_limit_is_respected() {
        let poster = Arc::new(FakePoster {
            limit: Some(40),
            ..Default::default()
        });
        let task = AnnounceTask::new(keys()).with_poster(poster.clone());

        let err = task.run(&context("v2.0.0")).await.unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Validation(ValidationError::InvalidMessage(_))
        ));
        assert!(poster.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_needs_no_credentials() {
        let poster = Arc::new(FakePoster::default());
        let task = AnnounceTask::new(CredentialProvider::from_vars(HashMap::new()))
            .with_poster(poster.clone());

        let detail = task
            .run(&context("v2.0.0").with_dry_run(true))
            .await
            .unwrap();
        assert!(detail.starts_with("would post: "));
        assert!(poster.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_keys_are_auth_error() {
        let vars = HashMap::from([("TWITTER_CONSUMER_KEY".to_string(), "ck".to_string())]);
        let task = AnnounceTask::new(CredentialProvider::from_vars(vars))
            .with_poster(Arc::new(FakePoster::default()));

        let err = task.run(&context("v2.0.0")).await.unwrap_err();
        assert!(matches!(err, HeraldError::Auth(_)));
    }

    #[tokio::test]
    async fn test_api_errors_are_classified() {
        let cases = [(401, true), (500, false)];
        for (status, auth) in cases {
            let poster = Arc::new(FakePoster {
                fail_with: Some(status),
                ..Default::default()
            });
            let task = AnnounceTask::new(keys()).with_poster(poster);

            let err = task.run(&context("v2.0.0")).await.unwrap_err();
            assert_eq!(matches!(err, HeraldError::Auth(_)), auth, "status {status}");
            assert_eq!(matches!(err, HeraldError::Transport(_)), !auth, "status {status}");
        }
    }
}
