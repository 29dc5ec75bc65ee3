//! Image publisher task

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use herald_adapters::{CredentialProvider, ImagePublisher, REGISTRY};
use herald_core::Result;
use tracing::{instrument, warn};

use super::lock;
use crate::task::{ReleaseTask, TaskContext, TaskKind};

/// Builds the container image for a tag and pushes it
pub struct ImageTask {
    credentials: Mutex<CredentialProvider>,
    docker: String,
    working_dir: PathBuf,
}

impl ImageTask {
    pub fn new(credentials: CredentialProvider) -> Self {
        Self {
            credentials: Mutex::new(credentials),
            docker: "docker".to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    /// Use a different docker client binary
    pub fn with_docker_binary(mut self, docker: impl Into<String>) -> Self {
        self.docker = docker.into();
        self
    }

    /// Directory the build context is resolved against
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Registry login, if credentials are available
    fn login(&self) -> Result<Option<(String, String)>> {
        let mut credentials = lock(&self.credentials)?;
        if !credentials.has_credentials(REGISTRY) {
            warn!(
                hint = %credentials.hint(REGISTRY),
                "no registry credentials, pushing with the existing docker session"
            );
            return Ok(None);
        }
        credentials.require_login(REGISTRY).map(Some)
    }
}

#[async_trait]
impl ReleaseTask for ImageTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Image
    }

    #[instrument(skip(self, ctx), fields(tag = %ctx.event.tag()))]
    async fn run(&self, ctx: &TaskContext) -> Result<String> {
        ctx.event.ensure_matches(&ctx.pattern)?;

        let publisher = ImagePublisher::new(ctx.config.image.clone())
            .with_docker_binary(&self.docker)
            .with_working_dir(&self.working_dir);

        let login = if ctx.dry_run { None } else { self.login()? };
        let login = login.as_ref().map(|(u, p)| (u.as_str(), p.as_str()));

        let image = publisher
            .publish(ctx.event.tag(), login, ctx.dry_run)
            .await?;

        let cache = image
            .cache_from
            .as_deref()
            .map(|c| format!(", cache {}", c))
            .unwrap_or_default();

        Ok(if image.pushed {
            format!("pushed {}{}", image.tags.join(" "), cache)
        } else {
            format!("built {} (not pushed){}", image.reference, cache)
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use herald_core::{Config, HeraldError, ReleaseEvent, TransportError, ValidationError};
    use std::collections::HashMap;

    fn context(tag: &str) -> TaskContext {
        let event = ReleaseEvent::from_ref(tag, None).unwrap();
        TaskContext::new(event, Config::default()).unwrap()
    }

    fn login_vars() -> CredentialProvider {
        CredentialProvider::from_vars(HashMap::from([
            ("DOCKER_USERNAME".to_string(), "inaimathi".to_string()),
            ("DOCKER_PASSWORD".to_string(), "hunter2".to_string()),
        ]))
    }

    #[tokio::test]
    async fn test_pushes_image_tagged_with_release() {
        let task = ImageTask::new(login_vars()).with_docker_binary("true");

        let detail = task.run(&context("refs/tags/v2.0.0")).await.unwrap();
        assert_eq!(detail, "pushed cl-notebook:v2.0.0, cache cl-notebook:v2.0.0");
    }

    #[tokio::test]
    async fn test_push_without_credentials_uses_existing_session() {
        let task = ImageTask::new(CredentialProvider::from_vars(HashMap::new()))
            .with_docker_binary("true");

        let detail = task.run(&context("v1.2.3")).await.unwrap();
        assert!(detail.starts_with("pushed cl-notebook:v1.2.3"));
    }

    #[tokio::test]
    async fn test_dry_run_builds_only() {
        let task = ImageTask::new(login_vars()).with_docker_binary("true");

        let detail = task
            .run(&context("v2.0.0").with_dry_run(true))
            .await
            .unwrap();
        assert!(detail.starts_with("built cl-notebook:v2.0.0 (not pushed)"));
    }

    #[tokio::test]
    async fn test_login_rejected_is_auth_error() {
        let task = ImageTask::new(login_vars()).with_docker_binary("false");

        let err = task.run(&context("v2.0.0")).await.unwrap_err();
        assert!(matches!(err, HeraldError::Auth(_)));
    }

    #[tokio::test]
    async fn test_build_failure_is_transport_error() {
        let task = ImageTask::new(CredentialProvider::from_vars(HashMap::new()))
            .with_docker_binary("false");

        let err = task.run(&context("v2.0.0")).await.unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Transport(TransportError::CommandFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unusable_image_tag() {
        let task = ImageTask::new(login_vars()).with_docker_binary("true");

        let err = task.run(&context("v2.0.0+build.5")).await.unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Validation(ValidationError::InvalidImageTag(_))
        ));
    }
}
