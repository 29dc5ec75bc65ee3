//! Container image publisher
//!
//! Builds the release image with `docker buildx` and pushes it under the
//! release tag. The registry layer cache is keyed by the same tag.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use herald_core::config::ImageConfig;
use herald_core::error::{AuthError, Result, TransportError, ValidationError};

/// Longest tag a registry accepts
const MAX_TAG_LEN: usize = 128;

/// Outcome of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedImage {
    /// Primary reference, `image:tag`
    pub reference: String,
    /// Every reference tagged by the build
    pub tags: Vec<String>,
    /// Registry cache source, when caching is enabled
    pub cache_from: Option<String>,
    /// Whether the image left the machine
    pub pushed: bool,
}

/// Docker image publisher
pub struct ImagePublisher {
    config: ImageConfig,
    /// Docker binary
    docker: String,
    /// Directory the build runs from
    working_dir: PathBuf,
}

impl ImagePublisher {
    /// Create a publisher for an image configuration
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config,
            docker: "docker".to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    /// Use a different docker-compatible binary
    pub fn with_docker_binary(mut self, docker: impl Into<String>) -> Self {
        self.docker = docker.into();
        self
    }

    /// Run builds from this directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Registry this publisher logs in to (`None` means Docker Hub)
    pub fn registry(&self) -> Option<&str> {
        self.config.registry.as_deref()
    }

    /// Check a release tag can be used as an image tag
    pub fn validate_tag(tag: &str) -> Result<()> {
        if tag.is_empty() {
            return Err(ValidationError::EmptyTag.into());
        }

        let mut chars = tag.chars();
        let first_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

        if !first_ok || !rest_ok || tag.len() > MAX_TAG_LEN {
            return Err(ValidationError::InvalidImageTag(tag.to_string()).into());
        }

        Ok(())
    }

    /// `image:tag`
    pub fn image_ref(&self, tag: &str) -> String {
        format!("{}:{}", self.config.image, tag)
    }

    /// Registry cache reference for a tag
    pub fn cache_ref(&self, tag: &str) -> Option<String> {
        self.config.cache.then(|| self.image_ref(tag))
    }

    /// All references the build tags, release tag first
    pub fn tag_refs(&self, tag: &str) -> Vec<String> {
        let mut refs = vec![self.image_ref(tag)];
        for extra in &self.config.extra_tags {
            let reference = self.image_ref(extra);
            if !refs.contains(&reference) {
                refs.push(reference);
            }
        }
        refs
    }

    /// Arguments for `docker buildx build`
    pub fn build_args(&self, tag: &str, push: bool) -> Vec<String> {
        let mut args: Vec<String> = vec!["buildx".into(), "build".into()];

        if let Some(dockerfile) = &self.config.dockerfile {
            args.push("--file".into());
            args.push(dockerfile.display().to_string());
        }

        if let Some(target) = &self.config.target {
            args.push("--target".into());
            args.push(target.clone());
        }

        for reference in self.tag_refs(tag) {
            args.push("--tag".into());
            args.push(reference);
        }

        if let Some(cache) = self.cache_ref(tag) {
            args.push("--cache-from".into());
            args.push(format!("type=registry,ref={}", cache));
            args.push("--cache-to".into());
            args.push("type=inline".into());
        }

        if !self.config.platforms.is_empty() {
            args.push("--platform".into());
            args.push(self.config.platforms.join(","));
        }

        for (key, value) in &self.config.build_args {
            args.push("--build-arg".into());
            args.push(format!("{}={}", key, value));
        }

        if push {
            args.push("--push".into());
        }

        args.push(self.config.context.display().to_string());
        args
    }

    /// Log in to the registry, passing the password on stdin
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let mut cmd = Command::new(&self.docker);
        cmd.args(["login", "--username", username, "--password-stdin"]);
        if let Some(registry) = self.registry() {
            cmd.arg(registry);
        }

        let mut child = cmd
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_failed("docker login", e.to_string()))?;

        // The pipe closes when `stdin` drops. A write error means the
        // process already exited; its status says why.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(password.as_bytes()).await {
                debug!(error = %e, "could not hand password to docker login");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| command_failed("docker login", e.to_string()))?;

        if !output.status.success() {
            return Err(AuthError::Rejected {
                service: "registry".to_string(),
                reason: tail(&output.stderr),
            }
            .into());
        }

        debug!("registry login succeeded");
        Ok(())
    }

    /// Build the image and, unless `dry_run`, push it.
    ///
    /// `login` carries the registry username and password; without it the
    /// push relies on whatever session the docker client already has.
    #[instrument(skip(self, login))]
    pub async fn publish(
        &self,
        tag: &str,
        login: Option<(&str, &str)>,
        dry_run: bool,
    ) -> Result<PublishedImage> {
        Self::validate_tag(tag)?;

        let push = !dry_run;
        if push {
            if let Some((username, password)) = login {
                self.login(username, password).await?;
            }
        }

        let args = self.build_args(tag, push);
        info!(tag, push, "building image");
        debug!(command = %format!("{} {}", self.docker, args.join(" ")), "docker invocation");

        self.run(&args, "docker buildx build").await?;

        let published = PublishedImage {
            reference: self.image_ref(tag),
            tags: self.tag_refs(tag),
            cache_from: self.cache_ref(tag),
            pushed: push,
        };
        info!(reference = %published.reference, pushed = push, "image published");
        Ok(published)
    }

    async fn run(&self, args: &[String], label: &str) -> Result<()> {
        let output = Command::new(&self.docker)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| command_failed(label, e.to_string()))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(command_failed(
                label,
                format!("exited with code {}: {}", code, tail(&output.stderr)),
            ));
        }

        Ok(())
    }
}

fn command_failed(command: &str, reason: String) -> herald_core::HeraldError {
    TransportError::CommandFailed {
        command: command.to_string(),
        reason,
    }
    .into()
}

/// Last few lines of command output, enough to show the error
fn tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(10);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::HeraldError;

    fn publisher() -> ImagePublisher {
        ImagePublisher::new(ImageConfig::default())
    }

    #[test]
    fn test_image_ref_uses_release_tag() {
        let publisher = publisher();
        assert_eq!(publisher.image_ref("v2.0.0"), "cl-notebook:v2.0.0");
        assert_eq!(
            publisher.cache_ref("v2.0.0").as_deref(),
            Some("cl-notebook:v2.0.0")
        );
    }

    #[test]
    fn test_build_args_push() {
        let args = publisher().build_args("v2.0.0", true);
        let joined = args.join(" ");

        assert!(joined.starts_with("buildx build"));
        assert!(joined.contains("--tag cl-notebook:v2.0.0"));
        assert!(joined.contains("--cache-from type=registry,ref=cl-notebook:v2.0.0"));
        assert!(joined.contains("--cache-to type=inline"));
        assert!(joined.contains("--push"));
        assert_eq!(args.last().map(String::as_str), Some("."));
    }

    #[test]
    fn test_build_args_full_config() {
        let mut config = ImageConfig::default();
        config.image = "ghcr.io/inaimathi/cl-notebook".to_string();
        config.dockerfile = Some(PathBuf::from("build/Dockerfile"));
        config.target = Some("release".to_string());
        config.platforms = vec!["linux/amd64".to_string(), "linux/arm64".to_string()];
        config.extra_tags = vec!["latest".to_string()];
        config.build_args.insert("SBCL_VERSION".to_string(), "2.4.0".to_string());
        config.cache = false;

        let args = ImagePublisher::new(config).build_args("v1.0.0", false);
        let joined = args.join(" ");

        assert!(joined.contains("--file build/Dockerfile"));
        assert!(joined.contains("--target release"));
        assert!(joined.contains("--tag ghcr.io/inaimathi/cl-notebook:v1.0.0"));
        assert!(joined.contains("--tag ghcr.io/inaimathi/cl-notebook:latest"));
        assert!(joined.contains("--platform linux/amd64,linux/arm64"));
        assert!(joined.contains("--build-arg SBCL_VERSION=2.4.0"));
        assert!(!joined.contains("--cache-from"));
        assert!(!joined.contains("--push"));
    }

    #[test]
    fn test_extra_tag_equal_to_release_not_duplicated() {
        let mut config = ImageConfig::default();
        config.extra_tags = vec!["v1.0.0".to_string(), "latest".to_string()];
        let refs = ImagePublisher::new(config).tag_refs("v1.0.0");
        assert_eq!(refs, vec!["cl-notebook:v1.0.0", "cl-notebook:latest"]);
    }

    #[test]
    fn test_validate_tag() {
        assert!(ImagePublisher::validate_tag("v1.2.3").is_ok());
        assert!(ImagePublisher::validate_tag("v2.0.0-rc.1").is_ok());

        assert!(matches!(
            ImagePublisher::validate_tag(""),
            Err(HeraldError::Validation(ValidationError::EmptyTag))
        ));
        for bad in ["v1+build", "-v1", ".v1", "v1/x"] {
            assert!(matches!(
                ImagePublisher::validate_tag(bad),
                Err(HeraldError::Validation(ValidationError::InvalidImageTag(_)))
            ));
        }
        let long = format!("v{}", "1".repeat(MAX_TAG_LEN));
        assert!(ImagePublisher::validate_tag(&long).is_err());
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        let text = (1..=15).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let tail = tail(text.as_bytes());
        assert!(tail.starts_with("6\n"));
        assert!(tail.ends_with("15"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_publish_with_succeeding_binary() {
        let publisher = publisher().with_docker_binary("true");
        let published = publisher
            .publish("v2.0.0", Some(("user", "pass")), false)
            .await
            .unwrap();

        assert_eq!(published.reference, "cl-notebook:v2.0.0");
        assert_eq!(published.cache_from.as_deref(), Some("cl-notebook:v2.0.0"));
        assert!(published.pushed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_login_is_auth_error() {
        let publisher = publisher().with_docker_binary("false");
        let err = publisher
            .publish("v2.0.0", Some(("user", "pass")), false)
            .await
            .unwrap_err();
        assert!(matches!(err, HeraldError::Auth(AuthError::Rejected { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_build_is_transport_error() {
        let publisher = publisher().with_docker_binary("false");
        let err = publisher.publish("v2.0.0", None, true).await.unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Transport(TransportError::CommandFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_transport_error() {
        let publisher = publisher().with_docker_binary("herald-no-such-docker-binary");
        let err = publisher.publish("v2.0.0", None, false).await.unwrap_err();
        assert!(matches!(err, HeraldError::Transport(_)));
    }
}
