//! Release events and the tag pattern that triggers them

use std::env;
use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result, ValidationError};

/// Literal prefix of tag refs
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Pattern a tag must match for the pipeline to run
pub const DEFAULT_TAG_PATTERN: &str = "v*";

/// Compiled glob for release tags.
///
/// `*` does not cross `/`, matching how CI tag filters treat it.
#[derive(Debug, Clone)]
pub struct TagPattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl TagPattern {
    /// Compile a tag pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "trigger.tag_pattern".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// Whether a tag matches
    pub fn matches(&self, tag: &str) -> bool {
        !tag.is_empty() && self.matcher.is_match(tag)
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// A pushed release tag. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    git_ref: String,
    tag: String,
    repository: Option<String>,
    sha: Option<String>,
}

impl ReleaseEvent {
    /// Build an event from a ref such as `refs/tags/v1.2.3`.
    ///
    /// A bare tag (`v1.2.3`) is accepted as well. Refs outside
    /// `refs/tags/` are rejected.
    pub fn from_ref(git_ref: &str, repository: Option<String>) -> Result<Self> {
        let git_ref = git_ref.trim();

        let tag = match git_ref.strip_prefix(TAG_REF_PREFIX) {
            Some(tag) => tag,
            None if git_ref.starts_with("refs/") => {
                return Err(ValidationError::NotATagRef(git_ref.to_string()).into());
            }
            None => git_ref,
        };

        if tag.is_empty() {
            return Err(ValidationError::EmptyTag.into());
        }

        debug!(git_ref, tag, "parsed release ref");

        Ok(Self {
            git_ref: format!("{}{}", TAG_REF_PREFIX, tag),
            tag: tag.to_string(),
            repository: repository.filter(|r| !r.is_empty()),
            sha: None,
        })
    }

    /// Build an event from the CI environment (`GITHUB_REF`, `GITHUB_REPOSITORY`, `GITHUB_SHA`)
    pub fn from_env() -> Result<Self> {
        let git_ref = env::var("GITHUB_REF").map_err(|_| ValidationError::MissingRef)?;
        let repository = env::var("GITHUB_REPOSITORY").ok();
        let event = Self::from_ref(&git_ref, repository)?;

        Ok(match env::var("GITHUB_SHA") {
            Ok(sha) if !sha.is_empty() => event.with_sha(sha),
            _ => event,
        })
    }

    /// Attach the tagged commit
    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    /// Full ref, always prefixed with `refs/tags/`
    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// Tag name with the ref prefix stripped
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Repository slug (`owner/name`)
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Tagged commit id
    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// Whether this event triggers the pipeline
    pub fn is_triggered_by(&self, pattern: &TagPattern) -> bool {
        pattern.matches(&self.tag)
    }

    /// Fail with a validation error unless the tag matches
    pub fn ensure_matches(&self, pattern: &TagPattern) -> Result<()> {
        if self.is_triggered_by(pattern) {
            Ok(())
        } else {
            Err(ValidationError::TagMismatch {
                tag: self.tag.clone(),
                pattern: pattern.as_str().to_string(),
            }
            .into())
        }
    }

    /// Tag parsed as semver, ignoring a leading `v`
    pub fn version(&self) -> Option<semver::Version> {
        let raw = self.tag.strip_prefix('v').unwrap_or(&self.tag);
        semver::Version::parse(raw).ok()
    }

    /// Whether the tag carries a pre-release component
    pub fn is_prerelease(&self) -> bool {
        self.version().is_some_and(|v| !v.pre.is_empty())
    }

    /// Substitute `{tag}`, `{version}`, `{repository}` and `{name}` in a template
    pub fn render(&self, template: &str, name: &str) -> String {
        let version = self
            .version()
            .map(|v| v.to_string())
            .unwrap_or_else(|| self.tag.trim_start_matches('v').to_string());

        template
            .replace("{tag}", &self.tag)
            .replace("{version}", &version)
            .replace("{repository}", self.repository().unwrap_or_default())
            .replace("{name}", name)
    }
}

impl fmt::Display for ReleaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repository {
            Some(repo) => write!(f, "{}@{}", repo, self.tag),
            None => f.write_str(&self.tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeraldError;

    fn pattern() -> TagPattern {
        TagPattern::new(DEFAULT_TAG_PATTERN).unwrap()
    }

    #[test]
    fn test_ref_prefix_is_stripped() {
        let event = ReleaseEvent::from_ref("refs/tags/v1.2.3", None).unwrap();
        assert_eq!(event.tag(), "v1.2.3");
        assert_eq!(event.git_ref(), "refs/tags/v1.2.3");
    }

    #[test]
    fn test_bare_tag_accepted() {
        let event = ReleaseEvent::from_ref("v2.0.0", Some("inaimathi/cl-notebook".into())).unwrap();
        assert_eq!(event.tag(), "v2.0.0");
        assert_eq!(event.git_ref(), "refs/tags/v2.0.0");
        assert_eq!(event.repository(), Some("inaimathi/cl-notebook"));
    }

    #[test]
    fn test_branch_ref_rejected() {
        let err = ReleaseEvent::from_ref("refs/heads/main", None).unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Validation(ValidationError::NotATagRef(_))
        ));
    }

    #[test]
    fn test_empty_tag_rejected() {
        for input in ["", "refs/tags/", "   "] {
            let err = ReleaseEvent::from_ref(input, None).unwrap_err();
            assert!(matches!(err, HeraldError::Validation(ValidationError::EmptyTag)));
        }
    }

    #[test]
    fn test_pattern_matches_version_tags() {
        let pattern = pattern();
        for tag in ["v1", "v1.2.3", "v2.0.0-rc.1", "version-next"] {
            assert!(pattern.matches(tag), "{tag} should match");
        }
        for tag in ["1.2.3", "release-v1", "", "V1.0.0", "v1/hotfix"] {
            assert!(!pattern.matches(tag), "{tag} should not match");
        }
    }

    #[test]
    fn test_ensure_matches() {
        let pattern = pattern();
        let good = ReleaseEvent::from_ref("refs/tags/v0.9.0", None).unwrap();
        assert!(good.ensure_matches(&pattern).is_ok());

        let bad = ReleaseEvent::from_ref("refs/tags/nightly", None).unwrap();
        let err = bad.ensure_matches(&pattern).unwrap_err();
        assert!(matches!(
            err,
            HeraldError::Validation(ValidationError::TagMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = TagPattern::new("v[").unwrap_err();
        assert!(matches!(err, HeraldError::Config(_)));
    }

    #[test]
    fn test_version_and_prerelease() {
        let stable = ReleaseEvent::from_ref("v1.4.0", None).unwrap();
        assert_eq!(stable.version(), Some(semver::Version::new(1, 4, 0)));
        assert!(!stable.is_prerelease());

        let rc = ReleaseEvent::from_ref("v2.0.0-rc.1", None).unwrap();
        assert!(rc.is_prerelease());

        let odd = ReleaseEvent::from_ref("vNext", None).unwrap();
        assert_eq!(odd.version(), None);
        assert!(!odd.is_prerelease());
    }

    #[test]
    fn test_render() {
        let event =
            ReleaseEvent::from_ref("refs/tags/v2.0.0", Some("inaimathi/cl-notebook".into()))
                .unwrap();
        let text = event.render(
            "{name} {tag} ({version}) https://github.com/{repository}/releases/tag/{tag}",
            "cl-notebook",
        );
        assert_eq!(
            text,
            "cl-notebook v2.0.0 (2.0.0) https://github.com/inaimathi/cl-notebook/releases/tag/v2.0.0"
        );
    }

    #[test]
    fn test_display() {
        let event = ReleaseEvent::from_ref("v1.0.0", Some("o/r".into())).unwrap();
        assert_eq!(event.to_string(), "o/r@v1.0.0");
        let bare = ReleaseEvent::from_ref("v1.0.0", None).unwrap();
        assert_eq!(bare.to_string(), "v1.0.0");
    }
}
