//! Configuration types

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::event::DEFAULT_TAG_PATTERN;

/// Main configuration for Herald
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name used in announcements (defaults to the repository name)
    pub name: Option<String>,

    /// Which tags start the pipeline
    pub trigger: TriggerConfig,

    /// Website updater
    pub website: WebsiteConfig,

    /// Container image publisher
    pub image: ImageConfig,

    /// Social announcer
    pub announce: AnnounceConfig,

    /// Dispatcher behaviour
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Project name, falling back to the last segment of the repository slug
    pub fn project_name(&self, repository: Option<&str>) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        repository
            .and_then(|r| r.rsplit('/').next())
            .filter(|n| !n.is_empty())
            .unwrap_or("release")
            .to_string()
    }
}

/// Trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Glob a pushed tag must match
    pub tag_pattern: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            tag_pattern: DEFAULT_TAG_PATTERN.to_string(),
        }
    }
}

/// Website updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    /// Whether the task runs
    pub enabled: bool,

    /// Content API base URL
    pub api_url: String,

    /// Repository hosting the site (defaults to the released repository)
    pub repository: Option<String>,

    /// Page file inside the site repository
    pub path: String,

    /// Branch the site is served from
    pub branch: String,

    /// Marker opening the release block
    pub marker_start: String,

    /// Marker closing the release block
    pub marker_end: String,

    /// Release block template
    pub template: String,

    /// Commit message template
    pub commit_message: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.github.com".to_string(),
            repository: None,
            path: "index.html".to_string(),
            branch: "gh-pages".to_string(),
            marker_start: "<!-- herald:release:start -->".to_string(),
            marker_end: "<!-- herald:release:end -->".to_string(),
            template:
                r#"<a href="https://github.com/{repository}/releases/tag/{tag}">{tag}</a>"#
                    .to_string(),
            commit_message: "Release {tag}".to_string(),
        }
    }
}

/// Container image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Whether the task runs
    pub enabled: bool,

    /// Image repository, e.g. `cl-notebook` or `ghcr.io/org/app`
    pub image: String,

    /// Registry to log in to (Docker Hub when unset)
    pub registry: Option<String>,

    /// Build context
    pub context: PathBuf,

    /// Dockerfile path (relative to the working directory)
    pub dockerfile: Option<PathBuf>,

    /// Build stage to export
    pub target: Option<String>,

    /// Target platforms for multi-arch builds
    pub platforms: Vec<String>,

    /// Extra tags pushed alongside the release tag
    pub extra_tags: Vec<String>,

    /// Build arguments
    pub build_args: BTreeMap<String, String>,

    /// Reuse and refresh the registry layer cache
    pub cache: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: "cl-notebook".to_string(),
            registry: None,
            context: PathBuf::from("."),
            dockerfile: None,
            target: None,
            platforms: Vec::new(),
            extra_tags: Vec::new(),
            build_args: BTreeMap::new(),
            cache: true,
        }
    }
}

/// Longest announcement the social API accepts, in characters
pub const MAX_ANNOUNCEMENT_LENGTH: usize = 280;

/// Announcer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Whether the task runs
    pub enabled: bool,

    /// Social API base URL
    pub api_url: String,

    /// Message template
    pub template: String,

    /// Maximum message length in characters, at most 280
    pub max_length: usize,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.twitter.com".to_string(),
            template:
                "{name} {tag} has been released! https://github.com/{repository}/releases/tag/{tag}"
                    .to_string(),
            max_length: MAX_ANNOUNCEMENT_LENGTH,
        }
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum tasks running at once
    pub concurrency: usize,

    /// Per-task timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            timeout_secs: 3600,
        }
    }
}
