//! Task types and the task trait

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use herald_core::{Config, ReleaseEvent, Result, TagPattern};
use serde::{Deserialize, Serialize, Serializer};

/// The three release side effects
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Update the project website
    Website,
    /// Build and push the container image
    Image,
    /// Post the release announcement
    Announce,
}

impl TaskKind {
    /// Every kind, in canonical order
    pub const ALL: [TaskKind; 3] = [TaskKind::Website, TaskKind::Image, TaskKind::Announce];

    /// Stable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Image => "image",
            Self::Announce => "announce",
        }
    }

    /// Whether configuration enables this kind
    pub fn is_enabled(&self, config: &Config) -> bool {
        match self {
            Self::Website => config.website.enabled,
            Self::Image => config.image.enabled,
            Self::Announce => config.announce.enabled,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown task '{}' (expected website, image or announce)", s))
    }
}

/// Task execution status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task completed successfully
    Success,
    /// Task failed
    Failed(String),
    /// Task never started
    Skipped(String),
}

impl TaskStatus {
    /// Check if this status represents success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Result of a single task execution
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// Task that was executed
    pub kind: TaskKind,
    /// Outcome
    #[serde(flatten)]
    pub status: TaskStatus,
    /// How long the task took
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    /// What the task did, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TaskResult {
    pub fn success(kind: TaskKind, duration: Duration, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status: TaskStatus::Success,
            duration,
            detail: Some(detail.into()),
        }
    }

    pub fn failed(kind: TaskKind, duration: Duration, reason: impl Into<String>) -> Self {
        Self {
            kind,
            status: TaskStatus::Failed(reason.into()),
            duration,
            detail: None,
        }
    }

    pub fn skipped(kind: TaskKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            status: TaskStatus::Skipped(reason.into()),
            duration: Duration::ZERO,
            detail: None,
        }
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Everything a task reads. Shared read-only between tasks.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub event: ReleaseEvent,
    pub config: Config,
    pub pattern: TagPattern,
    pub dry_run: bool,
}

impl TaskContext {
    /// Build a context, compiling the configured tag pattern
    pub fn new(event: ReleaseEvent, config: Config) -> Result<Self> {
        let pattern = TagPattern::new(&config.trigger.tag_pattern)?;
        Ok(Self {
            event,
            config,
            pattern,
            dry_run: false,
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Project name for templates
    pub fn project_name(&self) -> String {
        self.config.project_name(self.event.repository())
    }
}

/// A single-shot release side effect.
///
/// `run` returns a short description of what was done. Errors carry
/// the validation, transport or auth classification.
#[async_trait]
pub trait ReleaseTask: Send + Sync {
    /// Which side effect this is
    fn kind(&self) -> TaskKind;

    /// Execute once for the event in `ctx`
    async fn run(&self, ctx: &TaskContext) -> Result<String>;
}
