//! Herald Core - shared types for the release-notification pipeline
//!
//! This crate provides the release event model, the error taxonomy,
//! configuration loading, and the CI workflow template.

pub mod config;
pub mod error;
pub mod event;
pub mod templates;

pub use config::Config;
pub use error::{AuthError, ConfigError, HeraldError, Result, TransportError, ValidationError};
pub use event::{ReleaseEvent, TagPattern, DEFAULT_TAG_PATTERN, TAG_REF_PREFIX};
pub use templates::{CITemplate, GitHubActionsTemplate, TemplateOptions};
