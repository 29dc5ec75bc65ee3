//! Error types for Herald

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using HeraldError
pub type Result<T> = std::result::Result<T, HeraldError>;

/// Main error type for Herald operations
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Malformed input (tag, ref, message)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote service or local tool unreachable or failing
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Missing or rejected credentials
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Input validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Tag is empty
    #[error("Release tag is empty")]
    EmptyTag,

    /// Tag does not match the release pattern
    #[error("Tag '{tag}' does not match release pattern '{pattern}'")]
    TagMismatch { tag: String, pattern: String },

    /// No ref was given and none is available from the environment
    #[error("No release ref given and GITHUB_REF is not set")]
    MissingRef,

    /// Ref points somewhere other than refs/tags/
    #[error("Ref '{0}' is not a tag ref")]
    NotATagRef(String),

    /// Tag cannot be used as a container image tag
    #[error("'{0}' is not a valid image tag")]
    InvalidImageTag(String),

    /// Website page does not contain the release markers
    #[error("Release markers not found in {path}: expected '{start}' followed by '{end}'")]
    MarkersNotFound {
        path: String,
        start: String,
        end: String,
    },

    /// Announcement text is not acceptable
    #[error("Invalid announcement: {0}")]
    InvalidMessage(String),
}

/// Transport-level errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Service could not be reached
    #[error("{service} unreachable: {reason}")]
    Unreachable { service: String, reason: String },

    /// Service answered with an error status
    #[error("{service} returned {status}: {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    /// Unexpected response body
    #[error("{service} sent an unexpected response: {reason}")]
    InvalidResponse { service: String, reason: String },

    /// Command execution failed
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },
}

/// Credential errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential could be resolved
    #[error("Missing credential for {service}: set {hint}")]
    MissingCredential { service: String, hint: String },

    /// Credential has the wrong shape for the service
    #[error("Credential for {service} has the wrong type, expected {expected}")]
    WrongKind { service: String, expected: String },

    /// Service rejected the credential
    #[error("Authentication failed for {service}: {reason}")]
    Rejected { service: String, reason: String },
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Process exit codes, one per error family
pub mod exit_code {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG: i32 = 2;
    /// Malformed input
    pub const VALIDATION: i32 = 3;
    /// Network, API or tool failure
    pub const TRANSPORT: i32 = 4;
    /// Missing or rejected credential
    pub const AUTH: i32 = 5;
}

impl HeraldError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => exit_code::VALIDATION,
            Self::Transport(_) => exit_code::TRANSPORT,
            Self::Auth(_) => exit_code::AUTH,
            Self::Config(_) | Self::Toml(_) => exit_code::CONFIG,
            Self::Io(_) | Self::Json(_) | Self::Other(_) => exit_code::ERROR,
        }
    }
}
