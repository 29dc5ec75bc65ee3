//! Common types for store clients

use serde::{Deserialize, Serialize};

/// A file in a repository branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    /// Repository slug (`owner/name`)
    pub repository: String,
    /// Path within the repository
    pub path: String,
    /// Branch holding the page
    pub branch: String,
}

impl PageLocation {
    pub fn new(
        repository: impl Into<String>,
        path: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            branch: branch.into(),
        }
    }
}

impl std::fmt::Display for PageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.repository, self.path, self.branch)
    }
}

/// Decoded page contents plus the blob id needed to replace them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub content: String,
    pub sha: String,
}

/// Commit created by a page update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub url: Option<String>,
}

/// A post accepted by the social API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub id: String,
    pub text: String,
}
