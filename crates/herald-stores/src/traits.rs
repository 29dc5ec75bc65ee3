//! Store client traits

use crate::error::Result;
use crate::types::*;

/// A service that stores website pages
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Get the service name
    fn name(&self) -> &str;

    /// Fetch a page and its current blob id
    async fn fetch_page(&self, location: &PageLocation) -> Result<Page>;

    /// Replace a page, guarded by the blob id it was fetched at
    async fn update_page(
        &self,
        location: &PageLocation,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<CommitInfo>;
}

/// A service that accepts short public posts
#[async_trait::async_trait]
pub trait SocialPoster: Send + Sync {
    /// Get the service name
    fn name(&self) -> &str;

    /// Longest text the service accepts, in characters
    fn max_length(&self) -> usize;

    /// Publish a post
    async fn post(&self, text: &str) -> Result<PostedMessage>;
}
