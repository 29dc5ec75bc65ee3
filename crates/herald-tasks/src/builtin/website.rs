//! Website updater: rewrites the release block of a page through the contents API

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use herald_adapters::{CredentialProvider, WEBSITE};
use herald_core::{ConfigError, Result, ValidationError};
use herald_stores::{ContentStore, GitHubConfig, GitHubContents, PageLocation};
use tracing::{info, instrument};

use super::lock;
use crate::task::{ReleaseTask, TaskContext, TaskKind};

/// Replace the text between `start` and `end` with `block`.
///
/// Only the first start marker and the first end marker after it count.
/// Everything outside the markers is left byte-for-byte intact.
pub fn splice_release_block(
    content: &str,
    start: &str,
    end: &str,
    block: &str,
    path: &str,
) -> Result<String> {
    let not_found = || ValidationError::MarkersNotFound {
        path: path.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    };

    let inner_start = content.find(start).ok_or_else(not_found)? + start.len();
    let inner_end = content[inner_start..]
        .find(end)
        .map(|i| inner_start + i)
        .ok_or_else(not_found)?;

    let mut spliced = String::with_capacity(content.len() + block.len());
    spliced.push_str(&content[..inner_start]);
    spliced.push_str(block);
    spliced.push_str(&content[inner_end..]);
    Ok(spliced)
}

/// Updates the project website
pub struct WebsiteTask {
    credentials: Mutex<CredentialProvider>,
    store: Option<Arc<dyn ContentStore>>,
}

impl WebsiteTask {
    pub fn new(credentials: CredentialProvider) -> Self {
        Self {
            credentials: Mutex::new(credentials),
            store: None,
        }
    }

    /// Use a specific content store instead of the GitHub client
    pub fn with_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn store(&self, ctx: &TaskContext) -> Result<Arc<dyn ContentStore>> {
        let token = lock(&self.credentials)?.require_token(WEBSITE)?;

        if let Some(store) = &self.store {
            return Ok(store.clone());
        }

        let config = GitHubConfig::new()
            .with_api_url(&ctx.config.website.api_url)
            .with_token(token);
        let client = GitHubContents::new(config).map_err(|e| e.into_herald(WEBSITE))?;
        Ok(Arc::new(client))
    }

    fn location(ctx: &TaskContext) -> Result<PageLocation> {
        let website = &ctx.config.website;
        let repository = website
            .repository
            .as_deref()
            .or(ctx.event.repository())
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "website.repository".to_string(),
                message: "not configured and GITHUB_REPOSITORY is not set".to_string(),
            })?;

        Ok(PageLocation::new(repository, &website.path, &website.branch))
    }
}

#[async_trait]
impl ReleaseTask for WebsiteTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Website
    }

    #[instrument(skip(self, ctx), fields(tag = %ctx.event.tag()))]
    async fn run(&self, ctx: &TaskContext) -> Result<String> {
        ctx.event.ensure_matches(&ctx.pattern)?;

        let website = &ctx.config.website;
        let location = Self::location(ctx)?;
        let store = self.store(ctx)?;
        let name = ctx.project_name();

        let page = store
            .fetch_page(&location)
            .await
            .map_err(|e| e.into_herald(WEBSITE))?;

        let block = ctx.event.render(&website.template, &name);
        let updated = splice_release_block(
            &page.content,
            &website.marker_start,
            &website.marker_end,
            &block,
            &location.path,
        )?;

        if ctx.dry_run {
            info!(location = %location, "dry run, page not written");
            return Ok(format!("would update {} on {}", location.path, location.branch));
        }

        let message = ctx.event.render(&website.commit_message, &name);
        let commit = store
            .update_page(&location, &updated, &page.sha, &message)
            .await
            .map_err(|e| e.into_herald(WEBSITE))?;

        Ok(format!(
            "updated {} on {} ({})",
            location.path,
            location.branch,
            short_sha(&commit.sha)
        ))
    }
}

/// First seven characters of a commit id
fn short_sha(sha: &str) -> String {
    sha.chars().take(7).collect()
}
