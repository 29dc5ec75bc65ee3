//! GitHub contents API
//!
//! Reads and replaces a single file on a branch, which is how a
//! GitHub Pages site is updated without a checkout.
//!
//! ## Usage
//!
//! ```ignore
//! use herald_stores::website::{GitHubConfig, GitHubContents};
//!
//! let client = GitHubContents::new(GitHubConfig::new().with_token(token))?;
//! let page = client.fetch_page(&location).await?;
//! client.update_page(&location, &new_content, &page.sha, "Release v1.0.0").await?;
//! ```

use crate::encoding::{encode_path, percent_encode};
use crate::error::{Result, StoreError};
use crate::traits::ContentStore;
use crate::types::*;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Default API endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("herald/", env!("CARGO_PKG_VERSION"));

/// GitHub contents API configuration
#[derive(Clone)]
pub struct GitHubConfig {
    /// API base URL (default: https://api.github.com)
    pub api_url: String,
    /// Token with contents write access
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GitHubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// GitHub contents API client
pub struct GitHubContents {
    config: GitHubConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    commit: CommitResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl GitHubContents {
    /// Create a new client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::ConfigurationError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn contents_url(&self, location: &PageLocation) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            location.repository,
            encode_path(&location.path)
        )
    }

    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let token = self.config.token.as_ref().ok_or_else(|| {
            StoreError::AuthenticationFailed("No GitHub token configured".to_string())
        })?;

        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28"))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        Err(StoreError::from_status(status.as_u16(), message))
    }
}

/// Decode a base64 payload that may be wrapped across lines
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact)?;
    String::from_utf8(bytes)
        .map_err(|e| StoreError::InvalidResponse(format!("page is not UTF-8: {}", e)))
}

#[async_trait]
impl ContentStore for GitHubContents {
    fn name(&self) -> &str {
        "GitHub"
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn fetch_page(&self, location: &PageLocation) -> Result<Page> {
        let url = format!(
            "{}?ref={}",
            self.contents_url(location),
            percent_encode(&location.branch)
        );
        debug!(url = %url, "fetching page");

        let response = self.request(Method::GET, &url)?.send().await?;
        let body: ContentsResponse = Self::check(response).await?.json().await?;

        if body.kind.as_deref().is_some_and(|k| k != "file") {
            return Err(StoreError::InvalidResponse(format!(
                "{} is not a file",
                location.path
            )));
        }
        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(StoreError::InvalidResponse(format!(
                    "unsupported content encoding '{}'",
                    encoding
                )));
            }
        }

        let content = decode_content(body.content.as_deref().unwrap_or_default())?;
        debug!(sha = %body.sha, bytes = content.len(), "fetched page");

        Ok(Page {
            content,
            sha: body.sha,
        })
    }

    #[instrument(skip(self, location, content), fields(location = %location))]
    async fn update_page(
        &self,
        location: &PageLocation,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<CommitInfo> {
        let url = self.contents_url(location);
        let request = UpdateRequest {
            message,
            content: BASE64.encode(content),
            sha,
            branch: &location.branch,
        };

        let response = self
            .request(Method::PUT, &url)?
            .json(&request)
            .send()
            .await?;
        let body: UpdateResponse = Self::check(response).await?.json().await?;

        info!(commit = %body.commit.sha, "page updated");

        Ok(CommitInfo {
            sha: body.commit.sha,
            url: body.commit.html_url,
        })
    }
}
