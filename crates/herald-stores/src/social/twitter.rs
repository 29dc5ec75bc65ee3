//! X/Twitter v2 posting
//!
//! Posts go to `POST /2/tweets` with a user-context OAuth 1.0a header.

use crate::error::{Result, StoreError};
use crate::social::oauth::OAuth1Signer;
use crate::traits::SocialPoster;
use crate::types::PostedMessage;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Default API endpoint
pub const TWITTER_API_URL: &str = "https://api.twitter.com";

/// Longest post the API accepts
pub const MAX_POST_LENGTH: usize = 280;

const USER_AGENT: &str = concat!("herald/", env!("CARGO_PKG_VERSION"));

/// Twitter client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// API base URL (default: https://api.twitter.com)
    pub api_url: String,
    /// Post length limit in characters
    pub max_length: usize,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_url: TWITTER_API_URL.to_string(),
            max_length: MAX_POST_LENGTH,
        }
    }
}

impl TwitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set post length limit, never above what the API accepts
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.min(MAX_POST_LENGTH);
        self
    }
}

/// Twitter API client
pub struct TwitterClient {
    config: TwitterConfig,
    signer: OAuth1Signer,
    client: Client,
}

#[derive(Debug, Serialize)]
struct CreatePost<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    detail: Option<String>,
    title: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    message: String,
}

impl ErrorResponse {
    fn message(self) -> Option<String> {
        self.detail
            .or(self.title)
            .or_else(|| self.errors.into_iter().next().map(|e| e.message))
    }
}

impl TwitterClient {
    /// Create a new client
    pub fn new(config: TwitterConfig, signer: OAuth1Signer) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            config,
            signer,
            client,
        })
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.config.api_url.trim_end_matches('/'))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(ErrorResponse::message)
            .unwrap_or(body);

        Err(StoreError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl SocialPoster for TwitterClient {
    fn name(&self) -> &str {
        "Twitter"
    }

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn post(&self, text: &str) -> Result<PostedMessage> {
        let length = text.chars().count();
        let limit = self.max_length().min(MAX_POST_LENGTH);
        if length > limit {
            return Err(StoreError::MessageTooLong { length, limit });
        }

        let url = self.tweets_url();
        let authorization = self.signer.authorize("POST", &url, &[])?;
        debug!(url = %url, "posting");

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .json(&CreatePost { text })
            .send()
            .await?;
        let body: CreatePostResponse = Self::check(response).await?.json().await?;

        info!(id = %body.data.id, "post published");

        Ok(PostedMessage {
            id: body.data.id,
            text: body.data.text.unwrap_or_else(|| text.to_string()),
        })
    }
}
