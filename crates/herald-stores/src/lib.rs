//! Content and social API clients for Herald
//!
//! - **website**: the GitHub contents API, used to rewrite a page on a
//!   Pages branch
//! - **social**: X/Twitter v2 posting with OAuth 1.0a signing
//!
//! Clients sit behind the [`ContentStore`] and [`SocialPoster`] traits
//! so tasks can be driven against fakes.

pub mod encoding;
pub mod error;
pub mod social;
pub mod traits;
pub mod types;
pub mod website;

#[cfg(test)]
mod testing;

pub use error::StoreError;
pub use social::{OAuth1Signer, TwitterClient, TwitterConfig};
pub use traits::{ContentStore, SocialPoster};
pub use types::*;
pub use website::{GitHubConfig, GitHubContents};
