//! Social posting APIs

pub mod oauth;
pub mod twitter;

pub use oauth::OAuth1Signer;
pub use twitter::{TwitterClient, TwitterConfig};
