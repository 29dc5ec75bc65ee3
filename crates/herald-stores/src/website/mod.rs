//! Website content APIs

pub mod github;

pub use github::{GitHubConfig, GitHubContents};
