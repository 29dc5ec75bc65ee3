//! Herald Adapters - credentials and container image publishing
//!
//! This crate resolves the secrets each release task needs and drives the
//! docker CLI to build and push the release image.

pub mod credentials;
pub mod docker;

pub use credentials::{Credential, CredentialProvider, OAuth1Keys, REGISTRY, TWITTER, WEBSITE};
pub use docker::{ImagePublisher, PublishedImage};
