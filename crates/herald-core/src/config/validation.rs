//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::event::TagPattern;

use super::types::{Config, MAX_ANNOUNCEMENT_LENGTH};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    TagPattern::new(&config.trigger.tag_pattern)?;
    validate_website(config)?;
    validate_image(config)?;
    validate_announce(config)?;
    validate_dispatch(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> crate::error::HeraldError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
    .into()
}

fn validate_website(config: &Config) -> Result<()> {
    let website = &config.website;
    if !website.enabled {
        return Ok(());
    }

    if !website.template.contains("{tag}") {
        return Err(invalid("website.template", "must contain {tag} placeholder"));
    }

    if website.marker_start.is_empty() || website.marker_end.is_empty() {
        return Err(invalid("website.marker_start", "markers cannot be empty"));
    }

    if website.marker_start == website.marker_end {
        return Err(invalid(
            "website.marker_end",
            "must differ from website.marker_start",
        ));
    }

    if website.path.is_empty() {
        return Err(invalid("website.path", "path cannot be empty"));
    }

    if let Some(repo) = &website.repository {
        if repo.split('/').filter(|p| !p.is_empty()).count() != 2 {
            return Err(invalid("website.repository", "must be in owner/name form"));
        }
    }

    Ok(())
}

fn validate_image(config: &Config) -> Result<()> {
    let image = &config.image;
    if !image.enabled {
        return Ok(());
    }

    if image.image.is_empty() {
        return Err(invalid("image.image", "image name cannot be empty"));
    }

    let repository = image.image.rsplit('/').next().unwrap_or_default();
    if repository.contains(':') {
        return Err(invalid(
            "image.image",
            "must not carry a tag, the release tag is appended",
        ));
    }

    Ok(())
}

fn validate_announce(config: &Config) -> Result<()> {
    let announce = &config.announce;
    if !announce.enabled {
        return Ok(());
    }

    if !announce.template.contains("{tag}") {
        return Err(invalid("announce.template", "must contain {tag} placeholder"));
    }

    if announce.max_length == 0 {
        return Err(invalid("announce.max_length", "must be greater than zero"));
    }

    if announce.max_length > MAX_ANNOUNCEMENT_LENGTH {
        return Err(invalid(
            "announce.max_length",
            format!("must be at most {}", MAX_ANNOUNCEMENT_LENGTH),
        ));
    }

    Ok(())
}

fn validate_dispatch(config: &Config) -> Result<()> {
    if config.dispatch.concurrency == 0 {
        return Err(invalid("dispatch.concurrency", "must be at least 1"));
    }

    if config.dispatch.timeout_secs == 0 {
        return Err(invalid("dispatch.timeout_secs", "must be greater than zero"));
    }

    Ok(())
}
