//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "herald.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "herald.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".herald.toml",
        ".herald.yaml",
    ]
}

/// Default configuration rendered as YAML
pub fn default_config_yaml() -> crate::error::Result<String> {
    serde_yaml::to_string(&Config::default())
        .map_err(|e| crate::error::ConfigError::YamlError(e).into())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Herald configuration

[trigger]
tag_pattern = "v*"

[website]
enabled = true
api_url = "https://api.github.com"
path = "index.html"
branch = "gh-pages"
marker_start = "<!-- herald:release:start -->"
marker_end = "<!-- herald:release:end -->"
template = '<a href="https://github.com/{repository}/releases/tag/{tag}">{tag}</a>'
commit_message = "Release {tag}"

[image]
enabled = true
image = "cl-notebook"
context = "."
cache = true

[announce]
enabled = true
api_url = "https://api.twitter.com"
template = "{name} {tag} has been released! https://github.com/{repository}/releases/tag/{tag}"
max_length = 280

[dispatch]
concurrency = 3
timeout_secs = 3600
"#;
