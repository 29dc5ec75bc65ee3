//! Credential resolution for the release services
//!
//! Secrets are read from the environment the CI runner injects. They are
//! cached for the lifetime of the provider, never written anywhere, and
//! redacted from `Debug` output.

use std::collections::HashMap;
use std::env;
use std::fmt;

use tracing::{debug, instrument, warn};

use herald_core::error::{AuthError, Result};

/// Service name for the website content API
pub const WEBSITE: &str = "website";

/// Service name for the container registry
pub const REGISTRY: &str = "registry";

/// Service name for the social posting API
pub const TWITTER: &str = "twitter";

/// Where variables are looked up
enum VarSource {
    Process,
    Map(HashMap<String, String>),
}

/// Credential provider for the release services
pub struct CredentialProvider {
    /// Environment variable prefix for credentials
    env_prefix: String,
    /// Variable lookup
    source: VarSource,
    /// Cached credentials
    cache: HashMap<String, Credential>,
}

impl CredentialProvider {
    /// Create a provider reading the process environment
    pub fn new() -> Self {
        Self {
            env_prefix: "HERALD".to_string(),
            source: VarSource::Process,
            cache: HashMap::new(),
        }
    }

    /// Create a provider reading from a fixed set of variables
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self {
            source: VarSource::Map(vars),
            ..Self::new()
        }
    }

    /// Pin a credential for a service, e.g. one passed on the command line
    pub fn with_credential(mut self, service: &str, credential: Credential) -> Self {
        self.cache.insert(service.to_string(), credential);
        self
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.source {
            VarSource::Process => env::var(name).ok(),
            VarSource::Map(vars) => vars.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Get credentials for a service
    #[instrument(skip(self))]
    pub fn get(&mut self, service: &str) -> Result<Option<Credential>> {
        if let Some(cred) = self.cache.get(service) {
            debug!(service, source = "cache", "credentials found");
            return Ok(Some(cred.clone()));
        }

        if let Some(cred) = self.from_env(service) {
            debug!(service, source = "environment", kind = cred.kind(), "credentials found");
            self.cache.insert(service.to_string(), cred.clone());
            return Ok(Some(cred));
        }

        debug!(service, "no credentials found");
        Ok(None)
    }

    /// Resolve credentials from environment variables
    fn from_env(&self, service: &str) -> Option<Credential> {
        let prefix = self.service_prefix(service);

        if let Some(token) = self.var(&format!("{}_TOKEN", prefix)) {
            return Some(Credential::Token(token));
        }

        match service {
            WEBSITE => {
                if let Some(token) = self.var("GITHUB_TOKEN") {
                    return Some(Credential::Token(token));
                }
            }
            REGISTRY => {
                if let (Some(username), Some(password)) =
                    (self.var("DOCKER_USERNAME"), self.var("DOCKER_PASSWORD"))
                {
                    return Some(Credential::UsernamePassword { username, password });
                }
            }
            TWITTER => {
                if let Some(keys) = self.oauth1_from("TWITTER") {
                    return Some(Credential::OAuth1(keys));
                }
            }
            _ => {}
        }

        if let (Some(username), Some(password)) = (
            self.var(&format!("{}_USERNAME", prefix)),
            self.var(&format!("{}_PASSWORD", prefix)),
        ) {
            return Some(Credential::UsernamePassword { username, password });
        }

        self.oauth1_from(&prefix).map(Credential::OAuth1)
    }

    /// Read the four OAuth 1.0a fragments under a prefix. All four must be present.
    fn oauth1_from(&self, prefix: &str) -> Option<OAuth1Keys> {
        let parts = [
            self.var(&format!("{}_CONSUMER_KEY", prefix)),
            self.var(&format!("{}_CONSUMER_SECRET", prefix)),
            self.var(&format!("{}_ACCESS_TOKEN", prefix)),
            self.var(&format!("{}_ACCESS_TOKEN_SECRET", prefix)),
        ];

        let present = parts.iter().filter(|p| p.is_some()).count();
        match parts {
            [Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_token_secret)] => {
                Some(OAuth1Keys {
                    consumer_key,
                    consumer_secret,
                    access_token,
                    access_token_secret,
                })
            }
            _ => {
                if present > 0 {
                    warn!(prefix, present, "incomplete OAuth credentials, need all four");
                }
                None
            }
        }
    }

    fn service_prefix(&self, service: &str) -> String {
        format!(
            "{}_{}",
            self.env_prefix,
            service.to_uppercase().replace(['.', '-', '/'], "_")
        )
    }

    /// Variables that would satisfy a service, for error messages
    pub fn hint(&self, service: &str) -> String {
        let prefix = self.service_prefix(service);
        match service {
            WEBSITE => format!("{}_TOKEN or GITHUB_TOKEN", prefix),
            REGISTRY => format!(
                "{p}_USERNAME and {p}_PASSWORD (or DOCKER_USERNAME and DOCKER_PASSWORD)",
                p = prefix
            ),
            TWITTER => format!(
                "{p}_CONSUMER_KEY, {p}_CONSUMER_SECRET, {p}_ACCESS_TOKEN and {p}_ACCESS_TOKEN_SECRET",
                p = prefix
            ),
            _ => format!("{}_TOKEN", prefix),
        }
    }

    fn require(&mut self, service: &str) -> Result<Credential> {
        self.get(service)?.ok_or_else(|| {
            AuthError::MissingCredential {
                service: service.to_string(),
                hint: self.hint(service),
            }
            .into()
        })
    }

    /// Resolve a bearer token or fail with an auth error
    pub fn require_token(&mut self, service: &str) -> Result<String> {
        match self.require(service)? {
            Credential::Token(token) => Ok(token),
            _ => Err(wrong_kind(service, "token")),
        }
    }

    /// Resolve a username/password pair or fail with an auth error
    pub fn require_login(&mut self, service: &str) -> Result<(String, String)> {
        match self.require(service)? {
            Credential::UsernamePassword { username, password } => Ok((username, password)),
            _ => Err(wrong_kind(service, "username and password")),
        }
    }

    /// Resolve the four OAuth 1.0a fragments or fail with an auth error
    pub fn require_oauth1(&mut self, service: &str) -> Result<OAuth1Keys> {
        match self.require(service)? {
            Credential::OAuth1(keys) => Ok(keys),
            _ => Err(wrong_kind(service, "OAuth 1.0a keys")),
        }
    }

    /// Check if credentials are available for a service
    pub fn has_credentials(&mut self, service: &str) -> bool {
        let has = self.get(service).ok().flatten().is_some();
        debug!(service, has_credentials = has, "credential check");
        has
    }
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_kind(service: &str, expected: &str) -> herald_core::HeraldError {
    AuthError::WrongKind {
        service: service.to_string(),
        expected: expected.to_string(),
    }
    .into()
}

/// Credential types
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Bearer/API token
    Token(String),
    /// Username and password
    UsernamePassword { username: String, password: String },
    /// OAuth 1.0a consumer and access keys
    OAuth1(OAuth1Keys),
}

impl Credential {
    /// Short name of the credential shape
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Token(_) => "token",
            Self::UsernamePassword { .. } => "username_password",
            Self::OAuth1(_) => "oauth1",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(***)"),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::OAuth1(keys) => f.debug_tuple("OAuth1").field(keys).finish(),
        }
    }
}

/// The four fragments of an OAuth 1.0a user-context credential
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth1Keys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OAuth1Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Keys")
            .field("consumer_key", &"***")
            .field("consumer_secret", &"***")
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .finish()
    }
}
