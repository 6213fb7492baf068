//! Connection parameters for an HTTP space.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid space URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Credentials cannot be sent as a header: {0}")]
    InvalidCredentials(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// User/password pair sent as an `auth` cookie on every request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Cookie value `auth=<base64 "user:password">`, or `None` unless both
    /// parts are non-empty.
    pub fn auth_cookie(&self) -> Option<String> {
        if self.user.is_empty() || self.password.is_empty() {
            return None;
        }
        let token = STANDARD.encode(format!("{}:{}", self.user, self.password));
        Some(format!("auth={}", token))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for [`HttpSpace`](crate::HttpSpace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSpaceConfig {
    /// Root URL of the space, e.g. `https://notes.example.com/.fs`
    pub url: String,

    /// Space path the server must report in `X-Space-Path` when listing
    #[serde(default)]
    pub expected_space_path: Option<String>,

    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl HttpSpaceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expected_space_path: None,
            credentials: None,
        }
    }

    pub fn with_expected_space_path(mut self, path: impl Into<String>) -> Self {
        self.expected_space_path = Some(path.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(user, password));
        self
    }

    /// Validated base URL with any trailing slash removed.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let trimmed = self.url.trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn auth_cookie(&self) -> Option<String> {
        self.credentials.as_ref().and_then(Credentials::auth_cookie)
    }
}
