//! HTTP transport that attaches credentials and detects rejected sessions.

use std::sync::Arc;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response, StatusCode};
use space_core::{ClientHooks, RestartReason, Result, SpaceError};
use tracing::{debug, warn};
use url::Url;

use crate::config::ConfigError;

/// Sends one request per call; never retries.
///
/// Redirects are never followed. A 401 or any 3xx (servers bounce expired
/// sessions to a login page) restarts the client through the hooks and
/// fails the call. Every other status is returned untouched.
pub struct AuthenticatedTransport {
    client: Client,
    auth_cookie: Option<HeaderValue>,
    hooks: Arc<dyn ClientHooks>,
}

impl AuthenticatedTransport {
    pub fn new(auth_cookie: Option<String>, hooks: Arc<dyn ClientHooks>) -> std::result::Result<Self, ConfigError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()?;
        Self::with_client(client, auth_cookie, hooks)
    }

    /// Use a preconfigured client (proxy, TLS roots, timeouts). It should not
    /// follow redirects; if it does, a changed final URL still counts as one.
    pub fn with_client(
        client: Client,
        auth_cookie: Option<String>,
        hooks: Arc<dyn ClientHooks>,
    ) -> std::result::Result<Self, ConfigError> {
        let auth_cookie = auth_cookie
            .map(|cookie| {
                let mut value = HeaderValue::from_str(&cookie)
                    .map_err(|e| ConfigError::InvalidCredentials(e.to_string()))?;
                value.set_sensitive(true);
                Ok::<_, ConfigError>(value)
            })
            .transpose()?;

        Ok(Self {
            client,
            auth_cookie,
            hooks,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.auth_cookie.is_some()
    }

    pub async fn request(
        &self,
        method: Method,
        url: Url,
        mut headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        // Overwrites any cookie the caller set
        if let Some(cookie) = &self.auth_cookie {
            headers.insert(COOKIE, cookie.clone());
        }

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SpaceError::Transport(e.to_string()))?;

        let status = response.status();
        let redirected = status.is_redirection() || response.url() != &url;
        if status == StatusCode::UNAUTHORIZED || redirected {
            warn!(
                "{} {} rejected (status {}, redirected: {}), restarting client",
                method, url, status, redirected
            );
            self.hooks.restart(RestartReason::AuthenticationInvalid);
            return Err(SpaceError::AuthenticationInvalid);
        }

        debug!("{} {} -> {}", method, url, status);
        Ok(response)
    }
}
