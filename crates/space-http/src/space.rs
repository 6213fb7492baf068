//! Space implementation that talks to a space server over HTTP.
//!
//! Wire protocol:
//! - `GET <base>` - file list as a JSON array, with `X-Space-Path`
//! - `GET <base>/<path>` - file content
//! - `PUT <base>/<path>` - write file content
//! - `DELETE <base>/<path>` - delete file
//! - `OPTIONS <base>/<path>` - file metadata only
//!
//! File metadata travels in `X-*` response headers (see [`crate::headers`]).

use std::sync::Arc;

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use space_core::{
    ClientHooks, Encoding, ExtensionMimeLookup, FileContent, FileData, FileMeta, MimeLookup,
    OCTET_STREAM, RestartReason, Result, Space, SpaceError, content_type_for,
};
use tracing::{debug, warn};
use url::Url;

use crate::config::{ConfigError, HttpSpaceConfig};
use crate::headers::{X_LAST_MODIFIED, X_SPACE_PATH, header_str, meta_from_headers};
use crate::transport::AuthenticatedTransport;

/// Percent-encode a file name segment by segment, keeping `/` separators.
pub fn encode_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct HttpSpace {
    base_url: Url,
    expected_space_path: Option<String>,
    transport: AuthenticatedTransport,
    hooks: Arc<dyn ClientHooks>,
    mime: Arc<dyn MimeLookup>,
}

impl HttpSpace {
    pub fn new(config: HttpSpaceConfig, hooks: Arc<dyn ClientHooks>) -> std::result::Result<Self, ConfigError> {
        let transport = AuthenticatedTransport::new(config.auth_cookie(), hooks.clone())?;
        Self::with_transport(config, transport, hooks)
    }

    pub fn with_transport(
        config: HttpSpaceConfig,
        transport: AuthenticatedTransport,
        hooks: Arc<dyn ClientHooks>,
    ) -> std::result::Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        debug!(
            "HTTP space at {} (credentials: {})",
            base_url,
            transport.has_credentials()
        );
        Ok(Self {
            base_url,
            expected_space_path: config.expected_space_path,
            transport,
            hooks,
            mime: ExtensionMimeLookup::shared(),
        })
    }

    /// Replace the lookup used to label data URLs.
    pub fn with_mime_lookup(mut self, mime: Arc<dyn MimeLookup>) -> Self {
        self.mime = mime;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL addressing one file in the space.
    pub fn file_url(&self, name: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = format!("{}/{}", base, encode_path(name));
        Url::parse(&raw).map_err(|e| SpaceError::Transport(format!("Invalid file URL {}: {}", raw, e)))
    }

    fn check_space_path(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = &self.expected_space_path else {
            return Ok(());
        };
        let actual = header_str(headers, X_SPACE_PATH);
        if actual == Some(expected.as_str()) {
            return Ok(());
        }

        warn!(
            "Space path mismatch: expected {}, server reports {:?}",
            expected, actual
        );
        self.hooks.flush_caches();
        self.hooks
            .alert("Space folder path different on server, reloading the page");
        self.hooks.restart(RestartReason::SpaceMismatch);
        Err(SpaceError::SpaceMismatch {
            expected: expected.clone(),
            actual: actual.map(str::to_string),
        })
    }
}

fn transport_error(e: reqwest::Error) -> SpaceError {
    SpaceError::Transport(e.to_string())
}

/// Reason phrase the server sent, else the standard one, else the code.
fn status_text(response: &Response) -> String {
    let status = response.status();
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.as_str().to_string())
}

#[async_trait]
impl Space for HttpSpace {
    async fn fetch_file_list(&self) -> Result<Vec<FileMeta>> {
        let response = self
            .transport
            .request(Method::GET, self.base_url.clone(), HeaderMap::new(), None)
            .await?;

        if response.status() == StatusCode::OK {
            self.check_space_path(response.headers())?;
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let files: Vec<FileMeta> = serde_json::from_slice(&body)
            .map_err(|e| SpaceError::InvalidResponse(format!("file list: {}", e)))?;
        debug!("Listed {} file(s)", files.len());
        Ok(files)
    }

    async fn read_file(&self, name: &str, encoding: Encoding) -> Result<FileContent> {
        let url = self.file_url(name)?;
        let response = self
            .transport
            .request(Method::GET, url, HeaderMap::new(), None)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SpaceError::NotFound("Page not found".to_string()));
        }

        let meta = meta_from_headers(name, response.headers());
        let body = response.bytes().await.map_err(transport_error)?;
        let content_type = content_type_for(self.mime.as_ref(), name);
        Ok(FileContent {
            data: FileData::decode(body.to_vec(), encoding, &content_type),
            meta,
        })
    }

    async fn get_file_meta(&self, name: &str) -> Result<FileMeta> {
        let url = self.file_url(name)?;
        let response = self
            .transport
            .request(Method::OPTIONS, url, HeaderMap::new(), None)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SpaceError::NotFound("File not found".to_string()));
        }

        Ok(meta_from_headers(name, response.headers()))
    }

    async fn write_file(
        &self,
        name: &str,
        data: FileData,
        last_modified: Option<i64>,
    ) -> Result<FileMeta> {
        let url = self.file_url(name)?;
        let encoding = data.encoding();
        let body = data.into_bytes()?;

        // The server derives the real content type from the name
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
        if let Some(ts) = last_modified {
            headers.insert(HeaderName::from_static(X_LAST_MODIFIED), HeaderValue::from(ts));
        }

        debug!("Writing {} ({} bytes, {})", name, body.len(), encoding);
        let response = self
            .transport
            .request(Method::PUT, url, headers, Some(body))
            .await?;

        Ok(meta_from_headers(name, response.headers()))
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        let url = self.file_url(name)?;
        let response = self
            .transport
            .request(Method::DELETE, url, HeaderMap::new(), None)
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SpaceError::DeleteFailed(status_text(&response)));
        }
        Ok(())
    }

    async fn proxy_syscall(&self, _plug: &str, _name: &str, _args: Vec<Value>) -> Result<Value> {
        Err(SpaceError::Unsupported)
    }

    async fn invoke_function(
        &self,
        _plug: &str,
        _env: &str,
        _name: &str,
        _args: Vec<Value>,
    ) -> Result<Value> {
        Err(SpaceError::Unsupported)
    }
}
