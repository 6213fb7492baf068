//! Space trait abstraction for transport-independent file storage.
//!
//! Implementations:
//! - `InMemorySpace` - For testing and embedding
//! - `HttpSpace` (in space-http) - Talks to a space server over HTTP

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::data::{Encoding, FileContent, FileData};
use crate::meta::FileMeta;

#[derive(Debug, Error)]
pub enum SpaceError {
    /// Credentials were rejected; the client has been asked to restart.
    #[error("Invalid credentials")]
    AuthenticationInvalid,

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to delete file: {0}")]
    DeleteFailed(String),

    /// The server serves a different space; caches were flushed and the
    /// client has been asked to restart.
    #[error("Space folder path different on server: expected {expected}, got {}", .actual.as_deref().unwrap_or("<none>"))]
    SpaceMismatch {
        expected: String,
        actual: Option<String>,
    },

    #[error("Not supported")]
    Unsupported,

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SpaceError {
    /// Errors after which the host has already been told to restart.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SpaceError::AuthenticationInvalid | SpaceError::SpaceMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SpaceError>;

/// Storage capability shared by every space transport.
///
/// Each call is independent: there is no ordering between concurrent calls,
/// read-after-write ordering is the caller's job.
#[async_trait]
pub trait Space: Send + Sync {
    /// List every file in the space.
    async fn fetch_file_list(&self) -> Result<Vec<FileMeta>>;

    /// Read a file in the requested representation.
    async fn read_file(&self, name: &str, encoding: Encoding) -> Result<FileContent>;

    /// Get file metadata without content.
    async fn get_file_meta(&self, name: &str) -> Result<FileMeta>;

    /// Write a file. `last_modified` (ms since epoch) asks the store to keep
    /// that timestamp instead of stamping its own clock.
    async fn write_file(
        &self,
        name: &str,
        data: FileData,
        last_modified: Option<i64>,
    ) -> Result<FileMeta>;

    async fn delete_file(&self, name: &str) -> Result<()>;

    /// Forward a syscall to a plug running next to the store.
    async fn proxy_syscall(&self, plug: &str, name: &str, args: Vec<Value>) -> Result<Value>;

    /// Invoke a plug function in the given environment.
    async fn invoke_function(
        &self,
        plug: &str,
        env: &str,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value>;
}

// Implement Space for Arc<T> where T: Space
// This allows sharing one space between several owners
#[async_trait]
impl<T: Space + ?Sized> Space for std::sync::Arc<T> {
    async fn fetch_file_list(&self) -> Result<Vec<FileMeta>> {
        (**self).fetch_file_list().await
    }

    async fn read_file(&self, name: &str, encoding: Encoding) -> Result<FileContent> {
        (**self).read_file(name, encoding).await
    }

    async fn get_file_meta(&self, name: &str) -> Result<FileMeta> {
        (**self).get_file_meta(name).await
    }

    async fn write_file(
        &self,
        name: &str,
        data: FileData,
        last_modified: Option<i64>,
    ) -> Result<FileMeta> {
        (**self).write_file(name, data, last_modified).await
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        (**self).delete_file(name).await
    }

    async fn proxy_syscall(&self, plug: &str, name: &str, args: Vec<Value>) -> Result<Value> {
        (**self).proxy_syscall(plug, name, args).await
    }

    async fn invoke_function(
        &self,
        plug: &str,
        env: &str,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        (**self).invoke_function(plug, env, name, args).await
    }
}
