//! In-memory space, used as a test double and as the backing store of the
//! integration test server.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::data::{
    Encoding, ExtensionMimeLookup, FileContent, FileData, MimeLookup, content_type_for,
};
use crate::meta::{FileMeta, Permission};
use crate::space::{Result, Space, SpaceError};

struct StoredFile {
    content: Vec<u8>,
    meta: FileMeta,
}

/// In-memory space keyed by file name.
pub struct InMemorySpace {
    files: RwLock<BTreeMap<String, StoredFile>>,
    mime: Arc<dyn MimeLookup>,
}

impl InMemorySpace {
    pub fn new() -> Self {
        Self::with_mime_lookup(ExtensionMimeLookup::shared())
    }

    pub fn with_mime_lookup(mime: Arc<dyn MimeLookup>) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            mime,
        }
    }

    /// Mark a file read-only or read-write. Returns false if it doesn't exist.
    pub fn set_permission(&self, name: &str, perm: Permission) -> bool {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        match files.get_mut(name) {
            Some(file) => {
                file.meta.perm = perm;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.contains_key(name)
    }

    /// Raw stored bytes, bypassing any encoding.
    pub fn raw_content(&self, name: &str) -> Option<Vec<u8>> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.get(name).map(|file| file.content.clone())
    }

    fn current_time_ms() -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

impl Default for InMemorySpace {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Space for InMemorySpace {
    async fn fetch_file_list(&self) -> Result<Vec<FileMeta>> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        Ok(files.values().map(|file| file.meta.clone()).collect())
    }

    async fn read_file(&self, name: &str, encoding: Encoding) -> Result<FileContent> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        let file = files
            .get(name)
            .ok_or_else(|| SpaceError::NotFound("Page not found".to_string()))?;
        Ok(FileContent {
            data: FileData::decode(file.content.clone(), encoding, &file.meta.content_type),
            meta: file.meta.clone(),
        })
    }

    async fn get_file_meta(&self, name: &str) -> Result<FileMeta> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(name)
            .map(|file| file.meta.clone())
            .ok_or_else(|| SpaceError::NotFound("File not found".to_string()))
    }

    async fn write_file(
        &self,
        name: &str,
        data: FileData,
        last_modified: Option<i64>,
    ) -> Result<FileMeta> {
        let content = data.into_bytes()?;
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());

        // Rewrites keep the permission of the existing file
        let perm = files.get(name).map(|f| f.meta.perm).unwrap_or_default();
        let meta = FileMeta {
            name: name.to_string(),
            size: content.len() as u64,
            content_type: content_type_for(self.mime.as_ref(), name),
            last_modified: last_modified.unwrap_or_else(Self::current_time_ms),
            perm,
        };
        debug!("Stored {} ({} bytes)", name, meta.size);
        files.insert(
            name.to_string(),
            StoredFile {
                content,
                meta: meta.clone(),
            },
        );
        Ok(meta)
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SpaceError::NotFound("File not found".to_string()))
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
