//! File metadata as reported by a space.

use serde::{Deserialize, Serialize};

/// Content type used whenever nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Write permission of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Permission {
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "ro")]
    ReadOnly,
}

impl Permission {
    /// Parse a permission header value. Anything other than `ro` is read-write.
    pub fn from_header(value: &str) -> Self {
        match value.trim() {
            "ro" => Permission::ReadOnly,
            _ => Permission::ReadWrite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadWrite => "rw",
            Permission::ReadOnly => "ro",
        }
    }
}

/// Canonical metadata record for a file in a space.
///
/// Serializes with the camelCase keys used by the file list endpoint. Missing
/// fields fall back to the same defaults as header projection, so a sparse
/// entry from the server still deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    /// Path-like name, unique within the space
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// MIME type
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Modification time in milliseconds since epoch
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub perm: Permission,
}

fn default_content_type() -> String {
    OCTET_STREAM.to_string()
}

impl FileMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            content_type: default_content_type(),
            last_modified: 0,
            perm: Permission::ReadWrite,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.perm == Permission::ReadOnly
    }
}
