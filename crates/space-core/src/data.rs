//! File content representations and the conversions between them.
//!
//! A file travels over the wire as raw bytes. Callers pick one of three
//! in-memory representations with an [`Encoding`]:
//! - `Binary` - the bytes as-is
//! - `Text` - the bytes decoded as UTF-8
//! - `DataUrl` - `data:<mime>;base64,<payload>`, self-describing

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::meta::{FileMeta, OCTET_STREAM};
use crate::space::{Result, SpaceError};

/// Which [`FileData`] variant a read should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Binary,
    Text,
    DataUrl,
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Binary => "binary",
            Encoding::Text => "text",
            Encoding::DataUrl => "dataurl",
        };
        f.write_str(name)
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "arraybuffer" => Ok(Encoding::Binary),
            "text" | "utf8" | "utf-8" => Ok(Encoding::Text),
            "dataurl" => Ok(Encoding::DataUrl),
            other => Err(format!("unknown encoding: {other}")),
        }
    }
}

/// In-memory content of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Binary(Vec<u8>),
    Text(String),
    DataUrl(String),
}

impl FileData {
    pub fn encoding(&self) -> Encoding {
        match self {
            FileData::Binary(_) => Encoding::Binary,
            FileData::Text(_) => Encoding::Text,
            FileData::DataUrl(_) => Encoding::DataUrl,
        }
    }

    /// Build the representation selected by `encoding` from raw file bytes.
    ///
    /// `content_type` is only used for data URLs. Text decoding is lossy:
    /// invalid UTF-8 sequences become U+FFFD.
    pub fn decode(bytes: Vec<u8>, encoding: Encoding, content_type: &str) -> Self {
        match encoding {
            Encoding::Binary => FileData::Binary(bytes),
            Encoding::Text => match String::from_utf8(bytes) {
                Ok(text) => FileData::Text(text),
                Err(e) => FileData::Text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
            Encoding::DataUrl => FileData::DataUrl(to_data_url(content_type, &bytes)),
        }
    }

    /// Convert to the raw bytes that go over the wire.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            FileData::Binary(bytes) => Ok(bytes),
            FileData::Text(text) => Ok(text.into_bytes()),
            FileData::DataUrl(url) => from_data_url(&url),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileData::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for FileData {
    fn from(bytes: Vec<u8>) -> Self {
        FileData::Binary(bytes)
    }
}

impl From<&[u8]> for FileData {
    fn from(bytes: &[u8]) -> Self {
        FileData::Binary(bytes.to_vec())
    }
}

impl From<String> for FileData {
    fn from(text: String) -> Self {
        FileData::Text(text)
    }
}

impl From<&str> for FileData {
    fn from(text: &str) -> Self {
        FileData::Text(text.to_string())
    }
}

/// Result of reading a file: its content plus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub data: FileData,
    pub meta: FileMeta,
}

/// Format bytes as a base64 data URL.
pub fn to_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Decode the payload of a base64 data URL. The MIME part is ignored.
pub fn from_data_url(url: &str) -> Result<Vec<u8>> {
    let (_, payload) = url
        .split_once(',')
        .ok_or_else(|| SpaceError::InvalidDataUrl("missing ',' separator".to_string()))?;
    STANDARD
        .decode(payload.trim())
        .map_err(|e| SpaceError::InvalidDataUrl(e.to_string()))
}

/// Maps a file name to a content type.
pub trait MimeLookup: Send + Sync {
    fn content_type(&self, name: &str) -> Option<String>;
}

impl<F> MimeLookup for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn content_type(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Resolve a content type through `lookup`, falling back to octet-stream.
pub fn content_type_for(lookup: &dyn MimeLookup, name: &str) -> String {
    lookup
        .content_type(name)
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Extension-based lookup backed by the `mime_guess` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionMimeLookup;

impl ExtensionMimeLookup {
    pub fn shared() -> Arc<dyn MimeLookup> {
        Arc::new(Self)
    }
}

impl MimeLookup for ExtensionMimeLookup {
    fn content_type(&self, name: &str) -> Option<String> {
        // Only the last segment counts: "dir.d/noext" has no extension
        let file_name = name.rsplit('/').next().unwrap_or(name);
        mime_guess::from_path(file_name)
            .first_raw()
            .map(str::to_string)
    }
}
