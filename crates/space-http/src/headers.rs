//! Header names of the space wire protocol and metadata projection.

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use space_core::{FileMeta, OCTET_STREAM, Permission};

/// File size. `Content-Length` can't be used: it describes the body, and
/// OPTIONS responses have none.
pub const X_CONTENT_LENGTH: &str = "x-content-length";
/// Modification time in ms since epoch, on responses and on PUT requests.
pub const X_LAST_MODIFIED: &str = "x-last-modified";
/// `rw` or `ro`.
pub const X_PERMISSION: &str = "x-permission";
/// Server-side path of the space, sent with the file list.
pub const X_SPACE_PATH: &str = "x-space-path";

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_number(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Build file metadata from response headers.
///
/// Never fails: absent or malformed headers fall back to size 0, timestamp 0,
/// octet-stream and read-write.
pub fn meta_from_headers(name: &str, headers: &HeaderMap) -> FileMeta {
    let size = header_str(headers, X_CONTENT_LENGTH)
        .and_then(parse_number)
        .map(|n| n.max(0) as u64)
        .unwrap_or(0);
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(OCTET_STREAM)
        .to_string();
    let last_modified = header_str(headers, X_LAST_MODIFIED)
        .and_then(parse_number)
        .unwrap_or(0);
    let perm = header_str(headers, X_PERMISSION)
        .map(Permission::from_header)
        .unwrap_or_default();

    FileMeta {
        name: name.to_string(),
        size,
        content_type,
        last_modified,
        perm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_full_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(X_CONTENT_LENGTH, HeaderValue::from_static("1234"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/markdown"));
        headers.insert(X_LAST_MODIFIED, HeaderValue::from_static("1700000000000"));
        headers.insert(X_PERMISSION, HeaderValue::from_static("ro"));

        let meta = meta_from_headers("notes/a.md", &headers);
        assert_eq!(meta.name, "notes/a.md");
        assert_eq!(meta.size, 1234);
        assert_eq!(meta.content_type, "text/markdown");
        assert_eq!(meta.last_modified, 1_700_000_000_000);
        assert_eq!(meta.perm, Permission::ReadOnly);
    }

    #[test]
    fn test_empty_headers_use_defaults() {
        let meta = meta_from_headers("a", &HeaderMap::new());
        assert_eq!(meta, FileMeta::new("a"));
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert(X_CONTENT_LENGTH, HeaderValue::from_static("lots"));
        headers.insert(X_LAST_MODIFIED, HeaderValue::from_static("yesterday"));
        headers.insert(X_PERMISSION, HeaderValue::from_static("admin"));

        let meta = meta_from_headers("a", &headers);
        assert_eq!(meta.size, 0);
        assert_eq!(meta.last_modified, 0);
        assert_eq!(meta.perm, Permission::ReadWrite);
    }

    #[test]
    fn test_fractional_timestamp_truncates() {
        let mut headers = HeaderMap::new();
        headers.insert(X_LAST_MODIFIED, HeaderValue::from_static("1700000000000.75"));
        assert_eq!(meta_from_headers("a", &headers).last_modified, 1_700_000_000_000);
    }
}
