//! space-http: `Space` over HTTP.
//!
//! One HTTP exchange per operation, no retries. Credential rejection and
//! space mismatches are reported to the host through `ClientHooks` before
//! the call fails.
//!
//! ```no_run
//! use space_core::{Encoding, LoggingHooks, Space};
//! use space_http::{HttpSpace, HttpSpaceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpSpaceConfig::new("http://localhost:3000/.fs").with_credentials("alice", "secret");
//! let space = HttpSpace::new(config, LoggingHooks::shared())?;
//!
//! space.write_file("notes/a.md", "hello".into(), None).await?;
//! let content = space.read_file("notes/a.md", Encoding::Text).await?;
//! assert_eq!(content.data.as_text(), Some("hello"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod headers;
pub mod space;
pub mod transport;

pub use config::{ConfigError, Credentials, HttpSpaceConfig};
pub use headers::meta_from_headers;
pub use space::{HttpSpace, encode_path};
pub use transport::AuthenticatedTransport;
