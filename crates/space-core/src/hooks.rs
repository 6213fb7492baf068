//! Host callbacks for conditions a space client cannot recover from itself.
//!
//! A browser host restarts the whole client so a fresh login can happen; a
//! native host usually just logs and lets the returned error surface.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use tracing::{error, warn};

/// Why the client is being restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// The server rejected our credentials (401 or redirect to login)
    AuthenticationInvalid,
    /// The server is serving a different space than expected
    SpaceMismatch,
}

impl Display for RestartReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::AuthenticationInvalid => f.write_str("authentication invalid"),
            RestartReason::SpaceMismatch => f.write_str("space mismatch"),
        }
    }
}

pub trait ClientHooks: Send + Sync {
    /// Restart the client from scratch. Called at most once per failed call.
    fn restart(&self, reason: RestartReason);

    /// Drop any locally cached copies of space content.
    fn flush_caches(&self) {}

    /// Tell the user something went wrong.
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Hooks for hosts without a reload mechanism: log and rely on the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHooks;

impl LoggingHooks {
    pub fn shared() -> Arc<dyn ClientHooks> {
        Arc::new(Self)
    }
}

impl ClientHooks for LoggingHooks {
    fn restart(&self, reason: RestartReason) {
        error!("Client restart requested: {}", reason);
    }
}

impl<T: ClientHooks + ?Sized> ClientHooks for Arc<T> {
    fn restart(&self, reason: RestartReason) {
        (**self).restart(reason)
    }

    fn flush_caches(&self) {
        (**self).flush_caches()
    }

    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}
