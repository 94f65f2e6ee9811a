//! Append-only progress log for git operations
//!
//! The sync workflow and the git transport sideband write human-readable
//! messages here; a status view (or the CLI) reads them back. The reporter is
//! cheap to clone and safe to share between the queue worker and readers.

use std::sync::{Arc, Mutex};

use tracing::info;

/// Shared, append-only message log.
#[derive(Debug, Clone, Default)]
pub struct GitProgress {
    messages: Arc<Mutex<Vec<String>>>,
}

impl GitProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the log.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "note_sync_sdk::git", "{}", message);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }

    /// Most recent message, if any. This is what a read-only status field shows.
    pub fn buffered_message(&self) -> Option<String> {
        self.messages
            .lock()
            .ok()
            .and_then(|messages| messages.last().cloned())
    }

    /// Full message history, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}
