//! Git synchronization
//!
//! Everything around the clone/pull workflow: the typed error surface, the
//! per-project [`service::GitService`], the [`workflow`] state machine, the
//! serial [`queue::SyncQueue`] and the repository-directory bookkeeping.

pub mod queue;
pub mod repositories;
pub mod service;
pub mod workflow;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use queue::{QueueEvent, SyncDelegate, SyncQueue};
pub use repositories::{list_repositories, remove_repository};
pub use service::GitService;
pub use workflow::{SyncOutcome, SyncRequest, run_sync};

/// Error type for git operations
///
/// Three kinds matter to the workflow: structured errors with a machine code
/// and human description (surfaced verbatim), a missing reference (an empty
/// remote still waiting for its first commit) and an explicit cancellation.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("{message} – {description}")]
    Unknown {
        code: i32,
        message: String,
        description: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("repository not opened")]
    NotOpened,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            // transfer_progress returning false surfaces as a user error
            git2::ErrorCode::User => GitError::Cancelled,
            git2::ErrorCode::NotFound => GitError::NotFound(err.message().to_string()),
            code => GitError::Unknown {
                code: err.raw_code(),
                message: err.message().to_string(),
                description: format!("class={:?} code={:?}", err.class(), code),
            },
        }
    }
}

/// Credentials for remote operations.
///
/// SSH key plus passphrase is the primary path (key materialized by the
/// settings store); username/token covers HTTPS remotes.
#[derive(Debug, Clone, Default)]
pub struct GitCredentials {
    pub ssh_key_path: Option<PathBuf>,
    pub passphrase: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
}

/// Shared cancellation flag for one queued git job.
///
/// Setting it aborts the transfer at the next progress callback and stops
/// the workflow at its next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_unknown_error_display_composes_code_and_description() {
        let err = GitError::Unknown {
            code: -1,
            message: "ERROR: Repository not found.".to_string(),
            description: "class=Ssh code=Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ERROR: Repository not found. – class=Ssh code=Error"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = GitError::NotFound("refs/heads/master".to_string());
        assert_eq!(err.to_string(), "not found: refs/heads/master");
    }
}
