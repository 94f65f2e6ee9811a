//! Note Sync SDK - Shared library for note storage and git synchronization
//!
//! Provides unified interfaces for:
//! - Note/folder storage (project registry, tag index)
//! - Git settings (private key, passphrase, origin) with file-backed persistence
//! - The clone/pull sync workflow and its serial background queue
//! - Sidebar folder/tag actions
//! - The editor window contract (resize insets, undo-manager resolution)

pub mod actions;
pub mod editor;
pub mod git;
pub mod models;
pub mod progress;
pub mod settings;
pub mod storage;

// Re-export commonly used types
pub use actions::ActionError;
pub use git::{
    CancelToken, GitCredentials, GitError, GitService, QueueEvent, SyncDelegate, SyncOutcome,
    SyncQueue, SyncRequest,
};
pub use models::{Note, Project, SidebarAction, SidebarItemKind, allowed_actions};
pub use progress::GitProgress;
pub use settings::{GitSettings, SettingsError, SettingsStore};
pub use storage::layout::StorageLayout;
pub use storage::{NoteStorage, StorageError};
