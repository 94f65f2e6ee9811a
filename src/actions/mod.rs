//! Sidebar folder and tag actions
//!
//! Each action is the confirm half of a confirm/cancel interaction: the caller
//! has already collected a name or a confirmation, and the functions here
//! perform the actual folder-tree or tag-index mutation against
//! [`crate::storage::NoteStorage`].

pub mod folders;
pub mod tags;

use crate::storage::StorageError;

pub use folders::{create_folder, import_notes, remove_folder, rename_folder};
pub use tags::{remove_tag, rename_tag, sanitize_tag};

/// Error type for sidebar actions
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Invalid tag name: {0}")]
    InvalidTag(String),
    #[error("Folder already exists: {0}")]
    AlreadyExists(String),
    #[error("The default folder can not be removed")]
    NotRemovable,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    IoError(String),
}
