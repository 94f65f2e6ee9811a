//! Models module for the SDK
//!
//! Core data structures shared across the SDK: notes, projects (folders) and
//! the sidebar item/action vocabulary.

pub mod note;
pub mod project;
pub mod sidebar;

pub use note::{Note, is_note_file};
pub use project::Project;
pub use sidebar::{SidebarAction, SidebarItemKind, allowed_actions};
