//! Sidebar item kinds and their allowed action sets

use serde::{Deserialize, Serialize};

/// Kind of the currently selected sidebar item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SidebarItemKind {
    Inbox,
    All,
    Todo,
    Archive,
    Trash,
    Category,
    Tag,
    Label,
}

/// Discrete confirm/cancel interactions offered for a sidebar item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SidebarAction {
    ImportNotes,
    ViewSettings,
    CreateFolder,
    RemoveFolder,
    RenameFolder,
    RemoveTag,
    RenameTag,
}

/// Action set for an item kind.
pub fn allowed_actions(kind: SidebarItemKind) -> &'static [SidebarAction] {
    use SidebarAction::*;

    match kind {
        SidebarItemKind::Inbox => &[ImportNotes, ViewSettings, CreateFolder],
        SidebarItemKind::All | SidebarItemKind::Todo => &[ViewSettings],
        SidebarItemKind::Archive => &[ImportNotes, ViewSettings],
        SidebarItemKind::Trash => &[ViewSettings],
        SidebarItemKind::Category => {
            &[ImportNotes, ViewSettings, CreateFolder, RemoveFolder, RenameFolder]
        }
        SidebarItemKind::Tag => &[RemoveTag, RenameTag],
        SidebarItemKind::Label => &[],
    }
}
