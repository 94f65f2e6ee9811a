//! Project (folder) model

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A folder tracked by the storage layer.
///
/// The default project is the top level of the documents directory; category
/// projects are its (possibly nested) subfolders. External projects are
/// tracked but their on-disk lifecycle is managed outside the application,
/// so removing one never deletes content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    /// Absolute path of the folder.
    pub path: PathBuf,
    /// Display label, normally the folder name.
    pub label: String,
    pub parent_id: Option<Uuid>,
    pub is_default: bool,
    pub is_external: bool,
    pub is_archive: bool,
    pub is_trash: bool,
}

impl Project {
    /// The default (inbox) project at the documents root.
    pub fn default_project(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            label: label.into(),
            parent_id: None,
            is_default: true,
            is_external: false,
            is_archive: false,
            is_trash: false,
        }
    }

    /// A regular folder below another project.
    pub fn category(path: impl Into<PathBuf>, label: impl Into<String>, parent_id: Uuid) -> Self {
        let label = label.into();
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            is_archive: label == "Archive",
            is_trash: label == "Trash",
            label,
            parent_id: Some(parent_id),
            is_default: false,
            is_external: false,
        }
    }

    /// A folder whose lifecycle is managed outside the application.
    pub fn external(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            label: label.into(),
            parent_id: None,
            is_default: false,
            is_external: true,
            is_archive: false,
            is_trash: false,
        }
    }

    /// Directory name under `Repositories` for this project's git dir.
    ///
    /// Derived from the folder name, restricted to filesystem-safe characters.
    pub fn repository_name(&self) -> String {
        let raw = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.label);
        sanitize_repository_name(raw)
    }

    /// Whether a path belongs to this project's folder (non-recursive).
    pub fn contains(&self, path: &Path) -> bool {
        path.parent() == Some(self.path.as_path())
    }
}

fn sanitize_repository_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if name.is_empty() { "repository".to_string() } else { name }
}
