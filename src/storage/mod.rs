//! Note storage layer
//!
//! Holds the project (folder) registry and the in-memory note list, both
//! loaded from the documents directory. The sync queue reloads this storage
//! from disk after a successful clone/pull; the sidebar actions mutate it.

pub mod layout;

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Note, Project, is_note_file};
use layout::StorageLayout;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

/// Project registry and note list, loaded from disk.
#[derive(Debug)]
pub struct NoteStorage {
    layout: StorageLayout,
    projects: Vec<Project>,
    notes: Vec<Note>,
    default_origin: Option<String>,
}

impl NoteStorage {
    /// Load the note tree from the documents directory.
    ///
    /// Creates the directory when missing. The top level becomes the default
    /// project; every subfolder becomes a category project.
    pub async fn load(layout: StorageLayout) -> Result<Self, StorageError> {
        fs::create_dir_all(layout.documents_dir())
            .await
            .map_err(|e| StorageError::IoError(format!("Failed to create documents dir: {}", e)))?;

        let mut storage = Self {
            layout,
            projects: Vec::new(),
            notes: Vec::new(),
            default_origin: None,
        };
        storage.reload().await?;
        Ok(storage)
    }

    /// Re-scan projects and notes from disk.
    ///
    /// Registered external projects survive a reload; everything under the
    /// documents directory is rebuilt from what is actually on disk.
    pub async fn reload(&mut self) -> Result<(), StorageError> {
        let externals: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.is_external)
            .cloned()
            .collect();

        self.projects.clear();
        self.notes.clear();

        let label = self
            .layout
            .documents_dir()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("Notes")
            .to_string();
        let root = Project::default_project(self.layout.documents_dir(), label);
        let root_id = root.id;
        self.projects.push(root);
        self.scan_tree(self.layout.documents_dir().to_path_buf(), root_id)
            .await?;

        for external in externals {
            let id = external.id;
            let path = external.path.clone();
            self.projects.push(external);
            self.scan_notes(&path, id).await?;
        }

        debug!(
            projects = self.projects.len(),
            notes = self.notes.len(),
            "Reloaded note storage"
        );
        Ok(())
    }

    /// Walk subdirectories of `root`, registering a category project per
    /// folder and loading the notes of each level.
    async fn scan_tree(&mut self, root: PathBuf, root_id: Uuid) -> Result<(), StorageError> {
        let mut pending = vec![(root, root_id)];

        while let Some((dir, project_id)) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::DirectoryNotFound(format!("{}: {}", dir.display(), e)))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?
            {
                let path = entry.path();
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if name.starts_with('.') {
                    continue;
                }

                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::IoError(e.to_string()))?;

                if file_type.is_dir() {
                    let project = Project::category(&path, name, project_id);
                    let child_id = project.id;
                    self.projects.push(project);
                    pending.push((path, child_id));
                } else if is_note_file(&path) {
                    match Note::load(&path, project_id).await {
                        Ok(note) => self.notes.push(note),
                        Err(e) => warn!("Skipping unreadable note {}: {}", path.display(), e),
                    }
                }
            }
        }
        Ok(())
    }

    /// Load the notes directly inside `dir` (non-recursive).
    async fn scan_notes(&mut self, dir: &Path, project_id: Uuid) -> Result<(), StorageError> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("External project unreadable {}: {}", dir.display(), e);
                return Ok(());
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.is_file() && is_note_file(&path) {
                match Note::load(&path, project_id).await {
                    Ok(note) => self.notes.push(note),
                    Err(e) => warn!("Skipping unreadable note {}: {}", path.display(), e),
                }
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    // --- projects ---

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn default_project(&self) -> Option<&Project> {
        self.projects.iter().find(|p| p.is_default)
    }

    pub fn project_by_path(&self, path: &Path) -> Option<&Project> {
        self.projects.iter().find(|p| p.path == path)
    }

    /// Register a project (folder created through an action, or external).
    pub fn register_project(&mut self, project: Project) -> Uuid {
        let id = project.id;
        debug!("Registered project {} at {}", project.label, project.path.display());
        self.projects.push(project);
        id
    }

    /// Unregister a project, its descendant projects and all their notes.
    pub fn unregister_project(&mut self, id: Uuid) -> Option<Project> {
        let position = self.projects.iter().position(|p| p.id == id)?;
        let removed = self.projects.remove(position);

        let prefix = removed.path.clone();
        let descendants: Vec<Uuid> = self
            .projects
            .iter()
            .filter(|p| p.path.starts_with(&prefix))
            .map(|p| p.id)
            .collect();
        self.projects.retain(|p| !p.path.starts_with(&prefix));

        self.notes
            .retain(|n| n.project_id != id && !descendants.contains(&n.project_id));
        Some(removed)
    }

    /// Move a project to a new path and label, remapping its notes and any
    /// descendant projects. Filesystem changes are the caller's business.
    pub fn relocate_project(
        &mut self,
        id: Uuid,
        new_path: PathBuf,
        new_label: String,
    ) -> Result<(), StorageError> {
        let old_path = self
            .project(id)
            .map(|p| p.path.clone())
            .ok_or(StorageError::ProjectNotFound(id))?;

        for project in self.projects.iter_mut() {
            if project.id == id {
                project.path = new_path.clone();
                project.label = new_label.clone();
            } else if let Ok(rest) = project.path.strip_prefix(&old_path) {
                project.path = new_path.join(rest);
            }
        }

        for note in self.notes.iter_mut() {
            if let Ok(rest) = note.path.strip_prefix(&old_path) {
                note.path = new_path.join(rest);
            }
        }
        Ok(())
    }

    // --- notes ---

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn notes_in(&self, project_id: Uuid) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(move |n| n.project_id == project_id)
    }

    /// Notes of a project carrying a tag.
    pub fn notes_with_tag(&self, project_id: Uuid, tag: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.project_id == project_id && n.has_tag(tag))
            .collect()
    }

    pub(crate) fn notes_mut(&mut self) -> &mut [Note] {
        &mut self.notes
    }

    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    pub fn remove_note(&mut self, path: &Path) -> Option<Note> {
        let position = self.notes.iter().position(|n| n.path == path)?;
        Some(self.notes.remove(position))
    }

    // --- origin & tags ---

    /// Refresh the storage layer's notion of the default origin. Fed from the
    /// settings store whenever the origin field is edited.
    pub fn update_default_origin(&mut self, origin: Option<String>) {
        self.default_origin = origin.filter(|url| !url.trim().is_empty());
    }

    pub fn default_origin(&self) -> Option<&str> {
        self.default_origin.as_deref()
    }

    /// Sidebar tag index: every tag present on at least one note, sorted,
    /// each listed exactly once.
    pub fn tag_index(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for note in &self.notes {
            for tag in &note.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        tags.sort();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage_with(files: &[(&str, &str)]) -> (TempDir, NoteStorage) {
        let temp = TempDir::new().unwrap();
        let documents = temp.path().join("notes");
        std::fs::create_dir_all(&documents).unwrap();
        for (rel, content) in files {
            let path = documents.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }

        let layout = StorageLayout::new(temp.path().join("support"), documents);
        let storage = NoteStorage::load(layout).await.unwrap();
        (temp, storage)
    }

    #[tokio::test]
    async fn test_load_builds_project_tree() {
        let (_temp, storage) = storage_with(&[
            ("inbox.md", "hello"),
            ("Work/todo.md", "#todo list"),
            ("Work/Deep/idea.md", "an idea"),
            ("ignored.png", "binary"),
        ])
        .await;

        assert!(storage.default_project().is_some());
        let labels: Vec<&str> = storage.projects().iter().map(|p| p.label.as_str()).collect();
        assert!(labels.contains(&"Work"));
        assert!(labels.contains(&"Deep"));
        assert_eq!(storage.notes().len(), 3);
    }

    #[tokio::test]
    async fn test_tag_index_unique_sorted() {
        let (_temp, storage) = storage_with(&[
            ("a.md", "#zebra #apple"),
            ("b.md", "#apple again"),
        ])
        .await;

        assert_eq!(storage.tag_index(), vec!["apple", "zebra"]);
    }

    #[tokio::test]
    async fn test_reload_keeps_external_projects() {
        let temp = TempDir::new().unwrap();
        let external_dir = temp.path().join("elsewhere");
        std::fs::create_dir_all(&external_dir).unwrap();
        std::fs::write(external_dir.join("ext.md"), "external note").unwrap();

        let (_inner, mut storage) = storage_with(&[("a.md", "hi")]).await;
        let id = storage.register_project(Project::external(&external_dir, "Elsewhere"));
        storage.reload().await.unwrap();

        assert!(storage.project(id).is_some());
        assert_eq!(storage.notes_in(id).count(), 1);
    }

    #[tokio::test]
    async fn test_unregister_removes_descendants() {
        let (_temp, mut storage) = storage_with(&[
            ("Work/todo.md", "x"),
            ("Work/Deep/idea.md", "y"),
            ("other.md", "z"),
        ])
        .await;

        let work = storage
            .projects()
            .iter()
            .find(|p| p.label == "Work")
            .map(|p| p.id)
            .unwrap();
        storage.unregister_project(work);

        assert!(storage.projects().iter().all(|p| p.label != "Deep"));
        assert_eq!(storage.notes().len(), 1);
    }

    #[tokio::test]
    async fn test_relocate_remaps_note_paths() {
        let (_temp, mut storage) = storage_with(&[("Work/todo.md", "x")]).await;
        let work = storage
            .projects()
            .iter()
            .find(|p| p.label == "Work")
            .cloned()
            .unwrap();

        let new_path = work.path.parent().unwrap().join("Job");
        storage
            .relocate_project(work.id, new_path.clone(), "Job".to_string())
            .unwrap();

        let note = storage.notes_in(work.id).next().unwrap();
        assert_eq!(note.path, new_path.join("todo.md"));
        assert_eq!(storage.project(work.id).unwrap().label, "Job");
    }

    #[tokio::test]
    async fn test_update_default_origin() {
        let (_temp, mut storage) = storage_with(&[]).await;
        storage.update_default_origin(Some("git@host:a/b.git".into()));
        assert_eq!(storage.default_origin(), Some("git@host:a/b.git"));
        storage.update_default_origin(Some("  ".into()));
        assert_eq!(storage.default_origin(), None);
    }
}
