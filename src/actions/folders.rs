//! Folder actions: create, remove, rename, import

use std::path::PathBuf;

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use super::ActionError;
use crate::models::{Note, Project};
use crate::storage::{NoteStorage, StorageError};

/// Create a folder below `parent` and register it as a project.
///
/// The name must be non-empty; only the final path component is created.
pub async fn create_folder(
    storage: &mut NoteStorage,
    parent: Uuid,
    name: &str,
) -> Result<Uuid, ActionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ActionError::EmptyName);
    }

    let parent_project = storage
        .project(parent)
        .ok_or(StorageError::ProjectNotFound(parent))?;
    let new_dir = parent_project.path.join(name);

    match fs::create_dir(&new_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(ActionError::AlreadyExists(new_dir.display().to_string()));
        }
        Err(e) => return Err(ActionError::IoError(format!("{}: {}", new_dir.display(), e))),
    }

    let project = Project::category(&new_dir, name, parent);
    let id = storage.register_project(project);
    info!("Created folder {}", new_dir.display());
    Ok(id)
}

/// Remove a folder.
///
/// On-disk content is deleted unless the project is externally managed; the
/// project (and its descendants) is always unregistered.
pub async fn remove_folder(storage: &mut NoteStorage, project: Uuid) -> Result<(), ActionError> {
    let target = storage
        .project(project)
        .ok_or(StorageError::ProjectNotFound(project))?;
    if target.is_default {
        return Err(ActionError::NotRemovable);
    }

    let path = target.path.clone();
    let is_external = target.is_external;

    if !is_external {
        match fs::remove_dir_all(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ActionError::IoError(format!("{}: {}", path.display(), e))),
        }
    }

    storage.unregister_project(project);
    info!(external = is_external, "Removed folder {}", path.display());
    Ok(())
}

/// Rename a folder: move the directory, relabel the project and remap the
/// paths of its notes and child folders.
pub async fn rename_folder(
    storage: &mut NoteStorage,
    project: Uuid,
    name: &str,
) -> Result<(), ActionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ActionError::EmptyName);
    }

    let target = storage
        .project(project)
        .ok_or(StorageError::ProjectNotFound(project))?;
    let old_path = target.path.clone();
    let new_path: PathBuf = old_path
        .parent()
        .map(|parent| parent.join(name))
        .ok_or_else(|| ActionError::IoError(format!("{} has no parent", old_path.display())))?;

    if new_path.exists() {
        return Err(ActionError::AlreadyExists(new_path.display().to_string()));
    }

    fs::rename(&old_path, &new_path)
        .await
        .map_err(|e| ActionError::IoError(format!("{}: {}", old_path.display(), e)))?;

    storage.relocate_project(project, new_path.clone(), name.to_string())?;
    info!("Renamed folder {} to {}", old_path.display(), new_path.display());
    Ok(())
}

/// Copy external files into a project's folder and register them as notes.
///
/// Returns the number of imported files.
pub async fn import_notes(
    storage: &mut NoteStorage,
    project: Uuid,
    sources: &[PathBuf],
) -> Result<usize, ActionError> {
    let target = storage
        .project(project)
        .ok_or(StorageError::ProjectNotFound(project))?;
    let dir = target.path.clone();

    let mut imported = 0;
    for source in sources {
        let Some(file_name) = source.file_name() else { continue };
        let destination = dir.join(file_name);

        fs::copy(source, &destination)
            .await
            .map_err(|e| ActionError::IoError(format!("{}: {}", source.display(), e)))?;

        if crate::models::is_note_file(&destination)
            && let Ok(note) = Note::load(&destination, project).await
        {
            storage.add_note(note);
        }
        imported += 1;
    }

    info!("Imported {} file(s) into {}", imported, dir.display());
    Ok(imported)
}
