//! Tag actions: remove and rename inline tags across a project's notes

use tracing::info;
use uuid::Uuid;

use super::ActionError;
use crate::storage::NoteStorage;

/// Strip characters that may not appear in a tag name.
pub fn sanitize_tag(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '/'))
        .collect()
}

/// Remove a tag from every note of a project.
///
/// Rewrites the inline `#tag` markers to nothing, updates each note's tag set
/// and persists the changed notes. Returns the number of notes touched.
pub async fn remove_tag(
    storage: &mut NoteStorage,
    project: Uuid,
    tag: &str,
) -> Result<usize, ActionError> {
    rewrite_tag(storage, project, tag, None).await
}

/// Rename a tag on every note of a project.
///
/// The new name is sanitized and must keep more than one character.
/// Returns the number of notes touched.
pub async fn rename_tag(
    storage: &mut NoteStorage,
    project: Uuid,
    old: &str,
    new: &str,
) -> Result<usize, ActionError> {
    let new = sanitize_tag(new);
    if new.chars().count() <= 1 {
        return Err(ActionError::InvalidTag(new));
    }

    rewrite_tag(storage, project, old, Some(&new)).await
}

async fn rewrite_tag(
    storage: &mut NoteStorage,
    project: Uuid,
    tag: &str,
    replacement: Option<&str>,
) -> Result<usize, ActionError> {
    let mut touched = 0;

    for note in storage.notes_mut() {
        if note.project_id != project || !note.has_tag(tag) {
            continue;
        }

        note.replace_tag(tag, replacement);
        note.scan_content_tags();
        note.save()
            .await
            .map_err(|e| ActionError::IoError(format!("{}: {}", note.path.display(), e)))?;
        touched += 1;
    }

    match replacement {
        Some(new) => info!("Renamed tag #{} to #{} on {} note(s)", tag, new, touched),
        None => info!("Removed tag #{} from {} note(s)", tag, touched),
    }
    Ok(touched)
}
