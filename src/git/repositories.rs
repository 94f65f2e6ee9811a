//! Repository directory bookkeeping
//!
//! One subdirectory of the application-support `Repositories` folder per
//! cloned/initialized repository. The reserved `tmp` name never shows up in
//! listings, and deleting a repository first stops any in-flight sync.

use tokio::fs;
use tracing::info;

use super::queue::SyncQueue;
use crate::storage::StorageError;
use crate::storage::layout::{StorageLayout, TMP_REPOSITORY_NAME};

/// Names of the on-disk repositories, sorted, reserved name excluded.
pub async fn list_repositories(layout: &StorageLayout) -> Result<Vec<String>, StorageError> {
    let dir = layout.repositories_dir();
    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StorageError::IoError(format!("{}: {}", dir.display(), e)));
        }
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::IoError(e.to_string()))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        if !file_type.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name != TMP_REPOSITORY_NAME
        {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Delete a repository directory, cancelling any in-flight sync first.
pub async fn remove_repository(
    layout: &StorageLayout,
    name: &str,
    queue: &SyncQueue,
) -> Result<(), StorageError> {
    queue.cancel_all();

    let path = layout.repository_path(name);
    match fs::remove_dir_all(&path).await {
        Ok(()) => {
            info!("Removed repository {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::IoError(format!("{}: {}", path.display(), e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_listing_excludes_reserved_tmp() {
        let temp = TempDir::new().unwrap();
        let layout = StorageLayout::new(temp.path(), temp.path().join("notes"));

        let repositories = layout.repositories_dir();
        std::fs::create_dir_all(repositories.join("alpha")).unwrap();
        std::fs::create_dir_all(repositories.join(TMP_REPOSITORY_NAME)).unwrap();
        std::fs::create_dir_all(repositories.join("beta")).unwrap();
        std::fs::write(repositories.join("stray.txt"), "not a repo").unwrap();

        let names = list_repositories(&layout).await.unwrap();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_listing_without_repositories_dir() {
        let temp = TempDir::new().unwrap();
        let layout = StorageLayout::new(temp.path().join("missing"), temp.path().join("notes"));
        assert!(list_repositories(&layout).await.unwrap().is_empty());
    }
}
