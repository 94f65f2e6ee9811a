//! Sidebar action tests: folder lifecycle and project-wide tag rewrites

use tempfile::TempDir;

use note_sync_sdk::actions::{
    ActionError, create_folder, import_notes, remove_folder, remove_tag, rename_folder, rename_tag,
};
use note_sync_sdk::models::Project;
use note_sync_sdk::{NoteStorage, StorageLayout};

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
async fn test_create_and_rename_folder() {
    let (_temp, mut storage) = storage_with(&[]).await;
    let root = storage.default_project().unwrap().id;

    let id = create_folder(&mut storage, root, "Journal").await.unwrap();
    let path = storage.project(id).unwrap().path.clone();
    assert!(path.is_dir());

    assert!(matches!(
        create_folder(&mut storage, root, "Journal").await,
        Err(ActionError::AlreadyExists(_))
    ));
    assert!(matches!(
        create_folder(&mut storage, root, "   ").await,
        Err(ActionError::EmptyName)
    ));

    rename_folder(&mut storage, id, "Diary").await.unwrap();
    assert!(!path.exists());
    let renamed = storage.project(id).unwrap();
    assert_eq!(renamed.label, "Diary");
    assert!(renamed.path.is_dir());
}

#[tokio::test]
async fn test_remove_folder_deletes_managed_content_only() {
    let (_temp, mut storage) = storage_with(&[("Work/todo.md", "x")]).await;

    let work = storage
        .projects()
        .iter()
        .find(|p| p.label == "Work")
        .cloned()
        .unwrap();
    remove_folder(&mut storage, work.id).await.unwrap();
    assert!(!work.path.exists());
    assert!(storage.project(work.id).is_none());

    // External folders leave their disk content alone.
    let external_temp = TempDir::new().unwrap();
    let external_dir = external_temp.path().join("shared");
    std::fs::create_dir_all(&external_dir).unwrap();
    std::fs::write(external_dir.join("keep.md"), "keep me").unwrap();

    let external = storage.register_project(Project::external(&external_dir, "Shared"));
    remove_folder(&mut storage, external).await.unwrap();
    assert!(storage.project(external).is_none());
    assert!(external_dir.join("keep.md").exists());
}

#[tokio::test]
async fn test_default_project_is_not_removable() {
    let (_temp, mut storage) = storage_with(&[]).await;
    let root = storage.default_project().unwrap().id;
    assert!(matches!(
        remove_folder(&mut storage, root).await,
        Err(ActionError::NotRemovable)
    ));
}

#[tokio::test]
async fn test_rename_tag_across_project() {
    let (_temp, mut storage) = storage_with(&[
        ("a.md", "first #draft note"),
        ("b.md", "second #draft and #draft/sub"),
        ("c.md", "untagged"),
    ])
    .await;
    let root = storage.default_project().unwrap().id;

    let touched = rename_tag(&mut storage, root, "draft", "review").await.unwrap();
    assert_eq!(touched, 2);

    let tags = storage.tag_index();
    assert!(tags.contains(&"review".to_string()));
    assert!(!tags.contains(&"draft".to_string()));
    // The longer tag sharing the prefix is untouched.
    assert!(tags.contains(&"draft/sub".to_string()));

    // The rewrite reached the files, not just the in-memory notes.
    let a = storage
        .notes()
        .iter()
        .find(|n| n.path.ends_with("a.md"))
        .unwrap();
    let on_disk = std::fs::read_to_string(&a.path).unwrap();
    assert_eq!(on_disk, "first #review note");
}

#[tokio::test]
async fn test_rename_tag_rejects_short_names() {
    let (_temp, mut storage) = storage_with(&[("a.md", "#draft")]).await;
    let root = storage.default_project().unwrap().id;

    // Sanitizing "!?x" leaves one character, which is too short.
    assert!(matches!(
        rename_tag(&mut storage, root, "draft", "!?x").await,
        Err(ActionError::InvalidTag(_))
    ));
}

#[tokio::test]
async fn test_remove_tag_rewrites_markers() {
    let (_temp, mut storage) = storage_with(&[("a.md", "keep #done forever")]).await;
    let root = storage.default_project().unwrap().id;

    let touched = remove_tag(&mut storage, root, "done").await.unwrap();
    assert_eq!(touched, 1);
    assert!(storage.tag_index().is_empty());

    let a = storage.notes().first().unwrap();
    let on_disk = std::fs::read_to_string(&a.path).unwrap();
    assert!(!on_disk.contains("#done"));
    assert!(on_disk.contains("keep"));
    assert!(on_disk.contains("forever"));
}

#[tokio::test]
async fn test_import_copies_and_registers_notes() {
    let (_temp, mut storage) = storage_with(&[]).await;
    let root = storage.default_project().unwrap().id;

    let source_temp = TempDir::new().unwrap();
    let note_src = source_temp.path().join("imported.md");
    let other_src = source_temp.path().join("photo.png");
    std::fs::write(&note_src, "imported #inbox").unwrap();
    std::fs::write(&other_src, "not a note").unwrap();

    let imported = import_notes(&mut storage, root, &[note_src, other_src])
        .await
        .unwrap();
    assert_eq!(imported, 2);

    // Only the note file joined the storage index.
    assert_eq!(storage.notes().len(), 1);
    assert!(storage.tag_index().contains(&"inbox".to_string()));
}
