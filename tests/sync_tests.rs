//! Clone/pull workflow tests against local remotes

use std::path::Path;

use git2::Repository;
use tempfile::TempDir;

use note_sync_sdk::git::list_repositories;
use note_sync_sdk::{
    CancelToken, GitCredentials, GitProgress, StorageLayout, SyncOutcome, SyncRequest,
    git::run_sync,
};

fn layout_in(temp: &TempDir) -> StorageLayout {
    let layout = StorageLayout::new(temp.path().join("support"), temp.path().join("notes"));
    std::fs::create_dir_all(layout.documents_dir()).unwrap();
    layout
}

/// Bare remote with a single commit on `master`.
fn seed_remote(dir: &Path) -> String {
    let remote = Repository::init_bare(dir).unwrap();
    let signature = git2::Signature::now("seed", "seed@example.com").unwrap();

    let blob = remote.blob(b"# hello\n\nfirst note with #seeded\n").unwrap();
    let mut builder = remote.treebuilder(None).unwrap();
    builder.insert("hello.md", blob, 0o100644).unwrap();
    let tree_id = builder.write().unwrap();
    let tree = remote.find_tree(tree_id).unwrap();
    remote
        .commit(Some("refs/heads/master"), &signature, &signature, "seed", &tree, &[])
        .unwrap();

    dir.to_string_lossy().into_owned()
}

fn request(layout: &StorageLayout, origin: String) -> SyncRequest {
    SyncRequest {
        repository_path: layout.repository_path("notes"),
        workdir: layout.documents_dir().to_path_buf(),
        origin,
        credentials: GitCredentials::default(),
    }
}

#[tokio::test]
async fn test_clone_populates_work_tree_and_repository_list() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(&temp);
    let origin = seed_remote(&temp.path().join("remote.git"));

    // The reserved tmp directory must never appear in the listing.
    std::fs::create_dir_all(layout.repository_path("tmp")).unwrap();

    let outcome = run_sync(&request(&layout, origin), &GitProgress::new(), &CancelToken::new());

    assert_eq!(outcome, SyncOutcome::Success);
    assert!(layout.documents_dir().join("hello.md").exists());
    assert_eq!(list_repositories(&layout).await.unwrap(), vec!["notes"]);
}

#[test]
fn test_second_sync_replaces_existing_clone() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(&temp);
    let origin = seed_remote(&temp.path().join("remote.git"));
    let request = request(&layout, origin);

    assert_eq!(
        run_sync(&request, &GitProgress::new(), &CancelToken::new()),
        SyncOutcome::Success
    );
    assert_eq!(
        run_sync(&request, &GitProgress::new(), &CancelToken::new()),
        SyncOutcome::Success
    );
    assert!(layout.documents_dir().join("hello.md").exists());
}

#[test]
fn test_unborn_remote_gets_initial_commit_and_push() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(&temp);

    let remote_dir = temp.path().join("remote.git");
    Repository::init_bare(&remote_dir).unwrap();
    std::fs::write(layout.documents_dir().join("first.md"), "my first note\n").unwrap();

    let progress = GitProgress::new();
    let outcome = run_sync(
        &request(&layout, remote_dir.to_string_lossy().into_owned()),
        &progress,
        &CancelToken::new(),
    );

    // The fallback initializes the repository and pushes; no error surfaces.
    assert_eq!(outcome, SyncOutcome::Success);
    assert!(layout.repository_path("notes").exists());
    assert!(
        std::fs::read_dir(layout.repository_path("notes"))
            .unwrap()
            .next()
            .is_some()
    );

    let messages = progress.messages();
    assert!(messages.iter().any(|m| m == "Empty repo, git add -A"));
    assert!(messages.iter().any(|m| m == "git commit"));

    // The remote's default branch was born by the push.
    let remote = Repository::open_bare(&remote_dir).unwrap();
    let head = remote.find_reference("refs/heads/master").unwrap();
    let commit = head.peel_to_commit().unwrap();
    assert!(commit.tree().unwrap().get_name("first.md").is_some());
}

#[test]
fn test_unreachable_origin_surfaces_failure() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(&temp);
    let origin = temp.path().join("does-not-exist.git");

    let outcome = run_sync(
        &request(&layout, origin.to_string_lossy().into_owned()),
        &GitProgress::new(),
        &CancelToken::new(),
    );

    assert!(matches!(outcome, SyncOutcome::Failed { .. }));
}

#[test]
fn test_cancelled_token_short_circuits() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(&temp);
    let origin = seed_remote(&temp.path().join("remote.git"));

    let cancel = CancelToken::new();
    cancel.cancel();
    let outcome = run_sync(&request(&layout, origin), &GitProgress::new(), &cancel);

    assert_eq!(outcome, SyncOutcome::Cancelled);
    // Cancellation won: the existing clone directory was not touched.
    assert!(!layout.repository_path("notes").exists());
}
