//! Clone/pull workflow
//!
//! The one multi-step control flow of the sync subsystem. A run always starts
//! from a clean slate: the existing git dir (never the notes) is deleted, the
//! remote is cloned-or-fetched and its default branch force-checked-out. A
//! remote without commits switches to the initialization path: stage all,
//! first commit, push.
//!
//! Failures on the initialization path are not swallowed; they surface as a
//! failed outcome.

use std::path::PathBuf;

use chrono::Utc;

use super::service::GitService;
use super::{CancelToken, GitCredentials, GitError};
use crate::models::Project;
use crate::progress::GitProgress;
use crate::storage::layout::StorageLayout;

/// Result of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    Cancelled,
    /// Alert-equivalent: a title and the underlying message.
    Failed {
        title: String,
        message: String,
    },
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success)
    }
}

/// Everything a sync run needs, captured up front so the job can move to the
/// worker without touching shared state.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Git dir under the `Repositories` folder.
    pub repository_path: PathBuf,
    /// Work tree: the project's notes directory.
    pub workdir: PathBuf,
    pub origin: String,
    pub credentials: GitCredentials,
}

impl SyncRequest {
    /// Request for a project, using the layout's repository naming.
    pub fn for_project(
        layout: &StorageLayout,
        project: &Project,
        origin: impl Into<String>,
        credentials: GitCredentials,
    ) -> Self {
        Self {
            repository_path: layout.repository_path(&project.repository_name()),
            workdir: project.path.clone(),
            origin: origin.into(),
            credentials,
        }
    }
}

/// Run the clone/pull workflow to completion. Blocking; runs on the queue's
/// worker.
pub fn run_sync(request: &SyncRequest, progress: &GitProgress, cancel: &CancelToken) -> SyncOutcome {
    if cancel.is_cancelled() {
        return SyncOutcome::Cancelled;
    }

    progress.log(format!("Sync {}", request.origin));

    // Fresh clone every run: drop the old git dir. The work tree stays.
    match std::fs::remove_dir_all(&request.repository_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return SyncOutcome::Failed {
                title: "Git error".to_string(),
                message: e.to_string(),
            };
        }
    }

    let mut service = GitService::new(
        &request.repository_path,
        &request.workdir,
        &request.origin,
        request.credentials.clone(),
        progress.clone(),
        cancel.clone(),
    );

    match clone_or_pull(&mut service, cancel) {
        Ok(branch) => {
            progress.log(format!("Sync done ({branch})"));
            SyncOutcome::Success
        }
        Err(GitError::NotFound(reference)) if reference.starts_with("refs/heads/") => {
            initialize_remote(&service, progress)
        }
        Err(GitError::Cancelled) => SyncOutcome::Cancelled,
        Err(err @ GitError::Unknown { .. }) => SyncOutcome::Failed {
            title: "Git clone/pull error".to_string(),
            message: err.to_string(),
        },
        Err(err) => SyncOutcome::Failed {
            title: "Git error".to_string(),
            message: err.to_string(),
        },
    }
}

fn clone_or_pull(service: &mut GitService, cancel: &CancelToken) -> Result<String, GitError> {
    service.open_or_init()?;
    if cancel.is_cancelled() {
        return Err(GitError::Cancelled);
    }
    service.fetch_origin()?;
    let branch = service.default_remote_branch()?;
    service.checkout_remote_branch(&branch)?;
    Ok(branch)
}

/// Initialization path for a remote without commits: stage all, first commit,
/// push the local default branch.
fn initialize_remote(service: &GitService, progress: &GitProgress) -> SyncOutcome {
    let result = (|| -> Result<(), GitError> {
        progress.log("Empty repo, git add -A");
        service.stage_all()?;

        progress.log("git commit");
        let message = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        service.commit(&message)?;

        let branch = service
            .local_branch()?
            .unwrap_or_else(|| "master".to_string());
        service.push(&branch)
    })();

    match result {
        Ok(()) => SyncOutcome::Success,
        Err(GitError::Cancelled) => SyncOutcome::Cancelled,
        Err(err) => SyncOutcome::Failed {
            title: "Git init error".to_string(),
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_before_start() {
        let request = SyncRequest {
            repository_path: PathBuf::from("/nonexistent/repo"),
            workdir: PathBuf::from("/nonexistent/notes"),
            origin: "git@host:a/b.git".to_string(),
            credentials: GitCredentials::default(),
        };
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = run_sync(&request, &GitProgress::new(), &cancel);
        assert_eq!(outcome, SyncOutcome::Cancelled);
    }

    #[test]
    fn test_request_for_project_uses_repository_naming() {
        let layout = StorageLayout::new("/support", "/notes");
        let project = Project::default_project("/notes", "notes");
        let request = SyncRequest::for_project(
            &layout,
            &project,
            "git@host:a/b.git",
            GitCredentials::default(),
        );
        assert_eq!(
            request.repository_path,
            PathBuf::from("/support/Repositories/notes")
        );
        assert_eq!(request.workdir, PathBuf::from("/notes"));
    }
}
