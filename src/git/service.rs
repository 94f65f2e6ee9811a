//! Git service for one project's repository
//!
//! The git directory lives under the application-support `Repositories`
//! folder while the work tree is the project's notes directory, so deleting a
//! repository never touches the notes themselves. All operations are blocking
//! (libgit2) and are expected to run on the sync queue's worker.

use std::path::{Path, PathBuf};

use git2::{
    Cred, CredentialType, FetchOptions, PushOptions, RemoteCallbacks, Repository,
    RepositoryInitOptions, Signature,
};
use tracing::{debug, info};

use super::{CancelToken, GitCredentials, GitError};
use crate::progress::GitProgress;

const ORIGIN: &str = "origin";

/// Signature used for merge and first commits.
const COMMITTER_NAME: &str = "Note Sync";
const COMMITTER_EMAIL: &str = "sync@notes.local";

/// Service for one repository: git dir, work tree, origin and credentials.
pub struct GitService {
    repository_path: PathBuf,
    workdir: PathBuf,
    origin: String,
    credentials: GitCredentials,
    progress: GitProgress,
    cancel: CancelToken,
    repo: Option<Repository>,
}

impl GitService {
    pub fn new(
        repository_path: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
        origin: impl Into<String>,
        credentials: GitCredentials,
        progress: GitProgress,
        cancel: CancelToken,
    ) -> Self {
        Self {
            repository_path: repository_path.into(),
            workdir: workdir.into(),
            origin: origin.into(),
            credentials,
            progress,
            cancel,
            repo: None,
        }
    }

    pub fn repository_path(&self) -> &Path {
        &self.repository_path
    }

    /// Open the repository, or initialize one with a separate git dir and the
    /// project directory as work tree.
    pub fn open_or_init(&mut self) -> Result<(), GitError> {
        std::fs::create_dir_all(&self.workdir)?;
        if let Some(parent) = self.repository_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let repo = match Repository::open(&self.repository_path) {
            Ok(repo) => {
                debug!("Opened repository at {}", self.repository_path.display());
                repo
            }
            Err(_) => {
                let mut opts = RepositoryInitOptions::new();
                opts.bare(false);
                opts.no_dotgit_dir(true);
                opts.workdir_path(&self.workdir);
                let repo = Repository::init_opts(&self.repository_path, &opts)?;
                info!(
                    "Initialized repository at {} with work tree {}",
                    self.repository_path.display(),
                    self.workdir.display()
                );
                repo
            }
        };

        repo.set_workdir(&self.workdir, false)?;
        self.repo = Some(repo);
        Ok(())
    }

    fn repo(&self) -> Result<&Repository, GitError> {
        self.repo.as_ref().ok_or(GitError::NotOpened)
    }

    /// Fetch all branches from origin, (re)pointing the remote at the
    /// configured URL first.
    pub fn fetch_origin(&self) -> Result<(), GitError> {
        let repo = self.repo()?;

        if repo.find_remote(ORIGIN).is_ok() {
            repo.remote_set_url(ORIGIN, &self.origin)?;
        } else {
            repo.remote(ORIGIN, &self.origin)?;
        }

        let mut remote = repo.find_remote(ORIGIN)?;
        let mut opts = FetchOptions::new();
        opts.remote_callbacks(self.remote_callbacks());

        self.progress.log(format!("Fetching {}", self.origin));
        remote.fetch(
            &[&format!("+refs/heads/*:refs/remotes/{ORIGIN}/*")],
            Some(&mut opts),
            None,
        )?;
        Ok(())
    }

    /// Remote default branch after a fetch.
    ///
    /// Resolution order: symbolic `origin/HEAD`, then `master`, then `main`,
    /// then any fetched branch. An empty remote
    /// reports the default head as missing, which the workflow treats as an
    /// uninitialized repository.
    pub fn default_remote_branch(&self) -> Result<String, GitError> {
        let repo = self.repo()?;
        let prefix = format!("refs/remotes/{ORIGIN}/");

        if let Ok(head) = repo.find_reference(&format!("refs/remotes/{ORIGIN}/HEAD"))
            && let Some(target) = head.symbolic_target()
            && let Some(branch) = target.strip_prefix(&prefix)
        {
            return Ok(branch.to_string());
        }

        for branch in ["master", "main"] {
            if repo.find_reference(&format!("{prefix}{branch}")).is_ok() {
                return Ok(branch.to_string());
            }
        }

        let mut references = repo.references_glob(&format!("{prefix}*"))?;
        if let Some(Ok(reference)) = references.next()
            && let Some(name) = reference.name()
            && let Some(branch) = name.strip_prefix(&prefix)
            && branch != "HEAD"
        {
            return Ok(branch.to_string());
        }

        Err(GitError::NotFound("refs/heads/master".to_string()))
    }

    /// Point the local branch at the fetched remote branch and force-checkout
    /// the work tree.
    pub fn checkout_remote_branch(&self, branch: &str) -> Result<(), GitError> {
        let repo = self.repo()?;

        let reference = repo.find_reference(&format!("refs/remotes/{ORIGIN}/{branch}"))?;
        let commit = reference.peel_to_commit()?;
        repo.branch(branch, &commit, true)?;
        repo.set_head(&format!("refs/heads/{branch}"))?;

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        repo.checkout_head(Some(&mut checkout))?;

        self.progress.log(format!("Checked out {branch}"));
        Ok(())
    }

    /// Name of the branch HEAD points at, born or not.
    pub fn local_branch(&self) -> Result<Option<String>, GitError> {
        let repo = self.repo()?;
        match repo.head() {
            Ok(head) => Ok(head.shorthand().map(ToOwned::to_owned)),
            Err(_) => {
                let head = repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(ToOwned::to_owned))
            }
        }
    }

    /// Stage every change in the work tree.
    pub fn stage_all(&self) -> Result<(), GitError> {
        let repo = self.repo()?;
        let mut index = repo.index()?;
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;
        Ok(())
    }

    /// Commit the index. Works on an unborn HEAD (first commit).
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        let repo = self.repo()?;
        let signature = Signature::now(COMMITTER_NAME, COMMITTER_EMAIL)?;

        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let mut parents: Vec<git2::Commit> = Vec::new();
        if let Ok(head) = repo.head()
            && let Ok(parent) = head.peel_to_commit()
        {
            parents.push(parent);
        }
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)?;
        info!("Committed: {}", message);
        Ok(())
    }

    /// Push a branch to origin.
    pub fn push(&self, branch: &str) -> Result<(), GitError> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(ORIGIN)?;

        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        let mut opts = PushOptions::new();
        opts.remote_callbacks(self.remote_callbacks());

        remote.push(&[&refspec], Some(&mut opts))?;
        self.progress.log(format!("Pushed {branch}"));
        Ok(())
    }

    /// Authentication, cancellation and sideband logging callbacks.
    fn remote_callbacks(&self) -> RemoteCallbacks<'static> {
        let mut callbacks = RemoteCallbacks::new();

        let ssh_key_path = self.credentials.ssh_key_path.clone();
        let passphrase = self.credentials.passphrase.clone();
        let username = self.credentials.username.clone();
        let token = self.credentials.token.clone();
        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            if allowed_types.contains(CredentialType::SSH_KEY)
                && let Some(ref key_path) = ssh_key_path
            {
                let user = username_from_url.unwrap_or("git");
                return Cred::ssh_key(user, None, key_path, passphrase.as_deref());
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT)
                && let (Some(user), Some(pass)) = (&username, &token)
            {
                return Cred::userpass_plaintext(user, pass);
            }

            Cred::default()
        });

        let cancel = self.cancel.clone();
        callbacks.transfer_progress(move |_stats| !cancel.is_cancelled());

        let progress = self.progress.clone();
        callbacks.sideband_progress(move |data| {
            if let Ok(text) = std::str::from_utf8(data) {
                let text = text.trim();
                if !text.is_empty() {
                    progress.log(text);
                }
            }
            true
        });

        callbacks
    }
}

impl std::fmt::Debug for GitService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitService")
            .field("repository_path", &self.repository_path)
            .field("workdir", &self.workdir)
            .field("origin", &self.origin)
            .finish()
    }
}
