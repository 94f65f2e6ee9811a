//! note-sync-cli - command line front end over the SDK
//!
//! Drives the same operations the settings screen offers: credentials,
//! origin, repository listing/removal and the clone/pull workflow.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::RwLock;

use note_sync_sdk::git::{list_repositories, remove_repository};
use note_sync_sdk::{
    GitProgress, NoteStorage, QueueEvent, SettingsStore, StorageLayout, SyncOutcome, SyncQueue,
    SyncRequest,
};

#[derive(Parser)]
#[command(name = "note-sync-cli", version, about = "Note storage and git synchronization")]
struct Cli {
    /// Application-support directory (settings, Repositories, id_rsa)
    #[arg(long)]
    app_support: PathBuf,

    /// Documents directory holding the note tree
    #[arg(long)]
    documents: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clone or pull the default project's repository
    Sync,
    /// List repository directories
    Repos,
    /// Delete a repository directory (stops any in-flight sync)
    RemoveRepo { name: String },
    /// Set the remote origin URL
    SetOrigin { url: String },
    /// Set the private key passphrase
    SetPassphrase { passphrase: String },
    /// Import a private key file
    ImportKey { path: PathBuf },
    /// Delete the stored private key and its materialized file
    DeleteKey,
    /// List the sidebar tag index
    Tags,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let layout = StorageLayout::new(&cli.app_support, &cli.documents);

    match cli.command {
        Command::Sync => sync(layout).await,
        Command::Repos => {
            for name in list_repositories(&layout).await? {
                println!("{name}");
            }
            Ok(())
        }
        Command::RemoveRepo { name } => {
            let storage = NoteStorage::load(layout.clone()).await?;
            let (queue, _events) =
                SyncQueue::spawn(Arc::new(RwLock::new(storage)), GitProgress::new(), None);
            remove_repository(&layout, &name, &queue).await?;
            println!("Removed {name}");
            Ok(())
        }
        Command::SetOrigin { url } => {
            let mut store = SettingsStore::open(layout).await?;
            store.set_origin(Some(url)).await?;
            Ok(())
        }
        Command::SetPassphrase { passphrase } => {
            let mut store = SettingsStore::open(layout).await?;
            store.set_passphrase(passphrase).await?;
            Ok(())
        }
        Command::ImportKey { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let mut store = SettingsStore::open(layout).await?;
            store.set_private_key(bytes).await?;
            println!("Installed key at {}", store.layout().rsa_key_path().display());
            Ok(())
        }
        Command::DeleteKey => {
            let mut store = SettingsStore::open(layout).await?;
            store.delete_private_key().await?;
            Ok(())
        }
        Command::Tags => {
            let storage = NoteStorage::load(layout).await?;
            for tag in storage.tag_index() {
                println!("#{tag}");
            }
            Ok(())
        }
    }
}

async fn sync(layout: StorageLayout) -> Result<()> {
    let store = SettingsStore::open(layout.clone()).await?;
    store.install_key().await?;

    let origin = store
        .settings()
        .origin
        .clone()
        .context("origin is not configured; run set-origin first")?;

    let storage = NoteStorage::load(layout.clone()).await?;
    let project = storage
        .default_project()
        .cloned()
        .context("no default project")?;
    let request = SyncRequest::for_project(&layout, &project, origin, store.credentials());

    let progress = GitProgress::new();
    let (queue, mut events) =
        SyncQueue::spawn(Arc::new(RwLock::new(storage)), progress.clone(), None);
    queue.enqueue_sync(request);

    while let Some(event) = events.recv().await {
        if let QueueEvent::Finished { outcome, .. } = event {
            for message in progress.messages() {
                println!("{message}");
            }
            match outcome {
                SyncOutcome::Success => println!("Sync finished"),
                SyncOutcome::Cancelled => println!("Sync cancelled"),
                SyncOutcome::Failed { title, message } => bail!("{title}: {message}"),
            }
            break;
        }
    }
    Ok(())
}
