//! Serial sync queue
//!
//! One git operation at a time on a background worker; later jobs wait behind
//! earlier ones. Cancellation is explicit and coarse: enqueuing a sync first
//! cancels every outstanding job, so no two jobs ever write to the same
//! repository directory. Completion is always reported, whatever the outcome,
//! over the event channel and to an optional delegate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;
use uuid::Uuid;

use super::CancelToken;
use super::workflow::{SyncOutcome, SyncRequest, run_sync};
use crate::progress::GitProgress;
use crate::storage::NoteStorage;

/// Lifecycle events of queued jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Started { id: Uuid },
    Finished { id: Uuid, outcome: SyncOutcome },
}

/// Narrow interface for embedders that mirror job state into UI chrome
/// (busy indicators, idle-timer toggling and the like).
#[async_trait]
pub trait SyncDelegate: Send + Sync {
    async fn sync_started(&self, id: Uuid);
    async fn sync_finished(&self, id: Uuid, outcome: &SyncOutcome);
}

type JobFn = Box<dyn FnOnce(&CancelToken) -> SyncOutcome + Send + 'static>;

struct Job {
    id: Uuid,
    cancel: CancelToken,
    reload_on_success: bool,
    run: JobFn,
}

/// Handle to the serial background worker.
#[derive(Clone)]
pub struct SyncQueue {
    sender: UnboundedSender<Job>,
    outstanding: Arc<Mutex<Vec<(Uuid, CancelToken)>>>,
    progress: GitProgress,
}

impl SyncQueue {
    /// Spawn the worker task. After a successful sync job the note storage is
    /// reloaded from disk before completion is reported.
    pub fn spawn(
        storage: Arc<RwLock<NoteStorage>>,
        progress: GitProgress,
        delegate: Option<Arc<dyn SyncDelegate>>,
    ) -> (Self, UnboundedReceiver<QueueEvent>) {
        let (sender, mut jobs) = mpsc::unbounded_channel::<Job>();
        let (events, events_rx) = mpsc::unbounded_channel();
        let outstanding: Arc<Mutex<Vec<(Uuid, CancelToken)>>> = Arc::new(Mutex::new(Vec::new()));

        let worker_outstanding = Arc::clone(&outstanding);
        tokio::spawn(async move {
            while let Some(job) = jobs.recv().await {
                let Job {
                    id,
                    cancel,
                    reload_on_success,
                    run,
                } = job;

                let _ = events.send(QueueEvent::Started { id });
                if let Some(delegate) = &delegate {
                    delegate.sync_started(id).await;
                }

                let outcome = if cancel.is_cancelled() {
                    SyncOutcome::Cancelled
                } else {
                    let job_cancel = cancel.clone();
                    match tokio::task::spawn_blocking(move || run(&job_cancel)).await {
                        Ok(outcome) => outcome,
                        Err(e) => SyncOutcome::Failed {
                            title: "Git error".to_string(),
                            message: format!("sync task failed: {e}"),
                        },
                    }
                };

                if reload_on_success && outcome.is_success() {
                    if let Err(e) = storage.write().await.reload().await {
                        warn!("Database reload after sync failed: {}", e);
                    }
                }

                if let Some(delegate) = &delegate {
                    delegate.sync_finished(id, &outcome).await;
                }
                if let Ok(mut jobs) = worker_outstanding.lock() {
                    jobs.retain(|(job_id, _)| *job_id != id);
                }
                let _ = events.send(QueueEvent::Finished { id, outcome });
            }
        });

        (
            Self {
                sender,
                outstanding,
                progress,
            },
            events_rx,
        )
    }

    /// Queue a clone/pull run, cancelling every outstanding job first.
    pub fn enqueue_sync(&self, request: SyncRequest) -> Uuid {
        self.cancel_all();
        let progress = self.progress.clone();
        self.enqueue_job(true, Box::new(move |cancel| run_sync(&request, &progress, cancel)))
    }

    /// Queue an arbitrary git task on the serial worker.
    pub fn enqueue<F>(&self, job: F) -> Uuid
    where
        F: FnOnce(&CancelToken) -> SyncOutcome + Send + 'static,
    {
        self.enqueue_job(false, Box::new(job))
    }

    fn enqueue_job(&self, reload_on_success: bool, run: JobFn) -> Uuid {
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();
        if let Ok(mut jobs) = self.outstanding.lock() {
            jobs.push((id, cancel.clone()));
        }

        let job = Job {
            id,
            cancel,
            reload_on_success,
            run,
        };
        if self.sender.send(job).is_err() {
            warn!("Sync queue worker is gone; job {} dropped", id);
        }
        id
    }

    /// Request cancellation of every outstanding job (queued or running).
    pub fn cancel_all(&self) {
        if let Ok(jobs) = self.outstanding.lock() {
            for (_, cancel) in jobs.iter() {
                cancel.cancel();
            }
        }
    }

    /// Request cancellation of a single job.
    pub fn cancel(&self, id: Uuid) {
        if let Ok(jobs) = self.outstanding.lock()
            && let Some((_, cancel)) = jobs.iter().find(|(job_id, _)| *job_id == id)
        {
            cancel.cancel();
        }
    }

    /// Number of jobs not yet finished.
    pub fn outstanding(&self) -> usize {
        self.outstanding.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn progress(&self) -> &GitProgress {
        &self.progress
    }
}
