//! Background queue for enrichment runs.
//!
//! One worker task drains a bounded channel, running jobs one at a time.
//! Submitting selects the targets up front and returns an acknowledgment
//! immediately; progress is visible through [`JobQueue::status`] and the
//! optional event channel. Only the most recent finished jobs keep their
//! status; older ones are forgotten.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use romshelf_db::{CatalogStore, OperationError};
use romshelf_scraper::MetadataProvider;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedSender, error::TrySendError};
use tokio::sync::watch;

use crate::enrich::{
    EnrichEvent, EnrichOptions, EnrichRequest, EnrichSummary, run_enrichment, select_targets,
};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Enrichment queue is full")]
    QueueFull,
    #[error("Job queue worker has stopped")]
    Closed,
    #[error("Unknown job: {0}")]
    UnknownJob(u64),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

/// Returned as soon as a job is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichAccepted {
    pub job_id: u64,
    pub total_games: usize,
    pub batch_size: usize,
    /// Seconds between batches.
    pub delay: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed { summary: EnrichSummary },
    Failed { error: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Finished jobs whose status is kept by default.
pub const RETAINED_FINISHED_JOBS: usize = 32;

pub struct QueueConfig {
    /// Jobs that may wait behind the running one.
    pub capacity: usize,
    /// Finished jobs whose status stays queryable (at least one).
    pub retained_finished: usize,
    /// Batch sizing for requests that don't specify their own.
    pub defaults: EnrichOptions,
    pub events: Option<UnboundedSender<EnrichEvent>>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            retained_finished: RETAINED_FINISHED_JOBS,
            defaults: EnrichOptions::default(),
            events: None,
        }
    }
}

struct Job {
    id: u64,
    game_ids: Vec<i64>,
    options: EnrichOptions,
}

type StatusMap = HashMap<u64, JobStatus>;

pub struct JobQueue {
    store: Arc<dyn CatalogStore>,
    sender: mpsc::Sender<Job>,
    statuses: Arc<watch::Sender<StatusMap>>,
    next_id: AtomicU64,
    defaults: EnrichOptions,
}

impl JobQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn start(
        store: Arc<dyn CatalogStore>,
        provider: Arc<dyn MetadataProvider>,
        config: QueueConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let (statuses, _) = watch::channel(StatusMap::new());
        let statuses = Arc::new(statuses);

        tokio::spawn(worker(
            receiver,
            store.clone(),
            provider,
            statuses.clone(),
            config.events,
            config.retained_finished.max(1),
        ));

        Self {
            store,
            sender,
            statuses,
            next_id: AtomicU64::new(1),
            defaults: config.defaults,
        }
    }

    /// Select targets and queue a run.
    pub fn submit(&self, request: &EnrichRequest) -> Result<EnrichAccepted, JobError> {
        let game_ids = select_targets(self.store.as_ref(), request.game_ids.as_deref())?;
        let options = EnrichOptions::from_request(request, &self.defaults);
        let job_id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let accepted = EnrichAccepted {
            job_id,
            total_games: game_ids.len(),
            batch_size: options.batch_size,
            delay: options.delay.as_secs(),
        };

        // Record before sending so the worker's updates always come after.
        set_status(&self.statuses, job_id, JobStatus::Queued);
        let job = Job {
            id: job_id,
            game_ids,
            options,
        };
        match self.sender.try_send(job) {
            Ok(()) => {
                log::info!(
                    "Queued enrichment job {} ({} games)",
                    job_id,
                    accepted.total_games
                );
                Ok(accepted)
            }
            Err(e) => {
                self.statuses.send_modify(|map| {
                    map.remove(&job_id);
                });
                match e {
                    TrySendError::Full(_) => Err(JobError::QueueFull),
                    TrySendError::Closed(_) => Err(JobError::Closed),
                }
            }
        }
    }

    pub fn status(&self, job_id: u64) -> Option<JobStatus> {
        self.statuses.borrow().get(&job_id).cloned()
    }

    /// Resolve once the job reaches a terminal status. A job already evicted
    /// from the finished-status history is unknown.
    pub async fn wait(&self, job_id: u64) -> Result<JobStatus, JobError> {
        let mut rx = self.statuses.subscribe();
        let map = rx
            .wait_for(|map| map.get(&job_id).is_none_or(JobStatus::is_terminal))
            .await
            .map_err(|_| JobError::Closed)?;
        map.get(&job_id).cloned().ok_or(JobError::UnknownJob(job_id))
    }
}

fn set_status(statuses: &watch::Sender<StatusMap>, job_id: u64, status: JobStatus) {
    statuses.send_modify(|map| {
        map.insert(job_id, status);
    });
}

/// Record a terminal status and drop the oldest finished jobs beyond `retain`.
fn finish(statuses: &watch::Sender<StatusMap>, job_id: u64, status: JobStatus, retain: usize) {
    statuses.send_modify(|map| {
        map.insert(job_id, status);
        let mut finished: Vec<u64> = map
            .iter()
            .filter(|(_, s)| s.is_terminal())
            .map(|(id, _)| *id)
            .collect();
        if finished.len() > retain {
            finished.sort_unstable();
            let evict = finished.len() - retain;
            for id in &finished[..evict] {
                map.remove(id);
            }
            log::debug!("Forgot {} finished job(s)", evict);
        }
    });
}

async fn worker(
    mut receiver: mpsc::Receiver<Job>,
    store: Arc<dyn CatalogStore>,
    provider: Arc<dyn MetadataProvider>,
    statuses: Arc<watch::Sender<StatusMap>>,
    events: Option<UnboundedSender<EnrichEvent>>,
    retain: usize,
) {
    while let Some(job) = receiver.recv().await {
        let job_id = job.id;
        set_status(&statuses, job_id, JobStatus::Running);
        log::debug!("Starting enrichment job {}", job_id);

        let store = store.clone();
        let provider = provider.clone();
        let events = events.clone();
        let handle = tokio::spawn(async move {
            run_enrichment(
                store.as_ref(),
                provider.as_ref(),
                &job.game_ids,
                &job.options,
                events.as_ref(),
            )
            .await
        });

        let status = match handle.await {
            Ok(summary) => JobStatus::Completed { summary },
            Err(e) => {
                log::error!("Enrichment job {} failed: {}", job_id, e);
                JobStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        finish(&statuses, job_id, status, retain);
    }
}
