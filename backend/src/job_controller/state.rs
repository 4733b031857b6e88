//! Manages the state of long-running bulk jobs.
//!
//! A bulk upload is processed outside the request/response cycle (see
//! `services/bulk/upload.rs`). This module tracks those jobs:
//! - `JobsState`: a clonable, thread-safe struct injected into the Actix
//!   application. It holds every job's status, finished batch results and the
//!   cancellation tokens of jobs still running.
//! - `JobUpdate`: a status change sent by a background job.
//! - `start_job_updater`: a long-running task that applies `JobUpdate`s to the
//!   shared status map and forgets the oldest finished jobs once more than
//!   `retained_jobs` of them are kept.

use crate::pipeline::orchestrator::CancelToken;
use common::jobs::JobStatus;
use common::model::batch::BatchResult;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Capacity of the channel between background jobs and the updater task.
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Finished jobs kept for status polling and download unless configured otherwise.
pub const DEFAULT_RETAINED_JOBS: usize = 100;

/// Shared state of all bulk jobs, shared across the Actix application as `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    /// Job ID to current status. Written only by `start_job_updater` once a
    /// job has been registered as `Pending`.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Batch results of completed jobs, kept in memory for download.
    pub results: Arc<RwLock<HashMap<String, Arc<BatchResult>>>>,

    /// Tokens of jobs that are still running.
    pub cancel_tokens: Arc<RwLock<HashMap<String, CancelToken>>>,

    /// Background jobs push `JobUpdate`s here instead of locking `jobs`.
    pub tx: mpsc::Sender<JobUpdate>,

    /// How many finished jobs (and their results) stay in memory.
    pub retained_jobs: usize,
}

impl JobsState {
    /// Creates an empty state and the receiver to hand to `start_job_updater`.
    pub fn new(retained_jobs: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            results: Arc::new(RwLock::new(HashMap::new())),
            cancel_tokens: Arc::new(RwLock::new(HashMap::new())),
            tx,
            retained_jobs,
        };
        (state, rx)
    }
}

/// A status update for one background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies `JobUpdate`s to the shared map until every sender is dropped.
///
/// A job that already reached a terminal status is never moved back. Finished
/// jobs are remembered in completion order; past `retained_jobs` the oldest
/// one is dropped from both `jobs` and `results`.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    let mut finished: VecDeque<String> = VecDeque::new();
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if jobs.get(&update.job_id).is_some_and(JobStatus::is_terminal) {
            continue;
        }
        if update.status.is_terminal() {
            finished.push_back(update.job_id.clone());
        }
        jobs.insert(update.job_id, update.status);

        while finished.len() > state.retained_jobs {
            let Some(expired) = finished.pop_front() else {
                break;
            };
            jobs.remove(&expired);
            state.results.write().await.remove(&expired);
            debug!("evicted finished job {}", expired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn terminal_status_is_not_overwritten() {
        let (state, rx) = JobsState::new(DEFAULT_RETAINED_JOBS);
        tokio::spawn(start_job_updater(state.clone(), rx));

        let updates = [
            ("job", JobStatus::InProgress(50)),
            ("job", JobStatus::Completed("done".to_string())),
            ("job", JobStatus::InProgress(99)),
            ("sentinel", JobStatus::Pending),
        ];
        for (job_id, status) in updates {
            state
                .tx
                .send(JobUpdate {
                    job_id: job_id.to_string(),
                    status,
                })
                .await
                .unwrap();
        }

        // Updates are applied in order, so once the sentinel shows up the rest are in.
        while !state.jobs.read().await.contains_key("sentinel") {
            actix_web::rt::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(
            state.jobs.read().await.get("job"),
            Some(&JobStatus::Completed("done".to_string()))
        );
    }

    #[actix_web::test]
    async fn oldest_finished_jobs_are_evicted() {
        let (state, rx) = JobsState::new(2);
        tokio::spawn(start_job_updater(state.clone(), rx));

        for job_id in ["first", "second", "third"] {
            state
                .results
                .write()
                .await
                .insert(job_id.to_string(), Arc::new(BatchResult::default()));
            state
                .tx
                .send(JobUpdate {
                    job_id: job_id.to_string(),
                    status: JobStatus::Completed("done".to_string()),
                })
                .await
                .unwrap();
        }
        state
            .tx
            .send(JobUpdate {
                job_id: "running".to_string(),
                status: JobStatus::InProgress(10),
            })
            .await
            .unwrap();

        while !state.jobs.read().await.contains_key("running") {
            actix_web::rt::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let jobs = state.jobs.read().await;
        assert!(!jobs.contains_key("first"));
        assert!(jobs.contains_key("second"));
        assert!(jobs.contains_key("third"));
        drop(jobs);

        let results = state.results.read().await;
        assert!(!results.contains_key("first"));
        assert_eq!(results.len(), 2);
    }
}
