//! # Bulk Upload Service
//!
//! Provides `POST /api/bulk/upload`, which starts a background job turning an
//! uploaded contact table into deep links.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: `process` reads the multipart `file` field (it must end
//!     with `.csv`), hashing it with MD5 as it streams in.
//!
//! 2.  **Job Scheduling**: `schedule_bulk_job` registers a new `job_id` as
//!     `Pending`, stores a cancellation token for it and returns the ID
//!     immediately so the client can poll `/status/{job_id}`.
//!
//! 3.  **Background Processing**: the spawned task runs `bulk_blocking` through
//!     `tokio::task::spawn_blocking`, keeping row validation off the async
//!     runtime. Rows are processed strictly in order.
//!
//! 4.  **Progress Reporting**: after each row the worker sends an
//!     `InProgress(percent)` update to the central `job_controller`, only when
//!     the integer percentage changes.
//!
//! 5.  **Completion**: the `BatchResult` is stored in `JobsState.results` before
//!     the job is marked `Completed`, so a client that sees `Completed` can
//!     download right away. Parse errors mark the job `Failed`, cancellation
//!     marks it `Cancelled`.

use crate::config::UploadLimit;
use crate::error::BatchError;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::pipeline::orchestrator::{run_batch, CancelToken, Progress, ProgressSink};
use crate::pipeline::phone::LibPhoneNormalizer;
use crate::pipeline::validator::RowContext;
use crate::pipeline::PipelineConfig;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::batch::BatchResult;
use futures_util::StreamExt;
use log::info;
use md5::Context;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A fully received upload.
pub(crate) struct Upload {
    pub file_name: String,
    pub text: String,
    pub md5: String,
}

/// Forwards row progress of one job to the central job updater.
struct JobProgress {
    job_id: String,
    tx: mpsc::Sender<JobUpdate>,
    last_percent: Option<u32>,
}

impl ProgressSink for JobProgress {
    fn report(&mut self, progress: Progress) {
        let percent = progress.percent() as u32;
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        let _ = self.tx.blocking_send(JobUpdate {
            job_id: self.job_id.clone(),
            status: JobStatus::InProgress(percent),
        });
    }
}

/// The Actix web handler for `POST /api/bulk/upload`.
///
/// - On success: `200 OK` with `{ "job_id": ... }`.
/// - On a bad upload: `400 Bad Request` with the error message.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<PipelineConfig>,
    limit: web::Data<UploadLimit>,
    payload: Multipart,
) -> impl Responder {
    let upload = match read_upload(payload, limit.0).await {
        Ok(upload) => upload,
        Err(e) => return HttpResponse::BadRequest().body(format!("Error: {}", e)),
    };
    info!(
        "received {} ({} bytes, md5 {})",
        upload.file_name,
        upload.text.len(),
        upload.md5
    );

    match schedule_bulk_job(&state, config.get_ref().clone(), upload).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(err) => HttpResponse::InternalServerError().body(err),
    }
}

/// Reads the `file` field of the multipart payload. Other fields are ignored.
///
/// The bytes are decoded as UTF-8, replacing invalid sequences.
pub(crate) async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload, String> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if field_name.as_deref() != Some("file") {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err("The file must end with .csv".to_string());
        }

        let mut md5_hasher = Context::new();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            if bytes.len() + chunk.len() > limit {
                return Err(format!("The file exceeds the {} byte limit", limit));
            }
            md5_hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            file_name,
            text: String::from_utf8_lossy(&bytes).into_owned(),
            md5: format!("{:x}", md5_hasher.finalize()),
        });
    }
    Err("Missing file".to_string())
}

/// Registers the job and spawns its background task.
pub(crate) async fn schedule_bulk_job(
    state: &JobsState,
    config: PipelineConfig,
    upload: Upload,
) -> Result<String, String> {
    let job_id = Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);
    let token = CancelToken::default();
    state
        .cancel_tokens
        .write()
        .await
        .insert(job_id.clone(), token.clone());

    let state = state.clone();
    let job_id_clone = job_id.clone();

    tokio::spawn(async move {
        let tx = state.tx.clone();
        let progress = JobProgress {
            job_id: job_id_clone.clone(),
            tx: tx.clone(),
            last_percent: None,
        };
        let handle = tokio::task::spawn_blocking(move || {
            bulk_blocking(&upload.text, &config, &token, progress)
        });

        let status = match handle.await {
            Ok(Ok(result)) => {
                let summary = result.summary();
                state
                    .results
                    .write()
                    .await
                    .insert(job_id_clone.clone(), Arc::new(result));
                JobStatus::Completed(format!(
                    "Processed {} rows successfully, {} with errors, {} total",
                    summary.processed, summary.errors, summary.total
                ))
            }
            Ok(Err(BatchError::Cancelled { .. })) => JobStatus::Cancelled,
            Ok(Err(e)) => JobStatus::Failed(e.to_string()),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };

        state.cancel_tokens.write().await.remove(&job_id_clone);
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
    });

    Ok(job_id)
}

/// Runs the whole batch synchronously; meant for `spawn_blocking`.
fn bulk_blocking(
    text: &str,
    config: &PipelineConfig,
    token: &CancelToken,
    mut progress: JobProgress,
) -> Result<BatchResult, BatchError> {
    let _ = progress.tx.blocking_send(JobUpdate {
        job_id: progress.job_id.clone(),
        status: JobStatus::InProgress(0),
    });
    let ctx = RowContext {
        normalizer: &LibPhoneNormalizer,
        config,
    };
    run_batch(text, &ctx, Some(token), &mut progress)
}
