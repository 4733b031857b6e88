//! Bulk link generation: upload, progress, results and download.
//!
//! Uploads are processed by a background job (`job_controller`) so large tables
//! never block the server. The provided routes are:
//! - `POST /api/bulk/upload`: multipart/form-data with a `file` field holding
//!   the CSV. Returns `{ "job_id": ... }` immediately.
//! - `GET /api/bulk/status/{job_id}`: current `JobStatus` of the job.
//! - `GET /api/bulk/result/{job_id}`: success/failure counts of a completed job.
//! - `GET /api/bulk/download/{job_id}`: the zip archive with `links.csv`,
//!   `errors.csv` (when any row failed) and the `qrs/` images.
//! - `POST /api/bulk/cancel/{job_id}`: stops a running job at the next row.
//! - `GET /api/bulk/template`: an example CSV showing the expected columns.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod cancel;
mod download;
mod get_status;
mod result;
mod template;
mod upload;

const API_PATH: &str = "/api/bulk";

/// Configures and returns the Actix scope for bulk routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/status/{job_id}", get().to(get_status::process))
        .route("/result/{job_id}", get().to(result::process))
        .route("/download/{job_id}", get().to(download::process))
        .route("/cancel/{job_id}", post().to(cancel::process))
        .route("/template", get().to(template::process))
}
