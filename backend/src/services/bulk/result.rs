use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};
use common::model::batch::BatchResult;
use std::sync::Arc;

/// Looks up the finished result of a job.
///
/// Unknown jobs map to `404 Not Found`, jobs without a result yet (or that
/// failed) to `409 Conflict`.
pub(crate) async fn find_result(
    state: &JobsState,
    job_id: &str,
) -> Result<Arc<BatchResult>, HttpResponse> {
    if let Some(result) = state.results.read().await.get(job_id) {
        return Ok(result.clone());
    }
    match state.jobs.read().await.get(job_id) {
        Some(status) => Err(HttpResponse::Conflict().json(status)),
        None => Err(HttpResponse::NotFound().body("Job ID not found")),
    }
}

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match find_result(&state, &job_id).await {
        Ok(result) => HttpResponse::Ok().json(result.summary()),
        Err(response) => response,
    }
}
