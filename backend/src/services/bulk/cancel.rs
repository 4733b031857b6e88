use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};
use log::info;

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let job_id = job_id.into_inner();
    match state.cancel_tokens.read().await.get(&job_id) {
        Some(token) => {
            token.cancel();
            info!("cancellation requested for job {}", job_id);
            HttpResponse::Accepted().finish()
        }
        None => HttpResponse::NotFound().body("No running job with this ID"),
    }
}
