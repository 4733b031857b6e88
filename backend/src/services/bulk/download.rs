use crate::job_controller::state::JobsState;
use crate::pipeline::package::{build_package, ARCHIVE_FILE_NAME};
use crate::pipeline::qr::QrEncoder;
use crate::pipeline::PipelineConfig;
use crate::services::bulk::result::find_result;
use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

/// Builds the zip archive for a completed job.
///
/// QR encoding is CPU bound, so the archive is assembled on the blocking pool.
pub(crate) async fn process(
    job_id: web::Path<String>,
    state: web::Data<JobsState>,
    config: web::Data<PipelineConfig>,
) -> impl Responder {
    let result = match find_result(&state, &job_id).await {
        Ok(result) => result,
        Err(response) => return response,
    };

    let config = config.get_ref().clone();
    let packaged = tokio::task::spawn_blocking(move || {
        let encoder = QrEncoder::new(&config.fonts_dir);
        build_package(&result, &config, &encoder)
    })
    .await;

    match packaged {
        Ok(Ok(bytes)) => {
            info!("archive for job {} is {} bytes", job_id, bytes.len());
            HttpResponse::Ok()
                .content_type("application/zip")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", ARCHIVE_FILE_NAME),
                ))
                .body(bytes)
        }
        Ok(Err(e)) => {
            error!("packaging job {} failed: {}", job_id, e);
            HttpResponse::InternalServerError().body(format!("Packaging failed: {}", e))
        }
        Err(e) => HttpResponse::InternalServerError().body(format!("Task join error: {}", e)),
    }
}
