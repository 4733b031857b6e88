use crate::pipeline::sample::{TEMPLATE_CSV, TEMPLATE_FILE_NAME};
use actix_web::http::header;
use actix_web::{HttpResponse, Responder};

pub(crate) async fn process() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", TEMPLATE_FILE_NAME),
        ))
        .body(TEMPLATE_CSV)
}
