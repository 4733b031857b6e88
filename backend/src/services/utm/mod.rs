//! Read-only campaign presets for clients building tagged links.

use actix_web::web::{get, scope};
use actix_web::{HttpResponse, Responder, Scope};
use common::model::utm::UTM_PRESETS;

pub fn configure_routes() -> Scope {
    scope("/api/utm").route("/presets", get().to(presets))
}

async fn presets() -> impl Responder {
    HttpResponse::Ok().json(UTM_PRESETS)
}
