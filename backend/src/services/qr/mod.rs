//! Single QR code endpoint.
//!
//! `POST /api/qr` with `{ "text": ..., "options": { ... } }` answers
//! `{ "data_url": "data:<mime>;base64,<bytes>" }`. Omitted options fall back to
//! the server's configured QR settings.

use crate::pipeline::qr::{check_options, ArtifactEncoder, QrEncoder};
use crate::pipeline::PipelineConfig;
use actix_web::web::{post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::requests::QrRequest;
use log::warn;

pub fn configure_routes() -> Scope {
    scope("/api/qr").route("", post().to(generate))
}

async fn generate(request: web::Json<QrRequest>, config: web::Data<PipelineConfig>) -> impl Responder {
    let QrRequest { text, options } = request.into_inner();
    if text.trim().is_empty() {
        return HttpResponse::BadRequest().body("Text is required");
    }
    let options = options.unwrap_or_else(|| config.qr.clone());
    if let Err(e) = check_options(&options) {
        return HttpResponse::BadRequest().body(e.to_string());
    }
    let encoder = QrEncoder::new(&config.fonts_dir);

    let mime = options.format.mime_type();
    let encoded = tokio::task::spawn_blocking(move || encoder.encode(&text, &options)).await;

    match encoded {
        Ok(Ok(bytes)) => HttpResponse::Ok().json(serde_json::json!({
            "data_url": format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        })),
        Ok(Err(e)) => {
            warn!("QR request rejected: {}", e);
            HttpResponse::BadRequest().body(e.to_string())
        }
        Err(e) => HttpResponse::InternalServerError().body(format!("Task join error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    async fn post_qr(body: Value) -> (u16, Vec<u8>) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(PipelineConfig::default()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post().uri("/api/qr").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        (status, test::read_body(resp).await.to_vec())
    }

    #[actix_web::test]
    async fn returns_png_data_url() {
        let (status, body) = post_qr(json!({
            "text": "https://wa.me/14155552671",
            "options": { "size": 128, "margin": 4, "error_correction": "M", "format": "png" }
        }))
        .await;
        assert_eq!(status, 200);

        let body: Value = serde_json::from_slice(&body).unwrap();
        let data_url = body["data_url"].as_str().unwrap();
        let encoded = data_url.strip_prefix("data:image/png;base64,").unwrap();
        let png = image::load_from_memory(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!((png.width(), png.height()), (128, 128));
    }

    #[actix_web::test]
    async fn svg_format_is_honoured() {
        let (status, body) = post_qr(json!({
            "text": "hello",
            "options": { "size": 128, "margin": 2, "error_correction": "L", "format": "svg" }
        }))
        .await;
        assert_eq!(status, 200);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["data_url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));
    }

    #[actix_web::test]
    async fn oversized_options_are_rejected() {
        let (status, body) = post_qr(json!({
            "text": "hello",
            "options": { "size": 60000, "margin": 4, "error_correction": "M", "format": "png" }
        }))
        .await;
        assert_eq!(status, 400);
        assert!(String::from_utf8(body).unwrap().contains("size must be between"));

        let (status, _) = post_qr(json!({
            "text": "hello",
            "options": { "size": 256, "margin": 4294967295u32, "error_correction": "M", "format": "png" }
        }))
        .await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn blank_text_is_rejected() {
        let (status, _) = post_qr(json!({ "text": "  " })).await;
        assert_eq!(status, 400);
    }
}
