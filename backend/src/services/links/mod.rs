//! Single-record link builder.
//!
//! `POST /api/links` takes one `InputRow` as JSON and runs it through the same
//! validator the bulk pipeline uses. A linked row answers `200 OK`, a failed
//! row `422 Unprocessable Entity`; both bodies carry the processed row.

use crate::pipeline::phone::LibPhoneNormalizer;
use crate::pipeline::validator::{validate_row, RowContext};
use crate::pipeline::PipelineConfig;
use actix_web::web::{post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::bulk_row::{InputRow, ProcessedRow, RowOutcome};
use log::debug;
use serde::Serialize;

const API_PATH: &str = "/api/links";

#[derive(Serialize)]
struct LinkResponse {
    #[serde(flatten)]
    row: ProcessedRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_e164: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_formatted: Option<String>,
}

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(build_link))
}

async fn build_link(row: web::Json<InputRow>, config: web::Data<PipelineConfig>) -> impl Responder {
    let row = row.into_inner();
    let ctx = RowContext {
        normalizer: &LibPhoneNormalizer,
        config: config.get_ref(),
    };

    match validate_row(&row, &ctx) {
        Ok(links) => HttpResponse::Ok().json(LinkResponse {
            row: ProcessedRow {
                row_no: 1,
                row,
                outcome: RowOutcome::Linked {
                    wa_url: links.wa_url,
                    campaign_url: links.campaign_url,
                },
            },
            phone_e164: Some(links.phone.e164),
            phone_formatted: Some(links.phone.formatted),
        }),
        Err(err) => {
            debug!("single link rejected: {}", err);
            HttpResponse::UnprocessableEntity().json(LinkResponse {
                row: ProcessedRow {
                    row_no: 1,
                    row,
                    outcome: RowOutcome::Failed {
                        error: err.to_string(),
                    },
                },
                phone_e164: None,
                phone_formatted: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn valid_row_returns_links() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(PipelineConfig::default()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({
                "phone": "+14155552671",
                "message": "Hello {{name}}!",
                "name": "John Doe",
                "utm_source": "instagram",
                "utm_medium": "social",
                "utm_campaign": "bio"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"]["status"], "linked");
        assert_eq!(
            body["outcome"]["wa_url"],
            "https://wa.me/14155552671?text=Hello%20John%20Doe!"
        );
        assert!(body["outcome"]["campaign_url"]
            .as_str()
            .unwrap()
            .ends_with("utm_source=instagram&utm_medium=social&utm_campaign=bio"));
        assert_eq!(body["phone_e164"], "+14155552671");
    }

    #[actix_web::test]
    async fn invalid_row_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(PipelineConfig::default()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "name": "Nobody" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"]["status"], "failed");
        assert_eq!(body["outcome"]["error"], "Phone number is required");
        assert!(body.get("phone_e164").is_none());
    }
}
