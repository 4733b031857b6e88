mod config;
mod error;
mod job_controller;
mod pipeline;
mod services;

use crate::config::{AppConfig, UploadLimit};
use crate::job_controller::state::JobsState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (app_config, config_error) = match AppConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    env_logger::init_from_env(Env::default().default_filter_or(app_config.log_level.as_str()));
    if let Some(e) = config_error {
        warn!("invalid configuration, using defaults: {}", e);
    }

    let pipeline_config = app_config.pipeline();
    let upload_limit = UploadLimit(app_config.upload_limit_bytes);

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(app_config.retained_jobs.max(1));

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    info!(
        "Server running at http://{}:{} (default country {}, QR limit {})",
        app_config.host, app_config.port, pipeline_config.default_country, pipeline_config.qr_limit
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(upload_limit.0))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(pipeline_config.clone()))
            .app_data(web::Data::new(upload_limit))
            .service(services::bulk::configure_routes())
            .service(services::links::configure_routes())
            .service(services::qr::configure_routes())
            .service(services::utm::configure_routes())
    })
    .bind((app_config.host.as_str(), app_config.port))?
    .run()
    .await
}
