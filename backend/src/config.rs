//! Service configuration.
//!
//! Values come from `WALINK_*` environment variables (for example
//! `WALINK_PORT=9000` or `WALINK_INVALID_COUNTRY=fallback`); anything unset
//! keeps the default below.

use crate::job_controller::state::DEFAULT_RETAINED_JOBS;
use crate::pipeline::artifacts::MAX_QR_ARTIFACTS;
use crate::pipeline::phone::InvalidCountryPolicy;
use crate::pipeline::PipelineConfig;
use common::model::qr::{ErrorCorrectionLevel, QrFormat, QrOptions};
use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// Largest accepted multipart upload, shared with the upload handler.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default filter for `env_logger` when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted multipart upload, in bytes.
    #[serde(default = "default_upload_limit_bytes")]
    pub upload_limit_bytes: usize,

    /// ISO 3166-1 alpha-2 code used when a row has no `country`.
    #[serde(default = "default_country")]
    pub default_country: String,

    #[serde(default)]
    pub invalid_country: InvalidCountryPolicy,

    /// Maximum number of QR images placed in one archive, at most 100.
    #[serde(default = "default_qr_limit")]
    pub qr_limit: usize,

    #[serde(default = "default_qr_size")]
    pub qr_size: u32,

    #[serde(default = "default_qr_margin")]
    pub qr_margin: u32,

    #[serde(default = "default_qr_error_correction")]
    pub qr_error_correction: ErrorCorrectionLevel,

    /// Adds `qrs/print-sheet.pdf` to every archive.
    #[serde(default)]
    pub print_sheet: bool,

    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,

    /// Finished jobs kept in memory before the oldest is forgotten.
    #[serde(default = "default_retained_jobs")]
    pub retained_jobs: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_upload_limit_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_country() -> String {
    "US".to_string()
}

fn default_qr_limit() -> usize {
    MAX_QR_ARTIFACTS
}

fn default_qr_size() -> u32 {
    512
}

fn default_qr_margin() -> u32 {
    4
}

fn default_qr_error_correction() -> ErrorCorrectionLevel {
    ErrorCorrectionLevel::M
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("./fonts")
}

fn default_retained_jobs() -> usize {
    DEFAULT_RETAINED_JOBS
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("WALINK").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            default_country: self.default_country.trim().to_ascii_uppercase(),
            invalid_country: self.invalid_country,
            qr: QrOptions {
                size: self.qr_size,
                margin: self.qr_margin,
                error_correction: self.qr_error_correction,
                format: QrFormat::Png,
                label: None,
            },
            qr_limit: self.qr_limit.min(MAX_QR_ARTIFACTS),
            print_sheet: self.print_sheet,
            fonts_dir: self.fonts_dir.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            upload_limit_bytes: default_upload_limit_bytes(),
            default_country: default_country(),
            invalid_country: InvalidCountryPolicy::default(),
            qr_limit: default_qr_limit(),
            qr_size: default_qr_size(),
            qr_margin: default_qr_margin(),
            qr_error_correction: default_qr_error_correction(),
            print_sheet: false,
            fonts_dir: default_fonts_dir(),
            retained_jobs: default_retained_jobs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_settings() {
        let cfg = AppConfig::default().pipeline();
        assert_eq!(cfg.default_country, "US");
        assert_eq!(cfg.invalid_country, InvalidCountryPolicy::Reject);
        assert_eq!(cfg.qr_limit, 100);
        assert_eq!(cfg.qr, QrOptions::default());
        assert!(!cfg.print_sheet);
    }

    #[test]
    fn qr_limit_cannot_exceed_ceiling() {
        let raised = AppConfig {
            qr_limit: 150,
            ..AppConfig::default()
        };
        assert_eq!(raised.pipeline().qr_limit, MAX_QR_ARTIFACTS);

        let lowered = AppConfig {
            qr_limit: 10,
            ..AppConfig::default()
        };
        assert_eq!(lowered.pipeline().qr_limit, 10);
    }

    #[test]
    fn default_country_is_normalized() {
        let cfg = AppConfig {
            default_country: " gb ".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.pipeline().default_country, "GB");
    }
}
