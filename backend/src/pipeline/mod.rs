//! # Bulk Link Pipeline
//!
//! Turns an uploaded contact table into messaging deep links, campaign-tagged
//! URLs and QR images, then bundles everything into one zip archive.
//!
//! ## Stages
//!
//! 1.  **`parser`**: reads the CSV text into ordered `InputRow`s. A structurally
//!     broken table aborts the whole batch.
//! 2.  **`validator`**: per row, normalizes the phone number (`phone`), renders
//!     the `{{name}}` message template, builds the deep link (`deep_link`) and,
//!     when all three required UTM fields are present, the campaign URL (`utm`).
//!     Row failures are values, never panics or early returns.
//! 3.  **`orchestrator`**: drives the validator over every row in order, routes
//!     each outcome into `processed` or `errors` and reports progress.
//! 4.  **`artifacts`**: encodes QR images (`qr`) for the first `qr_limit`
//!     successful rows. A failed image is logged and skipped.
//! 5.  **`package`**: writes `links.csv`, `errors.csv` and the `qrs/` folder
//!     into the archive.
//!
//! Data only ever flows forward through these stages.

pub mod artifacts;
pub mod deep_link;
pub mod orchestrator;
pub mod package;
pub mod parser;
pub mod phone;
pub mod qr;
pub mod sample;
pub mod utm;
pub mod validator;

use common::model::qr::QrOptions;
use phone::InvalidCountryPolicy;
use std::path::PathBuf;

/// Settings shared by every stage of one batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_country: String,
    pub invalid_country: InvalidCountryPolicy,
    pub qr: QrOptions,
    pub qr_limit: usize,
    pub print_sheet: bool,
    pub fonts_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            default_country: "US".to_string(),
            invalid_country: InvalidCountryPolicy::default(),
            qr: QrOptions::default(),
            qr_limit: artifacts::MAX_QR_ARTIFACTS,
            print_sheet: false,
            fonts_dir: PathBuf::from("./fonts"),
        }
    }
}
