//! # Package Assembler
//!
//! Bundles a finished batch into a single zip archive:
//!
//! - `links.csv`: every successful row (`row_no, phone, name, wa_url, campaign_url`).
//! - `errors.csv`: every failed row with its reason, only when at least one row failed.
//! - `qrs/`: one PNG per capped successful row, plus `print-sheet.pdf` when enabled.

use crate::error::PackageError;
use crate::pipeline::artifacts::{capped, generate_artifacts, QrArtifact};
use crate::pipeline::qr::{ArtifactEncoder, QrEncoder};
use crate::pipeline::PipelineConfig;
use common::model::batch::BatchResult;
use common::model::bulk_row::ProcessedRow;
use log::{info, warn};
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ARCHIVE_FILE_NAME: &str = "whatsapp-bulk-results.zip";
pub const LINKS_ENTRY: &str = "links.csv";
pub const ERRORS_ENTRY: &str = "errors.csv";
pub const QR_FOLDER: &str = "qrs/";
pub const PRINT_SHEET_ENTRY: &str = "qrs/print-sheet.pdf";

const LINK_COLUMNS: [&str; 5] = ["row_no", "phone", "name", "wa_url", "campaign_url"];
const ERROR_COLUMNS: [&str; 11] = [
    "row_no",
    "phone",
    "country",
    "message",
    "name",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "error",
];

#[derive(Serialize)]
struct LinkRecord<'a> {
    row_no: usize,
    phone: &'a str,
    name: &'a str,
    wa_url: &'a str,
    campaign_url: &'a str,
}

#[derive(Serialize)]
struct ErrorRecord<'a> {
    row_no: usize,
    phone: &'a str,
    country: Option<&'a str>,
    message: Option<&'a str>,
    name: Option<&'a str>,
    utm_source: Option<&'a str>,
    utm_medium: Option<&'a str>,
    utm_campaign: Option<&'a str>,
    utm_content: Option<&'a str>,
    utm_term: Option<&'a str>,
    error: &'a str,
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, PackageError> {
    writer
        .into_inner()
        .map_err(|e| PackageError::Io(e.into_error()))
}

/// Serializes the successful rows. The header is written even when empty.
pub fn links_csv(processed: &[ProcessedRow]) -> Result<Vec<u8>, PackageError> {
    let mut writer = csv_writer();
    writer.write_record(LINK_COLUMNS)?;
    for row in processed {
        writer.serialize(LinkRecord {
            row_no: row.row_no,
            phone: &row.row.phone,
            name: row.row.name.as_deref().unwrap_or_default(),
            wa_url: row.wa_url().unwrap_or_default(),
            campaign_url: row.campaign_url().unwrap_or_default(),
        })?;
    }
    finish(writer)
}

/// Serializes the failed rows with all of their input fields and the reason.
pub fn errors_csv(errors: &[ProcessedRow]) -> Result<Vec<u8>, PackageError> {
    let mut writer = csv_writer();
    writer.write_record(ERROR_COLUMNS)?;
    for row in errors {
        let input = &row.row;
        writer.serialize(ErrorRecord {
            row_no: row.row_no,
            phone: &input.phone,
            country: input.country.as_deref(),
            message: input.message.as_deref(),
            name: input.name.as_deref(),
            utm_source: input.utm_source.as_deref(),
            utm_medium: input.utm_medium.as_deref(),
            utm_campaign: input.utm_campaign.as_deref(),
            utm_content: input.utm_content.as_deref(),
            utm_term: input.utm_term.as_deref(),
            error: row.error().unwrap_or_default(),
        })?;
    }
    finish(writer)
}

/// Writes the archive from already generated parts.
pub fn assemble_archive(
    result: &BatchResult,
    artifacts: &[QrArtifact],
    print_sheet: Option<&[u8]>,
) -> Result<Vec<u8>, PackageError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let text = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let binary = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file(LINKS_ENTRY, text)?;
    zip.write_all(&links_csv(&result.processed)?)?;

    if !result.errors.is_empty() {
        zip.start_file(ERRORS_ENTRY, text)?;
        zip.write_all(&errors_csv(&result.errors)?)?;
    }

    zip.add_directory(QR_FOLDER, text)?;
    for artifact in artifacts {
        zip.start_file(format!("{}{}", QR_FOLDER, artifact.file_name), binary)?;
        zip.write_all(&artifact.bytes)?;
    }

    if let Some(sheet) = print_sheet {
        zip.start_file(PRINT_SHEET_ENTRY, binary)?;
        zip.write_all(sheet)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Generates the QR artifacts for `result` and assembles the full archive.
pub fn build_package(
    result: &BatchResult,
    config: &PipelineConfig,
    encoder: &dyn ArtifactEncoder,
) -> Result<Vec<u8>, PackageError> {
    let artifacts = generate_artifacts(&result.processed, encoder, &config.qr, config.qr_limit);
    info!(
        "generated {} QR images for {} linked rows",
        artifacts.len(),
        result.processed.len()
    );

    let print_sheet = if config.print_sheet {
        build_print_sheet(result, config)
    } else {
        None
    };

    assemble_archive(result, &artifacts, print_sheet.as_deref())
}

fn build_print_sheet(result: &BatchResult, config: &PipelineConfig) -> Option<Vec<u8>> {
    let items: Vec<(String, String)> = capped(&result.processed, config.qr_limit)
        .iter()
        .filter_map(|row| Some((row.wa_url()?.to_string(), row.label().to_string())))
        .collect();
    QrEncoder::new(&config.fonts_dir)
        .print_sheet(&items, &config.qr)
        .map_err(|e| warn!("print sheet skipped: {}", e))
        .ok()
}
