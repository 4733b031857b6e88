//! QR artifacts for the successful rows of a batch.
//!
//! Only the first `limit` rows of `processed` get an image. The cap is applied
//! by slicing the already ordered sequence, and encoding runs in parallel with
//! results collected back in `processed` order. A row whose image cannot be
//! encoded is logged and left out; it stays a successful row.

use crate::pipeline::qr::ArtifactEncoder;
use common::model::bulk_row::ProcessedRow;
use common::model::qr::QrOptions;
use log::warn;
use rayon::prelude::*;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
    pub row_no: usize,
    pub file_name: String,
    /// The encoded text, i.e. the row's deep link.
    pub payload: String,
    pub bytes: Vec<u8>,
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`, one per UTF-16
/// code unit, so characters outside the BMP (emoji) become `__`.
pub fn sanitize(value: &str) -> String {
    UNSAFE_CHARS
        .replace_all(value, |caps: &Captures| "_".repeat(caps[0].encode_utf16().count()))
        .into_owned()
}

/// `{row_no}_{sanitized name or phone}.{ext}`
pub fn artifact_file_name(row: &ProcessedRow, options: &QrOptions) -> String {
    format!(
        "{}_{}.{}",
        row.row_no,
        sanitize(row.label()),
        options.format.extension()
    )
}

/// Hard ceiling on QR images per archive; a configured limit only lowers it.
pub const MAX_QR_ARTIFACTS: usize = 100;

/// The rows that receive an artifact: at most `limit` (never more than
/// `MAX_QR_ARTIFACTS`), in `processed` order.
pub fn capped(processed: &[ProcessedRow], limit: usize) -> &[ProcessedRow] {
    &processed[..processed.len().min(limit.min(MAX_QR_ARTIFACTS))]
}

pub fn generate_artifacts(
    processed: &[ProcessedRow],
    encoder: &dyn ArtifactEncoder,
    options: &QrOptions,
    limit: usize,
) -> Vec<QrArtifact> {
    capped(processed, limit)
        .par_iter()
        .filter_map(|row| {
            let payload = row.wa_url()?;
            match encoder.encode(payload, options) {
                Ok(bytes) => Some(QrArtifact {
                    row_no: row.row_no,
                    file_name: artifact_file_name(row, options),
                    payload: payload.to_string(),
                    bytes,
                }),
                Err(e) => {
                    warn!("Failed to generate QR for row {}: {}", row.row_no, e);
                    None
                }
            }
        })
        .collect()
}
