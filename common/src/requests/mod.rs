use crate::model::qr::QrOptions;
use serde::Deserialize;

/// Request payload for the single QR endpoint.
/// `options` falls back to `QrOptions::default()` when omitted.
#[derive(Deserialize, Debug, Clone)]
pub struct QrRequest {
    pub text: String,
    #[serde(default)]
    pub options: Option<QrOptions>,
}
