use serde::{Deserialize, Serialize};

/// Symbol redundancy level, lowest (`L`) to highest (`H`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    H,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrFormat {
    Png,
    Svg,
    Pdf,
}

impl QrFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Svg => "image/svg+xml",
            QrFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            QrFormat::Png => "png",
            QrFormat::Svg => "svg",
            QrFormat::Pdf => "pdf",
        }
    }
}

/// Encoder settings for one QR artifact.
///
/// `size` is the output edge in pixels and `margin` the quiet zone in modules.
/// `label` is printed under the code on document output only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrOptions {
    pub size: u32,
    pub margin: u32,
    pub error_correction: ErrorCorrectionLevel,
    pub format: QrFormat,
    #[serde(default)]
    pub label: Option<String>,
}

impl Default for QrOptions {
    fn default() -> Self {
        QrOptions {
            size: 512,
            margin: 4,
            error_correction: ErrorCorrectionLevel::M,
            format: QrFormat::Png,
            label: None,
        }
    }
}
