use thiserror::Error;

/// Failures that abort a whole batch before a result is produced.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("CSV parsing error: {0}")]
    Parse(String),

    #[error("batch cancelled after {completed} of {total} rows")]
    Cancelled { completed: usize, total: usize },
}

/// Row-fatal failures. The display string is the reason stored on the row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Phone number is required")]
    PhoneRequired,

    #[error(transparent)]
    Phone(#[from] PhoneError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Invalid phone number format")]
    InvalidFormat,

    #[error("Invalid phone number for selected country")]
    InvalidForCountry,

    #[error("Unknown country code '{0}'")]
    UnknownCountry(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("payload too long for the requested error correction level")]
    DataTooLong,

    #[error("QR encoding failed: {0}")]
    Encode(String),

    #[error("invalid QR options: {0}")]
    InvalidOptions(String),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<qrcode::types::QrError> for QrError {
    fn from(err: qrcode::types::QrError) -> Self {
        match err {
            qrcode::types::QrError::DataTooLong => QrError::DataTooLong,
            other => QrError::Encode(other.to_string()),
        }
    }
}

impl From<genpdf::error::Error> for QrError {
    fn from(err: genpdf::error::Error) -> Self {
        QrError::Pdf(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
