//! Phone number normalization.
//!
//! The pipeline only depends on the `PhoneNormalizer` trait; the production
//! implementation delegates parsing and validation to the `phonenumber` crate.

use crate::error::PhoneError;
use phonenumber::country;
use phonenumber::Mode;
use serde::Deserialize;

/// What to do with a row whose `country` is not a known ISO code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidCountryPolicy {
    /// The row fails with an "Unknown country code" reason.
    #[default]
    Reject,
    /// The row is normalized against the configured default country.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone {
    /// International dial format, e.g. `+14155552671`.
    pub e164: String,
    /// Human-readable international format, e.g. `+1 415-555-2671`.
    pub formatted: String,
}

pub trait PhoneNormalizer: Send + Sync {
    /// Normalizes an already cleaned number against an ISO 3166-1 alpha-2 code.
    fn normalize(&self, phone: &str, country: &str) -> Result<NormalizedPhone, PhoneError>;
}

/// `PhoneNormalizer` backed by libphonenumber metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibPhoneNormalizer;

impl PhoneNormalizer for LibPhoneNormalizer {
    fn normalize(&self, phone: &str, country: &str) -> Result<NormalizedPhone, PhoneError> {
        let id = parse_country(country).ok_or_else(|| PhoneError::UnknownCountry(country.to_string()))?;
        let number = phonenumber::parse(Some(id), phone).map_err(|_| PhoneError::InvalidFormat)?;
        if !phonenumber::is_valid(&number) {
            return Err(PhoneError::InvalidForCountry);
        }
        Ok(NormalizedPhone {
            e164: number.format().mode(Mode::E164).to_string(),
            formatted: number.format().mode(Mode::International).to_string(),
        })
    }
}

/// Parses a two-letter country code, ignoring case and surrounding spaces.
pub fn parse_country(code: &str) -> Option<country::Id> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 2 {
        return None;
    }
    code.parse::<country::Id>().ok()
}

/// Keeps digits and a single leading `+`; everything else is dropped.
pub fn clean_phone(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_digit() {
            cleaned.push(ch);
        } else if ch == '+' && cleaned.is_empty() {
            cleaned.push(ch);
        }
    }
    cleaned
}
