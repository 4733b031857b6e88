//! Per-row validation and link building.
//!
//! `validate_row` never panics and never aborts the batch: a row-fatal problem
//! comes back as `Err(RowError)`, and a campaign tagging failure simply leaves
//! `campaign_url` empty.

use crate::error::RowError;
use crate::pipeline::deep_link::{build_deep_link, render_message};
use crate::pipeline::phone::{
    clean_phone, parse_country, InvalidCountryPolicy, NormalizedPhone, PhoneNormalizer,
};
use crate::pipeline::utm::build_campaign_url;
use crate::pipeline::PipelineConfig;
use common::model::bulk_row::{non_empty, InputRow, ProcessedRow, RowOutcome};
use common::model::utm::UtmParameters;
use log::{debug, warn};

/// Links produced for a row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLinks {
    pub phone: NormalizedPhone,
    pub wa_url: String,
    pub campaign_url: Option<String>,
}

/// Everything a row needs besides its own data.
pub struct RowContext<'a> {
    pub normalizer: &'a dyn PhoneNormalizer,
    pub config: &'a PipelineConfig,
}

impl RowContext<'_> {
    /// Resolves the country a row is normalized against.
    fn country_for<'r>(&'r self, row: &'r InputRow) -> &'r str {
        match row.country().map(str::trim).filter(|c| !c.is_empty()) {
            None => &self.config.default_country,
            Some(code) if parse_country(code).is_some() => code,
            Some(code) => match self.config.invalid_country {
                InvalidCountryPolicy::Reject => code,
                InvalidCountryPolicy::Fallback => {
                    debug!(
                        "unknown country '{}', using default '{}'",
                        code, self.config.default_country
                    );
                    &self.config.default_country
                }
            },
        }
    }
}

/// Validates one row and builds its deep link and optional campaign URL.
pub fn validate_row(row: &InputRow, ctx: &RowContext<'_>) -> Result<RowLinks, RowError> {
    let cleaned = clean_phone(&row.phone);
    if cleaned.is_empty() {
        return Err(RowError::PhoneRequired);
    }

    let phone = ctx.normalizer.normalize(&cleaned, ctx.country_for(row))?;

    let message = row
        .message()
        .map(|template| render_message(template, row.name()));
    let wa_url = build_deep_link(&phone.e164, message.as_deref());

    let campaign_url = campaign_parameters(row).and_then(|params| {
        build_campaign_url(&wa_url, &params)
            .map_err(|e| warn!("campaign URL skipped for {}: {}", wa_url, e))
            .ok()
    });

    Ok(RowLinks {
        phone,
        wa_url,
        campaign_url,
    })
}

/// Tracking parameters for the row, if source, medium and campaign are all set.
pub fn campaign_parameters(row: &InputRow) -> Option<UtmParameters> {
    let source = non_empty(&row.utm_source)?;
    let medium = non_empty(&row.utm_medium)?;
    let campaign = non_empty(&row.utm_campaign)?;
    Some(UtmParameters {
        source: source.to_string(),
        medium: medium.to_string(),
        campaign: campaign.to_string(),
        content: non_empty(&row.utm_content).map(str::to_string),
        term: non_empty(&row.utm_term).map(str::to_string),
    })
}

/// Validates a row and attaches the outcome to it.
pub fn process_row(row_no: usize, row: InputRow, ctx: &RowContext<'_>) -> ProcessedRow {
    let outcome = match validate_row(&row, ctx) {
        Ok(links) => RowOutcome::Linked {
            wa_url: links.wa_url,
            campaign_url: links.campaign_url,
        },
        Err(err) => RowOutcome::Failed {
            error: err.to_string(),
        },
    };
    ProcessedRow {
        row_no,
        row,
        outcome,
    }
}
