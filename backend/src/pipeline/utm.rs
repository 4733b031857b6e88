//! Campaign tagging: appends `utm_*` tracking parameters to an absolute URL.

use crate::error::TagError;
use common::model::utm::UtmParameters;
use url::Url;

/// Returns `base_url` with the tracking parameters set.
///
/// `utm_source`, `utm_medium` and `utm_campaign` are always written;
/// `utm_content` and `utm_term` only when non-empty. An existing parameter of
/// the same name is replaced in place and its duplicates removed.
pub fn build_campaign_url(base_url: &str, params: &UtmParameters) -> Result<String, TagError> {
    let mut url = Url::parse(base_url)?;

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    set_param(&mut pairs, "utm_source", &params.source);
    set_param(&mut pairs, "utm_medium", &params.medium);
    set_param(&mut pairs, "utm_campaign", &params.campaign);
    if let Some(content) = params.content.as_deref().filter(|c| !c.is_empty()) {
        set_param(&mut pairs, "utm_content", content);
    }
    if let Some(term) = params.term.as_deref().filter(|t| !t.is_empty()) {
        set_param(&mut pairs, "utm_term", term);
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}

fn set_param(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut idx = 0;
            pairs.retain(|(k, _)| {
                let keep = k != key || idx == first;
                idx += 1;
                keep
            });
        }
        None => pairs.push((key.to_string(), value.to_string())),
    }
}
