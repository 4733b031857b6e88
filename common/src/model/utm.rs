use serde::{Deserialize, Serialize};

/// Campaign tracking values appended to a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParameters {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UtmPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub source: &'static str,
    pub medium: &'static str,
    pub campaign: &'static str,
}

impl UtmPreset {
    pub fn parameters(&self) -> UtmParameters {
        UtmParameters {
            source: self.source.to_string(),
            medium: self.medium.to_string(),
            campaign: self.campaign.to_string(),
            content: None,
            term: None,
        }
    }
}

pub const UTM_PRESETS: [UtmPreset; 6] = [
    UtmPreset {
        name: "Instagram Bio",
        description: "Link in Instagram bio",
        source: "instagram",
        medium: "bio",
        campaign: "profile",
    },
    UtmPreset {
        name: "Email Signature",
        description: "Link in email signature",
        source: "email",
        medium: "signature",
        campaign: "contact",
    },
    UtmPreset {
        name: "Print QR Code",
        description: "QR code on printed materials",
        source: "print",
        medium: "qr",
        campaign: "offline",
    },
    UtmPreset {
        name: "Facebook Ad",
        description: "Facebook advertising campaign",
        source: "facebook",
        medium: "cpc",
        campaign: "ads",
    },
    UtmPreset {
        name: "Google Ads",
        description: "Google advertising campaign",
        source: "google",
        medium: "cpc",
        campaign: "ads",
    },
    UtmPreset {
        name: "Website Button",
        description: "Button on website",
        source: "website",
        medium: "button",
        campaign: "contact",
    },
];
