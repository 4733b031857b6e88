use serde::{Deserialize, Serialize};

/// One record of the uploaded table, keyed by header name.
///
/// Only `phone` is required; every other column may be missing from the
/// header or left empty in a given record. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputRow {
    pub phone: String,
    pub country: Option<String>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

/// Returns the value only when it holds at least one character.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl InputRow {
    pub fn country(&self) -> Option<&str> {
        non_empty(&self.country)
    }

    pub fn message(&self) -> Option<&str> {
        non_empty(&self.message)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

/// How a row left the validator. A row is either linked or failed, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Linked {
        wa_url: String,
        campaign_url: Option<String>,
    },
    Failed {
        error: String,
    },
}

/// An input row together with its 1-based position and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRow {
    pub row_no: usize,
    #[serde(flatten)]
    pub row: InputRow,
    pub outcome: RowOutcome,
}

impl ProcessedRow {
    pub fn wa_url(&self) -> Option<&str> {
        match &self.outcome {
            RowOutcome::Linked { wa_url, .. } => Some(wa_url),
            RowOutcome::Failed { .. } => None,
        }
    }

    pub fn campaign_url(&self) -> Option<&str> {
        match &self.outcome {
            RowOutcome::Linked { campaign_url, .. } => campaign_url.as_deref(),
            RowOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RowOutcome::Linked { .. } => None,
            RowOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.outcome, RowOutcome::Linked { .. })
    }

    /// Name used for artifact file names: the display name, or the raw phone.
    pub fn label(&self) -> &str {
        self.row.name().unwrap_or(&self.row.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_optional_fields_count_as_absent() {
        let row = InputRow {
            phone: "+14155552671".to_string(),
            name: Some(String::new()),
            message: Some("Hi".to_string()),
            ..Default::default()
        };
        assert_eq!(row.name(), None);
        assert_eq!(row.message(), Some("Hi"));
        assert_eq!(row.country(), None);
    }

    #[test]
    fn outcome_accessors_are_exclusive() {
        let linked = ProcessedRow {
            row_no: 1,
            row: InputRow::default(),
            outcome: RowOutcome::Linked {
                wa_url: "https://wa.me/1".to_string(),
                campaign_url: None,
            },
        };
        assert_eq!(linked.wa_url(), Some("https://wa.me/1"));
        assert_eq!(linked.error(), None);

        let failed = ProcessedRow {
            row_no: 2,
            row: InputRow::default(),
            outcome: RowOutcome::Failed {
                error: "Phone number is required".to_string(),
            },
        };
        assert_eq!(failed.wa_url(), None);
        assert_eq!(failed.campaign_url(), None);
        assert_eq!(failed.error(), Some("Phone number is required"));
    }

    #[test]
    fn label_prefers_name_over_phone() {
        let mut row = ProcessedRow {
            row_no: 3,
            row: InputRow {
                phone: "+44 20 7123 4567".to_string(),
                ..Default::default()
            },
            outcome: RowOutcome::Failed {
                error: "x".to_string(),
            },
        };
        assert_eq!(row.label(), "+44 20 7123 4567");
        row.row.name = Some("Jane Smith".to_string());
        assert_eq!(row.label(), "Jane Smith");
    }

    #[test]
    fn processed_row_serializes_flat() {
        let row = ProcessedRow {
            row_no: 7,
            row: InputRow {
                phone: "123".to_string(),
                ..Default::default()
            },
            outcome: RowOutcome::Failed {
                error: "Invalid phone number format".to_string(),
            },
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["row_no"], 7);
        assert_eq!(json["phone"], "123");
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["error"], "Invalid phone number format");
    }
}
