use crate::model::bulk_row::ProcessedRow;
use serde::{Deserialize, Serialize};

/// Output of one pipeline run.
///
/// `processed` and `errors` are each ordered by original row position; together
/// they hold exactly `total` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub processed: Vec<ProcessedRow>,
    pub errors: Vec<ProcessedRow>,
    pub total: usize,
}

/// Counts reported to the user once a batch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub errors: usize,
    pub total: usize,
}

impl BatchResult {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            processed: self.processed.len(),
            errors: self.errors.len(),
            total: self.total,
        }
    }
}
