use serde::{Deserialize, Serialize};

/// Lifecycle of a background bulk job as seen by polling clients.
///
/// `InProgress` carries the integer percentage of rows completed so far.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(u32),
    Completed(String),
    Failed(String),
    Cancelled,
}

impl JobStatus {
    /// True once the job can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed(_) | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }
}
