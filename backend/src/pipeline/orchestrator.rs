//! # Batch Orchestrator
//!
//! Drives the row validator over a whole table, strictly one row after the
//! other, and splits the outcomes into `processed` and `errors` without ever
//! reordering them.
//!
//! Progress is a side channel: after each row a `Progress` value is handed to
//! the caller's `ProgressSink`. Cancellation, when requested, is honoured only
//! between rows so a row is always either fully processed or untouched.

use crate::error::BatchError;
use crate::pipeline::parser::parse_rows;
use crate::pipeline::validator::{process_row, RowContext};
use common::model::batch::BatchResult;
use common::model::bulk_row::InputRow;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rows completed out of the batch total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion as a percentage; exactly 100.0 once the last row is done.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Discards every progress report.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}

/// Shared flag used to stop a running batch at the next row boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parses `text` and processes every row. Parse failures abort before any
/// row is touched.
pub fn run_batch(
    text: &str,
    ctx: &RowContext<'_>,
    cancel: Option<&CancelToken>,
    progress: &mut dyn ProgressSink,
) -> Result<BatchResult, BatchError> {
    let rows = parse_rows(text).map_err(|e| {
        error!("bulk upload rejected: {}", e);
        e
    })?;
    process_rows(rows, ctx, cancel, progress)
}

/// Processes already parsed rows in order, numbering them from 1.
pub fn process_rows(
    rows: Vec<InputRow>,
    ctx: &RowContext<'_>,
    cancel: Option<&CancelToken>,
    progress: &mut dyn ProgressSink,
) -> Result<BatchResult, BatchError> {
    let total = rows.len();
    info!("processing {} rows", total);

    let mut result = BatchResult {
        processed: Vec::with_capacity(total),
        errors: Vec::new(),
        total,
    };

    for (idx, row) in rows.into_iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            info!("batch cancelled after {} of {} rows", idx, total);
            return Err(BatchError::Cancelled {
                completed: idx,
                total,
            });
        }

        let processed = process_row(idx + 1, row, ctx);
        if processed.is_linked() {
            result.processed.push(processed);
        } else {
            debug!(
                "row {} rejected: {}",
                processed.row_no,
                processed.error().unwrap_or_default()
            );
            result.errors.push(processed);
        }

        progress.report(Progress {
            completed: idx + 1,
            total,
        });
    }

    info!(
        "batch finished: {} linked, {} failed, {} total",
        result.processed.len(),
        result.errors.len(),
        result.total
    );
    Ok(result)
}
