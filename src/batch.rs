//! Generic "apply an operation across N files" driver with progress reporting
//! and cooperative cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use indicatif::ProgressBar;
use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// Shared cancellation flag. Clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub current: PathBuf,
}

impl BatchProgress {
    pub fn new(completed: usize, total: usize, current: &Path) -> Self {
        Self {
            completed,
            total,
            percent: percent_of(completed, total),
            current: current.to_owned(),
        }
    }
}

/// round(completed / total * 100); an empty batch counts as finished.
pub fn percent_of(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Receives one update per completed batch item.
pub trait ProgressSink {
    fn report(&self, progress: &BatchProgress);
}

impl ProgressSink for ProgressBar {
    fn report(&self, progress: &BatchProgress) {
        self.set_length(progress.total as u64);
        self.set_position(progress.completed as u64);
        if let Some(name) = progress.current.file_name() {
            self.set_message(name.to_string_lossy().to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub path: PathBuf,
    pub status: ItemStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<ItemResult>,
}

impl BatchOutcome {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Number of items that reached a terminal status.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    fn record(&mut self, path: &Path, status: ItemStatus, message: Option<String>) {
        match status {
            ItemStatus::Succeeded => self.succeeded += 1,
            ItemStatus::Failed => self.failed += 1,
            ItemStatus::Skipped => self.skipped += 1,
        }
        self.results.push(ItemResult {
            path: path.to_owned(),
            status,
            message,
        });
    }
}

/// Apply `op` to every path in order.
///
/// `op` returns the item's status, or an error that is recorded as a failure
/// for that item only. Cancellation is checked before each item; when set,
/// the partial outcome is returned inside [`Error::BatchCancelled`].
pub fn run_batch<F>(
    paths: &[PathBuf],
    progress: Option<&dyn ProgressSink>,
    cancel: Option<&CancellationToken>,
    mut op: F,
) -> Result<BatchOutcome>
where
    F: FnMut(&Path) -> Result<ItemStatus>,
{
    let mut outcome = BatchOutcome::new(paths.len());
    debug!("Starting batch over {} items", paths.len());

    for path in paths {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!("Batch cancelled after {} of {} items", outcome.processed(), outcome.total);
            return Err(Error::BatchCancelled(Box::new(outcome)));
        }

        match op(path) {
            Ok(status) => {
                debug!("  {:?}: {}", status, path.display());
                outcome.record(path, status, None);
            }
            Err(e) => {
                warn!("Batch item failed {}: {}", path.display(), e);
                outcome.record(path, ItemStatus::Failed, Some(e.to_string()));
            }
        }

        if let Some(sink) = progress {
            sink.report(&BatchProgress::new(outcome.processed(), outcome.total, path));
        }
    }

    debug!(
        "Batch complete: {} succeeded, {} failed, {} skipped",
        outcome.succeeded, outcome.failed, outcome.skipped
    );
    Ok(outcome)
}
