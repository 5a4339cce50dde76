use std::path::PathBuf;
use thiserror::Error;

use crate::batch::BatchOutcome;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a valid archive: {}", .0.display())]
    InvalidArchive(PathBuf),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Batch cancelled after {} of {} items", .0.processed(), .0.total)]
    BatchCancelled(Box<BatchOutcome>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for both plain and batch cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled | Error::BatchCancelled(_))
    }

    /// Partial batch outcome gathered before cancellation, if any.
    pub fn partial_outcome(&self) -> Option<&BatchOutcome> {
        match self {
            Error::BatchCancelled(outcome) => Some(outcome),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
