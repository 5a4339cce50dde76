pub mod archive;
pub mod batch;
pub mod error;
pub mod plugins;
pub mod report;
pub mod scanner;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export the types most callers need
pub use error::{Error, Result};
pub use types::*;
pub use batch::{run_batch, BatchOutcome, BatchProgress, CancellationToken, ItemResult, ItemStatus, ProgressSink};
pub use archive::{ArchiveInfo, ArchiveType, ArchiveVersion};
pub use plugins::{Compatibility, PluginInfo};
pub use report::{ReportStats, ScanReport};
pub use scanner::{scan_tree, ScanConfiguration, ScanCoordinator, ScanRules};
