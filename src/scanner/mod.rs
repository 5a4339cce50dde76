pub mod types;
pub mod rules;
pub mod checks;
pub mod owners;
pub mod coordinator;
pub mod fix;

use std::path::{Component, Path};

pub use types::*;
pub use coordinator::ScanCoordinator;
pub use owners::{OwnerMap, OwnerResolver, Unmanaged};
pub use fix::{AutoFixer, FixSummary};

use crate::error::Result;
use crate::types::Diagnostic;

/// Scan `root` with the built-in rule tables and no owner information.
pub fn scan_tree(root: &Path, config: &ScanConfiguration) -> Result<Vec<Diagnostic>> {
    let rules = ScanRules::default();
    ScanCoordinator::new(root, config, &rules).run()
}

/// Lowercase, `/`-separated form of a relative path used as a table key.
pub fn normalize_relative(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_lowercase()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
