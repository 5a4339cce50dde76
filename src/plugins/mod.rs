//! Script extender plugin classification from PE export tables.

pub mod types;
pub mod exports;

use std::path::Path;
use log::{debug, info, warn};

pub use types::*;
pub use exports::{analyze_module, format_packed_version};

use crate::utils;

/// Analyze every module in `dir`.
///
/// Modules that fail to parse are logged and left out. A missing directory
/// yields an empty list.
pub fn scan_directory(dir: &Path, recursive: bool) -> Vec<PluginInfo> {
    let modules = utils::list_files_with_extension(dir, MODULE_EXTENSION, recursive);
    debug!("Analyzing {} modules in {}", modules.len(), dir.display());

    let results: Vec<PluginInfo> = modules
        .iter()
        .filter_map(|path| {
            let info = analyze_module(path);
            if info.is_none() {
                warn!("Skipping unreadable module: {}", path.display());
            }
            info
        })
        .collect();

    info!(
        "Analyzed {} of {} modules in {} ({} plugins)",
        results.len(),
        modules.len(),
        dir.display(),
        results.iter().filter(|r| r.is_plugin).count()
    );
    results
}
