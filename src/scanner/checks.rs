use std::fs;
use std::io;
use std::path::Path;
use log::trace;
use walkdir::WalkDir;

use super::types::ConfigRegressionRule;

/// Whether a file falls under the config regression rule.
pub fn is_config_candidate(relative_key: &str, rule: &ConfigRegressionRule) -> bool {
    let (parent, name) = match relative_key.rfind('/') {
        Some(idx) => (&relative_key[..idx], &relative_key[idx + 1..]),
        None => ("", relative_key),
    };
    name.ends_with(rule.file_suffix.as_str()) && parent.contains(rule.folder_marker.as_str())
}

/// 1-based line number of the first live (non-comment) line that references
/// the deprecated field.
pub fn find_outdated_field(path: &Path, rule: &ConfigRegressionRule) -> io::Result<Option<usize>> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let needle = rule.deprecated_field.to_lowercase();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if rule.comment_prefixes.iter().any(|prefix| trimmed.starts_with(prefix.as_str())) {
            continue;
        }
        if trimmed.to_lowercase().contains(&needle) {
            trace!("Outdated field on line {} of {}", idx + 1, path.display());
            return Ok(Some(idx + 1));
        }
    }
    Ok(None)
}

/// Names of the regular files directly inside `dir`, sorted.
pub fn folder_files(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect()
}
