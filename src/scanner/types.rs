use std::collections::{HashMap, HashSet};
use serde::{Serialize, Deserialize};

use super::rules;

/// Independent rule toggles for a tree scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfiguration {
    /// Skip the whole pass.
    pub skip_scan: bool,
    pub junk_files: bool,
    pub unexpected_folders: bool,
    pub loose_previs: bool,
    pub anim_text_data: bool,
    pub wrong_formats: bool,
    pub config_regressions: bool,
    pub problem_overrides: bool,
    pub required_files: bool,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            skip_scan: false,
            junk_files: true,
            unexpected_folders: true,
            loose_previs: true,
            anim_text_data: true,
            wrong_formats: true,
            config_regressions: true,
            problem_overrides: true,
            // Only meaningful for a game install; a staging folder never has the master file.
            required_files: false,
        }
    }
}

impl ScanConfiguration {
    /// Every check off; useful as a base when enabling a single rule.
    pub fn none() -> Self {
        Self {
            skip_scan: false,
            junk_files: false,
            unexpected_folders: false,
            loose_previs: false,
            anim_text_data: false,
            wrong_formats: false,
            config_regressions: false,
            problem_overrides: false,
            required_files: false,
        }
    }
}

/// Flags `.ini` files under a config tool's folder that still use a renamed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRegressionRule {
    /// Lowercase substring the file's parent path must contain.
    pub folder_marker: String,
    /// Lowercase file name suffix.
    pub file_suffix: String,
    pub deprecated_field: String,
    pub replacement: String,
    pub comment_prefixes: Vec<String>,
}

/// Lookup tables driving the scan. All keys are lowercase; relative paths use `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRules {
    pub top_level_folders: HashSet<String>,
    pub packaging_folders: HashSet<String>,
    pub junk_names: HashSet<String>,
    pub junk_suffixes: Vec<String>,
    /// Top-level folder -> extensions allowed beneath it.
    pub format_whitelist: HashMap<String, HashSet<String>>,
    /// Top-level folder -> extra extensions tolerated despite the whitelist.
    pub format_exceptions: HashMap<String, HashSet<String>>,
    pub previs_folders: Vec<String>,
    pub anim_text_folders: Vec<String>,
    pub config_regression: ConfigRegressionRule,
    /// Relative file path -> remedy text.
    pub problem_overrides: HashMap<String, String>,
    pub required_files: Vec<String>,
}

fn owned_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn owned_map(table: &[(&str, &[&str])]) -> HashMap<String, HashSet<String>> {
    table.iter()
        .map(|(folder, exts)| (folder.to_string(), owned_set(exts)))
        .collect()
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            top_level_folders: owned_set(rules::TOP_LEVEL_FOLDERS),
            packaging_folders: owned_set(rules::PACKAGING_FOLDERS),
            junk_names: owned_set(rules::JUNK_FILE_NAMES),
            junk_suffixes: rules::JUNK_FILE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            format_whitelist: owned_map(rules::FORMAT_WHITELIST),
            format_exceptions: owned_map(rules::FORMAT_EXCEPTIONS),
            previs_folders: rules::PREVIS_FOLDERS.iter().map(|s| s.to_string()).collect(),
            anim_text_folders: rules::ANIM_TEXT_FOLDERS.iter().map(|s| s.to_string()).collect(),
            config_regression: rules::COMPLEX_SORTER_RULE.clone(),
            problem_overrides: rules::PROBLEM_OVERRIDES.iter()
                .map(|(path, text)| (path.to_string(), text.to_string()))
                .collect(),
            required_files: rules::REQUIRED_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanRules {
    /// Allow `extension` beneath `folder` even if the whitelist says otherwise.
    pub fn with_format_exception(mut self, folder: &str, extension: &str) -> Self {
        self.format_exceptions
            .entry(folder.to_lowercase())
            .or_default()
            .insert(extension.trim_start_matches('.').to_lowercase());
        self
    }

    pub fn is_junk_file(&self, name_lower: &str) -> bool {
        self.junk_names.contains(name_lower)
            || self.junk_suffixes.iter().any(|suffix| name_lower.ends_with(suffix.as_str()))
    }

    /// Whether `extension` is out of place beneath top-level `folder`.
    /// Folders without a whitelist accept anything.
    pub fn is_wrong_format(&self, folder: &str, extension: &str) -> bool {
        let Some(allowed) = self.format_whitelist.get(folder) else {
            return false;
        };
        if allowed.contains(extension) {
            return false;
        }
        !self.format_exceptions
            .get(folder)
            .is_some_and(|extra| extra.contains(extension))
    }

    pub fn expected_formats(&self, folder: &str) -> Vec<String> {
        let mut formats: Vec<String> = self.format_whitelist
            .get(folder)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        formats.sort();
        formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("desktop.ini", true)]
    #[test_case("thumbs.db", true)]
    #[test_case("meshes.nif.bak", true)]
    #[test_case("config.ini", false)]
    fn test_junk_detection(name: &str, expected: bool) {
        assert_eq!(ScanRules::default().is_junk_file(name), expected);
    }

    #[test_case("textures", "dds", false)]
    #[test_case("textures", "png", true)]
    #[test_case("f4se", "dll", false; "dll exception in f4se")]
    #[test_case("f4se", "exe", true)]
    #[test_case("interface", "anything", false; "folder without whitelist")]
    fn test_format_whitelist(folder: &str, ext: &str, expected: bool) {
        assert_eq!(ScanRules::default().is_wrong_format(folder, ext), expected);
    }

    #[test]
    fn test_custom_format_exception() {
        let rules = ScanRules::default().with_format_exception("Textures", ".PNG");
        assert!(!rules.is_wrong_format("textures", "png"));
        assert!(rules.is_wrong_format("textures", "tga"));
    }

    #[test]
    fn test_default_skips_required_files() {
        let config = ScanConfiguration::default();
        assert!(config.junk_files && config.wrong_formats && config.problem_overrides);
        assert!(!config.required_files);
    }

    #[test]
    fn test_none_disables_everything() {
        let config = ScanConfiguration::none();
        assert!(!config.junk_files && !config.wrong_formats && !config.required_files);
        assert!(!config.skip_scan);
    }
}
