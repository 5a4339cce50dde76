use std::collections::HashSet;
use std::path::{Path, PathBuf};
use log::{debug, info, trace};
use walkdir::WalkDir;

use super::checks;
use super::normalize_relative;
use super::owners::{OwnerResolver, Unmanaged};
use super::types::{ScanConfiguration, ScanRules};
use crate::batch::CancellationToken;
use crate::error::{Error, Result};
use crate::types::{Diagnostic, ProblemKind};
use crate::utils;

static UNMANAGED: Unmanaged = Unmanaged;

/// Walks an installation tree and applies the rule set.
///
/// Single-threaded: files of a directory are checked in name order before
/// any of its subdirectories is entered.
pub struct ScanCoordinator<'a> {
    root: &'a Path,
    config: &'a ScanConfiguration,
    rules: &'a ScanRules,
    owners: &'a dyn OwnerResolver,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> ScanCoordinator<'a> {
    pub fn new(root: &'a Path, config: &'a ScanConfiguration, rules: &'a ScanRules) -> Self {
        Self {
            root,
            config,
            rules,
            owners: &UNMANAGED,
            cancel: None,
        }
    }

    pub fn with_owners(mut self, owners: &'a dyn OwnerResolver) -> Self {
        self.owners = owners;
        self
    }

    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the scan.
    ///
    /// Fails with [`Error::NotFound`] if the root is not a directory and with
    /// [`Error::Cancelled`] if the token fires; partial results are dropped.
    pub fn run(&self) -> Result<Vec<Diagnostic>> {
        if self.config.skip_scan {
            debug!("Scan disabled by configuration");
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(Error::NotFound(self.root.to_owned()));
        }

        debug!("Starting tree scan of {}", self.root.display());
        debug!("  Configuration: {:?}", self.config);

        let mut diagnostics = Vec::new();
        if self.config.required_files {
            self.check_required_files(&mut diagnostics);
        }
        self.visit(self.root, &mut diagnostics)?;

        info!("Tree scan found {} problems in {}", diagnostics.len(), self.root.display());
        Ok(diagnostics)
    }

    fn visit(&self, dir: &Path, out: &mut Vec<Diagnostic>) -> Result<()> {
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!("Scan cancelled at {}", dir.display());
            return Err(Error::Cancelled);
        }

        let relative = dir.strip_prefix(self.root).unwrap_or(dir);
        let depth = relative.components().count();
        trace!("Visiting {}", relative.display());

        if depth > 0 {
            let key = normalize_relative(relative);
            let name = key.rsplit('/').next().unwrap_or_default().to_string();

            if self.config.junk_files && self.rules.packaging_folders.contains(&name) {
                out.push(self.diagnostic(
                    ProblemKind::PackagingLeftover,
                    dir,
                    relative,
                    format!("Installer folder '{}' was left in the data directory", dir_name(dir)),
                ));
                return Ok(());
            }

            self.check_folder(dir, relative, &key, &name, depth, out);
        }

        let (files, subdirs) = read_entries(dir);
        for file in &files {
            self.check_file(file, out);
        }
        for subdir in &subdirs {
            self.visit(subdir, out)?;
        }
        Ok(())
    }

    fn check_folder(&self, dir: &Path, relative: &Path, key: &str, name: &str, depth: usize, out: &mut Vec<Diagnostic>) {
        if self.config.unexpected_folders && depth == 1 && !self.rules.top_level_folders.contains(name) {
            out.push(self.diagnostic(
                ProblemKind::UnexpectedFolder,
                dir,
                relative,
                format!("'{}' is not a folder the game reads from", dir_name(dir)),
            ));
        }

        if self.config.loose_previs && self.rules.previs_folders.iter().any(|f| f == key) {
            out.push(
                self.diagnostic(
                    ProblemKind::LoosePrevis,
                    dir,
                    relative,
                    "Loose precombine/previs data overrides other mods' previs",
                )
                .with_extra_files(checks::folder_files(dir)),
            );
        }

        if self.config.anim_text_data && self.rules.anim_text_folders.iter().any(|f| f == key) {
            out.push(
                self.diagnostic(
                    ProblemKind::AnimTextData,
                    dir,
                    relative,
                    "Loose animation text data slows loading and is usually packed",
                )
                .with_extra_files(checks::folder_files(dir)),
            );
        }
    }

    fn check_file(&self, file: &Path, out: &mut Vec<Diagnostic>) {
        let relative = file.strip_prefix(self.root).unwrap_or(file);
        let key = normalize_relative(relative);
        let name = key.rsplit('/').next().unwrap_or_default();

        if self.config.junk_files && self.rules.is_junk_file(name) {
            out.push(self.diagnostic(
                ProblemKind::JunkFile,
                file,
                relative,
                format!("'{}' is a leftover system or temporary file", dir_name(file)),
            ));
            return;
        }

        if self.config.wrong_formats {
            if let Some((top, _)) = key.split_once('/') {
                let extension = utils::extension_lower(file);
                if self.rules.is_wrong_format(top, &extension) {
                    let expected = self.rules.expected_formats(top).join(", ");
                    out.push(self.diagnostic(
                        ProblemKind::WrongFormat,
                        file,
                        relative,
                        format!("Unexpected '.{}' file in {} (expected: {})", extension, top, expected),
                    ));
                }
            }
        }

        if self.config.config_regressions && checks::is_config_candidate(&key, &self.rules.config_regression) {
            let rule = &self.rules.config_regression;
            match checks::find_outdated_field(file, rule) {
                Ok(Some(line)) => out.push(self.diagnostic(
                    ProblemKind::ConfigRegression,
                    file,
                    relative,
                    format!(
                        "Line {} uses '{}', which was renamed to '{}'",
                        line, rule.deprecated_field, rule.replacement
                    ),
                )),
                Ok(None) => {}
                Err(e) => debug!("Could not read {}: {}", file.display(), e),
            }
        }

        if self.config.problem_overrides {
            if let Some(remedy) = self.rules.problem_overrides.get(&key) {
                out.push(
                    self.diagnostic(
                        ProblemKind::ProblemOverride,
                        file,
                        relative,
                        format!("'{}' is a known problematic override", relative.display()),
                    )
                    .with_remedy_text(remedy.clone()),
                );
            }
        }
    }

    fn check_required_files(&self, out: &mut Vec<Diagnostic>) {
        let (files, _) = read_entries(self.root);
        let present: HashSet<String> = files
            .iter()
            .filter_map(|f| f.file_name())
            .map(|n| n.to_string_lossy().to_lowercase())
            .collect();

        for required in &self.rules.required_files {
            if !present.contains(&required.to_lowercase()) {
                let relative = PathBuf::from(required);
                out.push(Diagnostic::new(
                    ProblemKind::MissingRequiredFile,
                    &self.root.join(&relative),
                    &relative,
                    None,
                    format!("Required file '{}' is missing", required),
                ));
            }
        }
    }

    fn diagnostic(&self, kind: ProblemKind, path: &Path, relative: &Path, summary: impl Into<String>) -> Diagnostic {
        Diagnostic::new(kind, path, relative, self.owners.owner_of(relative), summary)
    }
}

/// Split a directory's entries into files and subdirectories, sorted by name.
/// Unreadable or vanished directories produce nothing.
fn read_entries(dir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => subdirs.push(entry.into_path()),
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => debug!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }

    (files, subdirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
