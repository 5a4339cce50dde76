use std::fs;
use std::io;
use log::{debug, info, warn};

use crate::types::{Diagnostic, FixOutcome, ProblemKind};

/// Counts from an auto-fix pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixSummary {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Applies delete-type remedies and records the outcome on each diagnostic.
pub struct AutoFixer {
    dry_run: bool,
}

impl AutoFixer {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn can_fix(diagnostic: &Diagnostic) -> bool {
        matches!(
            diagnostic.kind,
            ProblemKind::JunkFile | ProblemKind::PackagingLeftover | ProblemKind::ProblemOverride
        )
    }

    /// Fix one diagnostic and attach the outcome. Returns whether anything changed on disk.
    pub fn apply(&self, diagnostic: &mut Diagnostic) -> bool {
        let outcome = self.fix_outcome(diagnostic);
        let applied = outcome.applied;
        diagnostic.attach_fix(outcome);
        applied
    }

    pub fn apply_all(&self, diagnostics: &mut [Diagnostic]) -> FixSummary {
        let mut summary = FixSummary::default();
        for diagnostic in diagnostics.iter_mut() {
            let fixable = Self::can_fix(diagnostic);
            if self.apply(diagnostic) {
                summary.applied += 1;
            } else if fixable && !self.dry_run {
                summary.failed += 1;
            } else {
                summary.skipped += 1;
            }
        }
        info!(
            "Auto-fix: {} applied, {} skipped, {} failed",
            summary.applied, summary.skipped, summary.failed
        );
        summary
    }

    fn fix_outcome(&self, diagnostic: &Diagnostic) -> FixOutcome {
        let path = &diagnostic.absolute_path;
        if !Self::can_fix(diagnostic) {
            return FixOutcome {
                applied: false,
                message: format!("No automatic fix for {}", diagnostic.kind),
            };
        }
        if self.dry_run {
            return FixOutcome {
                applied: false,
                message: format!("Would delete {}", path.display()),
            };
        }

        debug!("Deleting {}", path.display());
        let result: io::Result<()> = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => FixOutcome {
                applied: true,
                message: format!("Deleted {}", path.display()),
            },
            Err(e) => {
                warn!("Failed to delete {}: {}", path.display(), e);
                FixOutcome {
                    applied: false,
                    message: format!("Failed to delete: {}", e),
                }
            }
        }
    }
}
