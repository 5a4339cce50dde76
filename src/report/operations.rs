use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use anyhow::Result;
use super::types::{ScanReport, ReportStats};
use crate::types::{Diagnostic, Severity};
use log;

impl ScanReport {
    pub fn new(root: &Path, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            root: root.to_owned(),
            diagnostics,
        }
    }

    /// Load a previously saved report, or start an empty one if none exists yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No report at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let reader = BufReader::new(File::open(path)?);
        let report: Self = serde_json::from_reader(reader)?;
        log::debug!(
            "Loaded report for {} with {} diagnostics",
            report.root.display(),
            report.diagnostics.len()
        );
        Ok(report)
    }

    /// Write the report as pretty JSON, creating missing parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        log::debug!("Writing {} diagnostics to {}", self.diagnostics.len(), path.display());

        // A bare file name has an empty parent; nothing to create then
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        log::debug!("Report written to {}", path.display());
        Ok(())
    }

    pub fn get_stats(&self) -> ReportStats {
        let mut stats = ReportStats {
            total: self.diagnostics.len(),
            ..Default::default()
        };

        for diagnostic in &self.diagnostics {
            // Severity buckets always add up to the total
            match diagnostic.severity {
                Severity::Info => stats.info += 1,
                Severity::Warning => stats.warning += 1,
                Severity::Error => stats.error += 1,
            }
            if diagnostic.fix.as_ref().is_some_and(|f| f.applied) {
                stats.fixed += 1;
            }
            *stats.by_kind.entry(diagnostic.kind).or_default() += 1;
        }

        stats
    }
}
