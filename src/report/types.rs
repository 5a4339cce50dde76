use std::collections::BTreeMap;
use std::path::PathBuf;
use serde::{Serialize, Deserialize};

use crate::types::{Diagnostic, ProblemKind};

/// Persisted result of a scan.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub fixed: usize,
    pub by_kind: BTreeMap<ProblemKind, usize>,
}
