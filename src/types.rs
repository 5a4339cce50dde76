use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

/// Owner label used when no content-unit claims a path.
pub const UNMANAGED_OWNER: &str = "<unmanaged>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Suggested fix category. Every category resolves to exactly one description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemedyKind {
    ArchiveOrDelete,
    Delete,
    DeleteOrIgnore,
    ConvertOrIgnore,
    RenameRequired,
    MoveOrIgnore,
    Reinstall,
}

impl RemedyKind {
    pub fn description(&self) -> &'static str {
        match self {
            RemedyKind::ArchiveOrDelete => "Pack these files into an archive or delete them",
            RemedyKind::Delete => "Delete this item",
            RemedyKind::DeleteOrIgnore => "Delete this item or ignore it",
            RemedyKind::ConvertOrIgnore => "Convert to the expected format or ignore if intentional",
            RemedyKind::RenameRequired => "Rename the outdated field",
            RemedyKind::MoveOrIgnore => "Move the contents to the correct folder or ignore if intentional",
            RemedyKind::Reinstall => "Verify game files or reinstall to restore the missing file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    Kind(RemedyKind),
    Text(String),
}

impl Remedy {
    pub fn description(&self) -> &str {
        match self {
            Remedy::Kind(kind) => kind.description(),
            Remedy::Text(text) => text,
        }
    }
}

impl fmt::Display for Remedy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    JunkFile,
    PackagingLeftover,
    UnexpectedFolder,
    LoosePrevis,
    AnimTextData,
    WrongFormat,
    ConfigRegression,
    ProblemOverride,
    MissingRequiredFile,
}

impl ProblemKind {
    pub fn severity(&self) -> Severity {
        match self {
            ProblemKind::JunkFile | ProblemKind::PackagingLeftover => Severity::Info,
            ProblemKind::UnexpectedFolder
            | ProblemKind::AnimTextData
            | ProblemKind::WrongFormat
            | ProblemKind::ProblemOverride => Severity::Warning,
            ProblemKind::LoosePrevis
            | ProblemKind::ConfigRegression
            | ProblemKind::MissingRequiredFile => Severity::Error,
        }
    }

    pub fn remedy(&self) -> RemedyKind {
        match self {
            ProblemKind::JunkFile => RemedyKind::DeleteOrIgnore,
            ProblemKind::PackagingLeftover => RemedyKind::Delete,
            ProblemKind::UnexpectedFolder => RemedyKind::MoveOrIgnore,
            ProblemKind::LoosePrevis | ProblemKind::AnimTextData => RemedyKind::ArchiveOrDelete,
            ProblemKind::WrongFormat => RemedyKind::ConvertOrIgnore,
            ProblemKind::ConfigRegression => RemedyKind::RenameRequired,
            ProblemKind::ProblemOverride => RemedyKind::Delete,
            ProblemKind::MissingRequiredFile => RemedyKind::Reinstall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::JunkFile => "junk file",
            ProblemKind::PackagingLeftover => "packaging leftover",
            ProblemKind::UnexpectedFolder => "unexpected folder",
            ProblemKind::LoosePrevis => "loose previs",
            ProblemKind::AnimTextData => "loose animation text data",
            ProblemKind::WrongFormat => "wrong format",
            ProblemKind::ConfigRegression => "outdated config field",
            ProblemKind::ProblemOverride => "problem override",
            ProblemKind::MissingRequiredFile => "missing required file",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a corrective action run against a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOutcome {
    pub applied: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub owner: String,
    pub summary: String,
    pub remedy: Remedy,
    pub extra_files: Option<Vec<String>>,
    pub fix: Option<FixOutcome>,
}

impl Diagnostic {
    /// Build a diagnostic with the kind's default severity and remedy.
    ///
    /// Missing-file diagnostics never carry an owner; every other kind falls
    /// back to [`UNMANAGED_OWNER`].
    pub fn new(
        kind: ProblemKind,
        absolute_path: &Path,
        relative_path: &Path,
        owner: Option<String>,
        summary: impl Into<String>,
    ) -> Self {
        let owner = match kind {
            ProblemKind::MissingRequiredFile => String::new(),
            _ => owner
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| UNMANAGED_OWNER.to_string()),
        };

        Self {
            kind,
            severity: kind.severity(),
            absolute_path: absolute_path.to_owned(),
            relative_path: relative_path.to_owned(),
            owner,
            summary: summary.into(),
            remedy: Remedy::Kind(kind.remedy()),
            extra_files: None,
            fix: None,
        }
    }

    pub fn with_remedy_text(mut self, text: impl Into<String>) -> Self {
        self.remedy = Remedy::Text(text.into());
        self
    }

    pub fn with_extra_files(mut self, files: Vec<String>) -> Self {
        if !files.is_empty() {
            self.extra_files = Some(files);
        }
        self
    }

    pub fn attach_fix(&mut self, outcome: FixOutcome) {
        self.fix = Some(outcome);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {} -> {}",
            self.severity,
            self.relative_path.display(),
            self.owner,
            self.summary,
            self.remedy
        )
    }
}
