//! Fixed-header codec for `.ba2` containers.

pub mod types;
pub mod codec;

use std::path::{Path, PathBuf};
use log::{debug, info};

pub use types::*;
pub use codec::{is_valid, patch_version, read_header, try_patch_version, PatchStatus};

use crate::batch::{self, BatchOutcome, CancellationToken, ItemStatus, ProgressSink};
use crate::error::{Error, Result};
use crate::utils;

/// Archive files in `dir`, sorted by name within each directory.
pub fn list_container_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    utils::list_files_with_extension(dir, ARCHIVE_EXTENSION, recursive)
}

impl From<PatchStatus> for ItemStatus {
    fn from(status: PatchStatus) -> Self {
        match status {
            PatchStatus::Patched => ItemStatus::Succeeded,
            PatchStatus::AlreadyAtTarget => ItemStatus::Skipped,
        }
    }
}

/// Patch every archive under `dir` to `target`.
///
/// Archives already at `target` are skipped; unreadable or invalid archives
/// are recorded as failures. Cancellation is honoured between files and
/// returns [`Error::BatchCancelled`] with the partial outcome.
pub fn batch_patch(
    dir: &Path,
    target: ArchiveVersion,
    recursive: bool,
    progress: Option<&dyn ProgressSink>,
    cancel: Option<&CancellationToken>,
) -> Result<BatchOutcome> {
    if target.to_byte().is_none() {
        return Err(Error::InvalidArgument(format!("cannot patch to version {}", target)));
    }

    let files = list_container_files(dir, recursive);
    info!("Patching {} archives in {} to {}", files.len(), dir.display(), target);

    // try_patch_version covers missing, invalid and already-patched files in one header read.
    let outcome = batch::run_batch(&files, progress, cancel, |path| {
        let status = try_patch_version(path, target)?;
        if status == PatchStatus::AlreadyAtTarget {
            debug!("Skipping {}, already {}", path.display(), target);
        }
        Ok(ItemStatus::from(status))
    })?;

    info!(
        "Archive patch complete: {} patched, {} skipped, {} failed",
        outcome.succeeded, outcome.skipped, outcome.failed
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use crate::batch::ItemStatus;

    fn write_archive(path: &Path, version: u8) {
        let mut bytes = b"BTDX".to_vec();
        bytes.extend_from_slice(&[version, 0, 0, 0]);
        bytes.extend_from_slice(b"GNRL");
        bytes.extend_from_slice(&[0; 16]);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_batch_patch_mixed_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_archive(&root.join("a.ba2"), 0x01);
        write_archive(&root.join("b.ba2"), 0x08);
        fs::write(root.join("c.ba2"), b"junk").unwrap();
        fs::write(root.join("readme.txt"), b"ignored").unwrap();

        let outcome = batch_patch(root, ArchiveVersion::V8, false, None, None).unwrap();
        assert_eq!(outcome.total, 3);
        assert_eq!((outcome.succeeded, outcome.skipped, outcome.failed), (1, 1, 1));
        let statuses: Vec<_> = outcome.results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![ItemStatus::Succeeded, ItemStatus::Skipped, ItemStatus::Failed]);
        assert!(is_valid(&root.join("a.ba2")));
        assert_eq!(read_header(&root.join("a.ba2")).unwrap().version, ArchiveVersion::V8);
    }

    #[test]
    fn test_batch_failures_carry_reason() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("short.ba2"), b"BTDX").unwrap();
        write_archive(&root.join("ok.ba2"), 0x07);

        let outcome = batch_patch(root, ArchiveVersion::V7, false, None, None).unwrap();
        let summary: Vec<_> = outcome.results.iter()
            .map(|r| (r.status, r.message.clone()))
            .collect();
        assert_eq!(summary, vec![
            (ItemStatus::Skipped, None),
            (ItemStatus::Failed, Some(Error::InvalidArchive(root.join("short.ba2")).to_string())),
        ]);
    }

    #[test]
    fn test_patch_status_maps_to_item_status() {
        assert_eq!(ItemStatus::from(PatchStatus::Patched), ItemStatus::Succeeded);
        assert_eq!(ItemStatus::from(PatchStatus::AlreadyAtTarget), ItemStatus::Skipped);
    }

    #[test]
    fn test_batch_patch_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = batch_patch(&temp_dir.path().join("nope"), ArchiveVersion::V1, true, None, None).unwrap();
        assert_eq!(outcome.total, 0);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_batch_patch_cancelled_before_start() {
        let temp_dir = TempDir::new().unwrap();
        write_archive(&temp_dir.path().join("a.ba2"), 0x01);
        let token = CancellationToken::new();
        token.cancel();

        let err = batch_patch(temp_dir.path(), ArchiveVersion::V8, false, None, Some(&token)).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.partial_outcome().unwrap().processed(), 0);
        assert_eq!(read_header(&temp_dir.path().join("a.ba2")).unwrap().version, ArchiveVersion::V1);
    }
}
