use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use log::{debug, trace, warn};

use super::types::{ArchiveHeader, ArchiveInfo, ArchiveType, ArchiveVersion, HEADER_LEN, VERSION_OFFSET};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    Patched,
    AlreadyAtTarget,
}

/// Read the archive header and file metadata.
///
/// Returns `None` only when the path does not exist. Unreadable, truncated or
/// foreign files produce an info with `Unknown` version and type.
pub fn read_header(path: &Path) -> Option<ArchiveInfo> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            debug!("Not a file: {}", path.display());
            return None;
        }
        Err(e) => {
            debug!("Archive not found {}: {}", path.display(), e);
            return None;
        }
    };

    let header = match read_header_bytes(path) {
        Ok(buf) => ArchiveHeader::parse(&buf),
        Err(e) => {
            warn!("Failed to read archive header {}: {}", path.display(), e);
            None
        }
    };

    let (version, archive_type) = match header {
        Some(header) => (header.version(), header.archive_type()),
        None => {
            trace!("Truncated header in {}", path.display());
            (ArchiveVersion::Unknown, ArchiveType::Unknown)
        }
    };

    Some(ArchiveInfo {
        path: path.to_owned(),
        file_name: path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        size: metadata.len(),
        read_only: metadata.permissions().readonly(),
        version,
        archive_type,
    })
}

/// Whether the path is an archive with a known version and type.
pub fn is_valid(path: &Path) -> bool {
    read_header(path).is_some_and(|info| info.is_valid())
}

fn read_header_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Rewrite the version byte of a single archive.
///
/// Returns `true` when the archive ends up at `target`, including when it
/// already was. Failures are logged.
pub fn patch_version(path: &Path, target: ArchiveVersion) -> bool {
    match try_patch_version(path, target) {
        Ok(_) => true,
        Err(e) => {
            warn!("Failed to patch {}: {}", path.display(), e);
            false
        }
    }
}

/// Like [`patch_version`] but reports why a patch did not happen.
pub fn try_patch_version(path: &Path, target: ArchiveVersion) -> Result<PatchStatus> {
    patch_version_with(path, target, write_version_byte)
}

pub(crate) fn patch_version_with<W>(path: &Path, target: ArchiveVersion, write: W) -> Result<PatchStatus>
where
    W: FnOnce(&Path, u8) -> io::Result<()>,
{
    let byte = target.to_byte()
        .ok_or_else(|| Error::InvalidArgument(format!("cannot patch to version {}", target)))?;

    let info = read_header(path).ok_or_else(|| Error::NotFound(path.to_owned()))?;
    if !info.is_valid() {
        return Err(Error::InvalidArchive(path.to_owned()));
    }

    if info.version == target {
        debug!("{} already at {}, nothing to do", path.display(), target);
        return Ok(PatchStatus::AlreadyAtTarget);
    }

    debug!("Patching {} from {} to {}", path.display(), info.version, target);
    let _guard = ReadOnlyGuard::acquire(path, info.read_only)?;
    write(path, byte)?;
    Ok(PatchStatus::Patched)
}

fn write_version_byte(path: &Path, byte: u8) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(VERSION_OFFSET as u64))?;
    file.write_all(&[byte])?;
    file.flush()
}

/// Makes a read-only file writable for its lifetime and puts the original
/// permissions back on drop.
struct ReadOnlyGuard {
    path: PathBuf,
    original: Option<fs::Permissions>,
}

impl ReadOnlyGuard {
    fn acquire(path: &Path, read_only: bool) -> io::Result<Self> {
        let original = if read_only {
            let permissions = fs::metadata(path)?.permissions();
            trace!("Clearing read-only flag on {}", path.display());
            fs::set_permissions(path, owner_writable(&permissions))?;
            Some(permissions)
        } else {
            None
        };
        Ok(Self {
            path: path.to_owned(),
            original,
        })
    }
}

impl Drop for ReadOnlyGuard {
    fn drop(&mut self) {
        let Some(permissions) = self.original.take() else {
            return;
        };
        trace!("Restoring read-only flag on {}", self.path.display());
        if let Err(e) = fs::set_permissions(&self.path, permissions) {
            warn!("Failed to restore read-only flag on {}: {}", self.path.display(), e);
        }
    }
}

/// Adds the owner write bit only; group and other bits are left alone.
#[cfg(unix)]
fn owner_writable(permissions: &fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    fs::Permissions::from_mode(permissions.mode() | 0o200)
}

#[cfg(not(unix))]
fn owner_writable(permissions: &fs::Permissions) -> fs::Permissions {
    let mut writable = permissions.clone();
    #[allow(clippy::permissions_set_readonly_false)]
    writable.set_readonly(false);
    writable
}
