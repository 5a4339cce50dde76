use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::Result;
use log::{debug, trace};
use sha2::{Sha256, Digest};
use walkdir::WalkDir;

/// SHA-256 of a file's full content, hex encoded.
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether the path's extension is in a comma-separated list such as `"ba2, .dll"`.
///
/// An empty list matches everything; a path without an extension matches nothing.
pub fn matches_extension(path: &Path, extensions: &str) -> bool {
    if extensions.trim().is_empty() {
        return true;
    }

    let ext = extension_lower(path);
    if ext.is_empty() {
        return false;
    }

    // List entries may carry a leading dot and any casing
    extensions
        .split(',')
        .map(|e| e.trim().trim_start_matches('.'))
        .any(|e| e.eq_ignore_ascii_case(&ext))
}

/// Lowercased extension without the dot, or an empty string.
pub fn extension_lower(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Collect files under `dir` whose extension matches `extensions`.
///
/// Results are sorted by file name within each directory. A missing directory
/// yields an empty list, and unreadable entries are skipped.
pub fn list_files_with_extension(dir: &Path, extensions: &str, recursive: bool) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!("Directory does not exist, nothing to list: {}", dir.display());
        return Vec::new();
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                trace!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| matches_extension(e.path(), extensions))
        .map(|e| e.into_path())
        .collect();

    debug!("Found {} files matching '{}' in {}", files.len(), extensions, dir.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_file_checksum() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"test content").unwrap();

        let hash = file_checksum(&file_path).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, file_checksum(&file_path).unwrap());

        let different_path = temp_dir.path().join("different.txt");
        fs::write(&different_path, b"different content").unwrap();
        assert_ne!(hash, file_checksum(&different_path).unwrap());
    }

    #[test]
    fn test_matches_extension_empty_list() {
        let path = Path::new("test.txt");
        assert!(matches_extension(path, ""));
    }

    #[test]
    fn test_matches_extension_multiple() {
        let path = Path::new("Textures.BA2");
        assert!(matches_extension(path, "ba2,dll"));
        assert!(!matches_extension(path, "esp,esm"));
    }

    #[test]
    fn test_matches_extension_no_extension() {
        let path = Path::new("test");
        assert!(!matches_extension(path, "ba2"));
    }

    #[test]
    fn test_matches_extension_dotted_and_cased() {
        let path = Path::new("Data/Plugin.DLL");
        assert!(matches_extension(path, " .dll "));
        assert!(matches_extension(path, "esp,DLL"));
        assert!(!matches_extension(path, "dl"));
    }

    #[test]
    fn test_extension_lower() {
        assert_eq!(extension_lower(Path::new("a/B.DDS")), "dds");
        assert_eq!(extension_lower(Path::new("README")), "");
    }

    #[test]
    fn test_list_files_recursive_and_flat() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("b.ba2"), b"x").unwrap();
        fs::write(root.join("a.BA2"), b"x").unwrap();
        fs::write(root.join("notes.txt"), b"x").unwrap();
        fs::write(root.join("sub/c.ba2"), b"x").unwrap();

        let flat = list_files_with_extension(root, "ba2", false);
        let names: Vec<_> = flat.iter().map(|p| p.file_name().unwrap().to_string_lossy().to_string()).collect();
        assert_eq!(names, vec!["a.BA2", "b.ba2"]);

        let deep = list_files_with_extension(root, "ba2", true);
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_list_files_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_files_with_extension(&temp_dir.path().join("nope"), "ba2", true).is_empty());
    }
}
