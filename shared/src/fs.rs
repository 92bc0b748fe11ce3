//! Filesystem helpers shared across sheath tools.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed scene file size for reading into memory.
pub const MAX_SCENE_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB
/// Maximum allowed size of an archive's entry index.
pub const MAX_ARCHIVE_INDEX_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Normalise an asset path for lookups: lowercase with `/` separators.
pub fn normalize_asset_path(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// Write a file, creating any missing parent directories first.
pub fn write_file_creating_dirs(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_respects_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, [0u8; 16]).unwrap();

        assert_eq!(read_file_with_limit(&path, 16).unwrap().len(), 16);
        let err = read_file_with_limit(&path, 8).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_normalize_asset_path() {
        assert_eq!(
            normalize_asset_path("Weapons\\Iron\\IronSwordLeft.SGF"),
            "weapons/iron/ironswordleft.sgf"
        );
        assert_eq!(normalize_asset_path("a/b"), "a/b");
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meshes/weapons/iron/sword.sgf");
        write_file_creating_dirs(&path, b"data").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }
}
