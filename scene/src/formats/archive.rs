//! Archive container format (`.sga`)
//!
//! Bundles many scene files addressed by asset path. Only the entry index is
//! read when an archive is opened; entry data is read on demand, so a damaged
//! entry fails on its own without affecting the rest of the archive.
//!
//! ```text
//! 0x00: magic "SGAR"
//! 0x04: version u32 (little endian)
//! 0x08: index_len u32 (little endian)
//! 0x0C: index (bitcode serialized Vec<ArchiveIndexEntry>)
//! var:  entry data blob, offsets relative to its start
//! ```

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bitcode::{Decode, Encode};
use hashbrown::HashMap;
use sheath_shared::ARCHIVE_FORMAT;
use sheath_shared::fs::{MAX_ARCHIVE_INDEX_BYTES, MAX_SCENE_BYTES, normalize_asset_path};

use crate::error::FormatError;

const FORMAT_NAME: &str = "archive";
const HEADER_SIZE: usize = 12;

/// Location of one entry inside the data blob.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ArchiveIndexEntry {
    /// Asset path as stored (original case)
    pub path: String,
    pub offset: u64,
    pub size: u64,
}

/// An opened archive: index in memory, data on disk.
#[derive(Debug)]
pub struct Archive {
    name: String,
    file_path: PathBuf,
    data_start: u64,
    /// Length of the data blob on disk
    data_len: u64,
    entries: Vec<ArchiveIndexEntry>,
    lookup: HashMap<String, usize>,
}

fn parse_header(header: &[u8]) -> Result<u32, FormatError> {
    if !ARCHIVE_FORMAT.has_magic(header) || header.len() < HEADER_SIZE {
        return Err(FormatError::BadMagic {
            format: FORMAT_NAME,
            expected: ARCHIVE_FORMAT.magic,
        });
    }
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if version > ARCHIVE_FORMAT.version {
        return Err(FormatError::UnsupportedVersion {
            format: FORMAT_NAME,
            found: version,
            supported: ARCHIVE_FORMAT.version,
        });
    }
    Ok(u32::from_le_bytes([header[8], header[9], header[10], header[11]]))
}

impl Archive {
    /// Open an archive and load its entry index.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open archive: {}", path.display()))?;

        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header)
            .with_context(|| format!("Failed to read archive header: {}", path.display()))?;
        let index_len = parse_header(&header)? as u64;
        if index_len > MAX_ARCHIVE_INDEX_BYTES {
            anyhow::bail!(
                "Archive index too large: {} ({} bytes, max {} bytes)",
                path.display(),
                index_len,
                MAX_ARCHIVE_INDEX_BYTES
            );
        }

        let mut index = vec![0u8; index_len as usize];
        file.read_exact(&mut index)
            .with_context(|| format!("Failed to read archive index: {}", path.display()))?;
        let entries: Vec<ArchiveIndexEntry> =
            bitcode::decode(&index).map_err(|e| FormatError::Decode {
                format: FORMAT_NAME,
                reason: e.to_string(),
            })?;

        let file_len = file
            .metadata()
            .with_context(|| format!("Failed to read archive metadata: {}", path.display()))?
            .len();
        let data_start = HEADER_SIZE as u64 + index_len;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::from_index(
            name,
            path.to_path_buf(),
            data_start,
            file_len.saturating_sub(data_start),
            entries,
        ))
    }

    fn from_index(
        name: String,
        file_path: PathBuf,
        data_start: u64,
        data_len: u64,
        entries: Vec<ArchiveIndexEntry>,
    ) -> Self {
        let mut lookup = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            // First entry wins for duplicate paths
            lookup.entry(normalize_asset_path(&entry.path)).or_insert(i);
        }
        Self {
            name,
            file_path,
            data_start,
            data_len,
            entries,
            lookup,
        }
    }

    /// Archive file name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by asset path (case and separator insensitive).
    pub fn find(&self, path: &str) -> Option<&ArchiveIndexEntry> {
        self.lookup
            .get(&normalize_asset_path(path))
            .map(|&i| &self.entries[i])
    }

    /// Read one entry's bytes from disk.
    pub fn read(&self, entry: &ArchiveIndexEntry) -> Result<Vec<u8>> {
        if entry.size > MAX_SCENE_BYTES {
            anyhow::bail!(
                "Archive entry too large: {} in {} ({} bytes, max {} bytes)",
                entry.path,
                self.name,
                entry.size,
                MAX_SCENE_BYTES
            );
        }
        // Index values are untrusted; the entry must lie inside the blob
        let end = entry.offset.checked_add(entry.size);
        let start = self.data_start.checked_add(entry.offset);
        let (Some(end), Some(start)) = (end, start) else {
            anyhow::bail!("Archive entry out of range: {} in {}", entry.path, self.name);
        };
        if end > self.data_len {
            anyhow::bail!(
                "Archive entry out of range: {} in {} (ends at {}, data is {} bytes)",
                entry.path,
                self.name,
                end,
                self.data_len
            );
        }

        let mut file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open archive: {}", self.file_path.display()))?;
        file.seek(SeekFrom::Start(start))
            .with_context(|| format!("Failed to seek to {} in {}", entry.path, self.name))?;
        let mut data = vec![0u8; entry.size as usize];
        file.read_exact(&mut data)
            .with_context(|| format!("Failed to read {} from {}", entry.path, self.name))?;
        Ok(data)
    }
}

/// Assembles an archive file from in-memory entries.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, data: Vec<u8>) -> &mut Self {
        self.entries.push((path.into(), data));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut offset = 0u64;
        let index: Vec<ArchiveIndexEntry> = self
            .entries
            .iter()
            .map(|(path, data)| {
                let entry = ArchiveIndexEntry {
                    path: path.clone(),
                    offset,
                    size: data.len() as u64,
                };
                offset += data.len() as u64;
                entry
            })
            .collect();
        let index = bitcode::encode(&index);

        let mut bytes = ARCHIVE_FORMAT.magic.to_vec();
        bytes.extend_from_slice(&ARCHIVE_FORMAT.version.to_le_bytes());
        bytes.extend_from_slice(&(index.len() as u32).to_le_bytes());
        bytes.extend(index);
        for (_, data) in &self.entries {
            bytes.extend_from_slice(data);
        }
        bytes
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        sheath_shared::fs::write_file_creating_dirs(path, &self.to_bytes())
    }
}
