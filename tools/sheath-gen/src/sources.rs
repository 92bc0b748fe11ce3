//! Where mesh bytes come from and where generated meshes go.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use sheath_scene::Archive;
use sheath_shared::fs::{MAX_SCENE_BYTES, read_file_with_limit, write_file_creating_dirs};
use tracing::{debug, info, warn};

/// Folder under the input and output roots that holds meshes.
pub const MESHES_DIR: &str = "meshes";

/// Where a mesh was read from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshOrigin {
    Loose(PathBuf),
    Archive(String),
}

impl fmt::Display for MeshOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshOrigin::Loose(path) => write!(f, "loose file {}", path.display()),
            MeshOrigin::Archive(name) => write!(f, "archive {}", name),
        }
    }
}

/// Loose mesh files under `<input>/meshes`.
#[derive(Debug, Clone)]
pub struct LooseFolder {
    root: PathBuf,
}

impl LooseFolder {
    pub fn new(input_folder: &Path) -> Self {
        Self {
            root: input_folder.join(MESHES_DIR),
        }
    }

    pub fn path_of(&self, mesh_path: &str) -> PathBuf {
        self.root.join(mesh_path)
    }

    /// Loose file for `mesh_path`, if one exists.
    ///
    /// Record paths do not reliably match the on-disk casing, so a miss is
    /// retried segment by segment ignoring ASCII case.
    pub fn find(&self, mesh_path: &str) -> Option<PathBuf> {
        let path = self.path_of(mesh_path);
        if path.is_file() {
            return Some(path);
        }
        let found = self.find_ignoring_case(mesh_path)?;
        debug!("Loose {} found as {}", mesh_path, found.display());
        Some(found)
    }

    fn find_ignoring_case(&self, mesh_path: &str) -> Option<PathBuf> {
        let mut current = self.root.clone();
        for part in mesh_path
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != ".")
        {
            let entry = std::fs::read_dir(&current)
                .ok()?
                .filter_map(|entry| entry.ok())
                .find(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.eq_ignore_ascii_case(part))
                })?;
            current = entry.path();
        }
        current.is_file().then_some(current)
    }

    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        read_file_with_limit(path, MAX_SCENE_BYTES)
    }
}

/// Destination for generated meshes under `<output>/meshes`.
#[derive(Debug, Clone)]
pub struct OutputSink {
    root: PathBuf,
}

impl OutputSink {
    pub fn new(output_folder: &Path) -> Self {
        Self {
            root: output_folder.join(MESHES_DIR),
        }
    }

    pub fn path_of(&self, mesh_path: &str) -> PathBuf {
        self.root.join(mesh_path)
    }

    /// Write a generated mesh, creating directories as needed.
    pub fn write(&self, mesh_path: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_of(mesh_path);
        write_file_creating_dirs(&path, bytes)?;
        Ok(path)
    }
}

/// Open the configured archives in load order.
///
/// Archives that cannot be opened are logged and left out.
pub fn open_archives(input_folder: &Path, names: &[String]) -> Vec<Archive> {
    names
        .iter()
        .filter_map(|name| {
            let path = input_folder.join(name);
            match Archive::open(&path) {
                Ok(archive) => {
                    info!("Archive {} holds {} entries", name, archive.len());
                    Some(archive)
                }
                Err(e) => {
                    warn!("Skipping archive {}: {:#}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}
