//! settings.toml parsing and validation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::filters::PathFilter;

/// Top-level settings file.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub meshes: MeshesSection,
    #[serde(default)]
    pub diagnostics: DiagnosticsSection,
}

/// Mesh input, output and selection settings.
#[derive(Debug, Deserialize)]
pub struct MeshesSection {
    /// Game data folder: loose files live under `meshes/`, archives at the top
    #[serde(default = "default_input_folder")]
    pub input_folder: PathBuf,

    /// Where generated meshes are written, under `meshes/`
    #[serde(default)]
    pub output_folder: PathBuf,

    /// Also create left scabbards for two-handed melee weapons
    #[serde(default)]
    pub accept_two_handed: bool,

    /// Comma-separated substring lists; a mesh matching every substring of
    /// any entry is excluded
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Same format as the blacklist; when set, only matching meshes are
    /// included
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Archive file names in load order, relative to the input folder
    #[serde(default)]
    pub archives: Vec<String>,

    /// Weapon records, relative to the input folder
    #[serde(default = "default_records")]
    pub records: PathBuf,
}

impl Default for MeshesSection {
    fn default() -> Self {
        Self {
            input_folder: default_input_folder(),
            output_folder: PathBuf::new(),
            accept_two_handed: false,
            blacklist: Vec::new(),
            whitelist: Vec::new(),
            archives: Vec::new(),
            records: default_records(),
        }
    }
}

fn default_input_folder() -> PathBuf {
    PathBuf::from(".")
}

fn default_records() -> PathBuf {
    PathBuf::from("records.json")
}

#[derive(Debug, Default, Deserialize)]
pub struct DiagnosticsSection {
    /// Copy log output to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// A settings problem found before processing starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("input folder {} does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("output folder is not set")]
    OutputNotSet,

    #[error("parent of output folder {} does not exist", .0.display())]
    MissingOutputParent(PathBuf),

    #[error("cannot use {} as both input and output folder", .0.display())]
    SameFolders(PathBuf),

    #[error("log file {} is a directory", .0.display())]
    LogFileIsDirectory(PathBuf),

    #[error("folder for log file {} does not exist", .0.display())]
    MissingLogFolder(PathBuf),
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse settings")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(self.meshes.blacklist.as_slice(), self.meshes.whitelist.as_slice())
    }

    pub fn records_path(&self) -> PathBuf {
        self.meshes.input_folder.join(&self.meshes.records)
    }

    /// Every settings problem, in a stable order.
    pub fn config_errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let input = &self.meshes.input_folder;
        let output = &self.meshes.output_folder;

        if !input.is_dir() {
            errors.push(ConfigError::MissingInput(input.clone()));
        }

        if output.as_os_str().is_empty() {
            errors.push(ConfigError::OutputNotSet);
        } else {
            let parent = parent_or_current(output);
            if !parent.is_dir() {
                errors.push(ConfigError::MissingOutputParent(output.clone()));
            }
            if same_folder(input, output) {
                errors.push(ConfigError::SameFolders(input.clone()));
            }
        }

        if let Some(log_file) = &self.diagnostics.log_file {
            if log_file.is_dir() {
                errors.push(ConfigError::LogFileIsDirectory(log_file.clone()));
            } else if !parent_or_current(log_file).is_dir() {
                errors.push(ConfigError::MissingLogFolder(log_file.clone()));
            }
        }
        errors
    }

    /// Fail with every settings problem listed.
    pub fn validate(&self) -> Result<()> {
        let errors = self.config_errors();
        if errors.is_empty() {
            return Ok(());
        }
        let list: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        anyhow::bail!("Invalid settings:\n{}", list.join("\n"))
    }
}

fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn same_folder(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
