//! On-disk containers: single scene files and multi-entry archives.

pub mod archive;
pub mod scene_file;

pub use archive::{Archive, ArchiveBuilder, ArchiveIndexEntry};
