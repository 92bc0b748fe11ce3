//! sheath-gen library
//!
//! Adds a hidden, mirrored `ScbLeft` scabbard to weapon meshes so the game
//! can show a second sheathed weapon on the off-hand side.

pub mod classify;
pub mod filters;
pub mod inspect;
pub mod inventory;
pub mod mirror;
pub mod pipeline;
pub mod records;
pub mod settings;
pub mod sources;

pub use classify::{ModelClassification, WeaponCategory};
pub use inventory::{Inventory, MeshCandidate};
pub use mirror::{MirrorError, mirror_scabbard};
pub use pipeline::{MeshOutcome, MeshTransform, Pipeline, RunSummary, SkipReason, transform_mesh};
pub use settings::{ConfigError, Settings};
