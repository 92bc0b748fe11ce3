//! Weapon record input (`records.json`)
//!
//! Records are the winning overrides of the load order, exported by the
//! host pipeline. First-person models live on separate static records and
//! are resolved through a [`RecordContext`].

use std::path::Path;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::Deserialize;

/// Maximum records file size read into memory.
const MAX_RECORDS_BYTES: u64 = 256 * 1024 * 1024;

/// Weapon animation type as authored on the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    HandToHand,
    OneHandSword,
    OneHandDagger,
    OneHandAxe,
    OneHandMace,
    TwoHandSword,
    TwoHandAxe,
    Bow,
    Staff,
    Crossbow,
    #[default]
    #[serde(other)]
    Other,
}

/// One weapon record.
#[derive(Debug, Clone, Deserialize)]
pub struct WeaponRecord {
    pub id: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub animation_type: AnimationType,
    #[serde(default = "default_playable")]
    pub playable: bool,
    /// Primary model path, relative to the meshes folder
    #[serde(default)]
    pub model: Option<String>,
    /// Id of the static record holding the first-person model
    #[serde(default)]
    pub first_person: Option<String>,
}

fn default_playable() -> bool {
    true
}

/// Static record referenced as a first-person model.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticRecord {
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Contents of `records.json`.
#[derive(Debug, Default, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub weapons: Vec<WeaponRecord>,
    #[serde(default)]
    pub statics: Vec<StaticRecord>,
}

impl RecordSet {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse weapon records")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = sheath_shared::fs::read_file_with_limit(path, MAX_RECORDS_BYTES)?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse weapon records: {}", path.display()))
    }
}

/// Link resolution for record references.
pub struct RecordContext<'a> {
    statics: HashMap<&'a str, &'a StaticRecord>,
}

impl<'a> RecordContext<'a> {
    pub fn new(records: &'a RecordSet) -> Self {
        let statics = records
            .statics
            .iter()
            .map(|s| (s.id.as_str(), s))
            .collect();
        Self { statics }
    }

    /// The static record and model path of a weapon's first-person model,
    /// if the link resolves and the static has a model.
    pub fn first_person_model(&self, weapon: &WeaponRecord) -> Option<(&'a str, &'a str)> {
        let id = weapon.first_person.as_deref()?;
        let found: &'a StaticRecord = self.statics.get(id).copied()?;
        let model = found.model.as_deref()?;
        Some((found.id.as_str(), model))
    }
}
