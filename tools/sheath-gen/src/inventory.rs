//! Candidate inventory: which meshes to transform, and as what.

use std::path::{Component, Path};

use hashbrown::HashSet;
use sheath_shared::fs::normalize_asset_path;
use tracing::{debug, info, warn};

use crate::classify::ModelClassification;
use crate::filters::PathFilter;
use crate::records::{RecordContext, RecordSet};

/// A mesh to transform, keyed by its normalised path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshCandidate {
    /// Lowercase, `/`-separated path relative to the meshes folder
    pub key: String,
    /// Path as referenced by the record, with `/` separators
    pub path: String,
    pub classification: ModelClassification,
}

/// Deduplicated, filtered set of mesh candidates in insertion order.
#[derive(Debug, Default)]
pub struct Inventory {
    filter: PathFilter,
    candidates: Vec<MeshCandidate>,
    keys: HashSet<String>,
    skipped: usize,
}

impl Inventory {
    pub fn new(filter: PathFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    /// Build the inventory from every playable, classifiable weapon.
    pub fn collate(records: &RecordSet, filter: PathFilter) -> Self {
        let context = RecordContext::new(records);
        let mut inventory = Self::new(filter);

        for weapon in &records.weapons {
            if !weapon.playable {
                continue;
            }
            let Some(model) = weapon.model.as_deref() else {
                continue;
            };
            let classification = ModelClassification::classify(weapon);
            if classification == ModelClassification::Unknown {
                debug!("Weapon {} has indeterminate model type", weapon.id);
                continue;
            }

            if inventory.add(model, classification) {
                info!("Model {}/{} with type {} added", weapon.id, model, classification);
            }
            // First-person models share the weapon's classification
            if let Some((static_id, first_person)) = context.first_person_model(weapon) {
                if inventory.add(first_person, classification) {
                    info!(
                        "Model {}/{} with type {} added",
                        static_id, first_person, classification
                    );
                }
            }
        }
        inventory
    }

    /// Add a mesh path. Returns false when the path leaves the meshes folder
    /// or the filters reject it (both counted as skipped), or when the path is
    /// already present (first classification wins).
    pub fn add(&mut self, path: &str, classification: ModelClassification) -> bool {
        if !is_contained(path) {
            warn!("Model path {} escapes the meshes folder, skipped", path);
            self.skipped += 1;
            return false;
        }
        if !self.filter.accepts(path) {
            info!("Filters skip {}", path);
            self.skipped += 1;
            return false;
        }
        let key = normalize_asset_path(path);
        if !self.keys.insert(key.clone()) {
            return false;
        }
        self.candidates.push(MeshCandidate {
            key,
            path: path.replace('\\', "/"),
            classification,
        });
        true
    }

    pub fn candidates(&self) -> &[MeshCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Paths rejected by the filters or for leaving the meshes folder.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Whether `path` stays under the folder it is joined to: relative, with no
/// `..` and no drive prefix, in either separator form.
fn is_contained(path: &str) -> bool {
    let path = path.replace('\\', "/");
    if path.is_empty() || path.starts_with('/') {
        return false;
    }
    let plain_parts = path
        .split('/')
        .enumerate()
        .all(|(i, part)| part != ".." && !(i == 0 && part.contains(':')));
    plain_parts
        && Path::new(&path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
