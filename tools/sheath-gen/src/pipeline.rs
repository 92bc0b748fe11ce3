//! Orchestration: inventory -> asset resolution -> mirror -> output.
//!
//! Loose files are processed first and win over archive copies. Meshes not
//! found loose are searched for in the configured archives, later-loaded
//! archives first; the first archive to produce a mesh wins.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use hashbrown::HashMap;
use rayon::prelude::*;
use sheath_scene::SceneGraph;
use tracing::{error, info, warn};

use crate::classify::{ModelClassification, WeaponCategory};
use crate::inventory::{Inventory, MeshCandidate};
use crate::mirror::{MirrorError, mirror_scabbard};
use crate::records::RecordSet;
use crate::settings::Settings;
use crate::sources::{LooseFolder, MESHES_DIR, MeshOrigin, OutputSink, open_archives};

/// Why a mesh was left alone.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Final classification is not a mirrored category
    Category(WeaponCategory),
    /// The mirror engine declined or failed the mesh
    Mirror(MirrorError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Category(category) => write!(f, "incorrect weapon category {}", category),
            SkipReason::Mirror(e) => write!(f, "{}", e),
        }
    }
}

/// Result of transforming one mesh in memory.
#[derive(Debug)]
pub enum MeshTransform {
    /// Mirrored graph, ready to write
    Mirrored(Box<SceneGraph>),
    Skipped(SkipReason),
}

/// Per-mesh outcome of a run.
#[derive(Debug)]
pub enum MeshOutcome {
    Generated(PathBuf),
    Skipped(SkipReason),
    Failed(String),
}

/// Decode a scene file, settle its classification and mirror it.
///
/// Decode faults are errors; classification and mirror refusals are skips.
pub fn transform_mesh(
    bytes: &[u8],
    mesh_path: &str,
    classification: ModelClassification,
    accept_two_handed: bool,
) -> Result<MeshTransform> {
    let mut graph = SceneGraph::from_bytes(bytes)
        .with_context(|| format!("Failed to load scene {}", mesh_path))?;

    let classification = classification.refine(mesh_path, &graph);
    let category = classification.category();
    if !category.accepts(accept_two_handed) {
        return Ok(MeshTransform::Skipped(SkipReason::Category(category)));
    }

    Ok(match mirror_scabbard(&mut graph, mesh_path) {
        Ok(_) => MeshTransform::Mirrored(Box::new(graph)),
        Err(e) => MeshTransform::Skipped(SkipReason::Mirror(e)),
    })
}

/// Counters shared by all workers.
#[derive(Debug, Default)]
pub struct RunStats {
    candidates: AtomicUsize,
    generated: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl RunStats {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// End-of-run totals.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub loose: usize,
    pub archived: usize,
    /// Candidate paths found neither loose nor in an archive
    pub missing: Vec<String>,
    /// Candidate key -> archive that produced it
    pub resolved: HashMap<String, String>,
    pub candidates: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "{} total meshes: found {} loose, {} in archive, {} missing files",
            self.total,
            self.loose,
            self.archived,
            self.missing.len()
        );
        info!(
            "Generated {}, Candidates {}, Skipped {}, Failed {}",
            self.generated, self.candidates, self.skipped, self.failed
        );
    }
}

/// One generation run over a settings file's inputs.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    loose: LooseFolder,
    sink: OutputSink,
    stats: RunStats,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            loose: LooseFolder::new(&settings.meshes.input_folder),
            sink: OutputSink::new(&settings.meshes.output_folder),
            stats: RunStats::default(),
        }
    }

    /// Load the weapon records and process every candidate.
    pub fn run(self) -> Result<RunSummary> {
        let records = RecordSet::load(&self.settings.records_path())?;
        let inventory = Inventory::collate(&records, self.settings.path_filter());
        info!(
            "{} weapon records yield {} candidate meshes",
            records.weapons.len(),
            inventory.len()
        );
        Ok(self.process_inventory(&inventory))
    }

    /// Resolve and transform every mesh in `inventory`.
    pub fn process_inventory(self, inventory: &Inventory) -> RunSummary {
        self.stats
            .skipped
            .fetch_add(inventory.skipped(), Ordering::Relaxed);

        let mut summary = RunSummary {
            total: inventory.len(),
            ..Default::default()
        };
        if inventory.is_empty() {
            info!("No meshes require transformation");
            return self.finish(summary);
        }

        // Loose files win over archive contents
        let mut loose_files = Vec::new();
        let mut pending = Vec::new();
        for candidate in inventory.candidates() {
            match self.loose.find(&candidate.path) {
                Some(path) => loose_files.push((candidate, path)),
                None => pending.push(candidate),
            }
        }
        summary.loose = loose_files.len();

        loose_files.par_iter().for_each(|(candidate, path)| {
            match self.loose.read(path) {
                Ok(bytes) => {
                    self.process(&bytes, candidate, &MeshOrigin::Loose(path.clone()));
                }
                Err(e) => {
                    RunStats::bump(&self.stats.failed);
                    error!("Exception processing {}: {:#}", path.display(), e);
                }
            }
        });

        if !pending.is_empty() {
            summary.resolved = self.search_archives(&pending);
        }
        summary.archived = summary.resolved.len();
        summary.missing = pending
            .iter()
            .filter(|c| !summary.resolved.contains_key(&c.key))
            .map(|c| c.path.clone())
            .collect();
        for path in &summary.missing {
            warn!("Referenced mesh {} not found loose or in archive", path);
        }
        self.finish(summary)
    }

    /// Look for `pending` meshes in the archives, later-loaded first.
    fn search_archives(&self, pending: &[&MeshCandidate]) -> HashMap<String, String> {
        let resolved: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());

        let archives = open_archives(
            &self.settings.meshes.input_folder,
            &self.settings.meshes.archives,
        );
        for archive in archives.iter().rev() {
            let matches: Vec<_> = pending
                .iter()
                .filter_map(|candidate| {
                    archive
                        .find(&format!("{}/{}", MESHES_DIR, candidate.key))
                        .map(|entry| (entry, *candidate))
                })
                .collect();

            matches.par_iter().for_each(|(entry, candidate)| {
                let bytes = match archive.read(entry) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(
                            "Exception on mesh {} from archive {}: {:#}",
                            entry.path,
                            archive.name(),
                            e
                        );
                        return;
                    }
                };

                {
                    let Ok(mut done) = resolved.lock() else {
                        return;
                    };
                    if let Some(winner) = done.get(&candidate.key) {
                        info!(
                            "Mesh {} from archive {} already processed from archive {}",
                            entry.path,
                            archive.name(),
                            winner
                        );
                        return;
                    }
                    done.insert(candidate.key.clone(), archive.name().to_string());
                }

                let origin = MeshOrigin::Archive(archive.name().to_string());
                self.process(&bytes, candidate, &origin);
            });
        }

        resolved.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Transform one mesh and write the result, updating counters.
    fn process(&self, bytes: &[u8], candidate: &MeshCandidate, origin: &MeshOrigin) -> MeshOutcome {
        info!("Transform mesh {} from {}", candidate.path, origin);
        let outcome = match transform_mesh(
            bytes,
            &candidate.path,
            candidate.classification,
            self.settings.meshes.accept_two_handed,
        ) {
            Ok(MeshTransform::Mirrored(graph)) => {
                RunStats::bump(&self.stats.candidates);
                match self.sink.write(&candidate.path, &graph.to_bytes()) {
                    Ok(path) => MeshOutcome::Generated(path),
                    Err(e) => MeshOutcome::Failed(format!("{:#}", e)),
                }
            }
            Ok(MeshTransform::Skipped(reason)) => {
                if matches!(reason, SkipReason::Mirror(_)) {
                    RunStats::bump(&self.stats.candidates);
                }
                MeshOutcome::Skipped(reason)
            }
            Err(e) => MeshOutcome::Failed(format!("{:#}", e)),
        };

        match &outcome {
            MeshOutcome::Generated(path) => {
                RunStats::bump(&self.stats.generated);
                info!("Generated {}", path.display());
            }
            MeshOutcome::Skipped(reason) => {
                RunStats::bump(&self.stats.skipped);
                warn!("Skip {}: {}", candidate.path, reason);
            }
            MeshOutcome::Failed(cause) => {
                RunStats::bump(&self.stats.failed);
                error!("Exception processing {}: {}", candidate.path, cause);
            }
        }
        outcome
    }

    fn finish(self, mut summary: RunSummary) -> RunSummary {
        summary.candidates = self.stats.candidates.into_inner();
        summary.generated = self.stats.generated.into_inner();
        summary.skipped = self.stats.skipped.into_inner();
        summary.failed = self.stats.failed.into_inner();
        summary.log();
        summary
    }
}
