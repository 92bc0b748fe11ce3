//! Integration tests for the generation pipeline
//!
//! Builds a data folder (records, loose meshes, archives) in a temp dir,
//! runs the pipeline over it and inspects the generated meshes.


use std::path::{Path, PathBuf};

use scene_fixtures::*;
use sheath_gen::{
    MeshTransform, MirrorError, ModelClassification, Pipeline, RunSummary, Settings, SkipReason,
    transform_mesh,
};
use sheath_scene::ArchiveBuilder;
use tempfile::tempdir;

const SWORD: &str = "weapons/Iron/IronSword.sgf";

fn settings_for(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.meshes.input_folder = root.join("data");
    settings.meshes.output_folder = root.join("out");
    settings
}

fn loose_path(settings: &Settings, mesh: &str) -> PathBuf {
    settings.meshes.input_folder.join("meshes").join(mesh)
}

fn output_path(settings: &Settings, mesh: &str) -> PathBuf {
    settings.meshes.output_folder.join("meshes").join(mesh)
}

fn run(settings: &Settings) -> RunSummary {
    settings.validate().expect("Settings should be valid");
    Pipeline::new(settings).run().expect("Pipeline run failed")
}

/// Loose sword with an `Scb` gets a hidden, mirrored `ScbLeft`
#[test]
fn test_loose_scabbard_mirrored() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    write_records(&settings.meshes.input_folder, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_scene(&loose_path(&settings, SWORD), &scabbard_scene());

    let summary = run(&settings);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.loose, 1);
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    let graph = load_scene(&output_path(&settings, SWORD));
    let scb = root_child(&graph, "Scb").expect("Scb should be kept");
    let left = root_child(&graph, "ScbLeft").expect("ScbLeft should be added");
    assert!(!graph.node(scb).unwrap().av.is_hidden());

    let left = graph.node(left).unwrap();
    assert!(left.av.is_hidden());
    assert_eq!(left.children.len(), 1);
    let sheath = left.children[0];
    assert_eq!(graph.block_name(sheath), Some("SheathLeft"));

    let mesh = mesh_of(&graph, sheath);
    assert_eq!(
        mesh.positions,
        vec![[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]]
    );
    assert_eq!(mesh.normals, vec![[0.0, 0.0, -1.0]; 3]);
    assert_eq!(mesh.triangles, vec![[2, 1, 0]]);
}

/// Running over generated output refuses to mirror twice
#[test]
fn test_generated_mesh_not_mirrored_again() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    write_records(&settings.meshes.input_folder, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_scene(&loose_path(&settings, SWORD), &scabbard_scene());
    run(&settings);

    let bytes = std::fs::read(output_path(&settings, SWORD)).expect("Failed to read output");
    match transform_mesh(&bytes, SWORD, ModelClassification::Sword, false).unwrap() {
        MeshTransform::Skipped(reason) => {
            assert_eq!(reason, SkipReason::Mirror(MirrorError::AlreadyMirrored))
        }
        MeshTransform::Mirrored(_) => panic!("mesh was mirrored twice"),
    }
}

/// Meshes without a scabbard are counted and left unwritten
#[test]
fn test_mesh_without_scabbard_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    write_records(&settings.meshes.input_folder, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_scene(&loose_path(&settings, SWORD), &bare_scene());

    let summary = run(&settings);
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.generated, 0);
    assert!(!output_path(&settings, SWORD).exists());
}

/// A scabbard holding only blood decoration mirrors to nothing
#[test]
fn test_blood_only_scabbard_skipped() {
    let bytes = blood_only_scene().to_bytes();
    match transform_mesh(&bytes, SWORD, ModelClassification::Sword, false).unwrap() {
        MeshTransform::Skipped(reason) => {
            assert_eq!(reason, SkipReason::Mirror(MirrorError::EmptySubtree))
        }
        MeshTransform::Mirrored(_) => panic!("blood decal should not be mirrored"),
    }
}

/// Two-handed melee needs the opt-in; bows are never mirrored
#[test]
fn test_category_gate() {
    const AXE: &str = "weapons/steel/battleaxe.sgf";
    const BOW: &str = "weapons/steel/bow.sgf";

    let dir = tempdir().expect("Failed to create temp dir");
    let mut settings = settings_for(dir.path());
    write_records(
        &settings.meshes.input_folder,
        &[
            ("SteelBattleaxe", "WeapTypeBattleaxe", AXE),
            ("SteelBow", "WeapTypeBow", BOW),
        ],
    );
    write_scene(&loose_path(&settings, AXE), &scabbard_scene());
    write_scene(&loose_path(&settings, BOW), &scabbard_scene());

    let summary = run(&settings);
    assert_eq!(summary.candidates, 0);
    assert_eq!(summary.skipped, 2);
    assert!(!output_path(&settings, AXE).exists());

    settings.meshes.accept_two_handed = true;
    let summary = run(&settings);
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.skipped, 1);
    assert!(output_path(&settings, AXE).exists());
    assert!(!output_path(&settings, BOW).exists());
}

/// The later archive in load order wins; the earlier copy is ignored
#[test]
fn test_later_archive_wins() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut settings = settings_for(dir.path());
    settings.meshes.archives = vec!["Base.sga".into(), "Patch.sga".into()];
    let input = settings.meshes.input_folder.clone();
    write_records(&input, &[("IronSword", "WeapTypeSword", SWORD)]);

    let entry = "meshes\\Weapons\\Iron\\IronSword.sgf";
    ArchiveBuilder::new()
        .add(entry, scabbard_scene().to_bytes())
        .write(&input.join("Base.sga"))
        .expect("Failed to write archive");
    // Patched copy drops the blade so the winner is visible in the output
    let mut patched = scabbard_scene();
    let (root, _) = patched.root_node().unwrap();
    let scb = root_child(&patched, "Scb").unwrap();
    patched.node_mut(root).unwrap().children = vec![scb];
    ArchiveBuilder::new()
        .add(entry, patched.to_bytes())
        .write(&input.join("Patch.sga"))
        .expect("Failed to write archive");

    let summary = run(&settings);
    assert_eq!(summary.loose, 0);
    assert_eq!(summary.archived, 1);
    assert!(summary.missing.is_empty());
    assert_eq!(
        summary.resolved.get("weapons/iron/ironsword.sgf").map(String::as_str),
        Some("Patch.sga")
    );
    assert_eq!(summary.generated, 1);

    let graph = load_scene(&output_path(&settings, SWORD));
    assert!(root_child(&graph, "Blade").is_none());
    assert!(root_child(&graph, "ScbLeft").is_some());
}

/// Loose files shadow archive copies
#[test]
fn test_loose_beats_archive() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut settings = settings_for(dir.path());
    settings.meshes.archives = vec!["Base.sga".into()];
    let input = settings.meshes.input_folder.clone();
    write_records(&input, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_scene(&loose_path(&settings, SWORD), &scabbard_scene());
    ArchiveBuilder::new()
        .add(format!("meshes/{}", SWORD), bare_scene().to_bytes())
        .write(&input.join("Base.sga"))
        .expect("Failed to write archive");

    let summary = run(&settings);
    assert_eq!(summary.loose, 1);
    assert_eq!(summary.archived, 0);
    assert!(summary.resolved.is_empty());
    assert_eq!(summary.generated, 1);
}

/// Unresolvable meshes are reported, not failed
#[test]
fn test_missing_mesh_reported() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    write_records(
        &settings.meshes.input_folder,
        &[("GhostSword", "WeapTypeSword", "weapons/ghost/sword.sgf")],
    );

    let summary = run(&settings);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.missing, vec!["weapons/ghost/sword.sgf".to_string()]);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.generated, 0);
}

/// Corrupt loose files fail alone; filtered meshes count as skipped
#[test]
fn test_failures_and_filters_counted() {
    const BROKEN: &str = "weapons/Iron/IronDagger.sgf";
    const DAEDRIC: &str = "weapons/daedric/daedricsword.sgf";

    let dir = tempdir().expect("Failed to create temp dir");
    let mut settings = settings_for(dir.path());
    settings.meshes.blacklist = vec!["daedric".into()];
    write_records(
        &settings.meshes.input_folder,
        &[
            ("IronSword", "WeapTypeSword", SWORD),
            ("IronDagger", "WeapTypeDagger", BROKEN),
            ("DaedricSword", "WeapTypeSword", DAEDRIC),
        ],
    );
    write_scene(&loose_path(&settings, SWORD), &scabbard_scene());
    write_scene(&loose_path(&settings, DAEDRIC), &scabbard_scene());
    std::fs::write(loose_path(&settings, BROKEN), b"not a scene").unwrap();

    let summary = run(&settings);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(!output_path(&settings, DAEDRIC).exists());
}

/// An index offset that overflows the file position fails that entry only
#[test]
fn test_overflowing_archive_entry_reported_missing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut settings = settings_for(dir.path());
    settings.meshes.archives = vec!["Bad.sga".into()];
    let input = settings.meshes.input_folder.clone();
    write_records(&input, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_raw_archive(
        &input.join("Bad.sga"),
        &[("meshes/weapons/iron/ironsword.sgf", u64::MAX - 2, 3)],
        b"data",
    );

    let summary = run(&settings);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.archived, 0);
    assert_eq!(summary.missing, vec![SWORD.to_string()]);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.generated, 0);
}

/// A bad entry leaves its mesh missing while the rest still resolve
#[test]
fn test_bad_archive_entry_isolated() {
    const DAGGER: &str = "weapons/Iron/IronDagger.sgf";
    const MACE: &str = "weapons/Iron/IronMace.sgf";

    let dir = tempdir().expect("Failed to create temp dir");
    let mut settings = settings_for(dir.path());
    settings.meshes.archives = vec!["Base.sga".into(), "Broken.sga".into()];
    let input = settings.meshes.input_folder.clone();
    write_records(
        &input,
        &[
            ("IronSword", "WeapTypeSword", SWORD),
            ("IronDagger", "WeapTypeDagger", DAGGER),
            ("IronMace", "WeapTypeMace", MACE),
        ],
    );

    let scene = scabbard_scene().to_bytes();
    let size = scene.len() as u64;
    // The sword entry runs past the end of the data blob
    write_raw_archive(
        &input.join("Broken.sga"),
        &[
            ("meshes/weapons/iron/ironsword.sgf", 1, size),
            ("meshes/weapons/iron/irondagger.sgf", 0, size),
        ],
        &scene,
    );
    ArchiveBuilder::new()
        .add(format!("meshes/{}", MACE), scabbard_scene().to_bytes())
        .write(&input.join("Base.sga"))
        .expect("Failed to write archive");

    let summary = run(&settings);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.missing, vec![SWORD.to_string()]);
    assert_eq!(
        summary.resolved.get("weapons/iron/irondagger.sgf").map(String::as_str),
        Some("Broken.sga")
    );
    assert_eq!(
        summary.resolved.get("weapons/iron/ironmace.sgf").map(String::as_str),
        Some("Base.sga")
    );
    assert_eq!(summary.generated, 2);
    assert_eq!(summary.failed, 0);
    assert!(root_child(&load_scene(&output_path(&settings, DAGGER)), "ScbLeft").is_some());
    assert!(root_child(&load_scene(&output_path(&settings, MACE)), "ScbLeft").is_some());
    assert!(!output_path(&settings, SWORD).exists());
}

/// Tangent space failure is logged; the mesh is still mirrored
#[test]
fn test_mesh_without_uvs_still_generated() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    write_records(&settings.meshes.input_folder, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_scene(&loose_path(&settings, SWORD), &no_uv_scene());

    let summary = run(&settings);
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.failed, 0);

    let graph = load_scene(&output_path(&settings, SWORD));
    let left = root_child(&graph, "ScbLeft").expect("ScbLeft should be added");
    let sheath = graph.node(left).unwrap().children[0];
    let mesh = mesh_of(&graph, sheath);
    assert_eq!(mesh.triangles, vec![[2, 1, 0]]);
    assert!(mesh.tangents.is_empty());
}

/// Model paths that leave the meshes folder are skipped, never read or written
#[test]
fn test_escaping_model_paths_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    let outside = dir.path().join("outside/sword.sgf");
    write_scene(&outside, &scabbard_scene());
    write_scene(&settings.meshes.input_folder.join("loot/dagger.sgf"), &scabbard_scene());
    let before = std::fs::read(&outside).expect("Failed to read scene");

    let absolute = outside.to_string_lossy().into_owned();
    write_records(
        &settings.meshes.input_folder,
        &[
            ("OutsideSword", "WeapTypeSword", absolute.as_str()),
            ("ParentDagger", "WeapTypeDagger", "..\\loot\\dagger.sgf"),
        ],
    );

    let summary = run(&settings);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.generated, 0);
    assert_eq!(std::fs::read(&outside).expect("Failed to read scene"), before);
    assert!(!settings.meshes.output_folder.exists());
}

/// Record casing differs from the loose file on disk
#[test]
fn test_loose_lookup_ignores_case() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = settings_for(dir.path());
    write_records(&settings.meshes.input_folder, &[("IronSword", "WeapTypeSword", SWORD)]);
    write_scene(
        &loose_path(&settings, "weapons/iron/ironsword.sgf"),
        &scabbard_scene(),
    );

    let summary = run(&settings);
    assert_eq!(summary.loose, 1);
    assert!(summary.missing.is_empty());
    assert_eq!(summary.generated, 1);
}
