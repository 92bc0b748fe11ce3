//! Tests that drive the sheath-gen binary


use std::path::Path;
use std::process::{Command, Output};

use scene_fixtures::*;
use tempfile::tempdir;

fn sheath_gen(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sheath-gen"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run sheath-gen")
}

fn write_settings(dir: &Path, body: &str) {
    std::fs::write(dir.join("settings.toml"), body).expect("Failed to write settings");
}

#[test]
fn test_check_reports_invalid_settings() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_settings(
        dir.path(),
        r#"
        [meshes]
        input_folder = "missing"
        "#,
    );

    let output = sheath_gen(&["check"], dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input folder missing does not exist"), "{}", stderr);
    assert!(stderr.contains("output folder is not set"), "{}", stderr);
}

#[test]
fn test_run_generates_meshes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mesh = "weapons/iron/ironsword.sgf";
    write_records(&dir.path().join("data"), &[("IronSword", "WeapTypeSword", mesh)]);
    write_scene(&dir.path().join("data/meshes").join(mesh), &scabbard_scene());
    write_settings(
        dir.path(),
        r#"
        [meshes]
        input_folder = "data"
        output_folder = "out"

        [diagnostics]
        log_file = "sheath.log"
        "#,
    );

    let output = sheath_gen(&["check"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let output = sheath_gen(&["run"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let graph = load_scene(&dir.path().join("out/meshes").join(mesh));
    assert!(root_child(&graph, "ScbLeft").is_some());

    let log = std::fs::read_to_string(dir.path().join("sheath.log")).expect("log file written");
    assert!(log.contains("Generated 1, Candidates 1, Skipped 0, Failed 0"), "{}", log);
}

#[test]
fn test_mirror_single_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("sword.sgf");
    let output = dir.path().join("mirrored/sword.sgf");
    write_scene(&input, &scabbard_scene());

    let result = sheath_gen(
        &[
            "mirror",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--classification",
            "sword",
        ],
        dir.path(),
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(root_child(&load_scene(&output), "ScbLeft").is_some());

    // Unknown classification with no Prn tag is not a mirrored category
    let result = sheath_gen(
        &["mirror", input.to_str().unwrap(), "-o", output.to_str().unwrap()],
        dir.path(),
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("incorrect weapon category"), "{}", stderr);
}

#[test]
fn test_inspect_prints_tree() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("sword.sgf");
    write_scene(&input, &scabbard_scene());

    let output = sheath_gen(&["inspect", input.to_str().unwrap()], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Node \"Scb\""), "{}", stdout);
    assert!(stdout.contains("Shape \"Sheath\" TriShape 3 vertices 1 primitives"), "{}", stdout);
}
