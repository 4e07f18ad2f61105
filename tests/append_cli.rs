//! End-to-end tests for the `append-extension-metadata` binary.
//!
//! These run the compiled binary against a scratch directory and check the
//! artifact on disk, so they cover flag parsing and exit codes as well as the
//! footer layout.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_append-extension-metadata");
const FOOTER_LEN: usize = 534;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run append-extension-metadata")
}

fn slot(artifact: &[u8], index: usize) -> String {
    // Slots start after tag (1), outer length (2), name length (1), name (16)
    // and payload length (2).
    let footer = &artifact[artifact.len() - FOOTER_LEN..];
    let start = 22 + index * 32;
    let raw = &footer[start..start + 32];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8(raw[..end].to_vec()).unwrap()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn packages_library_with_literal_values() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("libgeo.so"), b"\x7fELF").unwrap();

    let output = run(
        dir.path(),
        &[
            "-l", "libgeo.so", "-n", "geo", "-p", "linux_amd64",
            "--duckdb-version", "v1.2.0", "--extension-version", "0.1.0",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let artifact = fs::read(dir.path().join("geo.duckdb_extension")).unwrap();
    assert_eq!(artifact.len(), 4 + FOOTER_LEN);
    assert_eq!(&artifact[..4], b"\x7fELF");
    assert_eq!(slot(&artifact, 3), "C_STRUCT");
    assert_eq!(slot(&artifact, 4), "0.1.0");
    assert_eq!(slot(&artifact, 5), "v1.2.0");
    assert_eq!(slot(&artifact, 6), "linux_amd64");
    assert_eq!(slot(&artifact, 7), "4");
    assert!(artifact[artifact.len() - 256..].iter().all(|&b| b == 0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Creating extension binary:"));
    assert!(stdout.contains("geo.duckdb_extension"));
}

#[test]
fn reads_values_from_configure_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("libgeo.so"), vec![0xAB; 1000]).unwrap();
    fs::create_dir(dir.path().join("configure")).unwrap();
    fs::write(dir.path().join("configure/platform.txt"), "osx_arm64").unwrap();
    fs::write(dir.path().join("configure/extension_version.txt"), "3f2a1bc").unwrap();
    fs::create_dir(dir.path().join("out")).unwrap();

    let output = run(
        dir.path(),
        &[
            "--library-file", "libgeo.so",
            "--extension-name", "geo",
            "--pf", "configure/platform.txt",
            "--dv", "v1.1.3",
            "--evf", "configure/extension_version.txt",
            "--abi-type", "C_STRUCT_UNSTABLE",
            "--out-file", "out/geo.duckdb_extension",
            "--silent",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let artifact = fs::read(dir.path().join("out/geo.duckdb_extension")).unwrap();
    assert_eq!(artifact.len(), 1000 + FOOTER_LEN);
    assert_eq!(slot(&artifact, 3), "C_STRUCT_UNSTABLE");
    assert_eq!(slot(&artifact, 4), "3f2a1bc");
    assert_eq!(slot(&artifact, 6), "osx_arm64");
    assert_eq!(entries(&dir.path().join("out")), ["geo.duckdb_extension"]);
}

#[test]
fn accepts_script_short_flags() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("libgeo.so"), b"\x7fELF").unwrap();
    fs::write(dir.path().join("platform.txt"), "linux_arm64\n").unwrap();

    let output = run(
        dir.path(),
        &[
            "-l", "libgeo.so", "-n", "geo", "-pf", "platform.txt",
            "-dv", "v1.2.0", "-ev", "0.1.0",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let artifact = fs::read(dir.path().join("geo.duckdb_extension")).unwrap();
    assert_eq!(slot(&artifact, 4), "0.1.0");
    assert_eq!(slot(&artifact, 5), "v1.2.0");
    assert_eq!(slot(&artifact, 6), "linux_arm64");
}

#[test]
fn configure_helper_accepts_script_short_flags() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_configure-helper"))
        .current_dir(dir.path())
        .args(["-o", "facts", "-dv", "v1.3.2"])
        .output()
        .expect("failed to run configure-helper");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let major = fs::read_to_string(dir.path().join("facts/duckdb_version_major.txt")).unwrap();
    assert_eq!(major, "1");
}

#[test]
fn missing_platform_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("libgeo.so"), b"\x7fELF").unwrap();

    let output = run(
        dir.path(),
        &["-l", "libgeo.so", "-n", "geo", "--dv", "v1.2.0", "--ev", "0.1.0"],
    );

    assert!(!output.status.success());
    assert_eq!(entries(dir.path()), ["libgeo.so"]);
}

#[test]
fn oversized_field_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("libgeo.so"), b"\x7fELF").unwrap();
    let long_version = "x".repeat(33);

    let output = run(
        dir.path(),
        &[
            "-l", "libgeo.so", "-n", "geo", "-p", "linux_amd64",
            "--dv", "v1.2.0", "--ev", &long_version,
        ],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("extension_version"));
    assert_eq!(entries(dir.path()), ["libgeo.so"]);
}

#[test]
fn missing_library_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(
        dir.path(),
        &[
            "-l", "libgeo.so", "-n", "geo", "-p", "linux_amd64",
            "--dv", "v1.2.0", "--ev", "0.1.0",
        ],
    );

    assert!(!output.status.success());
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn replaces_existing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("libgeo.so"), b"\x7fELF").unwrap();
    fs::write(dir.path().join("geo.duckdb_extension"), b"stale").unwrap();

    let output = run(
        dir.path(),
        &[
            "-l", "libgeo.so", "-n", "geo", "-p", "linux_amd64",
            "--dv", "v1.2.0", "--ev", "0.2.0",
        ],
    );
    assert!(output.status.success());

    let artifact = fs::read(dir.path().join("geo.duckdb_extension")).unwrap();
    assert_eq!(artifact.len(), 4 + FOOTER_LEN);
    assert_eq!(slot(&artifact, 4), "0.2.0");
    assert_eq!(entries(dir.path()), ["geo.duckdb_extension", "libgeo.so"]);
}
