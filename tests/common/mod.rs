// Shared fixture helpers for the integration tests.
//
// Fixture packages are synthesized in place: a payload tree plus a control
// directory (control file + md5sums manifest), tarred deterministically and
// recomposed into a .deb through the library's own codec. Tests that need
// external tools check for them first and skip when absent.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use ddelta::package::{self, CompressionProfile};

/// Tools the full pipeline round-trip needs.
pub const PIPELINE_TOOLS: &[&str] = &["ar", "tar", "xz", "xdelta3", "md5sum"];

pub fn have(tool: &str) -> bool {
    Command::new(tool).arg("--version").output().is_ok()
}

/// True when every listed tool can be spawned; prints a skip note otherwise.
pub fn have_all(tools: &[&str]) -> bool {
    for tool in tools {
        if !have(tool) {
            eprintln!("{tool} not found, skipping");
            return false;
        }
    }
    true
}

/// Deterministic pseudo-random bytes; incompressible, so payload sizes in
/// the fixtures stay honest.
pub fn noise(len: usize, mut seed: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        out.push((seed >> 33) as u8);
    }
    out
}

/// Build a fixture package under `dir` and return its path.
///
/// With `tamper_after_manifest` set, the first payload file is mutated
/// after the md5sums manifest was computed, so the finished package fails
/// its own integrity check.
pub fn make_package(
    dir: &Path,
    name: &str,
    version: &str,
    payload: &[(&str, Vec<u8>)],
    tamper_after_manifest: bool,
) -> PathBuf {
    let root = dir.join(format!("{name}-{version}-fixture"));
    let data_root = root.join("data");
    let control_root = root.join("control");
    let work = root.join("work");
    fs::create_dir_all(&data_root).unwrap();
    fs::create_dir_all(&control_root).unwrap();
    fs::create_dir_all(&work).unwrap();

    for (rel, content) in payload {
        let path = data_root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }

    fs::write(
        control_root.join("control"),
        format!(
            "Package: {name}\nVersion: {version}\nArchitecture: all\n\
             Maintainer: Fixture <fixture@example.invalid>\n\
             Description: ddelta test fixture\n"
        ),
    )
    .unwrap();

    let mut manifest = String::new();
    for (rel, _) in payload {
        let out = Command::new("md5sum")
            .arg(rel)
            .current_dir(&data_root)
            .output()
            .unwrap();
        assert!(out.status.success(), "md5sum failed for {rel}");
        manifest.push_str(&String::from_utf8_lossy(&out.stdout));
    }
    fs::write(control_root.join("md5sums"), manifest).unwrap();

    if tamper_after_manifest {
        let (rel, content) = &payload[0];
        let mut mutated = content.clone();
        mutated.extend_from_slice(b"tampered");
        fs::write(data_root.join(rel), mutated).unwrap();
    }

    tar_dir(&control_root, &work.join("control.tar"));
    tar_dir(&data_root, &work.join("data.tar"));

    package::recompose(
        &work,
        &format!("{name}_{version}_all"),
        CompressionProfile::default(),
    )
    .unwrap()
}

/// Deterministic tar so fixture bytes are reproducible across runs.
fn tar_dir(src: &Path, out: &Path) {
    let status = Command::new("tar")
        .arg("--format=ustar")
        .arg("--sort=name")
        .arg("--owner=0")
        .arg("--group=0")
        .arg("--numeric-owner")
        .arg("--mtime=@0")
        .arg("-cf")
        .arg(out)
        .arg("-C")
        .arg(src)
        .arg(".")
        .status()
        .unwrap();
    assert!(status.success(), "tar failed for {}", src.display());
}
