// Transfer container format.
//
// An `ar` archive bundling the control and data patches with no
// container-level compression: the patches are already LZMA-compressed by
// the delta engine, and `ar`'s per-member overhead is ~60 bytes against a
// tarball's 1 KiB, so a richer archive format would only add weight.

use std::ffi::OsStr;
use std::path::Path;

use crate::error::{DeltaError, Result};
use crate::tool;

/// Patch member covering the metadata (control) tarball stream.
pub const CONTROL_PATCH: &str = "control.xdelta3";
/// Patch member covering the payload (data) tarball stream.
pub const DATA_PATCH: &str = "data.xdelta3";

/// Bundle the two patches into `out`. Deterministic for identical member
/// bytes (`ar` runs in deterministic mode).
///
/// `ar` stores member names as file basenames, so the inputs must be
/// named `control.xdelta3` and `data.xdelta3`.
pub fn bundle(control_patch: &Path, data_patch: &Path, out: &Path) -> Result<()> {
    // `ar r` would update an existing archive in place; start clean.
    if out.exists() {
        std::fs::remove_file(out)?;
    }
    tool::run(
        "ar",
        [
            OsStr::new("Drcs"),
            out.as_os_str(),
            control_patch.as_os_str(),
            data_patch.as_os_str(),
        ],
    )?;
    Ok(())
}

/// Extract both patch members into `dest`. Fails with `MalformedTransfer`
/// if either expected member is absent from the container.
pub fn unbundle(container: &Path, dest: &Path) -> Result<()> {
    // The extraction runs with the child's cwd set to `dest`, so the
    // container path must stay valid from there.
    let container = std::fs::canonicalize(container)?;

    let listing = tool::run("ar", [OsStr::new("t"), container.as_os_str()])?;
    let listing = String::from_utf8_lossy(&listing);
    for member in [CONTROL_PATCH, DATA_PATCH] {
        if !listing.lines().any(|l| l.trim() == member) {
            return Err(DeltaError::MalformedTransfer {
                path: container.clone(),
                member,
            });
        }
    }

    tool::run_in("ar", [OsStr::new("x"), container.as_os_str()], dest)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
