// Delta engine adapter around the external xdelta3 tool.
//
// Patch generation runs at maximum effort (-9) with LZMA secondary
// compression of the patch body. The resulting patches are already
// near-optimally compressed, which is why the transfer container adds no
// compression layer of its own.

use std::ffi::OsStr;
use std::path::Path;

use log::debug;

use crate::error::{DeltaError, Result};
use crate::tool;

/// Generate a binary patch turning `old` into `new`, written to `patch`.
/// Deterministic for identical inputs and tool version.
pub fn diff(old: &Path, new: &Path, patch: &Path) -> Result<()> {
    tool::run(
        "xdelta3",
        [
            OsStr::new("-e"),
            OsStr::new("-f"),
            OsStr::new("-9"),
            OsStr::new("-S"),
            OsStr::new("lzma"),
            OsStr::new("-s"),
            old.as_os_str(),
            new.as_os_str(),
            patch.as_os_str(),
        ],
    )?;
    debug!("diffed {} -> {}", old.display(), patch.display());
    Ok(())
}

/// Apply `patch` against `old`, writing the reconstructed stream to `out`.
///
/// A non-zero exit from the apply tool means the patch does not belong to
/// this source stream or the patch bytes are damaged; both cases surface
/// as `CorruptPatch` with the tool's diagnostics attached.
pub fn apply(old: &Path, patch: &Path, out: &Path) -> Result<()> {
    tool::run(
        "xdelta3",
        [
            OsStr::new("-d"),
            OsStr::new("-f"),
            OsStr::new("-s"),
            old.as_os_str(),
            patch.as_os_str(),
            out.as_os_str(),
        ],
    )
    .map_err(|e| match e {
        DeltaError::ExternalTool { stderr, .. } => DeltaError::CorruptPatch {
            patch: patch.to_path_buf(),
            stream: old.to_path_buf(),
            stderr,
        },
        other => other,
    })?;
    debug!("applied {} onto {}", patch.display(), old.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
