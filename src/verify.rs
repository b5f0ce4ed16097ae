// Package integrity verification.
//
// The control tarball carries an `md5sums` manifest listing a checksum for
// every payload file. Verification unpacks both tarballs into a scratch
// directory, extracts them fully, and runs the manifest validator over the
// extracted payload tree.

use std::ffi::OsStr;
use std::path::Path;

use log::debug;

use crate::error::{DeltaError, Result};
use crate::package::{self, CONTROL_TAR, DATA_TAR};
use crate::tool;
use crate::workdir::WorkDir;

/// Check a package's payload against its embedded md5sums manifest.
///
/// Boolean gate, not a diagnostic: any tool failure along the way counts
/// as a failed check.
pub fn verify(package_path: &Path) -> bool {
    match check(package_path) {
        Ok(ok) => ok,
        Err(err) => {
            debug!(
                "integrity check error for {}: {err}",
                package_path.display()
            );
            false
        }
    }
}

fn check(package_path: &Path) -> Result<bool> {
    let scratch = WorkDir::new(false)?;
    let dir = scratch.path();

    package::unpack(package_path, dir)?;
    tool::run_in("tar", [OsStr::new("-xf"), OsStr::new(CONTROL_TAR)], dir)?;
    tool::run_in("tar", [OsStr::new("-xf"), OsStr::new(DATA_TAR)], dir)?;

    let result = tool::run_in(
        "md5sum",
        [
            OsStr::new("--quiet"),
            OsStr::new("--check"),
            OsStr::new("md5sums"),
        ],
        dir,
    );
    match result {
        Ok(_) => Ok(true),
        Err(DeltaError::ExternalTool { .. }) => Ok(false),
        Err(other) => Err(other),
    }
}
