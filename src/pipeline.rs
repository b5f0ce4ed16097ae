// Build and reconstruction pipelines.
//
// Build direction: unpack both packages, diff the payload and control
// streams, bundle the two patches into the transfer container.
//
// Apply direction: unpack the source, unbundle the transfer next to its
// streams, apply both patches into a separate output directory (the
// source streams stay intact so a failed apply can be retried), recompose
// the package and give it its canonical name.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::delta;
use crate::error::{DeltaError, Result};
use crate::naming;
use crate::package::{self, CompressionProfile, CONTROL_TAR, DATA_TAR};
use crate::transfer;
use crate::workdir::WorkDir;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options shared by the build and apply pipelines.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory receiving the final artifact.
    pub out_dir: PathBuf,
    /// Leave working directories behind for inspection.
    pub keep_work_dirs: bool,
    /// Compression parameters used when recomposing a package.
    pub profile: CompressionProfile,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            keep_work_dirs: false,
            profile: CompressionProfile::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Statistics for a finished build, for the verbose/JSON summaries.
#[derive(Debug, Clone)]
pub struct BuildStats {
    /// Source package size in bytes.
    pub source_size: u64,
    /// Target package size in bytes.
    pub target_size: u64,
    /// Transfer container size in bytes.
    pub transfer_size: u64,
    /// Wall-clock time spent building.
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub transfer: PathBuf,
    pub stats: BuildStats,
}

/// Build a delta transfer container turning `source` into `target`.
///
/// The container lands in `opts.out_dir` under the
/// `{name}_{old}-to-{new}.ar` naming scheme.
pub fn build(source: &Path, target: &Path, opts: &PipelineOptions) -> Result<BuildOutcome> {
    let started = Instant::now();

    let work = WorkDir::new(opts.keep_work_dirs)?;
    let source_dir = work.subdir("source")?;
    let target_dir = work.subdir("target")?;

    package::unpack(source, &source_dir)?;
    package::unpack(target, &target_dir)?;

    let data_patch = work.path().join(transfer::DATA_PATCH);
    let control_patch = work.path().join(transfer::CONTROL_PATCH);
    delta::diff(
        &source_dir.join(DATA_TAR),
        &target_dir.join(DATA_TAR),
        &data_patch,
    )?;
    delta::diff(
        &source_dir.join(CONTROL_TAR),
        &target_dir.join(CONTROL_TAR),
        &control_patch,
    )?;

    std::fs::create_dir_all(&opts.out_dir)?;
    let out = opts.out_dir.join(naming::transfer_name(source, target)?);
    transfer::bundle(&control_patch, &data_patch, &out)?;

    let stats = BuildStats {
        source_size: std::fs::metadata(source)?.len(),
        target_size: std::fs::metadata(target)?.len(),
        transfer_size: std::fs::metadata(&out)?.len(),
        elapsed: started.elapsed(),
    };
    info!(
        "built {} ({} bytes, {:.2}s)",
        out.display(),
        stats.transfer_size,
        stats.elapsed.as_secs_f64()
    );
    Ok(BuildOutcome {
        transfer: out,
        stats,
    })
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApplyOutcome {
    /// Final package path (canonical name when the rename succeeded).
    pub package: PathBuf,
    /// Whether the canonical rename from metadata succeeded. An unrenamed
    /// package is still a successful reconstruction.
    pub renamed: bool,
}

/// Reconstruct the target package from `source` plus a transfer container.
///
/// A patch-apply failure aborts with `CorruptPatch`; with
/// `keep_work_dirs` set, the partial working directories stay on disk for
/// inspection.
pub fn apply(source: &Path, transfer_file: &Path, opts: &PipelineOptions) -> Result<ApplyOutcome> {
    let work = WorkDir::new(opts.keep_work_dirs)?;
    let source_dir = work.subdir("source")?;
    let out_dir = work.subdir("out")?;

    package::unpack(source, &source_dir)?;
    transfer::unbundle(transfer_file, &source_dir)?;

    delta::apply(
        &source_dir.join(DATA_TAR),
        &source_dir.join(transfer::DATA_PATCH),
        &out_dir.join(DATA_TAR),
    )?;
    delta::apply(
        &source_dir.join(CONTROL_TAR),
        &source_dir.join(transfer::CONTROL_PATCH),
        &out_dir.join(CONTROL_TAR),
    )?;

    let recomposed = package::recompose(&out_dir, "reconstructed", opts.profile)?;

    // Cosmetic step: an unreadable metadata reader leaves the provisional
    // name in place rather than failing the reconstruction.
    let (named, renamed) = match naming::canonical_rename(&recomposed) {
        Some(path) => (path, true),
        None => {
            warn!(
                "canonical rename failed for {}, keeping provisional name",
                recomposed.display()
            );
            (recomposed, false)
        }
    };

    std::fs::create_dir_all(&opts.out_dir)?;
    let file_name = named
        .file_name()
        .ok_or_else(|| DeltaError::NamingConvention(named.display().to_string()))?;
    let final_path = opts.out_dir.join(file_name);
    move_file(&named, &final_path)?;

    info!("reconstructed {}", final_path.display());
    Ok(ApplyOutcome {
        package: final_path,
        renamed,
    })
}

// Rename, falling back to copy+remove when the output directory sits on a
// different filesystem than the working directory.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
