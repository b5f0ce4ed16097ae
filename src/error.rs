// Error taxonomy for the delta build/apply pipelines.
//
// External tool failures carry the captured stdout/stderr for operator
// diagnosis. Naming failures during the rename step are recoverable at the
// pipeline level; everything else aborts the current step immediately.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the package delta pipelines.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// The package container is missing one of its expected members.
    #[error("malformed package {}: missing member {member}", path.display())]
    MalformedPackage { path: PathBuf, member: &'static str },

    /// The payload tarball is in neither of the supported compressed forms.
    #[error("unsupported payload compression in {}: expected data.tar.gz or data.tar.xz", path.display())]
    UnsupportedCompression { path: PathBuf },

    /// The transfer container is missing one of the two patch members.
    #[error("malformed transfer container {}: missing member {member}", path.display())]
    MalformedTransfer { path: PathBuf, member: &'static str },

    /// A patch did not apply cleanly against the given stream, either
    /// because the stream is not the one the patch was generated from or
    /// because the patch bytes are damaged. The field is named `stream`
    /// rather than `source` so the derive does not treat it as the error
    /// chain.
    #[error("patch {} does not apply against {}: {stderr}", patch.display(), stream.display())]
    CorruptPatch {
        patch: PathBuf,
        stream: PathBuf,
        stderr: String,
    },

    /// A file name does not follow the `{name}_{version}_{arch}` convention.
    #[error("file name does not parse as {{name}}_{{version}}_{{arch}}: {0}")]
    NamingConvention(String),

    /// An invoked subprocess could not be spawned or exited non-zero.
    #[error("external tool `{tool}` failed ({reason}): {stderr}")]
    ExternalTool {
        tool: String,
        reason: String,
        stdout: String,
        stderr: String,
    },

    /// I/O error (file create, read, write, rename).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DeltaError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
