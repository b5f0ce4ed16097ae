//! ddelta: binary delta transfer for Debian packages.
//!
//! A Debian package is an `ar` archive holding a version marker and two
//! compressed tarballs (control metadata and payload). This crate builds a
//! small transfer container out of two xdelta3 patches between the
//! uncompressed tarball streams of two package versions, and reconstructs
//! the new package from the old one plus that container.
//!
//! The heavy lifting (binary diffing, archive member handling, xz
//! compression, checksum validation, metadata queries) is delegated to the
//! standard external tools: `xdelta3`, `ar`, `xz`, `tar`, `md5sum`,
//! `dpkg-deb`, `dpkg-name`. The crate's job is the orchestration contract
//! around them: stream preparation, deterministic recomposition and
//! end-to-end integrity.
//!
//! # Quick start
//!
//! ```no_run
//! use ddelta::pipeline::{self, PipelineOptions};
//!
//! let opts = PipelineOptions::default();
//! let built = pipeline::build("old.deb".as_ref(), "new.deb".as_ref(), &opts).unwrap();
//! let applied = pipeline::apply("old.deb".as_ref(), &built.transfer, &opts).unwrap();
//! assert!(ddelta::verify::verify(&applied.package));
//! ```

pub mod delta;
pub mod error;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod tool;
pub mod transfer;
pub mod verify;
pub mod workdir;

#[cfg(feature = "cli")]
pub mod cli;
