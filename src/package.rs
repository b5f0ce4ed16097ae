// Debian package container codec.
//
// A binary package is an `ar` archive with three ordered members:
// `debian-binary` (version marker), `control.tar.gz` (metadata tarball)
// and `data.tar.gz` or `data.tar.xz` (payload tarball). `unpack`
// normalizes both tarballs to their uncompressed form so they can be
// diffed/patched; `recompose` rebuilds a byte-stable package from a
// directory holding the uncompressed streams.

use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use log::debug;

use crate::error::{DeltaError, Result};
use crate::tool;

/// Content of the `debian-binary` member.
pub const VERSION_MARKER: &str = "2.0\n";

pub const VERSION_MEMBER: &str = "debian-binary";

pub const CONTROL_MEMBER: &str = "control.tar.gz";
pub const DATA_GZ_MEMBER: &str = "data.tar.gz";
pub const DATA_XZ_MEMBER: &str = "data.tar.xz";

/// Uncompressed stream names inside a working directory.
pub const CONTROL_TAR: &str = "control.tar";
pub const DATA_TAR: &str = "data.tar";

// ---------------------------------------------------------------------------
// Payload compression format
// ---------------------------------------------------------------------------

/// Payload tarball compression format, resolved once per package from the
/// container member listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadCompression {
    Gzip,
    Xz,
}

impl PayloadCompression {
    pub fn member_name(self) -> &'static str {
        match self {
            Self::Gzip => DATA_GZ_MEMBER,
            Self::Xz => DATA_XZ_MEMBER,
        }
    }

    /// Resolve the payload format from an `ar t` member listing.
    pub fn from_listing(listing: &str) -> Option<Self> {
        for line in listing.lines() {
            match line.trim() {
                DATA_XZ_MEMBER => return Some(Self::Xz),
                DATA_GZ_MEMBER => return Some(Self::Gzip),
                _ => {}
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Compression profile
// ---------------------------------------------------------------------------

/// Compression parameters used when recomposing a package.
///
/// Defaults match the common archive tooling output: gzip -9 for the
/// control tarball, xz preset 6 with a CRC32 integrity check for the
/// payload. The packaging ecosystem varies these per source package;
/// a mismatched level only changes output size, never correctness.
#[derive(Debug, Clone, Copy)]
pub struct CompressionProfile {
    pub gzip_level: u32,
    pub xz_level: u32,
}

impl Default for CompressionProfile {
    fn default() -> Self {
        Self {
            gzip_level: 9,
            xz_level: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// Unpack
// ---------------------------------------------------------------------------

/// Decompress a package's metadata and payload tarballs into `out_dir` as
/// `control.tar` and `data.tar`. Returns the payload compression that was
/// detected. The source package is never modified.
pub fn unpack(package: &Path, out_dir: &Path) -> Result<PayloadCompression> {
    let listing = list_members(package)?;
    for member in [VERSION_MEMBER, CONTROL_MEMBER] {
        if !listing.lines().any(|l| l.trim() == member) {
            return Err(DeltaError::MalformedPackage {
                path: package.to_path_buf(),
                member,
            });
        }
    }
    let payload =
        PayloadCompression::from_listing(&listing).ok_or_else(|| {
            DeltaError::UnsupportedCompression {
                path: package.to_path_buf(),
            }
        })?;
    debug!("unpack {}: payload is {payload:?}", package.display());

    let control_gz = read_member(package, CONTROL_MEMBER)?;
    gunzip_to(&control_gz, &out_dir.join(CONTROL_TAR))?;

    let data = read_member(package, payload.member_name())?;
    match payload {
        PayloadCompression::Gzip => gunzip_to(&data, &out_dir.join(DATA_TAR))?,
        PayloadCompression::Xz => {
            let compressed = out_dir.join(DATA_XZ_MEMBER);
            std::fs::write(&compressed, &data)?;
            // xz -d replaces data.tar.xz with data.tar
            tool::run(
                "xz",
                [OsStr::new("-d"), OsStr::new("-f"), compressed.as_os_str()],
            )?;
        }
    }
    Ok(payload)
}

fn list_members(archive: &Path) -> Result<String> {
    let out = tool::run("ar", [OsStr::new("t"), archive.as_os_str()])?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn read_member(archive: &Path, member: &str) -> Result<Vec<u8>> {
    tool::run(
        "ar",
        [OsStr::new("p"), archive.as_os_str(), OsStr::new(member)],
    )
}

fn gunzip_to(compressed: &[u8], out: &Path) -> Result<()> {
    let mut decoder = GzDecoder::new(compressed);
    let mut file = File::create(out)?;
    std::io::copy(&mut decoder, &mut file)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Recompose
// ---------------------------------------------------------------------------

/// Rebuild a package from a directory holding uncompressed `control.tar`
/// and `data.tar` streams. Writes the version marker, compresses both
/// tarballs with the given profile, then archives the three members in
/// canonical order. Returns the path of `{name}.deb` inside `work_dir`.
///
/// Output is byte-stable across runs: the gzip stream stores no file name
/// and a zero mtime, and the `ar` archive is created in deterministic
/// mode. The payload tarball is replaced by its compressed form as a side
/// effect of the xz invocation.
pub fn recompose(work_dir: &Path, name: &str, profile: CompressionProfile) -> Result<PathBuf> {
    let marker = work_dir.join(VERSION_MEMBER);
    std::fs::write(&marker, VERSION_MARKER)?;

    let control_gz = gzip_control(work_dir, profile.gzip_level)?;

    let data = work_dir.join(DATA_TAR);
    let level = format!("-{}", profile.xz_level);
    tool::run(
        "xz",
        [
            OsStr::new("-z"),
            OsStr::new("-f"),
            OsStr::new(&level),
            OsStr::new("--check=crc32"),
            data.as_os_str(),
        ],
    )?;
    let data_xz = work_dir.join(DATA_XZ_MEMBER);

    let package = work_dir.join(format!("{name}.deb"));
    if package.exists() {
        std::fs::remove_file(&package)?;
    }
    tool::run(
        "ar",
        [
            OsStr::new("Drcs"),
            package.as_os_str(),
            marker.as_os_str(),
            control_gz.as_os_str(),
            data_xz.as_os_str(),
        ],
    )?;
    Ok(package)
}

/// Gzip `control.tar` with a fixed level and no stored name or mtime, so
/// repeated runs over identical input produce identical bytes.
fn gzip_control(work_dir: &Path, level: u32) -> Result<PathBuf> {
    let control = work_dir.join(CONTROL_TAR);
    let out_path = work_dir.join(CONTROL_MEMBER);

    let mut input = File::open(&control)?;
    let out = File::create(&out_path)?;
    let mut encoder = GzBuilder::new().mtime(0).write(out, Compression::new(level));
    std::io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    Ok(out_path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn payload_format_from_listing() {
        let xz = "debian-binary\ncontrol.tar.gz\ndata.tar.xz\n";
        assert_eq!(PayloadCompression::from_listing(xz), Some(PayloadCompression::Xz));

        let gz = "debian-binary\ncontrol.tar.gz\ndata.tar.gz\n";
        assert_eq!(
            PayloadCompression::from_listing(gz),
            Some(PayloadCompression::Gzip)
        );

        let neither = "debian-binary\ncontrol.tar.gz\ndata.tar.bz2\n";
        assert_eq!(PayloadCompression::from_listing(neither), None);
    }

    #[test]
    fn payload_format_requires_exact_member_name() {
        // A member merely containing the known name must not match.
        let listing = "debian-binary\ncontrol.tar.gz\nnot-data.tar.xz.bak\n";
        assert_eq!(PayloadCompression::from_listing(listing), None);
    }

    #[test]
    fn control_gzip_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONTROL_TAR), b"control stream bytes").unwrap();

        let first = gzip_control(dir.path(), 9).unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        std::fs::remove_file(&first).unwrap();

        let second = gzip_control(dir.path(), 9).unwrap();
        let second_bytes = std::fs::read(&second).unwrap();

        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn control_gzip_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let payload = b"some tarball-ish bytes for the roundtrip".repeat(64);
        std::fs::write(dir.path().join(CONTROL_TAR), &payload).unwrap();

        let gz = gzip_control(dir.path(), 6).unwrap();
        let mut decoder = GzDecoder::new(File::open(&gz).unwrap());
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();

        assert_eq!(decoded, payload);
    }
}
