// Package identity and naming.
//
// Identity is used for naming artifacts only, never for patch
// correctness. Embedded metadata (dpkg-deb) is the source of truth; the
// `{name}_{version}_{arch}` file-name convention is the fallback when the
// metadata tool is unavailable or the file is unreadable.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{DeltaError, Result};
use crate::tool;

/// Identity of a package as recovered from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
    pub arch: String,
}

/// Parse the `{name}_{version}_{arch}` file-name convention.
pub fn parse_identity(path: &Path) -> Result<PackageIdentity> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DeltaError::NamingConvention(path.display().to_string()))?;

    let mut fields = stem.split('_');
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(name), Some(version), Some(arch), None)
            if !name.is_empty() && !version.is_empty() && !arch.is_empty() =>
        {
            Ok(PackageIdentity {
                name: name.to_string(),
                version: version.to_string(),
                arch: arch.to_string(),
            })
        }
        _ => Err(DeltaError::NamingConvention(stem.to_string())),
    }
}

/// Query authoritative name and version from the package's embedded
/// metadata (`dpkg-deb --show`, default format `${Package}\t${Version}`).
pub fn query_identity(package: &Path) -> Result<(String, String)> {
    let out = tool::run("dpkg-deb", [OsStr::new("--show"), package.as_os_str()])?;
    let text = String::from_utf8_lossy(&out);
    let mut fields = text.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(name), Some(version)) => Ok((name.to_string(), version.to_string())),
        _ => Err(DeltaError::NamingConvention(text.trim().to_string())),
    }
}

/// Name and version for a package: embedded metadata when readable, the
/// file-name convention otherwise.
pub fn resolve_identity(package: &Path) -> Result<(String, String)> {
    match query_identity(package) {
        Ok(id) => Ok(id),
        Err(err) => {
            warn!(
                "metadata query failed for {} ({err}), falling back to file name",
                package.display()
            );
            let id = parse_identity(package)?;
            Ok((id.name, id.version))
        }
    }
}

/// Default transfer container name:
/// `{target_name}_{old_version}-to-{new_version}.ar`.
pub fn transfer_name(source: &Path, target: &Path) -> Result<String> {
    let (_, old_version) = resolve_identity(source)?;
    let (name, new_version) = resolve_identity(target)?;
    Ok(format!("{name}_{old_version}-to-{new_version}.ar"))
}

/// Rename a package to its canonical `{name}_{version}_{arch}.deb` form
/// using the embedded metadata (`dpkg-name`). Returns the new path, or
/// `None` when the metadata is unreadable or the tool is unavailable;
/// naming is cosmetic, so callers continue with the old path.
pub fn canonical_rename(package: &Path) -> Option<PathBuf> {
    let out = tool::run_plain_locale("dpkg-name", [package.as_os_str()]).ok()?;
    let text = String::from_utf8_lossy(&out);
    // dpkg-name reports: moved '<old>' to '<new>'
    let renamed = PathBuf::from(second_quoted(&text)?);
    renamed.exists().then_some(renamed)
}

fn second_quoted(text: &str) -> Option<&str> {
    // Quoted substrings sit at the odd indices of a split on '\''.
    text.split('\'').nth(3)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
