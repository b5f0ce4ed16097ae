// Scoped temporary working directories.
//
// Each pipeline run owns its working directories. Cleanup happens on drop
// on every exit path; a run may opt out so partial state stays on disk for
// inspection after a failed patch apply.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A private directory under the system temp root.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    // None when cleanup is disabled; the directory then outlives the run.
    temp: Option<TempDir>,
}

impl WorkDir {
    /// Create a fresh working directory. With `keep` set, the directory
    /// survives drop.
    pub fn new(keep: bool) -> io::Result<Self> {
        let temp = tempfile::Builder::new().prefix("ddelta-").tempdir()?;
        if keep {
            Ok(Self {
                path: temp.keep(),
                temp: None,
            })
        } else {
            Ok(Self {
                path: temp.path().to_path_buf(),
                temp: Some(temp),
            })
        }
    }

    /// Create a named subdirectory inside this working directory.
    pub fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.path.join(name);
        std::fs::create_dir(&dir)?;
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_kept(&self) -> bool {
        self.temp.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_up_on_drop() {
        let path;
        {
            let work = WorkDir::new(false).unwrap();
            path = work.path().to_path_buf();
            assert!(path.is_dir());
        }
        assert!(!path.exists());
    }

    #[test]
    fn keep_leaves_directory_behind() {
        let work = WorkDir::new(true).unwrap();
        assert!(work.is_kept());
        let path = work.path().to_path_buf();
        drop(work);
        assert!(path.is_dir());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn subdir_is_created_inside() {
        let work = WorkDir::new(false).unwrap();
        let sub = work.subdir("source").unwrap();
        assert!(sub.is_dir());
        assert_eq!(sub.parent(), Some(work.path()));
    }
}
