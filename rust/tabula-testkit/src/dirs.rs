//! Temporary paths and test-data locations.
//!
//! [`ensure_clean`] hands out a path that is removed again when the returned
//! guard is dropped, whether the test passes, fails or panics. The
//! [`data_path!`](crate::data_path) macro resolves files under the calling
//! crate's `tests/data` directory.

use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

/// A path that is deleted, if it exists, when dropped.
#[derive(Debug)]
pub struct CleanPath {
    path: PathBuf,
}

impl CleanPath {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Deref for CleanPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for CleanPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for CleanPath {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::debug!("failed to remove {}: {e}", self.path.display());
            }
        }
    }
}

/// Returns a guard over `filename`, or over a fresh, unique temporary file
/// when `filename` is `None`.
///
/// The file at the path is removed when the guard is dropped; removal errors
/// are logged and otherwise ignored. A generated file is created empty and
/// stays in place until the guard is dropped, so its name cannot be taken by
/// anyone else in the meantime.
pub fn ensure_clean(filename: Option<&Path>) -> anyhow::Result<CleanPath> {
    let path = match filename {
        Some(filename) => filename.to_path_buf(),
        None => {
            let (_file, path) = tempfile::Builder::new()
                .prefix("tabula-")
                .tempfile()?
                .keep()?;
            path
        }
    };
    Ok(CleanPath { path })
}

/// Returns `$base/tests/data`.
pub fn data_dir(base: impl AsRef<Path>) -> PathBuf {
    base.as_ref().join("tests").join("data")
}

/// Returns `$base/tests/data/$file`, without checking that it exists.
pub fn data_path_in(base: impl AsRef<Path>, file: &str) -> PathBuf {
    data_dir(base).join(file)
}

/// Returns `$base/tests/data/$file`, failing if it is not an existing file.
pub fn get_data_file(base: impl AsRef<Path>, file: &str) -> anyhow::Result<PathBuf> {
    let path = data_path_in(base, file);
    if !path.is_file() {
        anyhow::bail!("{} not found", path.display());
    }
    Ok(path)
}

/// Path of `file` under the calling crate's `tests/data` directory.
#[macro_export]
macro_rules! data_path {
    ($file:expr) => {
        $crate::dirs::data_path_in(env!("CARGO_MANIFEST_DIR"), $file)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_clean_generated() {
        let kept;
        {
            let path = ensure_clean(None).unwrap();
            assert!(path.is_file());
            assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
            std::fs::write(&path, b"abc").unwrap();
            assert!(path.is_file());
            kept = path.to_path_buf();
        }
        assert!(!kept.exists());
    }

    #[test]
    fn test_ensure_clean_named() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        {
            let path = ensure_clean(Some(&target)).unwrap();
            assert_eq!(path.path(), target.as_path());
            std::fs::write(&path, b"x,y").unwrap();
        }
        assert!(!target.exists());
    }

    #[test]
    fn test_ensure_clean_never_written() {
        let path = ensure_clean(None).unwrap();
        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
    }

    #[test]
    fn test_ensure_clean_names_stay_reserved() {
        let first = ensure_clean(None).unwrap();
        let second = ensure_clean(None).unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.is_file());
        assert!(second.is_file());
    }

    #[test]
    fn test_ensure_clean_on_panic() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("panic.bin");
        let inner = target.clone();
        let result = std::panic::catch_unwind(move || {
            let path = ensure_clean(Some(&inner)).unwrap();
            std::fs::write(&path, b"data").unwrap();
            panic!("test body failed");
        });
        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_data_paths() {
        let path = crate::data_path!("frame.csv");
        assert!(path.ends_with("tests/data/frame.csv"));
        assert!(path.starts_with(env!("CARGO_MANIFEST_DIR")));
        assert!(get_data_file(env!("CARGO_MANIFEST_DIR"), "missing.bin").is_err());
    }
}
