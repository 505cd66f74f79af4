//! Locating `.feature` files on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::FeatureError;

/// Collect unique, sorted feature files from files and directories.
///
/// Directories are walked recursively. Explicit files are accepted only when
/// they carry a `.feature` extension.
///
/// # Errors
/// Returns [`FeatureError::NotFound`] for a missing path and
/// [`FeatureError::Io`] when a directory cannot be walked.
pub fn collect_feature_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, FeatureError> {
    let mut files = BTreeSet::new();
    for path in paths {
        files.extend(gather(path)?);
    }
    Ok(files.into_iter().collect())
}

fn gather(path: &Path) -> Result<Vec<PathBuf>, FeatureError> {
    let meta = fs::metadata(path).map_err(|_| FeatureError::NotFound(path.to_path_buf()))?;
    if meta.is_file() {
        return Ok(if is_feature_file(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|err| FeatureError::Io {
            path: err.path().unwrap_or(path).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() && is_feature_file(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

fn is_feature_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|err| panic!("mkdir: {err}"));
        }
        fs::write(&path, "Feature: x\n").unwrap_or_else(|err| panic!("write: {err}"));
        path
    }

    #[test]
    fn walks_directories_and_dedupes() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let b = touch(dir.path(), "nested/b.feature");
        let a = touch(dir.path(), "a.feature");
        touch(dir.path(), "notes.txt");

        let files = collect_feature_files(&[dir.path().to_path_buf(), a.clone()])
            .unwrap_or_else(|err| panic!("collect: {err}"));
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn missing_path_is_reported() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let missing = dir.path().join("absent");
        let Err(err) = collect_feature_files(&[missing.clone()]) else {
            panic!("missing path must fail");
        };
        assert!(matches!(err, FeatureError::NotFound(path) if path == missing));
    }
}
