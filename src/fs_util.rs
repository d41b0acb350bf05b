use std::fs;

use camino::Utf8Path;

use crate::error::MirrorError;

/// Size of the file at `path` in bytes, 0 when it does not exist.
pub fn file_size(path: &Utf8Path) -> u64 {
    fs::metadata(path.as_std_path())
        .map(|meta| meta.len())
        .unwrap_or(0)
}

pub fn exists(path: &Utf8Path) -> bool {
    path.as_std_path().exists()
}

pub fn make_dirs(path: &Utf8Path) -> Result<(), MirrorError> {
    fs::create_dir_all(path.as_std_path())
        .map_err(|err| MirrorError::Filesystem(format!("create {path}: {err}")))
}

pub fn delete(path: &Utf8Path) -> Result<(), MirrorError> {
    fs::remove_file(path.as_std_path())
        .map_err(|err| MirrorError::Filesystem(format!("delete {path}: {err}")))
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    #[test]
    fn file_size_of_missing_path_is_zero() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("absent.grb2")).unwrap();
        assert_eq!(file_size(&path), 0);
        assert!(!exists(&path));
    }

    #[test]
    fn make_dirs_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("a/b/c")).unwrap();
        make_dirs(&path).unwrap();
        make_dirs(&path).unwrap();
        assert!(exists(&path));
    }
}
