use camino::Utf8Path;

use crate::fs_util;

/// The local filesystem is the cache index: a present file with size > 0
/// counts as fetched. A zero-byte file is the leftover of a failed
/// transfer and is treated as pending so the unit gets retried.
pub fn needs_fetch(local: &Utf8Path) -> bool {
    fs_util::file_size(local) == 0
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    #[test]
    fn missing_file_needs_fetch() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("gfs.grb2")).unwrap();
        assert!(needs_fetch(&path));
    }

    #[test]
    fn empty_file_needs_fetch() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("gfs.grb2")).unwrap();
        std::fs::write(path.as_std_path(), b"").unwrap();
        assert!(needs_fetch(&path));
    }

    #[test]
    fn non_empty_file_is_cached() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("gfs.grb2")).unwrap();
        std::fs::write(path.as_std_path(), b"GRIB").unwrap();
        assert!(!needs_fetch(&path));
    }
}
