//! Atomic JSON writes and tolerant JSON reads.
//!
//! Writes go through a temp file in the target directory, are fsynced, then
//! renamed over the destination so a crash never leaves a half-written file.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CheckError, Result};

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| CheckError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let json = serde_json::to_string_pretty(value)
        .map_err(|source| CheckError::JsonSerialize { source })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = dir.join(format!(".{file_name}.tmp"));

    let write_err = |source| CheckError::FileWrite {
        path: temp_path.clone(),
        source,
    };
    let mut file = std::fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(json.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    std::fs::rename(&temp_path, path).map_err(|source| CheckError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CheckError::JsonDeserialize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn write_creates_parents_and_replaces() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("a/b/value.json");

        write_json_atomic(&path, &vec![1, 2]).expect("first write");
        write_json_atomic(&path, &vec![3]).expect("second write");

        let read: Vec<u32> = read_json(&path).expect("read");
        assert_eq!(read, vec![3]);
        assert!(!temp.path().join("a/b/.value.json.tmp").exists());
    }

    #[test]
    fn read_reports_path_on_bad_json() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{not json").expect("write");

        let err = read_json::<Vec<u32>>(&path).expect_err("bad json");
        assert!(err.to_string().contains("bad.json"));
    }
}
