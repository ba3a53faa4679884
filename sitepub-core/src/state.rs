//! JSON state files kept between CLI invocations.
//!
//! Writes use the atomic `.tmp` + rename pattern so an interrupted run never
//! leaves a half-written record behind.

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{state_io_err, StateError};

/// Load a record, or `None` if the file does not exist.
pub fn load_at<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StateError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(state_io_err(path, err)),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| StateError::Json {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Save a record atomically, creating parent directories as needed.
pub fn save_at<T: Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
    let Some(dir) = path.parent() else {
        return Err(state_io_err(
            path,
            std::io::Error::other("invalid state file path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| state_io_err(dir, e))?;

    let json = serde_json::to_string_pretty(value).map_err(|e| StateError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| state_io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(state_io_err(path, e));
    }
    Ok(())
}

/// Delete a record. Returns `true` if a file was removed.
pub fn remove_at(path: &Path) -> Result<bool, StateError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(state_io_err(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_none() {
        let tmp = TempDir::new().unwrap();
        let loaded: Option<BTreeMap<String, String>> =
            load_at(&tmp.path().join("nope.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_and_tmp_cleaned_up() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".sitepub").join("record.json");
        let mut value = BTreeMap::new();
        value.insert("id".to_string(), "abc".to_string());

        save_at(&path, &value).unwrap();
        let loaded: Option<BTreeMap<String, String>> = load_at(&path).unwrap();
        assert_eq!(loaded, Some(value));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_at::<BTreeMap<String, String>>(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"), "got: {err}");
    }

    #[test]
    fn remove_reports_whether_file_existed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("r.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(remove_at(&path).unwrap());
        assert!(!remove_at(&path).unwrap());
    }
}
