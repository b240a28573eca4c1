//! Human-readable JSON persistence for mined and learned state.
//!
//! Writes go through a temporary file in the target directory followed by an
//! atomic rename, so a crash mid-write never leaves a truncated artifact.
//! Reads distinguish "absent" from "unreadable" so callers can decide how to
//! degrade.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{GlossaError, Result};

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| {
        GlossaError::storage(format!("Failed to persist '{}': {}", path.display(), e.error))
    })?;
    Ok(())
}

/// Read a JSON artifact. Returns `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Option<T>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let value = serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
        GlossaError::storage(format!("Failed to parse '{}': {e}", path.display()))
    })?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_roundtrip_and_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let missing: Option<BTreeMap<String, u32>> = read_json(&path).unwrap();
        assert!(missing.is_none());

        let mut value = BTreeMap::new();
        value.insert("машина".to_string(), 3u32);
        write_json_atomic(&path, &value).unwrap();

        let loaded: BTreeMap<String, u32> = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded, value);
        // human-readable on disk
        assert!(fs::read_to_string(&path).unwrap().contains("машина"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Option<BTreeMap<String, u32>>> = read_json(&path);
        assert!(matches!(result, Err(GlossaError::Storage(_))));
    }
}
