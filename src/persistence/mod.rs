//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic replace (write tmp, then rename over the old file)
//! - Version mismatch reported as an error so callers can fall back

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// On-disk wrapper around any persisted payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub payload: T,
}

/// Load `path` and unwrap its envelope, rejecting other format versions
pub fn load_json<T: DeserializeOwned>(path: &Path, version: u32) -> Result<T, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&text, version)
}

/// Parse envelope text (split out so it can be tested without a filesystem)
pub fn decode<T: DeserializeOwned>(text: &str, version: u32) -> Result<T, PersistenceError> {
    // Peek at the version before committing to the payload type
    let raw: Envelope<serde_json::Value> = serde_json::from_str(text)?;
    if raw.version != version {
        return Err(PersistenceError::VersionMismatch {
            expected: version,
            found: raw.version,
        });
    }
    Ok(serde_json::from_value(raw.payload)?)
}

/// Wrap `payload` in an envelope and write it to `path`
pub fn save_json<T: Serialize>(path: &Path, version: u32, payload: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(&Envelope { version, payload })?;
    let tmp = tmp_path(path);
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    log::debug!("Saved {}", path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nucleus-persist-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("roundtrip.json");
        save_json(&path, 3, &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = load_json(&path, 3).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        assert!(!tmp_path(&path).exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_mismatch() {
        let err = decode::<Vec<u32>>(r#"{"version":1,"payload":[1]}"#, 2).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::VersionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_json::<u32>(&scratch("missing.json"), 1).unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }

    #[test]
    fn test_garbage_is_json_error() {
        let err = decode::<u32>("not json", 1).unwrap_err();
        assert!(matches!(err, PersistenceError::Json(_)));
    }
}
