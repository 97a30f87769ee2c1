//! Disk-backed state store: one pretty-printed JSON document under the XDG
//! state dir, written atomically (temp file + rename) so a crash mid-write
//! never leaves a truncated state file.

use std::fs;
use std::path::{Path, PathBuf};

use super::{PersistedState, PersistenceError, ProgressStore};

/// JSON-file implementation of [`ProgressStore`].
///
/// Default location: `~/.local/state/coursegen/state.json`.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Store at the default XDG state path.
    pub fn open_default() -> Result<Self, PersistenceError> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// Store at an explicit path (config override, tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf, PersistenceError> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("coursegen")
            .map_err(|e| PersistenceError::StateDir(e.to_string()))?;
        Ok(xdg_dirs
            .get_state_home()
            .join("coursegen")
            .join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonStateStore {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        let data = match fs::read(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let state =
            serde_json::from_slice(&data).map_err(|source| PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        let json =
            serde_json::to_string_pretty(state).map_err(PersistenceError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| PersistenceError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
