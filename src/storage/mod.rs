use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{app_config_path, config_env_dirs, ConfigPathError, APP_DIR};
use crate::host::KeyValueStore;

const STATE_FILE: &str = "state.json";
const TEMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".corrupt";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read state file: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write state file: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse state file: {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Key-value store persisted as a flat JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store under `$XDG_CONFIG_HOME/themekeeper/state.json`.
    pub fn with_default_path() -> StorageResult<Self> {
        let (xdg_config_home, home) = config_env_dirs();
        let path = state_file_path_with(xdg_config_home.as_deref(), home.as_deref())?;
        Ok(Self::with_path(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unparsable state file is moved before it is rewritten.
    pub fn backup_path(&self) -> PathBuf {
        self.sibling_path(BACKUP_SUFFIX)
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(STATE_FILE));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn read_entries(&self) -> StorageResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let serialized = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        if serialized.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&serialized).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let serialized = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        // Write beside the target and rename so readers never see a partial file.
        let temp_path = self.sibling_path(TEMP_SUFFIX);
        let written =
            fs::write(&temp_path, serialized).and_then(|()| fs::rename(&temp_path, &self.path));
        written.map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            StorageError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Keep whatever else other writers left in the file.
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Parse { path, source }) => {
                let backup = self.backup_path();
                match fs::rename(&path, &backup) {
                    Ok(()) => tracing::warn!(
                        ?source,
                        path = %path.display(),
                        backup = %backup.display(),
                        "state file is unparsable; moved it aside and starting fresh, other keys are dropped"
                    ),
                    Err(err) => tracing::warn!(
                        ?source,
                        ?err,
                        path = %path.display(),
                        "state file is unparsable and could not be backed up; other keys are dropped"
                    ),
                }
                Map::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(&entries)
    }
}

fn state_file_path_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> StorageResult<PathBuf> {
    app_config_path(APP_DIR, STATE_FILE, xdg_config_home, home).map_err(|error| match error {
        ConfigPathError::MissingHomeDirectory => StorageError::MissingHomeDirectory,
    })
}
