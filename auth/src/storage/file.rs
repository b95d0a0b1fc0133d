//! File-backed key-value store
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary sibling
//! file that is then renamed over the target, so readers never observe a
//! partially written value.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use super::{KeyValueStore, StorageError, validate_key};

const VALUE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Store persisting each key as a file in a data directory
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Serializes writers within this process; other processes are not excluded
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if necessary
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("Created data directory: {:?}", dir);
        } else if !dir.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("Data path {:?} exists but is not a directory", dir),
            )));
        }

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory this store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{VALUE_EXTENSION}"))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{TEMP_EXTENSION}"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        match fs::read_to_string(self.value_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let temp_path = self.temp_path(key);
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, self.value_path(key))?;

        debug!("Wrote key {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        match fs::remove_file(self.value_path(key)) {
            Ok(()) => {
                debug!("Removed key {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
