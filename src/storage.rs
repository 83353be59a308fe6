//! Durable key-value storage for session settings and per-language code

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::Error;

pub const LANGUAGE_KEY: &str = "editor-language";
pub const THEME_KEY: &str = "editor-theme";
pub const FONT_SIZE_KEY: &str = "editor-font-size";

/// Key under which the saved code for `language` lives
pub fn code_key(language: &str) -> String {
    format!("editor-code-{}", language)
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

/// String-to-string store. Writes are synchronous.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// Volatile store, used when no durable storage is available
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file starts empty. A file that
    /// cannot be parsed is moved aside to `<path>.corrupt` and the store
    /// starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                let aside = corrupt_path(&path);
                warn!(
                    "Unreadable storage file {}: {}; moving it to {}",
                    path.display(),
                    e,
                    aside.display()
                );
                if let Err(e) = fs::rename(&path, &aside) {
                    warn!("Failed to move {} aside: {}", path.display(), e);
                }
                BTreeMap::new()
            }),
            Err(e) => {
                debug!("Starting with empty storage at {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Open the store in the per-user data directory
    pub fn open_default() -> Result<Self, Error> {
        let dir = dirs::data_dir()
            .ok_or_else(|| Error::Storage("No user data directory available".to_string()))?;
        Ok(Self::open(dir.join("editor-session").join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file atomically: write a sibling temp file, then rename
    /// it over the old one.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // Keep memory and disk in agreement
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
