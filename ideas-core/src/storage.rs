use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::{Idea, IdeaStore};

/// Raised when a persisted file could not be parsed and was replaced by
/// defaults. The original bytes are kept at `backup` when the copy succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
    pub reason: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is corrupt ({})", self.path.display(), self.reason)?;
        match &self.backup {
            Some(backup) => write!(f, "; a copy was saved to {}", backup.display()),
            None => write!(f, "; no backup copy could be made"),
        }
    }
}

/// Result of loading a store: the value plus a warning when it was recovered
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub warning: Option<LoadWarning>,
}

impl<T> Loaded<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }
}

pub(crate) enum FileState<T> {
    Missing,
    Parsed(T),
    Corrupt(LoadWarning),
}

/// Reads and parses a JSON file, distinguishing a missing file and a
/// malformed one from real I/O failures.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<FileState<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileState::Missing),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read file: {:?}", path));
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Ok(FileState::Parsed(value)),
        Err(e) => {
            let backup = backup_corrupt_file(path);
            let warning = LoadWarning {
                path: path.to_path_buf(),
                backup,
                reason: e.to_string(),
            };
            log::warn!("{}", warning);
            Ok(FileState::Corrupt(warning))
        }
    }
}

/// Overwrites the file with pretty-printed JSON
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write file: {:?}", path))?;
    Ok(())
}

fn backup_corrupt_file(path: &Path) -> Option<PathBuf> {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    let mut name = path.file_name()?.to_os_string();
    name.push(format!(".corrupt-{}", stamp));
    let backup = path.with_file_name(name);

    match fs::copy(path, &backup) {
        Ok(_) => Some(backup),
        Err(e) => {
            log::error!("Failed to back up corrupt file {:?}: {}", path, e);
            None
        }
    }
}

/// Handles saving and loading the idea list from disk
pub struct IdeaStorage {
    file_path: PathBuf,
}

impl IdeaStorage {
    /// Creates a new IdeaStorage instance
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path to the storage file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads ideas from the JSON file.
    ///
    /// A missing file yields an empty store. A malformed file yields an empty
    /// store and a warning; the file itself is left in place with a backup copy.
    pub fn load(&self) -> Result<Loaded<IdeaStore>> {
        match read_json::<Vec<Idea>>(&self.file_path)? {
            FileState::Missing => {
                log::info!("No ideas file at {:?}, starting empty", self.file_path);
                Ok(Loaded::clean(IdeaStore::new()))
            }
            FileState::Parsed(ideas) => {
                log::debug!("Loaded {} ideas from {:?}", ideas.len(), self.file_path);
                Ok(Loaded::clean(IdeaStore::from_ideas(ideas)))
            }
            FileState::Corrupt(warning) => Ok(Loaded {
                value: IdeaStore::new(),
                warning: Some(warning),
            }),
        }
    }

    /// Saves the whole idea list, overwriting the file
    pub fn save(&self, store: &IdeaStore) -> Result<()> {
        write_json(&self.file_path, store)?;
        log::debug!("Saved {} ideas to {:?}", store.len(), self.file_path);
        Ok(())
    }
}
