use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const IDEAS_FILE_NAME: &str = "project_ideas.json";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Locations of the files the application reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding both JSON files
    pub data_dir: PathBuf,
    /// Absolute path of the running program, used for the autostart entry
    pub executable: PathBuf,
}

impl AppPaths {
    /// Resolves the data directory as the directory of the running executable
    pub fn beside_executable() -> Result<Self> {
        let executable = env::current_exe().context("Failed to determine executable path")?;
        let executable = executable.canonicalize().unwrap_or(executable);
        let data_dir = executable
            .parent()
            .context("Executable path has no parent directory")?
            .to_path_buf();
        Ok(Self {
            data_dir,
            executable,
        })
    }

    /// Uses an explicit data directory
    pub fn in_dir<P: AsRef<Path>>(data_dir: P, executable: PathBuf) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            executable,
        }
    }

    pub fn ideas_file(&self) -> PathBuf {
        self.data_dir.join(IDEAS_FILE_NAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE_NAME)
    }
}
