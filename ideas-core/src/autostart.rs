//! Registration of the program with the host's login autostart mechanism.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DESKTOP_ENTRY_FILE_NAME: &str = "Ideas.desktop";

/// Host-specific collaborator that makes the program start at user login
pub trait AutostartRegistrar {
    /// Registers `executable` to be launched at login
    fn enable(&self, executable: &Path) -> Result<()>;

    /// Removes the registration if present
    fn disable(&self) -> Result<()>;
}

/// Writes an XDG desktop entry into the per-user autostart directory
pub struct DesktopEntryRegistrar {
    autostart_dir: PathBuf,
}

impl DesktopEntryRegistrar {
    pub fn new<P: AsRef<Path>>(autostart_dir: P) -> Self {
        Self {
            autostart_dir: autostart_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the descriptor this registrar manages
    pub fn entry_path(&self) -> PathBuf {
        self.autostart_dir.join(DESKTOP_ENTRY_FILE_NAME)
    }

    fn render_entry(executable: &Path) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=Ideas\n\
             Exec=\"{}\"\n\
             Hidden=false\n\
             NoDisplay=false\n\
             X-GNOME-Autostart-enabled=true\n",
            quote_exec_arg(&executable.display().to_string())
        )
    }
}

/// Escapes a value for a double-quoted `Exec` argument.
///
/// Inside quotes `"`, `` ` ``, `$` and `\` take a backslash. The key value is
/// then a desktop-entry string, which doubles every backslash again.
fn quote_exec_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len());
    for c in arg.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.replace('\\', "\\\\")
}

impl AutostartRegistrar for DesktopEntryRegistrar {
    fn enable(&self, executable: &Path) -> Result<()> {
        fs::create_dir_all(&self.autostart_dir).with_context(|| {
            format!("Failed to create autostart directory: {:?}", self.autostart_dir)
        })?;

        let path = self.entry_path();
        fs::write(&path, Self::render_entry(executable))
            .with_context(|| format!("Failed to write autostart entry: {:?}", path))?;
        log::info!("Autostart enabled via {:?}", path);
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let path = self.entry_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Autostart entry removed: {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove autostart entry: {:?}", path))
            }
        }
    }
}

/// Registrar for hosts without a supported autostart mechanism
pub struct NoopRegistrar;

impl AutostartRegistrar for NoopRegistrar {
    fn enable(&self, executable: &Path) -> Result<()> {
        log::warn!(
            "Autostart is not supported on this platform; {:?} was not registered",
            executable
        );
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        Ok(())
    }
}

/// Picks the registrar for the current host
pub fn default_registrar() -> Box<dyn AutostartRegistrar> {
    if cfg!(all(unix, not(target_os = "macos"))) {
        if let Some(config_dir) = dirs::config_dir() {
            return Box::new(DesktopEntryRegistrar::new(config_dir.join("autostart")));
        }
    }
    Box::new(NoopRegistrar)
}
