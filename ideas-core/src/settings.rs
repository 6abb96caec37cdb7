use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::autostart::AutostartRegistrar;
use crate::storage::{read_json, write_json, FileState, Loaded};

pub const MIN_TRANSPARENCY: f64 = 0.10;
pub const MAX_TRANSPARENCY: f64 = 1.00;
pub const MIN_FONT_SIZE: i32 = 6;
pub const MAX_FONT_SIZE: i32 = 72;

pub const DEFAULT_TRANSPARENCY: f64 = 0.99;
pub const DEFAULT_FONT_FAMILY: &str = "Verdana";
pub const DEFAULT_FONT_SIZE: i32 = 10;
pub const DEFAULT_WINDOW_TITLE: &str = "Ideas";

/// Color theme
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Window position and size, persisted as `[x, y, width, height]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 480,
            height: 480,
        }
    }
}

impl From<[i32; 4]> for Geometry {
    fn from([x, y, width, height]: [i32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<Geometry> for [i32; 4] {
    fn from(g: Geometry) -> Self {
        [g.x, g.y, g.width, g.height]
    }
}

/// Persisted window and process preferences.
///
/// Keys missing from the file take the value from `Settings::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub geometry: Geometry,
    /// Window opacity, 0.10 (mostly transparent) to 1.00 (opaque)
    pub transparency: f64,
    pub theme: Theme,
    pub font_family: String,
    /// Tree font size in points
    pub font_size: i32,
    pub window_title: String,
    /// Launch at user login, starting minimized to the tray
    pub autostart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            transparency: DEFAULT_TRANSPARENCY,
            theme: Theme::default(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            autostart: false,
        }
    }
}

impl Settings {
    /// Clamps numeric fields into their valid ranges
    pub fn normalized(mut self) -> Self {
        self.transparency = clamp_transparency(self.transparency);
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self
    }
}

pub(crate) fn clamp_transparency(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_TRANSPARENCY
    } else {
        value.clamp(MIN_TRANSPARENCY, MAX_TRANSPARENCY)
    }
}

/// Handles saving and loading settings, and keeps the autostart
/// registration in step with the `autostart` flag.
pub struct SettingsStorage {
    file_path: PathBuf,
    executable: PathBuf,
    registrar: Box<dyn AutostartRegistrar>,
}

impl SettingsStorage {
    pub fn new<P: AsRef<Path>>(
        file_path: P,
        executable: PathBuf,
        registrar: Box<dyn AutostartRegistrar>,
    ) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            executable,
            registrar,
        }
    }

    /// Returns the path to the settings file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads settings, writing the defaults out when no file exists yet
    pub fn load(&self) -> Result<Loaded<Settings>> {
        match read_json::<Settings>(&self.file_path)? {
            FileState::Missing => {
                log::info!("No settings file at {:?}, writing defaults", self.file_path);
                let settings = Settings::default();
                self.save(&settings)?;
                Ok(Loaded::clean(settings))
            }
            FileState::Parsed(settings) => Ok(Loaded::clean(settings.normalized())),
            FileState::Corrupt(warning) => Ok(Loaded {
                value: Settings::default(),
                warning: Some(warning),
            }),
        }
    }

    /// Saves the full settings record, then enables or disables autostart
    pub fn save(&self, settings: &Settings) -> Result<()> {
        write_json(&self.file_path, settings)?;
        log::debug!("Saved settings to {:?}", self.file_path);

        if settings.autostart {
            self.registrar
                .enable(&self.executable)
                .context("Settings saved, but autostart could not be enabled")
        } else {
            self.registrar
                .disable()
                .context("Settings saved, but autostart could not be disabled")
        }
    }
}
