//! Transactional editing session behind the settings dialog.

use crate::settings::{clamp_transparency, Settings, Theme, MAX_FONT_SIZE, MIN_FONT_SIZE};

/// How an editing session ended
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome {
    Confirmed(Settings),
    Cancelled,
}

/// Holds a private draft of the settings while the dialog is open.
///
/// The live settings are only read once, when the session opens. Nothing
/// edited here becomes visible until `confirm` hands the draft back.
#[derive(Debug, Clone)]
pub struct SettingsEditor {
    draft: Settings,
}

impl SettingsEditor {
    pub fn open(live: &Settings) -> Self {
        Self {
            draft: live.clone(),
        }
    }

    pub fn draft(&self) -> &Settings {
        &self.draft
    }

    /// Transparency as a whole percentage (10..=100) for slider widgets
    pub fn transparency_percent(&self) -> u32 {
        (self.draft.transparency * 100.0).round() as u32
    }

    pub fn set_transparency_percent(&mut self, percent: u32) {
        self.set_transparency(f64::from(percent) / 100.0);
    }

    pub fn set_transparency(&mut self, value: f64) {
        self.draft.transparency = clamp_transparency(value);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.draft.theme = theme;
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        self.draft.font_family = family.into();
    }

    pub fn set_font_size(&mut self, size: i32) {
        self.draft.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    pub fn set_window_title(&mut self, title: impl Into<String>) {
        self.draft.window_title = title.into();
    }

    pub fn set_autostart(&mut self, autostart: bool) {
        self.draft.autostart = autostart;
    }

    /// Mutable access for widgets that bind directly to a field
    pub fn draft_mut(&mut self) -> &mut Settings {
        &mut self.draft
    }

    pub fn confirm(self) -> DialogOutcome {
        DialogOutcome::Confirmed(self.draft.normalized())
    }

    pub fn cancel(self) -> DialogOutcome {
        DialogOutcome::Cancelled
    }
}
