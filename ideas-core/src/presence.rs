/// Whether the main window is on screen or parked in the tray
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WindowPresence {
    #[default]
    Shown,
    InTray,
}

impl WindowPresence {
    /// Launching through autostart starts in the tray
    pub fn at_startup(autostart: bool) -> Self {
        if autostart {
            WindowPresence::InTray
        } else {
            WindowPresence::Shown
        }
    }

    /// Minimizing hides to the tray instead of the taskbar
    pub fn on_minimize(self) -> Self {
        WindowPresence::InTray
    }

    /// Closing the window keeps the process alive in the tray.
    ///
    /// Returns the next state and whether the close must be cancelled.
    pub fn on_close_requested(self) -> (Self, bool) {
        (WindowPresence::InTray, true)
    }

    pub fn restore(self) -> Self {
        WindowPresence::Shown
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, WindowPresence::Shown)
    }
}
