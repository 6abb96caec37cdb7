pub mod app_state;
pub mod autostart;
pub mod dialog;
pub mod error;
pub mod models;
pub mod paths;
pub mod presence;
pub mod settings;
pub mod storage;
pub mod tree;

// Re-export commonly used types
pub use app_state::AppState;
pub use autostart::{default_registrar, AutostartRegistrar, DesktopEntryRegistrar, NoopRegistrar};
pub use dialog::{DialogOutcome, SettingsEditor};
pub use error::IdeasError;
pub use models::{non_empty, Feature, FeatureId, Idea, IdeaId, IdeaStore};
pub use paths::AppPaths;
pub use presence::WindowPresence;
pub use settings::{
    Geometry, Settings, SettingsStorage, Theme, MAX_FONT_SIZE, MAX_TRANSPARENCY, MIN_FONT_SIZE,
    MIN_TRANSPARENCY,
};
pub use storage::{IdeaStorage, LoadWarning, Loaded};
pub use tree::{build_tree, root_position_by_name, ExpansionState, NodeKind, TreeNode};
