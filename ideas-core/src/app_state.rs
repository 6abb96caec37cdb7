use anyhow::Result;

use crate::autostart::AutostartRegistrar;
use crate::error::IdeasError;
use crate::models::{FeatureId, Idea, IdeaId, IdeaStore};
use crate::paths::AppPaths;
use crate::settings::{Settings, SettingsStorage};
use crate::storage::{IdeaStorage, LoadWarning};
use crate::tree::{build_tree, TreeNode};

/// Everything the application keeps in memory, owned by the top-level
/// controller.
///
/// Every idea mutation sorts the list and rewrites `project_ideas.json`
/// before returning. A failed precondition leaves both memory and disk
/// untouched.
pub struct AppState {
    ideas: IdeaStore,
    settings: Settings,
    idea_storage: IdeaStorage,
    settings_storage: SettingsStorage,
    warnings: Vec<LoadWarning>,
}

impl AppState {
    /// Loads both stores from the files described by `paths`
    pub fn load(paths: &AppPaths, registrar: Box<dyn AutostartRegistrar>) -> Result<Self> {
        let settings_storage =
            SettingsStorage::new(paths.settings_file(), paths.executable.clone(), registrar);
        let idea_storage = IdeaStorage::new(paths.ideas_file());

        let settings = settings_storage.load()?;
        let ideas = idea_storage.load()?;
        let warnings = settings.warning.into_iter().chain(ideas.warning).collect();

        log::info!(
            "Loaded {} ideas from {:?}",
            ideas.value.len(),
            idea_storage.path()
        );

        Ok(Self {
            ideas: ideas.value,
            settings: settings.value,
            idea_storage,
            settings_storage,
            warnings,
        })
    }

    pub fn ideas(&self) -> &IdeaStore {
        &self.ideas
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Problems found while loading, for showing to the user
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<LoadWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Fresh display tree for the current list
    pub fn tree(&self) -> Vec<TreeNode> {
        build_tree(self.ideas.ideas())
    }

    fn mutate<T>(
        &mut self,
        operation: impl FnOnce(&mut IdeaStore) -> Result<T, IdeasError>,
    ) -> Result<T> {
        let value = operation(&mut self.ideas)?;
        self.idea_storage.save(&self.ideas)?;
        Ok(value)
    }

    // =========================================================================
    // Id-addressed operations
    // =========================================================================

    pub fn add_idea(&mut self, name: &str) -> Result<IdeaId> {
        let id = self.mutate(|store| Ok(store.add_idea(name)))?;
        log::info!("Added idea '{}'", name);
        Ok(id)
    }

    pub fn rename_idea(&mut self, id: IdeaId, name: &str) -> Result<()> {
        self.mutate(|store| store.rename_idea(id, name))
    }

    pub fn delete_idea(&mut self, id: IdeaId) -> Result<Idea> {
        let removed = self.mutate(|store| store.delete_idea(id))?;
        log::info!("Deleted idea '{}'", removed.name);
        Ok(removed)
    }

    pub fn add_feature(&mut self, idea: IdeaId, text: &str) -> Result<FeatureId> {
        self.mutate(|store| store.add_feature(idea, text))
    }

    pub fn rename_feature(&mut self, idea: IdeaId, feature: FeatureId, text: &str) -> Result<()> {
        self.mutate(|store| store.rename_feature(idea, feature, text))
    }

    pub fn delete_feature(&mut self, idea: IdeaId, feature: FeatureId) -> Result<String> {
        self.mutate(|store| store.delete_feature(idea, feature))
    }

    // =========================================================================
    // Position-addressed operations
    // =========================================================================

    pub fn rename_idea_at(&mut self, position: usize, name: &str) -> Result<()> {
        self.mutate(|store| store.rename_idea_at(position, name))
    }

    pub fn delete_idea_at(&mut self, position: usize) -> Result<Idea> {
        self.mutate(|store| store.delete_idea_at(position))
    }

    pub fn add_feature_at(&mut self, position: usize, text: &str) -> Result<FeatureId> {
        self.mutate(|store| store.add_feature_at(position, text))
    }

    pub fn rename_feature_at(
        &mut self,
        idea_position: usize,
        feature_position: usize,
        text: &str,
    ) -> Result<()> {
        self.mutate(|store| store.rename_feature_at(idea_position, feature_position, text))
    }

    pub fn delete_feature_at(
        &mut self,
        idea_position: usize,
        feature_position: usize,
    ) -> Result<String> {
        self.mutate(|store| store.delete_feature_at(idea_position, feature_position))
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Replaces the live settings with a confirmed snapshot and saves it
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        let settings = settings.normalized();
        self.settings_storage.save(&settings)?;
        self.settings = settings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autostart::DesktopEntryRegistrar;
    use crate::dialog::{DialogOutcome, SettingsEditor};
    use crate::settings::Theme;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn paths_in(temp_dir: &TempDir) -> AppPaths {
        AppPaths::in_dir(temp_dir.path(), PathBuf::from("/opt/ideas/ideas"))
    }

    fn open(temp_dir: &TempDir) -> AppState {
        let registrar = DesktopEntryRegistrar::new(temp_dir.path().join("autostart"));
        AppState::load(&paths_in(temp_dir), Box::new(registrar)).unwrap()
    }

    fn persisted_names(temp_dir: &TempDir) -> Vec<String> {
        let content = fs::read_to_string(paths_in(temp_dir).ideas_file()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|idea| idea["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_first_start_writes_settings_only() {
        let temp_dir = TempDir::new().unwrap();
        let state = open(&temp_dir);

        assert!(state.ideas().is_empty());
        assert_eq!(state.settings(), &Settings::default());
        assert!(paths_in(&temp_dir).settings_file().exists());
        assert!(!paths_in(&temp_dir).ideas_file().exists());
    }

    #[test]
    fn test_added_idea_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);
        state.add_idea("Recipe box").unwrap();

        let reloaded = open(&temp_dir);
        let idea = reloaded.ideas().find_by_name("Recipe box").unwrap();
        assert!(idea.features.is_empty());
    }

    #[test]
    fn test_website_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);

        state.add_idea("Website").unwrap();
        let tree = state.tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].label, "Website");
        assert!(tree[0].children.is_empty());

        state.add_feature_at(0, "Login page").unwrap();
        let tree = state.tree();
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].label, "Login page");

        let content = fs::read_to_string(paths_in(&temp_dir).ideas_file()).unwrap();
        let on_disk: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            on_disk,
            serde_json::json!([{"name": "Website", "features": ["Login page"]}])
        );
    }

    #[test]
    fn test_persisted_order_is_sorted_after_every_mutation() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);

        state.add_idea("Zeta").unwrap();
        state.add_idea("Alpha").unwrap();
        assert_eq!(persisted_names(&temp_dir), vec!["Alpha", "Zeta"]);

        let tree_labels: Vec<String> = state.tree().into_iter().map(|n| n.label).collect();
        assert_eq!(tree_labels, vec!["Alpha", "Zeta"]);

        state.rename_idea_at(0, "Omega").unwrap();
        assert_eq!(persisted_names(&temp_dir), vec!["Omega", "Zeta"]);

        state.add_idea("Beta").unwrap();
        state.add_feature_at(2, "z feature").unwrap();
        assert_eq!(persisted_names(&temp_dir), vec!["Beta", "Omega", "Zeta"]);
    }

    #[test]
    fn test_position_captured_before_rename_goes_stale() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);
        state.add_idea("Alpha").unwrap();
        state.add_idea("Mango").unwrap();

        // Alpha sits at 0; renaming it moves it after Mango
        state.rename_idea_at(0, "Zucchini").unwrap();
        let removed = state.delete_idea_at(0).unwrap();

        // Position 0 now holds Mango, so that is what goes
        assert_eq!(removed.name, "Mango");
        assert_eq!(persisted_names(&temp_dir), vec!["Zucchini"]);
    }

    #[test]
    fn test_id_addressing_survives_reordering() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);
        let alpha = state.add_idea("Alpha").unwrap();
        state.add_idea("Mango").unwrap();

        state.rename_idea(alpha, "Zucchini").unwrap();
        let removed = state.delete_idea(alpha).unwrap();

        assert_eq!(removed.name, "Zucchini");
        assert_eq!(persisted_names(&temp_dir), vec!["Mango"]);
    }

    #[test]
    fn test_failed_precondition_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);

        let err = state.delete_idea_at(0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IdeasError>(),
            Some(&IdeasError::IdeaIndexOutOfRange { position: 0, len: 0 })
        );
        assert!(!paths_in(&temp_dir).ideas_file().exists());
    }

    #[test]
    fn test_feature_edits_persist() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);
        let idea = state.add_idea("Game").unwrap();
        let first = state.add_feature(idea, "Levels").unwrap();
        state.add_feature(idea, "Scores").unwrap();

        state.rename_feature(idea, first, "Level editor").unwrap();
        state.delete_feature_at(0, 1).unwrap();

        let reloaded = open(&temp_dir);
        let texts: Vec<&str> = reloaded.ideas().ideas()[0].feature_texts().collect();
        assert_eq!(texts, vec!["Level editor"]);
    }

    #[test]
    fn test_corrupt_ideas_file_reports_warning() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(paths_in(&temp_dir).ideas_file(), "not json at all").unwrap();

        let mut state = open(&temp_dir);
        assert!(state.ideas().is_empty());
        assert_eq!(state.warnings().len(), 1);

        let warnings = state.take_warnings();
        assert!(warnings[0].backup.as_ref().unwrap().exists());
        assert!(state.warnings().is_empty());
    }

    #[test]
    fn test_dialog_cancel_keeps_live_settings() {
        let temp_dir = TempDir::new().unwrap();
        let state = open(&temp_dir);
        let before = state.settings().clone();

        let mut editor = SettingsEditor::open(state.settings());
        editor.set_theme(Theme::Dark);
        editor.set_font_size(40);
        editor.set_window_title("Changed");
        editor.set_autostart(true);
        editor.set_transparency_percent(20);
        editor.set_font_family("Hack");
        assert_eq!(editor.cancel(), DialogOutcome::Cancelled);

        assert_eq!(state.settings(), &before);
        let reloaded = open(&temp_dir);
        assert_eq!(reloaded.settings(), &before);
    }

    #[test]
    fn test_apply_confirmed_settings() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);

        let mut editor = SettingsEditor::open(state.settings());
        editor.set_theme(Theme::Dark);
        editor.set_window_title("Brainstorm");
        editor.set_autostart(true);
        let DialogOutcome::Confirmed(next) = editor.confirm() else {
            panic!("expected a confirmed outcome");
        };
        state.apply_settings(next.clone()).unwrap();

        assert_eq!(state.settings(), &next);
        assert!(temp_dir.path().join("autostart").join("Ideas.desktop").exists());

        let reloaded = open(&temp_dir);
        assert_eq!(reloaded.settings(), &next);
    }

    #[test]
    fn test_failed_settings_save_keeps_live_settings() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);
        let settings_file = paths_in(&temp_dir).settings_file();
        fs::remove_file(&settings_file).unwrap();
        fs::create_dir(&settings_file).unwrap();

        let next = Settings {
            window_title: "Unsaved".to_string(),
            ..Settings::default()
        };
        assert!(state.apply_settings(next).is_err());
        assert_eq!(state.settings(), &Settings::default());
    }

    #[test]
    fn test_prompt_text_is_stored_as_typed() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = open(&temp_dir);

        let name = crate::non_empty("  Idea ").unwrap();
        let idea = state.add_idea(name).unwrap();
        state.add_feature(idea, " spaced feature").unwrap();
        assert!(crate::non_empty(" \t ").is_none());

        let reloaded = open(&temp_dir);
        assert_eq!(reloaded.ideas().ideas()[0].name, "  Idea ");
        let features: Vec<&str> = reloaded.ideas().ideas()[0].feature_texts().collect();
        assert_eq!(features, vec![" spaced feature"]);
    }
}
