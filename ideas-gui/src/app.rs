use eframe::egui;
use ideas_core::{
    non_empty, AppState, DialogOutcome, ExpansionState, FeatureId, Geometry, IdeaId, NodeKind,
    SettingsEditor, Theme, TreeNode, WindowPresence, MAX_FONT_SIZE, MIN_FONT_SIZE,
};

/// Font sizes are stored in typographic points
const POINTS_TO_PIXELS: f32 = 4.0 / 3.0;

/// Families offered in the settings dialog
const FONT_FAMILIES: &[&str] = &[
    "Verdana",
    "Sans Serif",
    "Ubuntu",
    "Monospace",
    "Hack",
    "Courier New",
];

const MONOSPACE_FAMILIES: &[&str] = &["Monospace", "Hack", "Courier New", "Courier", "Consolas"];

fn font_family_for(name: &str) -> egui::FontFamily {
    if MONOSPACE_FAMILIES
        .iter()
        .any(|family| family.eq_ignore_ascii_case(name))
    {
        egui::FontFamily::Monospace
    } else {
        egui::FontFamily::Proportional
    }
}

/// What a text prompt will do with its input
#[derive(Clone, Copy, PartialEq)]
enum PromptKind {
    AddIdea,
    RenameIdea(IdeaId),
    AddFeature(IdeaId),
    RenameFeature(IdeaId, FeatureId),
}

impl PromptKind {
    fn title(&self) -> &'static str {
        match self {
            PromptKind::AddIdea => "Add Idea",
            PromptKind::RenameIdea(_) => "Update Project Idea",
            PromptKind::AddFeature(_) => "Add Feature",
            PromptKind::RenameFeature(..) => "Update Feature",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PromptKind::AddIdea => "Enter your project idea:",
            PromptKind::RenameIdea(_) => "Update your project idea:",
            PromptKind::AddFeature(_) => "Enter the feature:",
            PromptKind::RenameFeature(..) => "Update the feature:",
        }
    }
}

struct TextPrompt {
    kind: PromptKind,
    text: String,
    focus_requested: bool,
}

/// Actions picked from the toolbar or a context menu, applied next frame
#[derive(Clone, Copy)]
enum TreeAction {
    Prompt(PromptKind),
    DeleteIdea(IdeaId),
    DeleteFeature(IdeaId, FeatureId),
}

pub struct IdeasApp {
    state: AppState,
    tree: Vec<TreeNode>,
    expansion: ExpansionState,

    presence: WindowPresence,
    last_minimized: Option<bool>,
    window_geometry: Geometry,
    appearance_dirty: bool,
    quit_requested: bool,

    prompt: Option<TextPrompt>,
    settings_editor: Option<SettingsEditor>,

    // Messages
    message: Option<(String, bool)>, // (message, is_error)

    // Pending operations (to avoid borrow checker issues)
    pending_action: Option<TreeAction>,
}

impl IdeasApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut state: AppState) -> Self {
        let warnings = state.take_warnings();
        let message = if warnings.is_empty() {
            None
        } else {
            let text = warnings
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Some((text, true))
        };

        let presence = WindowPresence::at_startup(state.settings().autostart);
        if !presence.is_shown() {
            cc.egui_ctx
                .send_viewport_cmd(egui::ViewportCommand::Minimized(true));
        }

        let tree = state.tree();
        let window_geometry = state.settings().geometry;

        Self {
            state,
            tree,
            expansion: ExpansionState::new(),
            presence,
            last_minimized: None,
            window_geometry,
            appearance_dirty: true,
            quit_requested: false,
            prompt: None,
            settings_editor: None,
            message,
            pending_action: None,
        }
    }

    fn refresh_tree(&mut self) {
        self.tree = self.state.tree();
        self.expansion.retain_existing(&self.tree);
    }

    fn report<T>(&mut self, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("{:#}", e);
                self.message = Some((format!("Error: {:#}", e), true));
                None
            }
        }
    }

    // =========================================================================
    // Window appearance and presence
    // =========================================================================

    fn apply_appearance(&self, ctx: &egui::Context) {
        let settings = self.state.settings();

        let mut visuals = match settings.theme {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
        };
        let alpha = settings.transparency as f32;
        visuals.panel_fill = visuals.panel_fill.gamma_multiply(alpha);
        visuals.window_fill = visuals.window_fill.gamma_multiply(alpha);
        ctx.set_visuals(visuals);

        ctx.send_viewport_cmd(egui::ViewportCommand::Title(
            settings.window_title.clone(),
        ));
    }

    fn tree_font(&self) -> egui::FontId {
        let settings = self.state.settings();
        egui::FontId::new(
            settings.font_size as f32 * POINTS_TO_PIXELS,
            font_family_for(&settings.font_family),
        )
    }

    fn set_presence(&mut self, ctx: &egui::Context, presence: WindowPresence) {
        if presence == self.presence {
            return;
        }
        self.presence = presence;
        match presence {
            WindowPresence::InTray => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
            }
            WindowPresence::Shown => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(false));
                ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            }
        }
    }

    fn handle_viewport_events(&mut self, ctx: &egui::Context) {
        let (close_requested, minimized, outer, inner) = ctx.input(|i| {
            let viewport = i.viewport();
            (
                viewport.close_requested(),
                viewport.minimized,
                viewport.outer_rect,
                viewport.inner_rect,
            )
        });

        if close_requested && !self.quit_requested {
            let (next, cancel) = self.presence.on_close_requested();
            if cancel {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            }
            self.set_presence(ctx, next);
        }

        if minimized != self.last_minimized {
            match minimized {
                Some(true) => self.presence = self.presence.on_minimize(),
                Some(false) if self.last_minimized == Some(true) => {
                    self.presence = self.presence.restore();
                }
                _ => {}
            }
            self.last_minimized = minimized;
        }

        if minimized != Some(true) {
            if let (Some(outer), Some(inner)) = (outer, inner) {
                self.window_geometry = Geometry {
                    x: outer.min.x.round() as i32,
                    y: outer.min.y.round() as i32,
                    width: inner.width().round() as i32,
                    height: inner.height().round() as i32,
                };
            }
        }
    }

    fn quit(&mut self, ctx: &egui::Context) {
        self.quit_requested = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    // =========================================================================
    // Idea operations
    // =========================================================================

    fn apply_action(&mut self, action: TreeAction) {
        match action {
            TreeAction::Prompt(kind) => self.open_prompt(kind),
            TreeAction::DeleteIdea(idea) => {
                let result = self.state.delete_idea(idea);
                if let Some(removed) = self.report(result) {
                    self.refresh_tree();
                    self.message = Some((format!("Deleted '{}'", removed.name), false));
                }
            }
            TreeAction::DeleteFeature(idea, feature) => {
                let result = self.state.delete_feature(idea, feature);
                if self.report(result).is_some() {
                    self.refresh_tree();
                    self.expansion.set_expanded(idea, true);
                }
            }
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let ideas = self.state.ideas();
        let text = match kind {
            PromptKind::RenameIdea(idea) => ideas.get(idea).map(|i| i.name.clone()),
            PromptKind::RenameFeature(idea, feature) => ideas.get(idea).and_then(|i| {
                i.features
                    .iter()
                    .find(|f| f.id == feature)
                    .map(|f| f.text.clone())
            }),
            PromptKind::AddIdea | PromptKind::AddFeature(_) => Some(String::new()),
        };

        match text {
            Some(text) => {
                self.prompt = Some(TextPrompt {
                    kind,
                    text,
                    focus_requested: false,
                });
            }
            None => {
                self.message = Some(("That item no longer exists".to_string(), true));
            }
        }
    }

    fn submit_prompt(&mut self, prompt: TextPrompt) {
        let Some(text) = non_empty(&prompt.text) else {
            return;
        };

        match prompt.kind {
            PromptKind::AddIdea => {
                let result = self.state.add_idea(text);
                if let Some(idea) = self.report(result) {
                    self.refresh_tree();
                    self.expansion.set_expanded(idea, true);
                }
            }
            PromptKind::RenameIdea(idea) => {
                let result = self.state.rename_idea(idea, text);
                if self.report(result).is_some() {
                    self.refresh_tree();
                }
            }
            PromptKind::AddFeature(idea) => {
                let result = self.state.add_feature(idea, text);
                if self.report(result).is_some() {
                    self.refresh_tree();
                    self.expansion.set_expanded(idea, true);
                }
            }
            PromptKind::RenameFeature(idea, feature) => {
                let result = self.state.rename_feature(idea, feature, text);
                if self.report(result).is_some() {
                    self.refresh_tree();
                    self.expansion.set_expanded(idea, true);
                }
            }
        }
    }

    fn finish_settings(&mut self, outcome: DialogOutcome) {
        let DialogOutcome::Confirmed(mut next) = outcome else {
            return;
        };
        next.geometry = self.window_geometry;

        let result = self.state.apply_settings(next);
        if self.report(result).is_some() {
            self.message = Some(("Settings saved".to_string(), false));
        }
        self.appearance_dirty = true;
    }

    // =========================================================================
    // Panels and windows
    // =========================================================================

    fn modal_open(&self) -> bool {
        self.prompt.is_some() || self.settings_editor.is_some()
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        let enabled = !self.modal_open();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.set_enabled(enabled);
                if ui.button("➕ Add Idea").clicked() {
                    self.pending_action = Some(TreeAction::Prompt(PromptKind::AddIdea));
                }

                if ui.button("⚙ Settings").clicked() && self.settings_editor.is_none() {
                    self.settings_editor = Some(SettingsEditor::open(self.state.settings()));
                }

                if ui.button("Exit").clicked() {
                    self.quit(ctx);
                }

                // Show message
                if let Some((msg, is_error)) = &self.message {
                    ui.separator();
                    let color = if *is_error {
                        egui::Color32::RED
                    } else {
                        ui.visuals().weak_text_color()
                    };
                    ui.colored_label(color, msg);
                }
            });
        });
    }

    fn show_tree(&mut self, ui: &mut egui::Ui) {
        let font = self.tree_font();
        let mut action = None;
        let mut toggled = None;

        for node in &self.tree {
            let NodeKind::Idea(idea) = node.kind else {
                continue;
            };
            let open = self.expansion.is_expanded(idea);

            let response = egui::CollapsingHeader::new(
                egui::RichText::new(&node.label).font(font.clone()),
            )
            .id_salt(idea)
            .open(Some(open))
            .show(ui, |ui| {
                for child in &node.children {
                    let NodeKind::Feature { idea, feature } = child.kind else {
                        continue;
                    };
                    let label = ui.add(
                        egui::Label::new(egui::RichText::new(&child.label).font(font.clone()))
                            .sense(egui::Sense::click()),
                    );
                    label.context_menu(|ui| {
                        if ui.button("✏ Update").clicked() {
                            action = Some(TreeAction::Prompt(PromptKind::RenameFeature(
                                idea, feature,
                            )));
                            ui.close_menu();
                        }
                        if ui.button("🗑 Delete").clicked() {
                            action = Some(TreeAction::DeleteFeature(idea, feature));
                            ui.close_menu();
                        }
                    });
                }
            });

            if response.header_response.clicked() {
                toggled = Some((idea, !open));
            }
            response.header_response.context_menu(|ui| {
                if ui.button("✏ Update").clicked() {
                    action = Some(TreeAction::Prompt(PromptKind::RenameIdea(idea)));
                    ui.close_menu();
                }
                if ui.button("🗑 Delete").clicked() {
                    action = Some(TreeAction::DeleteIdea(idea));
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("➕ Add Feature").clicked() {
                    action = Some(TreeAction::Prompt(PromptKind::AddFeature(idea)));
                    ui.close_menu();
                }
            });
        }

        if let Some((idea, open)) = toggled {
            self.expansion.set_expanded(idea, open);
        }
        if action.is_some() {
            self.pending_action = action;
        }
    }

    fn show_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };

        let mut submitted = false;
        let mut cancelled = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        egui::Window::new(prompt.kind.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(prompt.kind.label());
                let response = ui.add(
                    egui::TextEdit::singleline(&mut prompt.text).desired_width(300.0),
                );
                if !prompt.focus_requested {
                    response.request_focus();
                    prompt.focus_requested = true;
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submitted = true;
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        submitted = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if submitted {
            if let Some(prompt) = self.prompt.take() {
                self.submit_prompt(prompt);
            }
        } else if cancelled {
            self.prompt = None;
        }
    }

    fn show_settings_dialog(&mut self, ctx: &egui::Context) {
        let Some(editor) = self.settings_editor.as_mut() else {
            return;
        };

        let mut save = false;
        let mut cancel = false;

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(false)
            .min_width(360.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([20.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Window Transparency");
                        let mut percent = editor.transparency_percent();
                        if ui
                            .add(egui::Slider::new(&mut percent, 10..=100).suffix("%"))
                            .changed()
                        {
                            editor.set_transparency_percent(percent);
                        }
                        ui.end_row();

                        ui.label("Theme");
                        let mut theme = editor.draft().theme;
                        ui.horizontal(|ui| {
                            ui.radio_value(&mut theme, Theme::Light, Theme::Light.label());
                            ui.radio_value(&mut theme, Theme::Dark, Theme::Dark.label());
                        });
                        if theme != editor.draft().theme {
                            editor.set_theme(theme);
                        }
                        ui.end_row();

                        ui.label("Font Family");
                        let mut family = editor.draft().font_family.clone();
                        egui::ComboBox::from_id_salt("font_family_combo")
                            .selected_text(family.as_str())
                            .show_ui(ui, |ui| {
                                for name in FONT_FAMILIES {
                                    ui.selectable_value(&mut family, name.to_string(), *name);
                                }
                            });
                        if family != editor.draft().font_family {
                            editor.set_font_family(family);
                        }
                        ui.end_row();

                        ui.label("Font Size");
                        let mut size = editor.draft().font_size;
                        if ui
                            .add(egui::DragValue::new(&mut size).range(MIN_FONT_SIZE..=MAX_FONT_SIZE))
                            .changed()
                        {
                            editor.set_font_size(size);
                        }
                        ui.end_row();

                        ui.label("Window Title");
                        ui.add(
                            egui::TextEdit::singleline(&mut editor.draft_mut().window_title)
                                .desired_width(200.0),
                        );
                        ui.end_row();

                        ui.label("Start with OS");
                        ui.checkbox(&mut editor.draft_mut().autostart, "");
                        ui.end_row();
                    });

                ui.add_space(10.0);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        save = true;
                    }
                    if ui.button("❌ Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if save {
            if let Some(editor) = self.settings_editor.take() {
                self.finish_settings(editor.confirm());
            }
        } else if cancel {
            if let Some(editor) = self.settings_editor.take() {
                self.finish_settings(editor.cancel());
            }
        }
    }
}

impl eframe::App for IdeasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_viewport_events(ctx);

        if self.appearance_dirty {
            self.apply_appearance(ctx);
            self.appearance_dirty = false;
        }

        // Handle pending operations (to avoid borrow checker issues)
        if let Some(action) = self.pending_action.take() {
            self.apply_action(action);
        }

        self.show_top_panel(ctx);

        let enabled = !self.modal_open();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_enabled(enabled);
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.tree.is_empty() {
                        ui.weak("No ideas yet. Use \"Add Idea\" to record one.");
                    } else {
                        self.show_tree(ui);
                    }
                });
        });

        self.show_prompt(ctx);
        self.show_settings_dialog(ctx);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_family_mapping() {
        assert_eq!(font_family_for("Hack"), egui::FontFamily::Monospace);
        assert_eq!(font_family_for("monospace"), egui::FontFamily::Monospace);
        assert_eq!(font_family_for("Verdana"), egui::FontFamily::Proportional);
    }
}
