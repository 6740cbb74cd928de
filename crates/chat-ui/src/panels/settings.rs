//! Settings panel: Gemini model and key, prompt, sampling, storage backend.

use egui::{self, RichText, Vec2};
use chat_types::config::{AppConfig, CompletionConfig, StorageBackendType};
use crate::theme::*;

/// What the caller should do after rendering the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    /// Nothing changed
    None,
    /// A field was edited; nothing is applied until Save
    Changed,
    /// The user clicked Save
    SaveClicked,
    /// The user asked for the model list
    RefreshModels,
}

/// Save feedback passed in from the app layer
#[derive(Debug, Clone)]
pub struct SaveFeedback {
    pub message: String,
    pub success: bool,
}

/// Render the settings panel. `models` is the last fetched model list,
/// possibly empty.
pub fn settings_panel(
    ui: &mut egui::Ui,
    config: &mut AppConfig,
    models: &[String],
    save_feedback: Option<&SaveFeedback>,
) -> SettingsAction {
    let mut changed = false;
    let mut save_clicked = false;
    let mut refresh = false;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Settings").color(TEXT_PRIMARY));
            ui.separator();

            // ── Gemini ───────────────────────────────────────
            ui.label(RichText::new("Gemini").color(ACCENT).strong());
            ui.add_space(2.0);

            ui.label(RichText::new("Model").color(TEXT_SECONDARY).small());
            ui.horizontal(|ui| {
                if ui.text_edit_singleline(&mut config.completion.model).changed() {
                    changed = true;
                }
                if ui.small_button("⟳").on_hover_text("Fetch available models").clicked() {
                    refresh = true;
                }
            });
            if !models.is_empty() {
                egui::ComboBox::from_id_salt("gemini_model")
                    .selected_text("Pick a model")
                    .show_ui(ui, |ui| {
                        for model in models {
                            if ui
                                .selectable_value(&mut config.completion.model, model.clone(), model)
                                .changed()
                            {
                                changed = true;
                            }
                        }
                    });
            }

            ui.add_space(4.0);

            // API Key (masked)
            ui.label(RichText::new("API Key").color(TEXT_SECONDARY).small());
            let api_key_edit = egui::TextEdit::singleline(&mut config.completion.api_key)
                .password(true)
                .hint_text("AIza...");
            if ui.add(api_key_edit).changed() {
                changed = true;
            }

            ui.add_space(4.0);

            ui.label(RichText::new("API Base URL (optional)").color(TEXT_SECONDARY).small());
            let mut base_url = config.completion.api_base.clone().unwrap_or_default();
            if ui
                .add(
                    egui::TextEdit::singleline(&mut base_url)
                        .hint_text(CompletionConfig::DEFAULT_BASE_URL),
                )
                .changed()
            {
                config.completion.api_base = if base_url.trim().is_empty() {
                    None
                } else {
                    Some(base_url)
                };
                changed = true;
            }

            ui.add_space(4.0);

            ui.label(RichText::new("System Prompt").color(TEXT_SECONDARY).small());
            if ui
                .add(
                    egui::TextEdit::multiline(&mut config.completion.system_prompt)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                changed = true;
            }

            ui.add_space(4.0);

            ui.label(RichText::new("Temperature").color(TEXT_SECONDARY).small());
            if ui
                .add(egui::Slider::new(&mut config.completion.temperature, 0.0..=2.0))
                .changed()
            {
                changed = true;
            }

            if ui
                .checkbox(&mut config.completion.search_grounding, "Ground answers with Google Search")
                .changed()
            {
                changed = true;
            }

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(4.0);

            // ── Storage ──────────────────────────────────────
            ui.label(RichText::new("Storage").color(ACCENT).strong());
            ui.add_space(2.0);

            ui.label(RichText::new("Backend").color(TEXT_SECONDARY).small());
            egui::ComboBox::from_id_salt("storage_backend")
                .selected_text(config.storage.backend.label())
                .show_ui(ui, |ui| {
                    for backend in StorageBackendType::all() {
                        if ui
                            .selectable_value(&mut config.storage.backend, *backend, backend.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });

            ui.add_space(4.0);
            ui.label(
                RichText::new(config.storage.backend.description())
                    .color(TEXT_SECONDARY)
                    .small()
                    .italics(),
            );
            ui.label(
                RichText::new("Backend changes apply on next reload.")
                    .color(TEXT_SECONDARY)
                    .small(),
            );

            // ── Save Button ──────────────────────────────────
            ui.add_space(16.0);
            ui.separator();
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let btn = ui.add(
                    egui::Button::new(
                        RichText::new("Save Settings")
                            .color(TEXT_PRIMARY)
                            .strong(),
                    )
                    .fill(ACCENT)
                    .corner_radius(PANEL_ROUNDING)
                    .min_size(Vec2::new(120.0, 28.0)),
                );
                if btn.clicked() {
                    save_clicked = true;
                }

                if let Some(fb) = save_feedback {
                    let color = if fb.success { SUCCESS } else { ERROR };
                    ui.label(RichText::new(&fb.message).color(color).small());
                }
            });
        });

    if save_clicked {
        SettingsAction::SaveClicked
    } else if refresh {
        SettingsAction::RefreshModels
    } else if changed {
        SettingsAction::Changed
    } else {
        SettingsAction::None
    }
}
