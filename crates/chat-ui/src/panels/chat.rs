//! Chat panel: transcript, staged attachments and the input row.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use chat_core::attachments::parse_data_uri;
use chat_types::message::{Message, Role};
use chat_types::session::ChatSession;
use crate::state::UiState;
use crate::theme::*;

/// Prompts offered on an empty session; clicking one fills the input.
pub const SUGGESTIONS: &[&str] = &[
    "Summarize today's top technology news",
    "Explain how HTTPS keeps my data private",
    "Plan a three-day trip to Lisbon",
    "Describe what is in the image I attach",
];

/// What the caller should do after rendering the chat panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    None,
    /// Send the composer (Send button or Enter)
    Submit,
    /// Open the image file dialog
    AttachImages,
}

/// Render the chat panel for `session`.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState, session: Option<&ChatSession>) -> ChatAction {
    let mut action = ChatAction::None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header
                ui.horizontal(|ui| {
                    let title = session.map_or("No conversation", |s| s.title.as_str());
                    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status_color = if state.last_error.is_some() {
                            ERROR
                        } else if state.is_busy() {
                            WARNING
                        } else {
                            SUCCESS
                        };
                        ui.label(RichText::new(&state.status_text).color(status_color).small());
                    });
                });

                ui.separator();

                // Transcript
                let reserved = if state.composer.staging.is_empty() { 60.0 } else { 100.0 };
                let available_height = ui.available_height() - reserved;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| match session {
                        Some(session) if !session.messages.is_empty() => {
                            for message in &session.messages {
                                render_message(ui, message, state.is_streaming(&message.id));
                                ui.add_space(6.0);
                            }
                        }
                        _ => render_suggestions(ui, state),
                    });

                ui.add_space(8.0);

                render_staging(ui, state);

                if let Some(notice) = &state.notice {
                    ui.label(RichText::new(notice).color(WARNING).small());
                }

                // Input row
                ui.horizontal(|ui| {
                    if ui
                        .add(
                            egui::Button::new(RichText::new("🖼").color(TEXT_PRIMARY))
                                .fill(BG_SURFACE)
                                .corner_radius(PANEL_ROUNDING),
                        )
                        .on_hover_text("Attach images")
                        .clicked()
                    {
                        action = ChatAction::AttachImages;
                    }

                    let input = egui::TextEdit::singleline(&mut state.composer.text)
                        .hint_text("Ask anything, or attach an image...")
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));
                    let response = ui.add(input);

                    let send_enabled = state.can_submit();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if (enter && send_enabled) || send_btn.clicked() {
                        action = ChatAction::Submit;
                        response.request_focus();
                    }
                });
            });
        });

    action
}

fn render_message(ui: &mut egui::Ui, message: &Message, streaming: bool) {
    let (label, label_color, bg) = match message.role {
        Role::User => ("You", ACCENT, USER_BUBBLE),
        Role::Model => ("Gemini", SUCCESS, MODEL_BUBBLE),
        Role::System => ("System", WARNING, BG_SURFACE),
    };

    egui::Frame::default()
        .fill(bg)
        .corner_radius(BUBBLE_ROUNDING)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(label).color(label_color).strong().small());
                ui.label(
                    RichText::new(message.timestamp.with_timezone(&chrono::Local).format("%H:%M").to_string())
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            });

            if !message.attachments.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for uri in &message.attachments {
                        chip(ui, &attachment_label(uri));
                    }
                });
            }

            if message.text.is_empty() && streaming {
                // Typing indicator until the first fragment lands
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Thinking...").color(TEXT_SECONDARY).italics());
                });
            } else {
                ui.label(RichText::new(&message.text).color(TEXT_PRIMARY));
                if streaming {
                    ui.label(RichText::new("▌").color(ACCENT).strong());
                }
            }

            let sources = message.sources();
            if !sources.is_empty() {
                ui.add_space(4.0);
                ui.label(RichText::new("Sources").color(TEXT_SECONDARY).small());
                ui.horizontal_wrapped(|ui| {
                    for (i, source) in sources.iter().enumerate() {
                        ui.hyperlink_to(format!("[{}] {}", i + 1, source_label(&source.title)), &source.uri)
                            .on_hover_text(&source.uri);
                    }
                });
            }
        });
}

fn render_suggestions(ui: &mut egui::Ui, state: &mut UiState) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new("How can I help today?").color(TEXT_PRIMARY).size(20.0));
        ui.add_space(12.0);
        for suggestion in SUGGESTIONS {
            let btn = ui.add(
                egui::Button::new(RichText::new(*suggestion).color(TEXT_PRIMARY))
                    .fill(BG_SECONDARY)
                    .corner_radius(PANEL_ROUNDING)
                    .min_size(Vec2::new(320.0, 28.0)),
            );
            if btn.clicked() {
                state.composer.text = suggestion.to_string();
            }
        }
    });
}

/// Staged attachments with a remove button each.
fn render_staging(ui: &mut egui::Ui, state: &mut UiState) {
    if state.composer.staging.is_empty() {
        return;
    }
    let mut remove = None;
    ui.horizontal_wrapped(|ui| {
        for (index, uri) in state.composer.staging.iter().enumerate() {
            chip(ui, &attachment_label(uri));
            if ui.small_button("✕").on_hover_text("Remove").clicked() {
                remove = Some(index);
            }
        }
    });
    if let Some(index) = remove {
        state.composer.staging.remove(index);
    }
}

fn chip(ui: &mut egui::Ui, text: &str) {
    egui::Frame::default()
        .fill(BG_SURFACE)
        .corner_radius(CHIP_ROUNDING)
        .inner_margin(Vec2::new(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).color(TEXT_SECONDARY).small());
        });
}

/// Short description of an attached image, e.g. `🖼 image/png · 12 KB`.
pub fn attachment_label(uri: &str) -> String {
    match parse_data_uri(uri) {
        Ok(inline) => {
            let bytes = inline.data.len() / 4 * 3;
            format!("🖼 {} · {}", inline.mime_type, format_size(bytes))
        }
        Err(_) => "🖼 attachment".to_string(),
    }
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Source titles fall back to the URI; very long ones are cut.
pub fn source_label(title: &str) -> String {
    const MAX: usize = 40;
    if title.chars().count() <= MAX {
        title.to_string()
    } else {
        let cut: String = title.chars().take(MAX - 1).collect();
        format!("{}…", cut)
    }
}
