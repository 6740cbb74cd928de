//! Sidebar: session list with new / select / delete.

use egui::{self, RichText, ScrollArea, Vec2};
use chat_types::session::SessionSummary;
use crate::theme::*;

/// What the caller should do after rendering the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    None,
    New,
    Select(String),
    Delete(String),
}

/// Render the session list. Returns at most one action per frame.
pub fn sidebar_panel(
    ui: &mut egui::Ui,
    sessions: &[SessionSummary],
    current: Option<&str>,
) -> SidebarAction {
    let mut action = SidebarAction::None;

    ui.add_space(8.0);
    let new_btn = ui.add_sized(
        Vec2::new(ui.available_width(), 32.0),
        egui::Button::new(RichText::new("+ New Conversation").color(TEXT_PRIMARY).strong())
            .fill(ACCENT)
            .corner_radius(PANEL_ROUNDING),
    );
    if new_btn.clicked() {
        action = SidebarAction::New;
    }

    ui.add_space(8.0);
    ui.label(RichText::new("Recent").color(TEXT_SECONDARY).small());
    ui.add_space(2.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for summary in sessions {
                let selected = current == Some(summary.id.as_str());
                let fill = if selected { BG_SURFACE } else { BG_SIDEBAR };

                egui::Frame::default()
                    .fill(fill)
                    .corner_radius(PANEL_ROUNDING)
                    .inner_margin(6.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            let title = ui.add(
                                egui::Label::new(RichText::new(&summary.title).color(TEXT_PRIMARY))
                                    .truncate()
                                    .sense(egui::Sense::click()),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                let delete = ui
                                    .small_button(RichText::new("🗑").color(TEXT_SECONDARY))
                                    .on_hover_text("Delete conversation");
                                if delete.clicked() {
                                    action = SidebarAction::Delete(summary.id.clone());
                                }
                            });
                            if title.clicked() && !selected {
                                action = SidebarAction::Select(summary.id.clone());
                            }
                        });
                        ui.label(
                            RichText::new(session_subtitle(summary))
                                .color(TEXT_SECONDARY)
                                .small(),
                        );
                    });
                ui.add_space(2.0);
            }
        });

    action
}

/// "12 messages · Mar 04, 14:05" in local time
pub fn session_subtitle(summary: &SessionSummary) -> String {
    let when = summary
        .last_modified
        .with_timezone(&chrono::Local)
        .format("%b %d, %H:%M");
    match summary.message_count {
        0 => format!("Empty · {}", when),
        1 => format!("1 message · {}", when),
        n => format!("{} messages · {}", n, when),
    }
}
