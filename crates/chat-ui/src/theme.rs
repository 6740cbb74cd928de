//! UI theme constants

use egui::{Color32, CornerRadius, Stroke, Vec2};

pub const BG_PRIMARY: Color32 = Color32::from_rgb(17, 19, 24);
pub const BG_SIDEBAR: Color32 = Color32::from_rgb(12, 13, 17);
pub const BG_SECONDARY: Color32 = Color32::from_rgb(30, 33, 41);
pub const BG_SURFACE: Color32 = Color32::from_rgb(45, 49, 60);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(232, 234, 237);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(154, 160, 166);
pub const ACCENT: Color32 = Color32::from_rgb(66, 133, 244);
pub const USER_BUBBLE: Color32 = Color32::from_rgb(38, 56, 94);
pub const MODEL_BUBBLE: Color32 = BG_SECONDARY;
pub const LINK: Color32 = Color32::from_rgb(138, 180, 248);
pub const SUCCESS: Color32 = Color32::from_rgb(52, 168, 83);
pub const ERROR: Color32 = Color32::from_rgb(234, 67, 53);
pub const WARNING: Color32 = Color32::from_rgb(251, 188, 4);

pub const PANEL_ROUNDING: CornerRadius = CornerRadius::same(6);
pub const BUBBLE_ROUNDING: CornerRadius = CornerRadius::same(12);
pub const CHIP_ROUNDING: CornerRadius = CornerRadius::same(10);
pub const PANEL_PADDING: Vec2 = Vec2::new(12.0, 8.0);

/// Apply the dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = true;
    style.visuals.panel_fill = BG_PRIMARY;
    style.visuals.window_fill = BG_SECONDARY;
    style.visuals.extreme_bg_color = BG_SIDEBAR;
    style.visuals.hyperlink_color = LINK;

    style.visuals.widgets.inactive.bg_fill = BG_SURFACE;
    style.visuals.widgets.inactive.weak_bg_fill = BG_SURFACE;
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    style.visuals.widgets.hovered.bg_fill = BG_SURFACE;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.active.bg_fill = ACCENT;
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);

    style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.35);
    style.visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);
    style.spacing.button_padding = Vec2::new(10.0, 4.0);

    ctx.set_style(style);
}
