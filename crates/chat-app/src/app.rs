//! Main egui application: composes the panels and drives the orchestrator.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use chat_core::event_bus::EventBus;
use chat_core::orchestrator::SendOrchestrator;
use chat_core::ports::{CompletionPort, StoragePort};
use chat_core::store::SessionStore;
use chat_platform::config::{apply_completion_config, load_config, save_config};
use chat_platform::files::{pick_images, PickedFile};
use chat_platform::llm::GeminiProvider;
use chat_platform::storage::auto_detect_storage;
use chat_types::config::{AppConfig, StorageBackendType};
use chat_ui::panels::chat::ChatAction;
use chat_ui::panels::settings::{SaveFeedback, SettingsAction};
use chat_ui::panels::sidebar::SidebarAction;
use chat_ui::panels::{chat, settings, sidebar};
use chat_ui::state::UiState;
use chat_ui::theme;

/// The main application state
pub struct ChatApp {
    ui_state: UiState,
    config: AppConfig,
    /// Where the config itself lives (local storage when reachable)
    config_storage: Rc<dyn StoragePort>,
    event_bus: EventBus,
    orchestrator: Rc<SendOrchestrator>,
    /// Provider the orchestrator currently streams from
    provider: Rc<GeminiProvider>,
    /// Files read by the picker, staged on the next frame
    picked: Rc<RefCell<Vec<PickedFile>>>,
    models: Rc<RefCell<Vec<String>>>,
    save_feedback: Option<SaveFeedback>,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config_storage = auto_detect_storage(StorageBackendType::Auto);
        let config = load_config(config_storage.as_ref());

        let storage = match config.storage.backend {
            StorageBackendType::Memory => auto_detect_storage(StorageBackendType::Memory),
            StorageBackendType::Auto | StorageBackendType::LocalStorage => config_storage.clone(),
        };
        let store = SessionStore::open(storage, config.storage.key.clone());

        let event_bus = EventBus::new();
        let provider = Rc::new(GeminiProvider::new(config.completion.clone()));
        let orchestrator = SendOrchestrator::new(Rc::new(RefCell::new(store)), provider.clone(), event_bus.clone());

        let mut ui_state = UiState::new();
        if !config.completion.has_api_key() {
            ui_state.show_settings = true;
            ui_state.status_text = "Add a Gemini API key in Settings".to_string();
        }

        Self {
            ui_state,
            config,
            config_storage,
            event_bus,
            orchestrator: Rc::new(orchestrator),
            provider,
            picked: Rc::new(RefCell::new(Vec::new())),
            models: Rc::new(RefCell::new(Vec::new())),
            save_feedback: None,
            first_frame: true,
        }
    }

    /// Stage image files dropped onto the window and those the picker
    /// finished reading since the last frame.
    fn stage_incoming_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            let readable = dropped.iter().filter_map(|file| match file.bytes.as_deref() {
                Some(bytes) => Some((file.name.as_str(), file.mime.as_str(), bytes)),
                None => {
                    log::warn!("Dropped file {} has no contents", file.name);
                    None
                }
            });
            self.ui_state.stage_files(readable);
        }

        let picked = std::mem::take(&mut *self.picked.borrow_mut());
        if !picked.is_empty() {
            self.ui_state.stage_files(picked.iter().map(PickedFile::as_parts));
        }
    }

    /// Open the image dialog; the files land in `picked` once read.
    fn open_image_picker(&mut self, ctx: &egui::Context) {
        let picked = self.picked.clone();
        let ctx = ctx.clone();
        let opened = pick_images(move |files| {
            log::debug!("Picker returned {} file(s)", files.len());
            picked.borrow_mut().extend(files);
            ctx.request_repaint();
        });
        if let Err(e) = opened {
            log::error!("Could not open the file dialog: {}", e);
            self.ui_state.notice = Some(e.to_string());
        }
    }

    /// Hand the composer to the orchestrator and stream the reply in the
    /// background.
    fn submit(&mut self, ctx: &egui::Context) {
        let current = self
            .orchestrator
            .store()
            .borrow()
            .current_id()
            .map(str::to_string);

        match self.orchestrator.submit(current.as_deref(), &mut self.ui_state.composer) {
            Ok(pending) => {
                let orchestrator = self.orchestrator.clone();
                let ctx = ctx.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    orchestrator.complete_send(pending).await;
                    ctx.request_repaint();
                });
            }
            Err(reason) => log::debug!("Submit ignored: {:?}", reason),
        }
    }

    fn handle_sidebar(&mut self, action: SidebarAction) {
        match action {
            SidebarAction::None => {}
            SidebarAction::New => {
                self.orchestrator.new_session();
            }
            SidebarAction::Select(id) => {
                self.orchestrator.store().borrow_mut().select_session(&id);
            }
            SidebarAction::Delete(id) => {
                self.orchestrator.delete_session(&id);
            }
        }
    }

    /// Apply edited settings and persist the config. The provider is only
    /// rebuilt when the completion settings changed.
    fn save_settings(&mut self) {
        self.provider = apply_completion_config(&self.orchestrator, &self.provider, &self.config.completion);

        self.save_feedback = Some(match save_config(self.config_storage.as_ref(), &self.config) {
            Ok(()) => SaveFeedback {
                message: "Settings saved".to_string(),
                success: true,
            },
            Err(e) => {
                log::error!("Failed to save config: {}", e);
                SaveFeedback {
                    message: format!("Save failed: {}", e),
                    success: false,
                }
            }
        });

        if !self.ui_state.is_busy() {
            self.ui_state.status_text = "Ready".to_string();
        }
    }

    /// Fetch the model list with the settings as currently edited
    fn fetch_models(&self, ctx: &egui::Context) {
        let provider = GeminiProvider::new(self.config.completion.clone());
        let models = self.models.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            match provider.list_models().await {
                Ok(list) => {
                    log::info!("Fetched {} models", list.len());
                    *models.borrow_mut() = list;
                }
                Err(e) => log::warn!("Could not list models: {}", e),
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        self.stage_incoming_files(ctx);

        // Drain events from the orchestrator
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }

        if self.orchestrator.is_busy() {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(self.ui_state.show_sidebar, "☰")
                    .on_hover_text("Conversations")
                    .clicked()
                {
                    self.ui_state.show_sidebar = !self.ui_state.show_sidebar;
                }
                ui.label(
                    RichText::new("Chat Vault")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.separator();
                let grounding = if self.config.completion.search_grounding { " + Search" } else { "" };
                ui.label(
                    RichText::new(format!("Model: {}{}", self.config.completion.model, grounding))
                        .color(theme::TEXT_SECONDARY)
                        .small(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.ui_state.show_settings, "Settings")
                        .clicked()
                    {
                        self.ui_state.show_settings = !self.ui_state.show_settings;
                    }
                });
            });
        });

        // ── Session sidebar ──────────────────────────────────
        if self.ui_state.show_sidebar {
            let summaries = self.orchestrator.store().borrow().summaries();
            let current = self
                .orchestrator
                .store()
                .borrow()
                .current_id()
                .map(str::to_string);
            let mut action = SidebarAction::None;
            SidePanel::left("session_sidebar")
                .frame(egui::Frame::default().fill(theme::BG_SIDEBAR).inner_margin(theme::PANEL_PADDING))
                .min_width(200.0)
                .max_width(280.0)
                .show(ctx, |ui| {
                    action = sidebar::sidebar_panel(ui, &summaries, current.as_deref());
                });
            self.handle_sidebar(action);
        }

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            let mut action = SettingsAction::None;
            SidePanel::right("settings_panel")
                .min_width(280.0)
                .max_width(350.0)
                .show(ctx, |ui| {
                    let models = self.models.borrow();
                    action = settings::settings_panel(
                        ui,
                        &mut self.config,
                        &models,
                        self.save_feedback.as_ref(),
                    );
                });
            match action {
                SettingsAction::SaveClicked => self.save_settings(),
                SettingsAction::RefreshModels => self.fetch_models(ctx),
                SettingsAction::Changed => self.save_feedback = None,
                SettingsAction::None => {}
            }
        }

        // ── Main content ─────────────────────────────────────
        let mut action = ChatAction::None;
        CentralPanel::default().show(ctx, |ui| {
            let store = self.orchestrator.store().borrow();
            action = chat::chat_panel(ui, &mut self.ui_state, store.current());
        });
        match action {
            ChatAction::Submit => self.submit(ctx),
            ChatAction::AttachImages => self.open_image_picker(ctx),
            ChatAction::None => {}
        }

        // Drop target hint
        if ctx.input(|i| !i.raw.hovered_files.is_empty()) {
            egui::Area::new(egui::Id::new("drop_hint"))
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(
                        RichText::new("Drop images to attach")
                            .color(theme::TEXT_PRIMARY)
                            .size(20.0),
                    );
                });
        }
    }
}
