//! Frontend module for egui UI
//!
//! A single window with the tag search form and the serial port controls.
//! Background work reports through the [`BackendMessage`] channel, which is
//! drained at the start of every frame.
//!
//! # Main Types
//!
//! - [`TagTraceApp`] - Main application state implementing [`eframe::App`]
//! - [`SearchForm`] - Tag ID input and result labels
//! - [`AppAction`] - Button actions, handled in one place
//!
//! # Submodules
//!
//! - [`dialogs`] - Dialog trait and the notice dialog
//! - [`fonts`] - Hangul-capable font setup
//! - `status_bar` - Bottom status strip

pub mod dialogs;
pub mod fonts;
pub mod search;
pub mod state;
mod status_bar;

pub use search::{SearchForm, TraceLabels};
pub use state::AppAction;

use crossbeam_channel::Receiver;
use dialogs::{show_dialog, NoticeAction, NoticeDialog, NoticeQueue};
use rust_i18n::t;
use status_bar::{render_status_bar, StatusBarContext};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AppConfig;
use crate::notice::{drain, BackendMessage, Notice, NoticeMessage, Notifier};
use crate::reader::{self, ReaderExit};
use crate::serial::{CloseOutcome, SerialLink};
use crate::service::DataService;
use crate::types::{ConnectionStatus, WorkTrace};

/// Main application state
pub struct TagTraceApp {
    // === Communication ===
    link: SerialLink,
    service: Arc<DataService>,
    notifier: Notifier,
    messages: Receiver<BackendMessage>,
    reader: Option<JoinHandle<ReaderExit>>,

    config: AppConfig,

    // === Published state ===
    connection_status: ConnectionStatus,
    last_visit: Option<WorkTrace>,
    /// Set by the close button; a late `Lost` from that session is stale
    closed_by_operator: bool,

    // === Form and dialogs ===
    search: SearchForm,
    notices: NoticeQueue,
}

impl TagTraceApp {
    pub fn new(
        config: AppConfig,
        link: SerialLink,
        service: Arc<DataService>,
        notifier: Notifier,
        messages: Receiver<BackendMessage>,
    ) -> Self {
        Self {
            link,
            service,
            notifier,
            messages,
            reader: None,
            config,
            connection_status: ConnectionStatus::Disconnected,
            last_visit: None,
            closed_by_operator: false,
            search: SearchForm::new(),
            notices: NoticeQueue::default(),
        }
    }

    /// Apply fonts and text scale from the UI config
    pub fn configure_context(&self, ctx: &egui::Context) {
        fonts::install(
            ctx,
            self.config.ui.font_path.as_deref(),
            self.config.ui.font_scale,
        );
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    pub fn last_visit(&self) -> Option<&WorkTrace> {
        self.last_visit.as_ref()
    }

    pub fn search_form(&self) -> &SearchForm {
        &self.search
    }

    pub fn search_form_mut(&mut self) -> &mut SearchForm {
        &mut self.search
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    /// Dismiss the notice on screen
    pub fn acknowledge_notice(&mut self) -> Option<Notice> {
        self.notices.acknowledge()
    }

    /// Apply everything the background sent since the last frame
    ///
    /// Returns true if anything arrived.
    pub fn process_backend_messages(&mut self) -> bool {
        let messages = drain(&self.messages);
        let had_messages = !messages.is_empty();

        for msg in messages {
            match msg {
                BackendMessage::Notice(notice) => {
                    self.notices.push(notice);
                }
                BackendMessage::ConnectionStatus(ConnectionStatus::Lost)
                    if self.closed_by_operator =>
                {
                    tracing::debug!("Ignoring link loss reported after close");
                }
                BackendMessage::ConnectionStatus(status) => {
                    tracing::debug!("Connection status: {}", status);
                    self.connection_status = status;
                }
                BackendMessage::VisitRecorded(trace) => {
                    self.last_visit = Some(trace);
                }
            }
        }

        had_messages
    }

    pub fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Search => {
                if let Some(notice) = self.search.submit(self.service.as_ref()) {
                    self.notices.push(notice);
                }
            }
            AppAction::OpenSerial => self.open_serial(),
            AppAction::CloseSerial => self.close_serial(),
        }
    }

    /// Whether a reader thread is still attached to the app
    pub fn reader_running(&self) -> bool {
        self.reader.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn open_serial(&mut self) {
        self.reap_reader();

        match reader::start(
            &self.link,
            Arc::clone(&self.service),
            self.notifier.clone(),
            self.config.serial.poll_interval(),
        ) {
            Ok(handle) => {
                self.closed_by_operator = false;
                if self.reader.replace(handle).is_some() {
                    // Still finishing a scan from its old session; it stops on its own
                    tracing::debug!("Detached reader of the previous session");
                }
            }
            Err(e) => {
                tracing::error!("Failed to open serial port: {}", e);
                self.notices
                    .push(Notice::error(NoticeMessage::OpenFailed(e.to_string())));
            }
        }
    }

    fn close_serial(&mut self) {
        match self.link.close() {
            CloseOutcome::Closed => {}
            CloseOutcome::AlreadyClosed => {
                self.notices.push(Notice::info(NoticeMessage::AlreadyClosed));
            }
        }

        // Apply what the ended session already reported before overriding the status
        self.process_backend_messages();
        self.closed_by_operator = true;
        self.connection_status = ConnectionStatus::Disconnected;

        // The reader may be inside a database call; it is reaped once it exits
        self.reap_reader();
    }

    /// Join the reader thread if it has already exited
    fn reap_reader(&mut self) {
        if self.reader.as_ref().is_some_and(|h| h.is_finished()) {
            self.join_reader();
        }
    }

    /// Wait for the reader thread; blocks until it exits
    fn join_reader(&mut self) {
        if let Some(handle) = self.reader.take() {
            match handle.join() {
                Ok(exit) => tracing::debug!("Serial reader joined: {:?}", exit),
                Err(_) => tracing::error!("Serial reader panicked"),
            }
        }
    }

    fn render_form(&mut self, ui: &mut egui::Ui) -> Vec<AppAction> {
        let mut actions = Vec::new();

        egui::Grid::new("search_form")
            .num_columns(2)
            .spacing([12.0, 10.0])
            .show(ui, |ui| {
                ui.label(t!("form.tag_id"));
                ui.horizontal(|ui| {
                    let input = ui.text_edit_singleline(&mut self.search.tag_id);
                    let submitted =
                        input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button(t!("form.search")).clicked() || submitted {
                        actions.push(AppAction::Search);
                    }
                });
                ui.end_row();

                let labels = &self.search.labels;
                ui.label(t!("form.name"));
                ui.label(&labels.name);
                ui.end_row();

                ui.label(t!("form.machine"));
                ui.label(&labels.machine);
                ui.end_row();

                ui.label(t!("form.date"));
                ui.label(&labels.date);
                ui.end_row();
            });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if ui.button(t!("form.open_serial")).clicked() {
                actions.push(AppAction::OpenSerial);
            }
            if ui.button(t!("form.close_serial")).clicked() {
                actions.push(AppAction::CloseSerial);
            }
        });

        actions
    }
}

impl eframe::App for TagTraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.process_backend_messages();
        self.reap_reader();

        if had_messages {
            ctx.request_repaint();
        } else if self.link.is_open() {
            // Scans arrive without any input event
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let device = self.link.describe();
            render_status_bar(
                ui,
                &StatusBarContext {
                    connection_status: self.connection_status,
                    device: &device,
                    last_visit: self.last_visit.as_ref(),
                },
            );
        });

        let blocked = !self.notices.is_empty();
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ui.add_enabled_ui(!blocked, |ui| self.render_form(ui)).inner
            })
            .inner;

        for action in actions {
            self.handle_action(action);
        }

        if let Some(NoticeAction::Acknowledged(notice)) =
            show_dialog::<NoticeDialog>(ctx, &mut self.notices, ())
        {
            tracing::debug!("Notice acknowledged: {:?}", notice.message);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        tracing::info!("Shutting down...");
        self.link.close();
        self.join_reader();
    }
}
