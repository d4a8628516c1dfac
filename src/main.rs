//! TagTrace kiosk - Main Entry Point
//!
//! Loads the config, prepares logging and the visit database, then runs the
//! search window. The serial port stays closed until the operator opens it.

use anyhow::Context as _;
use rust_i18n::t;
use std::sync::Arc;
use tagtrace_rs::{
    config::{self, AppConfig, LoggingConfig},
    frontend::TagTraceApp,
    i18n,
    notice::{NoticeMessage, Notifier},
    serial::{self, SerialLink, SystemPortOpener},
    service::{DataService, TraceDb},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

rust_i18n::i18n!("locales", fallback = "en");

/// Console logging plus an optional daily rolling file
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tagtrace_rs=debug"));

    let (file_layer, guard) = match logging.file_enabled.then(|| logging.resolved_directory()) {
        Some(Some(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, "tagtrace.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_or_default();
    let _log_guard = init_logging(&config.logging);

    tracing::info!("Starting TagTrace kiosk");
    if let Some(path) = config::config_path() {
        tracing::info!("Config: {:?}", path);
    }

    i18n::set_language(config.ui.language);
    tracing::debug!("Available serial ports: {:?}", serial::available_ports());

    let (notifier, messages) = Notifier::channel();

    let db = TraceDb::new(config.database.resolved_path());
    if let Err(e) = db.initialize() {
        // Keep running; every visit and lookup will log its own failure
        tracing::error!("Visit database unavailable: {}", e);
        notifier.error(NoticeMessage::DatabaseUnavailable(e.to_string()));
    }
    let service = Arc::new(DataService::new(db));

    let link = SerialLink::new(SystemPortOpener::new(config.serial.clone()));
    tracing::info!("Serial device: {}", link.describe());

    let title = t!("app.title").into_owned();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.ui.window_size)
            .with_min_inner_size([400.0, 300.0])
            .with_title(&title),
        ..Default::default()
    };

    let app = TagTraceApp::new(config, link, service, notifier, messages);

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            app.configure_context(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
    .context("UI event loop failed")?;

    tracing::info!("TagTrace kiosk stopped");
    Ok(())
}
