//! # TagTrace-RS: RFID visit kiosk
//!
//! Records where tagged people have been and answers "where was this tag
//! last seen?". Tag readers on each machine report scans over a serial link;
//! each scan of a registered tag appends a visit trace and sends the person's
//! height and weight back to the device.
//!
//! ## Architecture
//!
//! - **Serial**: [`serial::SerialLink`] owns the port, shared by the reader
//!   thread and the UI
//! - **Reader**: [`reader`] frames newline-delimited JSON scans on a background
//!   thread
//! - **Service**: [`service::DataService`] records visits and looks up the
//!   latest trace in SQLite
//! - **Frontend**: a single eframe/egui window with the search form
//! - **Communication**: crossbeam channel of [`notice::BackendMessage`]s from
//!   background work to the UI
//!
//! ## Configuration
//!
//! `config.toml`, the visit database and log files live in the platform data
//! directory under `dev.tagtrace.kiosk`:
//!
//! - **Linux**: `~/.local/share/dev.tagtrace.kiosk/`
//! - **macOS**: `~/Library/Application Support/dev.tagtrace.kiosk/`
//! - **Windows**: `%APPDATA%\dev.tagtrace.kiosk\`

// Translations for the t! macro, keyed by dotted path (app.title, form.search, ...)
rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod error;
pub mod frontend;
pub mod i18n;
pub mod notice;
pub mod reader;
pub mod serial;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, TagTraceError};
pub use frontend::TagTraceApp;
pub use notice::{BackendMessage, Notice, Notifier};
pub use serial::SerialLink;
pub use service::{DataService, TraceDb};
pub use types::{ConnectionStatus, ScanEvent, WorkInfo, WorkTrace};
