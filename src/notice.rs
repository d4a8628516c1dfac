//! User-facing notices and the background → UI message channel
//!
//! Background work (the serial reader, the data service) never touches UI
//! state. It publishes [`BackendMessage`]s through a [`Notifier`]; the UI
//! drains them once per frame.

use crate::types::{ConnectionStatus, WorkTrace};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use rust_i18n::t;

/// Capacity of the background → UI channel
pub const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Severity of a notice, mapped to the dialog style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Localized dialog title
    pub fn title(&self) -> String {
        match self {
            NoticeLevel::Info => t!("notice.info_title").into_owned(),
            NoticeLevel::Warning => t!("notice.warning_title").into_owned(),
            NoticeLevel::Error => t!("notice.error_title").into_owned(),
        }
    }
}

/// What a notice is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeMessage {
    /// Search submitted without a tag ID
    EmptyTagId,
    /// Search found no trace rows
    NoData,
    /// A scanned tag has no `work_info` row
    UnregisteredCard,
    /// A device command could not be sent because the link is closed
    NotConnected,
    /// Close requested on a closed link
    AlreadyClosed,
    /// The serial port could not be opened
    OpenFailed(String),
    /// The database could not be prepared
    DatabaseUnavailable(String),
}

impl NoticeMessage {
    /// Localized message text
    pub fn text(&self) -> String {
        match self {
            NoticeMessage::EmptyTagId => t!("notice.empty_tag_id").into_owned(),
            NoticeMessage::NoData => t!("notice.no_data").into_owned(),
            NoticeMessage::UnregisteredCard => t!("notice.unregistered_card").into_owned(),
            NoticeMessage::NotConnected => t!("notice.not_connected").into_owned(),
            NoticeMessage::AlreadyClosed => t!("notice.already_closed").into_owned(),
            NoticeMessage::OpenFailed(error) => {
                t!("notice.open_failed", error = error).into_owned()
            }
            NoticeMessage::DatabaseUnavailable(error) => {
                t!("notice.database_unavailable", error = error).into_owned()
            }
        }
    }
}

/// A modal notice shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: NoticeMessage,
}

impl Notice {
    pub fn info(message: NoticeMessage) -> Self {
        Self {
            level: NoticeLevel::Info,
            message,
        }
    }

    pub fn warning(message: NoticeMessage) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message,
        }
    }

    pub fn error(message: NoticeMessage) -> Self {
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }
}

/// Message sent from background work to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum BackendMessage {
    /// Show a notice
    Notice(Notice),
    /// Serial link status changed
    ConnectionStatus(ConnectionStatus),
    /// A scan was matched and its trace row committed
    VisitRecorded(WorkTrace),
}

/// Sending side of the background → UI channel
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Sender<BackendMessage>,
}

impl Notifier {
    /// Create a notifier and the UI-side receiver
    pub fn channel() -> (Self, Receiver<BackendMessage>) {
        let (sender, receiver) = bounded(MESSAGE_CHANNEL_CAPACITY);
        (Self { sender }, receiver)
    }

    /// Publish a message without blocking
    ///
    /// A full queue drops the message; a closed UI is ignored.
    pub fn send(&self, msg: BackendMessage) {
        match self.sender.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                tracing::warn!("UI message queue full, dropping {:?}", msg);
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("UI receiver gone, message dropped");
            }
        }
    }

    pub fn notice(&self, notice: Notice) {
        self.send(BackendMessage::Notice(notice));
    }

    pub fn info(&self, message: NoticeMessage) {
        self.notice(Notice::info(message));
    }

    pub fn warning(&self, message: NoticeMessage) {
        self.notice(Notice::warning(message));
    }

    pub fn error(&self, message: NoticeMessage) {
        self.notice(Notice::error(message));
    }

    pub fn status(&self, status: ConnectionStatus) {
        self.send(BackendMessage::ConnectionStatus(status));
    }
}

/// Drain all pending messages without blocking
pub fn drain(receiver: &Receiver<BackendMessage>) -> Vec<BackendMessage> {
    let mut messages = Vec::new();
    while let Ok(msg) = receiver.try_recv() {
        messages.push(msg);
    }
    messages
}
