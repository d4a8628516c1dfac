//! Error handling for the TagTrace kiosk
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for TagTrace operations
#[derive(Error, Debug)]
pub enum TagTraceError {
    /// Errors raised by the serial port driver
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Errors related to the visit database
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Errors decoding or encoding JSON payloads
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// The serial link is closed
    #[error("Serial port is not connected")]
    NotConnected,

    /// The serial link already has an open session
    #[error("Serial port is already open")]
    AlreadyOpen,

    /// A stored row could not be turned into a record
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TagTraceError>,
    },
}

impl TagTraceError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TagTraceError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error is a read timeout rather than a broken connection
    pub fn is_timeout(&self) -> bool {
        match self {
            TagTraceError::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            TagTraceError::Serial(e) => {
                e.kind() == serialport::ErrorKind::Io(std::io::ErrorKind::TimedOut)
            }
            TagTraceError::WithContext { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias for TagTrace operations
pub type Result<T> = std::result::Result<T, TagTraceError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TagTraceError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
