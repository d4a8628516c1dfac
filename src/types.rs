//! Core data types for the TagTrace kiosk
//!
//! This module defines the records that flow between the serial link,
//! the visit database and the UI.
//!
//! # Main Types
//!
//! - [`ScanEvent`] - One tag scan decoded from a serial line
//! - [`WorkInfo`] - A registered tag and its physical parameters
//! - [`WorkTrace`] - One row of the append-only visit log
//! - [`DeviceCommand`] - Height/weight payload written back to the reader
//! - [`ConnectionStatus`] - Serial link state shown in the UI

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Text format of the `work_trace.date` column.
///
/// Zero-padded fields in most-significant-first order, so lexical order is
/// chronological order.
pub const TRACE_DATE_FORMAT: &str = "%Y-%m-%d %H-%M-%S%.3f";

/// Format a timestamp the way it is stored in `work_trace.date`
pub fn format_trace_date(time: &DateTime<Local>) -> String {
    time.format(TRACE_DATE_FORMAT).to_string()
}

/// Timestamp for a trace row created now
pub fn trace_date_now() -> String {
    format_trace_date(&Local::now())
}

/// A tag scan received from the reader, e.g. `{"id":"T001","machine":"M1"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Tag identifier read from the card
    pub id: String,
    /// Machine the reader is attached to
    pub machine: String,
}

impl ScanEvent {
    pub fn new(id: impl Into<String>, machine: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            machine: machine.into(),
        }
    }

    /// Decode one serial line
    ///
    /// Surrounding whitespace is ignored. Anything that is not a JSON object
    /// with string `id` and `machine` fields is an error.
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}

/// A registered tag holder
#[derive(Debug, Clone, PartialEq)]
pub struct WorkInfo {
    pub id: String,
    pub name: String,
    /// Height as stored; integers stay integers
    pub height: Number,
    /// Weight as stored; integers stay integers
    pub weight: Number,
}

impl WorkInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        height: impl Into<Number>,
        weight: impl Into<Number>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            height: height.into(),
            weight: weight.into(),
        }
    }

    /// Command that configures the machine for this person
    pub fn device_command(&self) -> DeviceCommand {
        DeviceCommand {
            height: self.height.clone(),
            weight: self.weight.clone(),
        }
    }
}

/// One visit log row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTrace {
    pub id: String,
    pub name: String,
    pub machine: String,
    /// Visit time formatted with [`TRACE_DATE_FORMAT`]
    pub date: String,
}

impl WorkTrace {
    /// Build the trace row for a scan of a registered tag
    pub fn for_visit(info: &WorkInfo, machine: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            machine: machine.into(),
            date: date.into(),
        }
    }
}

/// Payload written back to the reader after a recorded visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub height: Number,
    pub weight: Number,
}

impl DeviceCommand {
    /// Serialize as one newline-terminated JSON line
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Serial link state as shown in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No open session
    #[default]
    Disconnected,
    /// Port open and reader running
    Connected,
    /// The reader hit a connection fault; the port will not be reopened automatically
    Lost,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Lost => write!(f, "Connection lost"),
        }
    }
}
