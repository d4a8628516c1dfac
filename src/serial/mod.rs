//! Serial link to the tag reader
//!
//! The link owns one connection to the microcontroller at a time. The UI
//! opens and closes it explicitly; the reader loop reads from its own clone
//! of the port while the link keeps the write half for device commands.
//!
//! # Components
//!
//! - [`SerialTransport`] - Byte stream with "bytes waiting" and cloning, implemented by
//!   [`SystemPort`] (real hardware) and [`MockTransport`] (in-memory)
//! - [`PortOpener`] - Opens a transport; [`SystemPortOpener`] uses the configured device
//! - [`SerialLink`] - Shared handle with `open` / `close` / `send` / `is_open`
//!
//! # Sessions
//!
//! Every successful [`SerialLink::open`] starts a new session. A reader keeps
//! running only while its session is the current one, so closing and
//! reopening quickly never leaves two readers on the same device.

pub mod mock;
pub mod system;

pub use mock::{MockOpener, MockPortHandle, MockTransport};
pub use system::{available_ports, SystemPort, SystemPortOpener};

use crate::error::{Result, TagTraceError};
use crate::types::DeviceCommand;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Byte stream to the tag reader
///
/// Implementations must be `Send` so the read half can move to the reader thread.
pub trait SerialTransport: Read + Write + Send {
    /// Number of bytes waiting to be read
    fn bytes_to_read(&self) -> Result<u32>;

    /// Open a second handle on the same connection
    fn try_clone_transport(&self) -> Result<Box<dyn SerialTransport>>;

    /// Device name, if known
    fn name(&self) -> Option<String> {
        None
    }
}

/// Opens a connection to the tag reader
pub trait PortOpener: Send + Sync {
    /// Acquire the device
    fn open(&self) -> Result<Box<dyn SerialTransport>>;

    /// Human readable description of the target device
    fn describe(&self) -> String;
}

/// Result of [`SerialLink::close`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// An open session was closed
    Closed,
    /// Nothing was open
    AlreadyClosed,
}

/// Identifies one open/close cycle of the link
pub type SessionId = u64;

struct LinkInner {
    opener: Box<dyn PortOpener>,
    open: AtomicBool,
    session: AtomicU64,
    writer: Mutex<Option<Box<dyn SerialTransport>>>,
}

/// Shared handle to the serial connection
///
/// Cloning is cheap; all clones refer to the same connection.
#[derive(Clone)]
pub struct SerialLink {
    inner: Arc<LinkInner>,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("device", &self.inner.opener.describe())
            .field("open", &self.is_open())
            .field("session", &self.current_session())
            .finish()
    }
}

impl SerialLink {
    /// Create a closed link that opens devices through `opener`
    pub fn new(opener: impl PortOpener + 'static) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                opener: Box::new(opener),
                open: AtomicBool::new(false),
                session: AtomicU64::new(0),
                writer: Mutex::new(None),
            }),
        }
    }

    /// Description of the configured device
    pub fn describe(&self) -> String {
        self.inner.opener.describe()
    }

    /// Whether a session is open
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Id of the most recent session
    pub fn current_session(&self) -> SessionId {
        self.inner.session.load(Ordering::SeqCst)
    }

    /// Whether `session` is still the open session
    pub fn is_session_active(&self, session: SessionId) -> bool {
        self.is_open() && self.current_session() == session
    }

    /// Open the device and start a new session
    ///
    /// Returns the read half and the session id for the reader loop. On
    /// failure the link stays as it was.
    pub fn open(&self) -> Result<(Box<dyn SerialTransport>, SessionId)> {
        let mut writer = self.writer();
        if self.is_open() {
            return Err(TagTraceError::AlreadyOpen);
        }

        let port = self.inner.opener.open()?;
        let reader = port.try_clone_transport()?;

        *writer = Some(port);
        let session = self.inner.session.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.open.store(true, Ordering::SeqCst);

        tracing::info!("Opened serial link {} (session {})", self.describe(), session);
        Ok((reader, session))
    }

    /// Close the current session, if any
    pub fn close(&self) -> CloseOutcome {
        let mut writer = self.writer();
        if !self.inner.open.swap(false, Ordering::SeqCst) {
            return CloseOutcome::AlreadyClosed;
        }
        writer.take();
        tracing::info!("Closed serial link {}", self.describe());
        CloseOutcome::Closed
    }

    /// Close after a fault seen by the reader of `session`
    ///
    /// Returns false when that session had already ended.
    pub fn mark_lost(&self, session: SessionId) -> bool {
        let mut writer = self.writer();
        if !self.is_session_active(session) {
            return false;
        }
        self.inner.open.store(false, Ordering::SeqCst);
        writer.take();
        tracing::warn!("Serial link {} lost (session {})", self.describe(), session);
        true
    }

    /// Write raw bytes to the device
    ///
    /// Fails with [`TagTraceError::NotConnected`] when closed; nothing is queued.
    pub fn send(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = self.writer();
        let port = match writer.as_mut() {
            Some(port) if self.is_open() => port,
            _ => return Err(TagTraceError::NotConnected),
        };
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    /// Send a device command as one JSON line
    pub fn send_command(&self, command: &DeviceCommand) -> Result<()> {
        let line = command.to_line()?;
        self.send(line.as_bytes())?;
        tracing::debug!("Sent device command {}", line.trim_end());
        Ok(())
    }

    fn writer(&self) -> MutexGuard<'_, Option<Box<dyn SerialTransport>>> {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
