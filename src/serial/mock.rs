//! In-memory serial transport
//!
//! Stands in for the tag reader in tests and demos. A [`MockPortHandle`]
//! plays the device side: it queues inbound lines, records everything the
//! application writes, and can inject open failures or read faults.
//!
//! # Example
//!
//! ```ignore
//! use tagtrace_rs::serial::{MockOpener, SerialLink};
//!
//! let (opener, device) = MockOpener::new();
//! let link = SerialLink::new(opener);
//! let (reader, session) = link.open()?;
//!
//! device.push_line(r#"{"id":"T001","machine":"M1"}"#);
//! // ... run the reader loop ...
//! assert_eq!(device.written_lines(), vec![r#"{"height":170,"weight":65}"#]);
//! ```

use super::{PortOpener, SerialTransport};
use crate::error::{Result, TagTraceError};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared device-side state
#[derive(Debug, Default)]
struct MockState {
    /// Bytes waiting for the application to read
    inbound: VecDeque<u8>,
    /// Bytes written by the application
    outbound: Vec<u8>,
    /// Error returned by the next open
    open_error: Option<String>,
    /// Error returned by every read until cleared
    read_error: Option<io::ErrorKind>,
    /// Successful opens so far
    open_count: usize,
}

/// Device-side handle to a mock port
#[derive(Debug, Clone, Default)]
pub struct MockPortHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockPortHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue raw bytes for the application to read
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.state().inbound.extend(bytes.iter().copied());
    }

    /// Queue one line; a trailing newline is added
    pub fn push_line(&self, line: &str) {
        let mut state = self.state();
        state.inbound.extend(line.as_bytes().iter().copied());
        state.inbound.push_back(b'\n');
    }

    /// Number of inbound bytes not yet read
    pub fn pending(&self) -> usize {
        self.state().inbound.len()
    }

    /// Make the next open fail with `message`
    pub fn fail_next_open(&self, message: &str) {
        self.state().open_error = Some(message.to_string());
    }

    /// Make reads fail with `kind` until [`clear_read_error`](Self::clear_read_error)
    pub fn fail_reads(&self, kind: io::ErrorKind) {
        self.state().read_error = Some(kind);
    }

    pub fn clear_read_error(&self) {
        self.state().read_error = None;
    }

    /// Everything written by the application so far
    pub fn written(&self) -> Vec<u8> {
        self.state().outbound.clone()
    }

    /// Written bytes split into lines, newlines removed
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written())
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    /// Successful opens so far
    pub fn open_count(&self) -> usize {
        self.state().open_count
    }
}

/// Application-side mock transport
#[derive(Debug, Clone)]
pub struct MockTransport {
    handle: MockPortHandle,
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.handle.state();
        if let Some(kind) = state.read_error {
            return Err(io::Error::new(kind, "mock read fault"));
        }
        if state.inbound.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }

        let n = buf.len().min(state.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle.state().outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialTransport for MockTransport {
    fn bytes_to_read(&self) -> Result<u32> {
        let state = self.handle.state();
        if let Some(kind) = state.read_error {
            return Err(io::Error::new(kind, "mock read fault").into());
        }
        Ok(state.inbound.len() as u32)
    }

    fn try_clone_transport(&self) -> Result<Box<dyn SerialTransport>> {
        Ok(Box::new(self.clone()))
    }

    fn name(&self) -> Option<String> {
        Some("mock".to_string())
    }
}

/// Opens [`MockTransport`]s that share one [`MockPortHandle`]
#[derive(Debug, Clone)]
pub struct MockOpener {
    handle: MockPortHandle,
}

impl MockOpener {
    /// Create an opener and the device-side handle
    pub fn new() -> (Self, MockPortHandle) {
        let handle = MockPortHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }
}

impl PortOpener for MockOpener {
    fn open(&self) -> Result<Box<dyn SerialTransport>> {
        let mut state = self.handle.state();
        if let Some(message) = state.open_error.take() {
            return Err(TagTraceError::Serial(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                message,
            )));
        }
        state.open_count += 1;
        drop(state);

        Ok(Box::new(MockTransport {
            handle: self.handle.clone(),
        }))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
