//! Serial reader loop
//!
//! One background thread per open serial session. It drains the port, frames
//! the input on newlines, decodes each line as a [`ScanEvent`] and hands valid
//! scans to the [`DataService`]. It never touches UI state; anything the
//! operator should see goes through the [`Notifier`].
//!
//! # Termination
//!
//! The loop stops when:
//!
//! - the link is closed (or reopened as a new session), noticed on the next poll
//! - the port reports a fault other than a read timeout; the link is then
//!   marked lost and is not reopened automatically

use crate::error::{Result, TagTraceError};
use crate::notice::Notifier;
use crate::serial::{SerialLink, SerialTransport, SessionId};
use crate::service::DataService;
use crate::types::{ConnectionStatus, ScanEvent};
use std::io::Read;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Size of a single read from the port
const READ_CHUNK: usize = 256;

/// Longest line kept while waiting for its newline
///
/// Longer runs without a newline are discarded as noise.
pub const MAX_LINE_LEN: usize = 4096;

/// Why the reader loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The session was closed by the operator
    Closed,
    /// The port faulted; the link was marked lost
    ConnectionLost,
}

/// What happened to one framed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line, ignored
    Empty,
    /// Decoded and dispatched
    Scan(ScanEvent),
    /// Not a scan event; logged and dropped
    Malformed(String),
}

/// Decode one framed line
pub fn decode_line(raw: &[u8]) -> LineOutcome {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.trim(),
        Err(_) => return LineOutcome::Malformed(String::from_utf8_lossy(raw).trim().to_string()),
    };

    if text.is_empty() {
        return LineOutcome::Empty;
    }

    match ScanEvent::from_line(text) {
        Ok(event) => LineOutcome::Scan(event),
        Err(_) => LineOutcome::Malformed(text.to_string()),
    }
}

/// Splits a byte stream into newline-terminated lines
#[derive(Debug, Default)]
pub struct LineFramer {
    partial: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and return every completed line, without the newline
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' {
                lines.push(std::mem::take(&mut self.partial));
            } else if self.partial.len() < MAX_LINE_LEN {
                self.partial.push(byte);
            } else {
                tracing::warn!("Discarding {} bytes without a newline", self.partial.len());
                self.partial.clear();
            }
        }
        lines
    }

    /// Bytes of the unfinished line
    pub fn pending(&self) -> usize {
        self.partial.len()
    }
}

/// The reader loop for one serial session
pub struct ReaderLoop {
    link: SerialLink,
    session: SessionId,
    port: Box<dyn SerialTransport>,
    service: Arc<DataService>,
    notifier: Notifier,
    poll_interval: Duration,
    framer: LineFramer,
}

impl ReaderLoop {
    pub fn new(
        link: SerialLink,
        session: SessionId,
        port: Box<dyn SerialTransport>,
        service: Arc<DataService>,
        notifier: Notifier,
        poll_interval: Duration,
    ) -> Self {
        Self {
            link,
            session,
            port,
            service,
            notifier,
            poll_interval,
            framer: LineFramer::new(),
        }
    }

    /// Run until the session ends
    pub fn run(mut self) -> ReaderExit {
        tracing::info!("Serial reader started (session {})", self.session);

        let exit = loop {
            if !self.link.is_session_active(self.session) {
                break ReaderExit::Closed;
            }

            match self.poll_once() {
                Ok(0) => std::thread::sleep(self.poll_interval),
                Ok(_) => {}
                Err(e) => {
                    // A close racing with a read shows up as an error too
                    if !self.link.is_session_active(self.session) {
                        break ReaderExit::Closed;
                    }
                    tracing::error!("Serial connection lost: {}", e);
                    if self.link.mark_lost(self.session) {
                        self.notifier.status(ConnectionStatus::Lost);
                    }
                    break ReaderExit::ConnectionLost;
                }
            }
        };

        tracing::info!("Serial reader stopped (session {}): {:?}", self.session, exit);
        exit
    }

    /// Read whatever is waiting and process complete lines
    ///
    /// Returns the number of bytes read. Read timeouts count as zero bytes.
    pub fn poll_once(&mut self) -> Result<usize> {
        let waiting = match self.port.bytes_to_read() {
            Ok(n) => n as usize,
            Err(e) if e.is_timeout() => return Ok(0),
            Err(e) => return Err(e),
        };
        if waiting == 0 {
            return Ok(0);
        }

        let mut buf = vec![0u8; waiting.min(READ_CHUNK)];
        let n = match self.port.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Ok(0),
            Err(e) => return Err(TagTraceError::Io(e)),
        };

        for line in self.framer.push(&buf[..n]) {
            // Lines framed after a close belong to no session
            if !self.link.is_session_active(self.session) {
                tracing::debug!("Session {} ended, dropping buffered lines", self.session);
                break;
            }
            self.handle_line(&line);
        }
        Ok(n)
    }

    fn handle_line(&self, raw: &[u8]) {
        tracing::debug!("Serial line: {}", String::from_utf8_lossy(raw).trim_end());

        match decode_line(raw) {
            LineOutcome::Empty => {}
            LineOutcome::Scan(event) => {
                self.service.record_visit(&event, &self.link, &self.notifier);
            }
            LineOutcome::Malformed(line) => {
                tracing::warn!("Received (not JSON): {}", line);
            }
        }
    }
}

/// Open the link and spawn its reader thread
///
/// On success the UI is told the link is connected.
pub fn start(
    link: &SerialLink,
    service: Arc<DataService>,
    notifier: Notifier,
    poll_interval: Duration,
) -> Result<JoinHandle<ReaderExit>> {
    let (port, session) = link.open()?;

    let reader = ReaderLoop::new(
        link.clone(),
        session,
        port,
        service,
        notifier.clone(),
        poll_interval,
    );

    // Published before the thread exists so a fast `Lost` cannot overtake it
    notifier.status(ConnectionStatus::Connected);

    std::thread::Builder::new()
        .name("serial-reader".to_string())
        .spawn(move || reader.run())
        .map_err(|e| {
            link.close();
            notifier.status(ConnectionStatus::Disconnected);
            TagTraceError::Io(e).with_context("Failed to spawn serial reader")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::MockOpener;
    use crate::service::TraceDb;
    use crate::types::WorkInfo;

    #[test]
    fn test_lines_after_close_are_not_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let db = TraceDb::new(dir.path().join("visits.db"));
        db.initialize().unwrap();
        db.connect()
            .unwrap()
            .upsert_work_info(&WorkInfo::new("T001", "Kim", 170, 65))
            .unwrap();

        let (opener, device) = MockOpener::new();
        let link = SerialLink::new(opener);
        let (port, session) = link.open().unwrap();
        let (notifier, rx) = Notifier::channel();
        let mut reader = ReaderLoop::new(
            link.clone(),
            session,
            port,
            Arc::new(DataService::new(db.clone())),
            notifier,
            Duration::from_millis(1),
        );

        device.push_line("{\"id\":\"T001\",\"machine\":\"M1\"}");
        device.push_line("{\"id\":\"T001\",\"machine\":\"M2\"}");
        link.close();

        assert!(reader.poll_once().unwrap() > 0);
        assert_eq!(db.connect().unwrap().count_traces("T001").unwrap(), 0);
        assert!(device.written().is_empty());
        assert!(crate::notice::drain(&rx).is_empty());
    }

    #[test]
    fn test_decode_valid_scan() {
        assert_eq!(
            decode_line(b"{\"id\":\"T001\",\"machine\":\"M1\"}\r"),
            LineOutcome::Scan(ScanEvent::new("T001", "M1"))
        );
    }

    #[test]
    fn test_decode_not_json() {
        assert_eq!(
            decode_line(b"not json"),
            LineOutcome::Malformed("not json".to_string())
        );
    }

    #[test]
    fn test_decode_blank_and_invalid_utf8() {
        assert_eq!(decode_line(b"  \r"), LineOutcome::Empty);
        assert!(matches!(
            decode_line(&[0xff, 0xfe, b'{']),
            LineOutcome::Malformed(_)
        ));
    }

    #[test]
    fn test_framer_splits_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"{\"id\":\"T0").is_empty());
        assert_eq!(framer.pending(), 9);

        let lines = framer.push(b"01\"}\nnext\npart");
        assert_eq!(lines, vec![b"{\"id\":\"T001\"}".to_vec(), b"next".to_vec()]);
        assert_eq!(framer.pending(), 4);
    }

    #[test]
    fn test_framer_discards_overlong_noise() {
        let mut framer = LineFramer::new();
        let noise = vec![b'x'; MAX_LINE_LEN + 10];
        assert!(framer.push(&noise).is_empty());
        assert!(framer.pending() < MAX_LINE_LEN);

        let lines = framer.push(b"\n");
        assert_eq!(lines.len(), 1);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_framing_is_chunking_independent(
            bytes in prop::collection::vec(any::<u8>(), 0..512),
            split in 0usize..512
        ) {
            let split = split.min(bytes.len());

            let mut whole = LineFramer::new();
            let expected = whole.push(&bytes);

            let mut chunked = LineFramer::new();
            let mut lines = chunked.push(&bytes[..split]);
            lines.extend(chunked.push(&bytes[split..]));

            prop_assert_eq!(lines, expected);
            prop_assert_eq!(chunked.pending(), whole.pending());
        }

        #[test]
        fn test_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode_line(&bytes);
        }

        #[test]
        fn test_scan_lines_decode(id in "[A-Za-z0-9]{1,12}", machine in "[A-Za-z0-9 ]{1,12}") {
            let line = format!("{{\"id\":\"{}\",\"machine\":\"{}\"}}", id, machine);
            prop_assert_eq!(
                decode_line(line.as_bytes()),
                LineOutcome::Scan(ScanEvent::new(id, machine))
            );
        }
    }
}
