//! Data service: visit recording and trace lookup
//!
//! Two operations share this service but no in-memory state:
//!
//! - [`DataService::record_visit`] - write path, driven by tag scans on the reader thread
//! - [`DataService::lookup_latest_trace`] - read path, driven by the search button
//!
//! Each call opens and closes its own database connection. Database errors
//! are logged and swallowed; neither the UI nor the device sees them.

pub mod db;

pub use db::{DbSession, TraceDb};

use crate::error::Result;
use crate::notice::{BackendMessage, NoticeMessage, Notifier};
use crate::serial::SerialLink;
use crate::types::{trace_date_now, DeviceCommand, ScanEvent, WorkTrace};

/// Result of [`DataService::record_visit`]
#[derive(Debug, Clone, PartialEq)]
pub enum VisitOutcome {
    /// Trace committed; `command_sent` is false when the link was closed
    Recorded {
        trace: WorkTrace,
        command: DeviceCommand,
        command_sent: bool,
    },
    /// No `work_info` row for the tag
    Unregistered,
    /// A database error aborted the visit
    Failed,
}

/// Read access used by the search form
#[cfg_attr(test, mockall::automock)]
pub trait TraceLookup {
    /// Newest trace for `id`, or `None` when there is none or the lookup failed
    fn lookup_latest_trace(&self, id: &str) -> Option<WorkTrace>;
}

/// Visit recording and lookup over a [`TraceDb`]
#[derive(Debug, Clone)]
pub struct DataService {
    db: TraceDb,
}

impl DataService {
    pub fn new(db: TraceDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &TraceDb {
        &self.db
    }

    /// Record a scan of `event.id` on `event.machine`
    ///
    /// A registered tag gets one new trace row, committed before its device
    /// command is written to `link`. An unregistered tag produces an
    /// "unregistered card" notice and nothing else.
    pub fn record_visit(
        &self,
        event: &ScanEvent,
        link: &SerialLink,
        notifier: &Notifier,
    ) -> VisitOutcome {
        let (trace, command) = match self.write_trace(event) {
            Ok(Some(written)) => written,
            Ok(None) => {
                tracing::info!("Unregistered card {:?} on {:?}", event.id, event.machine);
                notifier.info(NoticeMessage::UnregisteredCard);
                return VisitOutcome::Unregistered;
            }
            Err(e) => {
                tracing::error!("Failed to record visit for {:?}: {}", event.id, e);
                return VisitOutcome::Failed;
            }
        };

        tracing::info!(
            "Recorded visit {} ({}) on {} at {}",
            trace.id,
            trace.name,
            trace.machine,
            trace.date
        );
        notifier.send(BackendMessage::VisitRecorded(trace.clone()));

        let command_sent = match link.send_command(&command) {
            Ok(()) => true,
            Err(crate::error::TagTraceError::NotConnected) => {
                tracing::warn!("Device command for {} dropped: link closed", trace.id);
                notifier.info(NoticeMessage::NotConnected);
                false
            }
            Err(e) => {
                tracing::error!("Failed to send device command for {}: {}", trace.id, e);
                false
            }
        };

        VisitOutcome::Recorded {
            trace,
            command,
            command_sent,
        }
    }

    /// Look up the tag and append its trace row in one session
    fn write_trace(&self, event: &ScanEvent) -> Result<Option<(WorkTrace, DeviceCommand)>> {
        let mut session = self.db.connect()?;

        let info = match session.find_work_info(&event.id)? {
            Some(info) => info,
            None => return Ok(None),
        };

        let trace = WorkTrace::for_visit(&info, event.machine.clone(), trace_date_now());
        session.insert_trace(&trace)?;
        Ok(Some((trace, info.device_command())))
    }

    /// Newest trace row for `id`
    ///
    /// Errors are logged and reported as no result.
    pub fn lookup_latest_trace(&self, id: &str) -> Option<WorkTrace> {
        let result = self
            .db
            .connect()
            .and_then(|session| session.latest_trace(id));

        match result {
            Ok(trace) => {
                tracing::debug!("Lookup {:?}: {}", id, if trace.is_some() { "hit" } else { "miss" });
                trace
            }
            Err(e) => {
                tracing::error!("Failed to look up traces for {:?}: {}", id, e);
                None
            }
        }
    }
}

impl TraceLookup for DataService {
    fn lookup_latest_trace(&self, id: &str) -> Option<WorkTrace> {
        DataService::lookup_latest_trace(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{drain, Notice};
    use crate::serial::MockOpener;
    use crate::types::WorkInfo;

    fn service_with(infos: &[WorkInfo]) -> (tempfile::TempDir, DataService) {
        let dir = tempfile::tempdir().unwrap();
        let db = TraceDb::new(dir.path().join("visits.db"));
        db.initialize().unwrap();
        let session = db.connect().unwrap();
        for info in infos {
            session.upsert_work_info(info).unwrap();
        }
        (dir, DataService::new(db))
    }

    #[test]
    fn test_record_visit_registered() {
        let (_dir, service) = service_with(&[WorkInfo::new("T001", "Kim", 170, 65)]);
        let (opener, device) = MockOpener::new();
        let link = SerialLink::new(opener);
        link.open().unwrap();
        let (notifier, rx) = Notifier::channel();

        let outcome = service.record_visit(&ScanEvent::new("T001", "M1"), &link, &notifier);

        match outcome {
            VisitOutcome::Recorded {
                trace,
                command_sent,
                ..
            } => {
                assert_eq!(trace.name, "Kim");
                assert_eq!(trace.machine, "M1");
                assert!(command_sent);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(device.written_lines(), vec!["{\"height\":170,\"weight\":65}"]);
        assert!(matches!(
            drain(&rx).as_slice(),
            [BackendMessage::VisitRecorded(_)]
        ));
    }

    #[test]
    fn test_record_visit_unregistered() {
        let (_dir, service) = service_with(&[]);
        let (opener, device) = MockOpener::new();
        let link = SerialLink::new(opener);
        link.open().unwrap();
        let (notifier, rx) = Notifier::channel();

        let outcome = service.record_visit(&ScanEvent::new("T404", "M1"), &link, &notifier);

        assert_eq!(outcome, VisitOutcome::Unregistered);
        assert!(device.written().is_empty());
        assert_eq!(
            drain(&rx),
            vec![BackendMessage::Notice(Notice::info(
                NoticeMessage::UnregisteredCard
            ))]
        );
        let session = service.db().connect().unwrap();
        assert_eq!(session.count_traces("T404").unwrap(), 0);
    }

    #[test]
    fn test_record_visit_with_closed_link_still_commits() {
        let (_dir, service) = service_with(&[WorkInfo::new("T001", "Kim", 170, 65)]);
        let (opener, device) = MockOpener::new();
        let link = SerialLink::new(opener);
        let (notifier, rx) = Notifier::channel();

        let outcome = service.record_visit(&ScanEvent::new("T001", "M1"), &link, &notifier);

        assert!(matches!(
            outcome,
            VisitOutcome::Recorded {
                command_sent: false,
                ..
            }
        ));
        assert!(device.written().is_empty());
        assert!(drain(&rx).contains(&BackendMessage::Notice(Notice::info(
            NoticeMessage::NotConnected
        ))));
        let session = service.db().connect().unwrap();
        assert_eq!(session.count_traces("T001").unwrap(), 1);
    }

    #[test]
    fn test_database_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let service = DataService::new(TraceDb::new(dir.path().join("no").join("such.db")));
        let (opener, device) = MockOpener::new();
        let link = SerialLink::new(opener);
        link.open().unwrap();
        let (notifier, rx) = Notifier::channel();

        let outcome = service.record_visit(&ScanEvent::new("T001", "M1"), &link, &notifier);

        assert_eq!(outcome, VisitOutcome::Failed);
        assert!(device.written().is_empty());
        assert!(drain(&rx).is_empty());
        assert!(service.lookup_latest_trace("T001").is_none());
    }

    #[test]
    fn test_lookup_returns_recorded_visit() {
        let (_dir, service) = service_with(&[WorkInfo::new("T001", "Kim", 170, 65)]);
        let (opener, _device) = MockOpener::new();
        let link = SerialLink::new(opener);
        let (notifier, _rx) = Notifier::channel();

        assert!(service.lookup_latest_trace("T001").is_none());
        service.record_visit(&ScanEvent::new("T001", "M7"), &link, &notifier);

        let trace = service.lookup_latest_trace("T001").unwrap();
        assert_eq!(trace.machine, "M7");
        assert_eq!(trace.name, "Kim");
    }
}
