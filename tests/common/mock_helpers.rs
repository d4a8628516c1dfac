//! Mock construction helpers
//!
//! A [`TestKiosk`] bundles a temporary visit database, a mock serial device
//! and the UI message channel.

use crossbeam_channel::Receiver;
use std::sync::Arc;
use tagtrace_rs::notice::{drain, BackendMessage, Notifier};
use tagtrace_rs::serial::{MockOpener, MockPortHandle, SerialLink};
use tagtrace_rs::service::{DataService, TraceDb};
use tagtrace_rs::types::WorkInfo;
use tempfile::TempDir;

pub struct TestKiosk {
    /// Keeps the database directory alive
    pub dir: TempDir,
    pub db: TraceDb,
    pub service: Arc<DataService>,
    pub link: SerialLink,
    pub device: MockPortHandle,
    pub notifier: Notifier,
    pub messages: Receiver<BackendMessage>,
}

impl TestKiosk {
    /// Fresh database with `infos` registered and a closed mock link
    pub fn new(infos: &[WorkInfo]) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db = create_test_db(&dir, infos);
        let (opener, device) = MockOpener::new();
        let (notifier, messages) = Notifier::channel();

        Self {
            service: Arc::new(DataService::new(db.clone())),
            db,
            dir,
            link: SerialLink::new(opener),
            device,
            notifier,
            messages,
        }
    }

    pub fn drain(&self) -> Vec<BackendMessage> {
        drain(&self.messages)
    }

    pub fn count_traces(&self, id: &str) -> u64 {
        self.db
            .connect()
            .and_then(|session| session.count_traces(id))
            .expect("count traces")
    }
}

/// Initialized database in `dir` with `infos` registered
pub fn create_test_db(dir: &TempDir, infos: &[WorkInfo]) -> TraceDb {
    let db = TraceDb::new(dir.path().join("visits.db"));
    db.initialize().expect("initialize db");
    let session = db.connect().expect("connect");
    for info in infos {
        session.upsert_work_info(info).expect("register tag");
    }
    db
}
