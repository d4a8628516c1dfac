//! Integration tests for the serial reader thread
//!
//! These tests run the real reader loop against the mock device:
//! - Scans flowing through to the database and back to the device
//! - Malformed lines being skipped
//! - Shutdown on close and on a port fault

mod common;

use common::builders::{scan_line, WorkInfoBuilder};
use common::mock_helpers::TestKiosk;
use common::wait_until;
use std::io;
use std::time::Duration;
use tagtrace_rs::notice::BackendMessage;
use tagtrace_rs::reader::{self, ReaderExit};
use tagtrace_rs::types::ConnectionStatus;

const POLL: Duration = Duration::from_millis(1);

fn start(kiosk: &TestKiosk) -> std::thread::JoinHandle<ReaderExit> {
    reader::start(
        &kiosk.link,
        kiosk.service.clone(),
        kiosk.notifier.clone(),
        POLL,
    )
    .unwrap()
}

#[test]
fn test_reader_records_scans_and_skips_garbage() {
    let kiosk = TestKiosk::new(&[WorkInfoBuilder::new("T001").build()]);
    let handle = start(&kiosk);

    kiosk.device.push_line("not json");
    kiosk.device.push_line("{\"id\":\"T001\"}");
    kiosk.device.push_bytes(scan_line("T001", "M1").as_bytes());

    assert!(wait_until(|| kiosk.device.written_lines().len() == 1));
    assert_eq!(kiosk.count_traces("T001"), 1);
    assert_eq!(
        kiosk.device.written_lines(),
        vec!["{\"height\":170,\"weight\":65}"]
    );
    assert!(kiosk.link.is_open());

    kiosk.link.close();
    assert_eq!(handle.join().unwrap(), ReaderExit::Closed);

    let messages = kiosk.drain();
    assert_eq!(
        messages.first(),
        Some(&BackendMessage::ConnectionStatus(ConnectionStatus::Connected))
    );
    assert!(messages
        .iter()
        .any(|m| matches!(m, BackendMessage::VisitRecorded(t) if t.machine == "M1")));
}

#[test]
fn test_reader_joins_split_lines() {
    let kiosk = TestKiosk::new(&[WorkInfoBuilder::new("T001").build()]);
    let handle = start(&kiosk);

    let line = scan_line("T001", "M2");
    let (head, tail) = line.split_at(7);
    kiosk.device.push_bytes(head.as_bytes());
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(kiosk.count_traces("T001"), 0);
    kiosk.device.push_bytes(tail.as_bytes());

    assert!(wait_until(|| kiosk.count_traces("T001") == 1));

    kiosk.link.close();
    assert_eq!(handle.join().unwrap(), ReaderExit::Closed);
}

#[test]
fn test_port_fault_marks_link_lost() {
    let kiosk = TestKiosk::new(&[]);
    let handle = start(&kiosk);

    kiosk.device.fail_reads(io::ErrorKind::BrokenPipe);

    assert_eq!(handle.join().unwrap(), ReaderExit::ConnectionLost);
    assert!(!kiosk.link.is_open());
    assert_eq!(
        kiosk.drain(),
        vec![
            BackendMessage::ConnectionStatus(ConnectionStatus::Connected),
            BackendMessage::ConnectionStatus(ConnectionStatus::Lost),
        ]
    );
}

#[test]
fn test_reopen_after_loss_starts_fresh_reader() {
    let kiosk = TestKiosk::new(&[WorkInfoBuilder::new("T001").build()]);
    let first = start(&kiosk);
    kiosk.device.fail_reads(io::ErrorKind::BrokenPipe);
    assert_eq!(first.join().unwrap(), ReaderExit::ConnectionLost);

    kiosk.device.clear_read_error();
    let second = start(&kiosk);
    kiosk.device.push_bytes(scan_line("T001", "M5").as_bytes());

    assert!(wait_until(|| kiosk.count_traces("T001") == 1));
    assert_eq!(kiosk.device.open_count(), 2);

    kiosk.link.close();
    assert_eq!(second.join().unwrap(), ReaderExit::Closed);
}

#[test]
fn test_start_twice_is_rejected() {
    let kiosk = TestKiosk::new(&[]);
    let handle = start(&kiosk);

    assert!(reader::start(&kiosk.link, kiosk.service.clone(), kiosk.notifier.clone(), POLL).is_err());
    assert!(kiosk.link.is_open());

    kiosk.link.close();
    assert_eq!(handle.join().unwrap(), ReaderExit::Closed);
}
