//! Frontend action types
//!
//! Widgets return [`AppAction`]s instead of mutating state directly, so the
//! behavior behind every button is testable without a window.

/// Actions the main form can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Look up the latest visit for the tag ID in the search box
    Search,
    /// Open the serial port and start the reader
    OpenSerial,
    /// Close the serial port
    CloseSerial,
}
