//! Operator-visible error taxonomy
//!
//! Every recoverable failure surfaces as one of these variants; the
//! `Display` string is exactly what appears on the dedicated error line.
//! All variants are non-fatal: the operator recovers by resubmitting a
//! field, switching modes, or re-toggling monitoring.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Unknown command-line flag
    #[error("Bad argument {0}")]
    BadArgument(String),

    /// Flag present but its required value was not
    #[error("Missing value for {0}")]
    MissingValue(String),

    /// Unrecognized display-mode name from -m/--mode
    #[error("Bad mode argument; must be char, graph, hex, uint, or int")]
    BadMode,

    /// Baud rate outside the supported table
    #[error("Bad baudrate; check `man 3 termios` for a full list of baudrates")]
    BadBaud,

    /// Device path could not be opened as a serial line
    #[error("Can't access device: {0}")]
    DeviceOpen(String),

    /// Line configuration could not be applied
    #[error("Can't set baud: {0}")]
    Configuration(String),

    /// Read or write failed mid-session
    #[error("Can't access device: {0}")]
    Io(String),

    /// Submit or monitor attempted with no open handle
    #[error("No device open for I/O")]
    NoDevice,

    /// Terminal geometry insufficient for the active display mode
    #[error("Terminal too small, use another mode")]
    TerminalTooSmall,
}
