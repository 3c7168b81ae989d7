//! Serial device manager
//!
//! Owns the device handle and its line configuration. Every entry point
//! upholds the session invariant: the handle is open iff the last open
//! attempt succeeded, and any device-level failure releases it immediately
//! while the display name stays put. Failures are never fatal; the operator
//! retries by resubmitting a field.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort, TTYPort};

use crate::baud::{self, DEFAULT_BAUD};
use crate::error::MonitorError;

/// Display name shown while no device path has been submitted
pub const NO_DEVICE_PLACEHOLDER: &str = "<none>";

/// Most bytes consumed from the device in one loop iteration
pub const READ_CHUNK: usize = 64;

/// Bound on a single device read, so a silent line cannot stall the loop
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// The narrow slice of a serial port the monitor needs. Tests drive the
/// manager through a scripted implementation of this trait.
pub trait Line: Send {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize>;
    fn discard_input(&mut self) -> io::Result<()>;
}

impl Line for TTYPort {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize> {
        Write::write(self, bytes)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}

/// The one serial device a session monitors
pub struct SerialDevice {
    name: String,
    handle: Option<Box<dyn Line>>,
    baud: u32,
}

impl Default for SerialDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialDevice {
    pub fn new() -> Self {
        Self {
            name: NO_DEVICE_PLACEHOLDER.to_string(),
            handle: None,
            baud: DEFAULT_BAUD,
        }
    }

    /// Name shown on the status line; the placeholder until a path is set
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Active rate, straight from the live configuration
    pub fn baud(&self) -> u32 {
        self.baud
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Drop the handle without touching the display name
    pub fn release(&mut self) {
        self.handle = None;
    }

    /// Close any current handle and open `path` with the stored line
    /// configuration. An empty path is not an error: it resets the display
    /// name to the placeholder and leaves the handle unset.
    pub fn open(&mut self, path: &str) -> Result<(), MonitorError> {
        self.handle = None;

        if path.is_empty() {
            self.name = NO_DEVICE_PLACEHOLDER.to_string();
            return Ok(());
        }
        self.name = path.to_string();

        let port = serialport::new(path, self.baud)
            .timeout(READ_TIMEOUT)
            .open_native()
            .map_err(|e| MonitorError::DeviceOpen(e.description))?;
        // Anything the device sent before we were watching is stale
        port.clear(ClearBuffer::Input)
            .map_err(|e| MonitorError::DeviceOpen(e.description))?;

        self.handle = Some(Box::new(port));
        Ok(())
    }

    /// Switch the line rate. Rates outside the supported table are rejected
    /// with no state change. With a device open, the same path is silently
    /// reopened so the new rate takes effect; a failed reopen surfaces as a
    /// configuration error and releases the handle.
    pub fn set_baud(&mut self, rate: u32) -> Result<(), MonitorError> {
        if !baud::is_supported(rate) {
            return Err(MonitorError::BadBaud);
        }
        self.baud = rate;

        if self.handle.is_some() {
            let path = self.name.clone();
            if let Err(err) = self.open(&path) {
                let detail = match err {
                    MonitorError::DeviceOpen(detail) => detail,
                    other => other.to_string(),
                };
                return Err(MonitorError::Configuration(detail));
            }
        }
        Ok(())
    }

    /// Bounded-timeout read into `buf`. Zero bytes means "no data yet",
    /// not end-of-stream. Any real error releases the handle.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, MonitorError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(MonitorError::NoDevice);
        };
        match handle.read_bytes(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => {
                self.handle = None;
                Err(MonitorError::Io(e.to_string()))
            }
        }
    }

    /// Single best-effort write. Any error releases the handle.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), MonitorError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(MonitorError::NoDevice);
        };
        if let Err(e) = handle.write_bytes(bytes) {
            self.handle = None;
            return Err(MonitorError::Io(e.to_string()));
        }
        Ok(())
    }

    /// Drop whatever the device has queued (used when monitoring turns on)
    pub fn discard_pending_input(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            let _ = handle.discard_input();
        }
    }

    #[cfg(test)]
    fn with_line(line: Box<dyn Line>) -> Self {
        Self {
            name: "/dev/fake0".to_string(),
            handle: Some(line),
            baud: DEFAULT_BAUD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Simulated line: scripted reads, shared transmit buffer
    struct ScriptedLine {
        reads: VecDeque<io::Result<Vec<u8>>>,
        tx: Arc<Mutex<Vec<u8>>>,
        fail_writes: bool,
    }

    impl ScriptedLine {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
                tx: Arc::new(Mutex::new(Vec::new())),
                fail_writes: false,
            }
        }
    }

    impl Line for ScriptedLine {
        fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
            }
        }

        fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "line dropped"));
            }
            self.tx.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn discard_input(&mut self) -> io::Result<()> {
            self.reads.clear();
            Ok(())
        }
    }

    #[test]
    fn test_empty_path_is_no_device_not_an_error() {
        let mut device = SerialDevice::new();
        assert!(device.open("").is_ok());
        assert!(!device.is_open());
        assert_eq!(device.display_name(), NO_DEVICE_PLACEHOLDER);
    }

    #[test]
    fn test_missing_path_fails_but_name_is_retained() {
        let mut device = SerialDevice::new();
        let err = device.open("/dev/definitely-missing-ttyZ99").unwrap_err();
        assert!(matches!(err, MonitorError::DeviceOpen(_)));
        assert!(!device.is_open());
        assert_eq!(device.display_name(), "/dev/definitely-missing-ttyZ99");
    }

    #[test]
    fn test_regular_file_is_not_a_serial_device() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a tty").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let mut device = SerialDevice::new();
        let err = device.open(&path).unwrap_err();
        assert!(matches!(err, MonitorError::DeviceOpen(_)));
        assert!(!device.is_open());
    }

    #[test]
    fn test_set_baud_rejects_unsupported_rates_without_state_change() {
        let mut device = SerialDevice::new();
        assert_eq!(device.baud(), DEFAULT_BAUD);
        assert_eq!(device.set_baud(12345), Err(MonitorError::BadBaud));
        assert_eq!(device.baud(), DEFAULT_BAUD);
    }

    #[test]
    fn test_set_baud_reports_every_supported_rate() {
        let mut device = SerialDevice::new();
        for rate in crate::baud::SUPPORTED_BAUDS {
            device.set_baud(rate).unwrap();
            assert_eq!(device.baud(), rate);
        }
    }

    #[test]
    fn test_set_baud_reopen_failure_releases_the_handle() {
        // Reopening "/dev/fake0" cannot succeed, so the rate change must
        // surface a configuration error and drop the handle.
        let line = ScriptedLine::new(vec![]);
        let mut device = SerialDevice::with_line(Box::new(line));
        let err = device.set_baud(9600).unwrap_err();
        assert!(matches!(err, MonitorError::Configuration(_)));
        assert!(!device.is_open());
        assert_eq!(device.baud(), 9600);
    }

    #[test]
    fn test_read_with_no_handle_is_no_device() {
        let mut device = SerialDevice::new();
        let mut buf = [0u8; READ_CHUNK];
        assert_eq!(device.read(&mut buf), Err(MonitorError::NoDevice));
    }

    #[test]
    fn test_read_timeout_means_no_data_yet() {
        let line = ScriptedLine::new(vec![]);
        let mut device = SerialDevice::with_line(Box::new(line));
        let mut buf = [0u8; READ_CHUNK];
        assert_eq!(device.read(&mut buf).unwrap(), 0);
        assert!(device.is_open(), "timeout must not release the handle");
    }

    #[test]
    fn test_read_error_releases_the_handle() {
        let line = ScriptedLine::new(vec![Err(io::Error::new(
            io::ErrorKind::Other,
            "device unplugged",
        ))]);
        let mut device = SerialDevice::with_line(Box::new(line));
        let mut buf = [0u8; READ_CHUNK];
        let err = device.read(&mut buf).unwrap_err();
        assert!(matches!(err, MonitorError::Io(_)));
        assert!(!device.is_open());
    }

    #[test]
    fn test_read_delivers_scripted_bytes() {
        let line = ScriptedLine::new(vec![Ok(b"hello".to_vec())]);
        let mut device = SerialDevice::with_line(Box::new(line));
        let mut buf = [0u8; READ_CHUNK];
        let n = device.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    fn test_write_goes_to_the_line() {
        let line = ScriptedLine::new(vec![]);
        let tx = line.tx.clone();
        let mut device = SerialDevice::with_line(Box::new(line));
        device.write(b"AT\r\n").unwrap();
        assert_eq!(tx.lock().unwrap().as_slice(), b"AT\r\n");
    }

    #[test]
    fn test_write_with_no_handle_is_no_device() {
        let mut device = SerialDevice::new();
        assert_eq!(device.write(b"x"), Err(MonitorError::NoDevice));
    }

    #[test]
    fn test_write_error_releases_the_handle() {
        let mut line = ScriptedLine::new(vec![]);
        line.fail_writes = true;
        let mut device = SerialDevice::with_line(Box::new(line));
        let err = device.write(b"x").unwrap_err();
        assert!(matches!(err, MonitorError::Io(_)));
        assert!(!device.is_open());
    }
}
