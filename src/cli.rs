//! CLI argument parsing and startup utilities
//!
//! Hand-rolled flag parsing: bad or incomplete flags never abort startup,
//! they are collected and reported on the error line once the screen is up.

use std::env;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::MonitorError;
use crate::render::DisplayMode;

pub const USAGE: &str = "
Options:
    -b | --baud <baud>     Set baud
    -d | --device <path>   Set device path
    -h | --help            Display this help message
    -m | --mode <mode>     Set monitor mode: char (default), graph, hex, uint, int
    -r | --read            Immediately read device (specified with -d)
    -n | --no-read         (Default) Opposite of -r
";

/// Parsed command-line arguments
#[derive(Clone, Default)]
pub struct Args {
    pub device: Option<String>,
    pub baud: Option<String>,
    pub mode: Option<DisplayMode>,
    /// Start monitoring immediately (-r); off by default
    pub monitor: bool,
    pub help: bool,
    pub profile: bool,
    /// Problems to surface on the error line after startup
    pub issues: Vec<MonitorError>,
}

/// Parse command-line arguments
pub fn parse_args() -> Args {
    parse(env::args().skip(1))
}

fn parse(args: impl Iterator<Item = String>) -> Args {
    let mut parsed = Args::default();
    let mut iter = args;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                parsed.help = true;
                return parsed;
            }
            "-r" | "--read" => parsed.monitor = true,
            "-n" | "--no-read" => parsed.monitor = false,
            "--profile" => parsed.profile = true,
            "-d" | "--device" => match iter.next() {
                Some(value) => parsed.device = Some(value),
                None => parsed.issues.push(MonitorError::MissingValue(arg)),
            },
            "-b" | "--baud" => match iter.next() {
                Some(value) => parsed.baud = Some(value),
                None => parsed.issues.push(MonitorError::MissingValue(arg)),
            },
            "-m" | "--mode" => match iter.next() {
                Some(value) => match DisplayMode::parse(&value) {
                    Some(mode) => parsed.mode = Some(mode),
                    None => parsed.issues.push(MonitorError::BadMode),
                },
                None => parsed.issues.push(MonitorError::MissingValue(arg)),
            },
            _ => parsed.issues.push(MonitorError::BadArgument(arg)),
        }
    }

    parsed
}

/// Device path from the flag, or the `TTYMON_DEVICE` fallback
pub fn resolve_device(args: &Args) -> Option<String> {
    args.device
        .clone()
        .or_else(|| env::var("TTYMON_DEVICE").ok())
}

/// Baud value from the flag, or the `TTYMON_BAUD` fallback; validation
/// happens at apply time, through the same path as an interactive submit
pub fn resolve_baud(args: &Args) -> Option<String> {
    args.baud.clone().or_else(|| env::var("TTYMON_BAUD").ok())
}

/// Display mode from the flag, the `TTYMON_MODE` fallback, or the default
pub fn resolve_mode(args: &Args) -> DisplayMode {
    args.mode
        .or_else(|| {
            env::var("TTYMON_MODE")
                .ok()
                .and_then(|name| DisplayMode::parse(&name))
        })
        .unwrap_or(DisplayMode::Char)
}

/// Startup trace for measuring performance.
/// Enabled with --profile. Dumps to stdout after terminal restore.
#[derive(Clone)]
pub struct DebugTimer {
    enabled: bool,
    start: Instant,
    logs: Arc<Mutex<Vec<String>>>,
}

impl DebugTimer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start: Instant::now(),
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn log(&self, msg: &str) {
        if !self.enabled {
            return;
        }
        self.push_line(format!(
            "+{:>6}ms  {}",
            self.start.elapsed().as_millis(),
            msg
        ));
    }

    pub fn duration(&self, label: &str, duration: Duration) {
        if !self.enabled {
            return;
        }
        self.push_line(format!(
            "+{:>6}ms  {:<28} {:>6}ms",
            self.start.elapsed().as_millis(),
            label,
            duration.as_millis()
        ));
    }

    fn push_line(&self, line: String) {
        let mut guard = self.logs.lock().unwrap_or_else(|p| p.into_inner());
        guard.push(line);
    }

    pub fn dump(&self) {
        if !self.enabled {
            return;
        }
        let lines = self.logs.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if lines.is_empty() {
            return;
        }
        println!("\nStartup trace:");
        for line in &lines {
            println!("  {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Args {
        parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_short_and_long_flags_parse() {
        let args = parse_strs(&["-d", "/dev/ttyUSB0", "-b", "9600", "-m", "hex", "-r"]);
        assert_eq!(args.device.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(args.baud.as_deref(), Some("9600"));
        assert_eq!(args.mode, Some(DisplayMode::Hex));
        assert!(args.monitor);
        assert!(args.issues.is_empty());

        let args = parse_strs(&["--device", "/dev/ttyS1", "--baud", "300", "--mode", "graph"]);
        assert_eq!(args.device.as_deref(), Some("/dev/ttyS1"));
        assert_eq!(args.baud.as_deref(), Some("300"));
        assert_eq!(args.mode, Some(DisplayMode::Graph));
        assert!(!args.monitor);
    }

    #[test]
    fn test_no_read_wins_when_it_comes_last() {
        let args = parse_strs(&["-r", "-n"]);
        assert!(!args.monitor);
        let args = parse_strs(&["-n", "-r"]);
        assert!(args.monitor);
    }

    #[test]
    fn test_unknown_flag_is_collected_not_fatal() {
        let args = parse_strs(&["--frobnicate", "-d", "/dev/ttyUSB0"]);
        assert_eq!(args.device.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(
            args.issues,
            vec![MonitorError::BadArgument("--frobnicate".to_string())]
        );
    }

    #[test]
    fn test_flag_missing_its_value_is_collected() {
        let args = parse_strs(&["--baud"]);
        assert_eq!(
            args.issues,
            vec![MonitorError::MissingValue("--baud".to_string())]
        );
        assert!(args.baud.is_none());
    }

    #[test]
    fn test_bad_mode_name_is_collected() {
        let args = parse_strs(&["-m", "octal"]);
        assert_eq!(args.issues, vec![MonitorError::BadMode]);
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_help_short_circuits() {
        let args = parse_strs(&["-h", "--frobnicate"]);
        assert!(args.help);
        assert!(args.issues.is_empty());
    }

    #[test]
    fn test_default_mode_is_char() {
        let args = parse_strs(&[]);
        assert_eq!(resolve_mode(&args), DisplayMode::Char);
    }
}
