//! Status line and error line
//!
//! One centered status line recomputed on every redraw — the baud shown is
//! read back from the live device configuration, never cached — and one
//! dedicated error line above it. A new error always replaces the previous
//! one; only one is visible at a time.

use std::io::Write;

use anyhow::Result;

use crate::device::SerialDevice;
use crate::error::MonitorError;
use crate::escape;
use crate::layout::{Layout, ERROR_ROW, HELP_ROW, STATUS_ROW};
use crate::render::DisplayMode;

const STATUS_DEVICE: &str = "Device: ";
const STATUS_BAUD: &str = ", baud: ";
const STATUS_MODE: &str = ", monitor mode: ";
const STATUS_OFF: &str = " (off)";

pub const HELP_MSG: &str = "Ctrl-WASD to select input, Ctrl-Z to change monitor mode, \
                            Ctrl-X to toggle monitor, Ctrl-C to exit";

/// Column that centers a line of `len` cells
fn centered_col(cols: u16, len: usize) -> u16 {
    (cols.saturating_sub(len as u16) + 1) / 2
}

/// The status line text, without positioning
fn status_text(device: &SerialDevice, mode: DisplayMode, monitoring: bool) -> String {
    let mut line = format!(
        "{}{}{}{}{}{}",
        STATUS_DEVICE,
        device.display_name(),
        STATUS_BAUD,
        device.baud(),
        STATUS_MODE,
        mode.name(),
    );
    if !monitoring {
        line.push_str(STATUS_OFF);
    }
    line
}

/// Redraw the centered status line
pub fn draw_status(
    layout: &Layout,
    device: &SerialDevice,
    mode: DisplayMode,
    monitoring: bool,
    out: &mut impl Write,
) -> Result<()> {
    let line = status_text(device, mode, monitoring);
    write!(
        out,
        "{}{}{}",
        escape::clear_line(STATUS_ROW),
        escape::cursor_to(STATUS_ROW, centered_col(layout.cols, line.len())),
        line,
    )?;
    Ok(())
}

/// Show `err` on the error line, replacing whatever was there
pub fn report_error(layout: &Layout, err: &MonitorError, out: &mut impl Write) -> Result<()> {
    let msg = err.to_string();
    write!(
        out,
        "{}{}{}",
        escape::clear_line(ERROR_ROW),
        escape::cursor_to(ERROR_ROW, centered_col(layout.cols, msg.len())),
        msg,
    )?;
    Ok(())
}

/// Wipe the error line
pub fn clear_error(out: &mut impl Write) -> Result<()> {
    write!(out, "{}", escape::clear_line(ERROR_ROW))?;
    Ok(())
}

/// Draw the keybinding reference, if the terminal is wide enough for it
pub fn draw_help(layout: &Layout, out: &mut impl Write) -> Result<()> {
    if usize::from(layout.cols) > HELP_MSG.len() {
        write!(
            out,
            "{}{}",
            escape::cursor_to(HELP_ROW, centered_col(layout.cols, HELP_MSG.len())),
            HELP_MSG,
        )?;
    }
    Ok(())
}
