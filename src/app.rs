//! The monitoring session and its polling loop
//!
//! One explicitly owned session object holds every piece of mutable state:
//! the three fields, the device handle, and the monitor. The loop is
//! single-threaded and cooperative — each iteration waits up to 50 ms for
//! one key event, then performs at most one bounded device read, so input
//! latency stays bounded by one iteration no matter what the line does.

use std::io::{stdout, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::cli::{self, Args};
use crate::device::{SerialDevice, READ_CHUNK};
use crate::error::MonitorError;
use crate::escape;
use crate::fields::{FieldId, Fields};
use crate::layout::Layout;
use crate::render::{Monitor, Outcome};
use crate::status;

/// Bound on the wait for one key event
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

pub struct App {
    running: bool,
    layout: Layout,
    fields: Fields,
    focus: FieldId,
    device: SerialDevice,
    monitor: Monitor,
}

impl App {
    pub fn new(layout: Layout, args: &Args) -> Self {
        let fields = Fields::new(layout.device, layout.baud, layout.send);
        let monitor = Monitor::new(cli::resolve_mode(args), args.monitor);
        Self {
            running: true,
            layout,
            fields,
            focus: FieldId::Device,
            device: SerialDevice::new(),
            monitor,
        }
    }

    /// Draw the initial screen and apply the startup configuration through
    /// the same entry points interactive submits use. Startup problems land
    /// on the error line; none of them abort.
    pub fn init(&mut self, args: &Args, out: &mut impl Write) -> Result<()> {
        write!(out, "{}{}", escape::CURSOR_HOME, escape::CLEAR_BELOW)?;
        self.fields.draw_all(out)?;
        status::draw_help(&self.layout, out)?;

        for issue in &args.issues {
            status::report_error(&self.layout, issue, out)?;
        }
        // Baud first, so a single open uses the requested rate
        if let Some(raw) = cli::resolve_baud(args) {
            if let Err(err) = self.device.set_baud(raw.parse().unwrap_or(0)) {
                status::report_error(&self.layout, &err, out)?;
            }
        }
        if let Some(path) = cli::resolve_device(args) {
            if let Err(err) = self.device.open(&path) {
                status::report_error(&self.layout, &err, out)?;
            }
        }

        self.draw_status(out)?;
        out.flush()?;
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = stdout();

        while self.running {
            // Park the terminal cursor at the focused field's edit point
            let (row, col) = self.fields.get(self.focus).cursor();
            write!(stdout, "{}", escape::cursor_to(row, col))?;
            stdout.flush()?;

            // At most one key event per iteration; a timeout just means
            // "no input" and the loop moves on to the device
            if event::poll(POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key, &mut stdout)?;
                }
            }

            if !self.monitor.is_active() {
                continue;
            }

            if !self.device.is_open() {
                self.monitor.turn_off();
                status::report_error(&self.layout, &MonitorError::NoDevice, &mut stdout)?;
                self.draw_status(&mut stdout)?;
                continue;
            }

            let mut buf = [0u8; READ_CHUNK];
            let chunk = match self.device.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => &buf[..n],
                Err(err) => {
                    self.monitor.turn_off();
                    status::report_error(&self.layout, &err, &mut stdout)?;
                    self.draw_status(&mut stdout)?;
                    continue;
                }
            };

            match self.monitor.consume(chunk, &self.layout, &mut stdout)? {
                Outcome::Running => {}
                Outcome::ScreenFull => self.draw_status(&mut stdout)?,
                Outcome::TooSmall => {
                    status::report_error(&self.layout, &MonitorError::TerminalTooSmall, &mut stdout)?;
                    self.draw_status(&mut stdout)?;
                }
            }
            stdout.flush()?;
        }

        Ok(())
    }

    /// Global chords first, then field-local editing keys
    fn handle_key(&mut self, key: KeyEvent, out: &mut impl Write) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('x') if ctrl => self.toggle_monitor(out)?,
            KeyCode::Char('z') if ctrl => {
                self.monitor.cycle_mode(out)?;
                self.draw_status(out)?;
            }

            // Triangular field layout: up and right both lead to the device
            // box, down always drops to the send box, left to the baud box
            KeyCode::Up | KeyCode::Right => self.focus = FieldId::Device,
            KeyCode::Down => self.focus = FieldId::Send,
            KeyCode::Left => self.focus = FieldId::Baud,
            KeyCode::Char('w') | KeyCode::Char('a') if ctrl => self.focus = FieldId::Device,
            KeyCode::Char('s') if ctrl => self.focus = FieldId::Send,
            KeyCode::Char('d') if ctrl => self.focus = FieldId::Baud,

            KeyCode::Backspace | KeyCode::Delete => {
                self.fields.get_mut(self.focus).delete(out)?;
            }
            KeyCode::Enter => self.submit(out)?,
            KeyCode::Char(ch) if !ctrl => {
                self.fields.get_mut(self.focus).insert(ch, out)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Ctrl-X: flip monitoring. Turning on clears the data region and
    /// drops stale device input; turning off discards the grid surface.
    fn toggle_monitor(&mut self, out: &mut impl Write) -> Result<()> {
        if self.monitor.is_active() {
            self.monitor.turn_off();
        } else {
            self.monitor.turn_on(out)?;
            self.device.discard_pending_input();
        }
        self.draw_status(out)
    }

    /// Enter: dispatch the focused field's full buffer. The buffer is kept,
    /// so a second Enter resubmits the same value.
    fn submit(&mut self, out: &mut impl Write) -> Result<()> {
        status::clear_error(out)?;

        match self.focus {
            FieldId::Device => {
                if let Err(err) = self.device.open(self.fields.device.text()) {
                    status::report_error(&self.layout, &err, out)?;
                }
            }
            FieldId::Baud => {
                let text = self.fields.baud.text();
                if text.is_empty() {
                    return Ok(());
                }
                let rate = text.parse().unwrap_or(0);
                if let Err(err) = self.device.set_baud(rate) {
                    status::report_error(&self.layout, &err, out)?;
                }
            }
            FieldId::Send => {
                if let Err(err) = self.device.write(self.fields.send.text().as_bytes()) {
                    status::report_error(&self.layout, &err, out)?;
                }
            }
        }
        self.draw_status(out)
    }

    fn draw_status(&self, out: &mut impl Write) -> Result<()> {
        status::draw_status(
            &self.layout,
            &self.device,
            self.monitor.mode(),
            self.monitor.is_active(),
            out,
        )
    }
}
