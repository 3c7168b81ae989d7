//! Editable input fields
//!
//! The three bordered text fields: device path, baud rate, and outgoing
//! data. Each owns a bounded buffer with an implicit cursor at the end,
//! created once at startup and redrawn in place on every edit.
//!
//! Submitted buffers are deliberately not cleared, so the last value can be
//! resubmitted with a second Enter.

use std::io::Write;

use anyhow::Result;

use crate::escape::{self, BOX_VERTICAL};
use crate::layout::FieldGeometry;

pub const DEVICE_LABEL: &str = "Dev. path: ";
pub const BAUD_LABEL: &str = "Baud: ";
pub const SEND_LABEL: &str = "Send: ";

/// Gap between the box's left border and the label
const LABEL_OFFSET: u16 = 2;

/// Which field currently has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Device,
    Baud,
    Send,
}

/// One bordered input box and its text buffer
pub struct Field {
    label: &'static str,
    geometry: FieldGeometry,
    text: String,
}

impl Field {
    pub fn new(label: &'static str, geometry: FieldGeometry) -> Self {
        Self {
            label,
            geometry,
            text: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Screen cell the next typed character lands on
    pub fn cursor(&self) -> (u16, u16) {
        let col = self.geometry.col + LABEL_OFFSET + self.label.len() as u16 + self.text.len() as u16;
        (self.geometry.row + 1, col)
    }

    /// Append a printable ASCII character, echoing it into the box.
    /// No-op at capacity or for anything outside 0x20-0x7E.
    pub fn insert(&mut self, ch: char, out: &mut impl Write) -> Result<()> {
        if self.text.len() >= self.geometry.capacity || !(' '..='~').contains(&ch) {
            return Ok(());
        }
        let (row, col) = self.cursor();
        write!(out, "{}{}", escape::cursor_to(row, col), ch)?;
        self.text.push(ch);
        Ok(())
    }

    /// Remove the last character, blanking its cell. No-op on empty.
    pub fn delete(&mut self, out: &mut impl Write) -> Result<()> {
        if self.text.pop().is_none() {
            return Ok(());
        }
        let (row, col) = self.cursor();
        write!(out, "{} ", escape::cursor_to(row, col))?;
        Ok(())
    }

    /// Draw the full box: border, label, and current text
    pub fn draw(&self, out: &mut impl Write) -> Result<()> {
        let g = self.geometry;
        let inner = g.width.saturating_sub(2);

        write!(
            out,
            "{}{}{}{}",
            escape::cursor_to(g.row, g.col),
            escape::BOX_TOP_LEFT,
            escape::horizontal_rule(inner),
            escape::BOX_TOP_RIGHT,
        )?;

        let text_width = inner.saturating_sub(1 + self.label.len() as u16) as usize;
        write!(
            out,
            "{}{} {}{:<text_width$}{}",
            escape::cursor_to(g.row + 1, g.col),
            BOX_VERTICAL,
            self.label,
            self.text,
            BOX_VERTICAL,
        )?;

        write!(
            out,
            "{}{}{}{}",
            escape::cursor_to(g.row + 2, g.col),
            escape::BOX_BOTTOM_LEFT,
            escape::horizontal_rule(inner),
            escape::BOX_BOTTOM_RIGHT,
        )?;
        Ok(())
    }
}

/// The three session fields, owned for the whole run
pub struct Fields {
    pub device: Field,
    pub baud: Field,
    pub send: Field,
}

impl Fields {
    pub fn new(device: FieldGeometry, baud: FieldGeometry, send: FieldGeometry) -> Self {
        Self {
            device: Field::new(DEVICE_LABEL, device),
            baud: Field::new(BAUD_LABEL, baud),
            send: Field::new(SEND_LABEL, send),
        }
    }

    pub fn get(&self, id: FieldId) -> &Field {
        match id {
            FieldId::Device => &self.device,
            FieldId::Baud => &self.baud,
            FieldId::Send => &self.send,
        }
    }

    pub fn get_mut(&mut self, id: FieldId) -> &mut Field {
        match id {
            FieldId::Device => &mut self.device,
            FieldId::Baud => &mut self.baud,
            FieldId::Send => &mut self.send,
        }
    }

    pub fn draw_all(&self, out: &mut impl Write) -> Result<()> {
        self.device.draw(out)?;
        self.baud.draw(out)?;
        self.send.draw(out)?;
        Ok(())
    }
}
