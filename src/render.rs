//! Incoming-byte render engine
//!
//! One state machine per display mode, all sharing a single cursor that is
//! interpreted mode-locally: an absolute screen position in char mode, a
//! plot column in graph mode, a cell coordinate in the grid modes. The
//! cursor persists across reads and resets when monitoring turns on or the
//! mode changes.
//!
//! Grid modes draw into a bordered surface created lazily on the first
//! chunk after monitoring starts; it exists only while a grid mode is
//! actively monitoring.

use std::io::Write;

use anyhow::Result;

use crate::escape;
use crate::layout::{Layout, DATA_START_ROW, ERROR_ROW};

/// Fewest visible data rows the graph mode can plot into
pub const MIN_GRAPH_ROWS: u16 = 5;

/// Cells per grid row
const GRID_COLUMNS: u16 = 16;

const GRAPH_MARKER: char = 'X';

/// The five renderings of incoming bytes, in cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Char,
    Graph,
    Hex,
    Uint,
    Int,
}

impl DisplayMode {
    /// Next mode in the fixed cycle, wrapping after Int
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Char => DisplayMode::Graph,
            DisplayMode::Graph => DisplayMode::Hex,
            DisplayMode::Hex => DisplayMode::Uint,
            DisplayMode::Uint => DisplayMode::Int,
            DisplayMode::Int => DisplayMode::Char,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Char => "char",
            DisplayMode::Graph => "graph",
            DisplayMode::Hex => "hex",
            DisplayMode::Uint => "uint",
            DisplayMode::Int => "int",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "char" => Some(DisplayMode::Char),
            "graph" => Some(DisplayMode::Graph),
            "hex" => Some(DisplayMode::Hex),
            "uint" => Some(DisplayMode::Uint),
            "int" => Some(DisplayMode::Int),
            _ => None,
        }
    }

    /// Grid cell parameters, for the modes that have them
    fn grid(self) -> Option<GridParams> {
        match self {
            // cell: value width + separator; surface: 16 cells + borders,
            // minus the trailing separator
            DisplayMode::Hex => Some(GridParams {
                cell_width: 3,
                surface_width: 51,
            }),
            DisplayMode::Uint => Some(GridParams {
                cell_width: 4,
                surface_width: 67,
            }),
            DisplayMode::Int => Some(GridParams {
                cell_width: 5,
                surface_width: 83,
            }),
            DisplayMode::Char | DisplayMode::Graph => None,
        }
    }

    /// One grid cell for `byte`, exactly `cell_width - 1` characters wide
    fn format_cell(self, byte: u8) -> String {
        match self {
            DisplayMode::Hex => format!("{:>2X}", byte),
            DisplayMode::Uint => format!("{:>3}", byte),
            DisplayMode::Int => format!("{:>4}", byte as i8),
            DisplayMode::Char | DisplayMode::Graph => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GridParams {
    cell_width: u16,
    surface_width: u16,
}

/// Centered bordered box the grid modes render into
#[derive(Debug, Clone, Copy)]
struct GridSurface {
    top: u16,
    left: u16,
    width: u16,
    height: u16,
}

impl GridSurface {
    fn draw_border(&self, out: &mut impl Write) -> Result<()> {
        let inner = self.width.saturating_sub(2);
        write!(
            out,
            "{}{}{}{}",
            escape::cursor_to(self.top, self.left),
            escape::BOX_TOP_LEFT,
            escape::horizontal_rule(inner),
            escape::BOX_TOP_RIGHT,
        )?;
        for row in 1..self.height.saturating_sub(1) {
            write!(
                out,
                "{}{}{}{}",
                escape::cursor_to(self.top + row, self.left),
                escape::BOX_VERTICAL,
                escape::cursor_to(self.top + row, self.left + self.width - 1),
                escape::BOX_VERTICAL,
            )?;
        }
        write!(
            out,
            "{}{}{}{}",
            escape::cursor_to(self.top + self.height.saturating_sub(1), self.left),
            escape::BOX_BOTTOM_LEFT,
            escape::horizontal_rule(inner),
            escape::BOX_BOTTOM_RIGHT,
        )?;
        Ok(())
    }

    /// Rows available for cells, inside the borders
    fn interior_rows(&self) -> u16 {
        self.height.saturating_sub(2)
    }
}

/// What a chunk of bytes did to the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Still monitoring; more chunks welcome
    Running,
    /// Display space exhausted; monitoring stopped rather than overwrite
    ScreenFull,
    /// Terminal geometry insufficient for this mode; monitoring stopped
    TooSmall,
}

/// Monitoring state: active flag, mode, per-mode cursor, lazy grid surface
pub struct Monitor {
    active: bool,
    mode: DisplayMode,
    cursor_row: u16,
    cursor_col: u16,
    surface: Option<GridSurface>,
}

impl Monitor {
    pub fn new(mode: DisplayMode, active: bool) -> Self {
        Self {
            active,
            mode,
            cursor_row: 0,
            cursor_col: 0,
            surface: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Start monitoring: clear the data region and reset the cursor.
    /// The caller flushes pending device input.
    pub fn turn_on(&mut self, out: &mut impl Write) -> Result<()> {
        write!(
            out,
            "{}{}",
            escape::cursor_to(DATA_START_ROW, 0),
            escape::CLEAR_BELOW
        )?;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.active = true;
        Ok(())
    }

    /// Stop monitoring and drop the grid surface
    pub fn turn_off(&mut self) {
        self.active = false;
        self.surface = None;
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// Advance to the next display mode: drop the surface, reset the
    /// cursor, clear the data region
    pub fn cycle_mode(&mut self, out: &mut impl Write) -> Result<()> {
        self.mode = self.mode.next();
        self.surface = None;
        self.cursor_row = 0;
        self.cursor_col = 0;
        write!(
            out,
            "{}{}",
            escape::cursor_to(DATA_START_ROW, 0),
            escape::CLEAR_BELOW
        )?;
        Ok(())
    }

    /// Auto-stop from within a render step
    fn stop(&mut self) {
        self.active = false;
        self.surface = None;
    }

    /// Render one chunk of incoming bytes in the current mode
    pub fn consume(&mut self, bytes: &[u8], layout: &Layout, out: &mut impl Write) -> Result<Outcome> {
        if let Some(params) = self.mode.grid() {
            self.consume_grid(bytes, params, layout, out)
        } else if self.mode == DisplayMode::Graph {
            // Checked lazily, on data arrival rather than at mode switch
            if layout.rows.saturating_sub(DATA_START_ROW) < MIN_GRAPH_ROWS {
                self.stop();
                return Ok(Outcome::TooSmall);
            }
            self.consume_graph(bytes, layout, out)
        } else {
            self.consume_char(bytes, layout, out)
        }
    }

    /// Scrolling text log. Stops rather than wrap once the write cursor
    /// lands on the terminal's last cell, so nothing scrolls away unseen.
    fn consume_char(&mut self, bytes: &[u8], layout: &Layout, out: &mut impl Write) -> Result<Outcome> {
        if self.cursor_row == 0 {
            self.cursor_row = DATA_START_ROW;
        }
        let last_row = layout.rows.saturating_sub(1);
        let last_col = layout.cols.saturating_sub(1);

        let mut full = false;
        'bytes: for &byte in bytes {
            match glyph(byte) {
                Glyph::Newline => {
                    if self.cursor_row >= last_row {
                        full = true;
                        break 'bytes;
                    }
                    self.cursor_row += 1;
                    self.cursor_col = 0;
                }
                Glyph::Literal(ch) => {
                    if self.put_char(ch, last_row, last_col, layout, out)? {
                        full = true;
                        break 'bytes;
                    }
                }
                Glyph::Escaped(text) => {
                    for ch in text.chars() {
                        if self.put_char(ch, last_row, last_col, layout, out)? {
                            full = true;
                            break 'bytes;
                        }
                    }
                }
            }
        }

        if full {
            self.cursor_row = last_row;
            self.cursor_col = last_col;
            self.stop();
            return Ok(Outcome::ScreenFull);
        }
        Ok(Outcome::Running)
    }

    /// Write one log character at the cursor and advance it. Returns true
    /// when the character landed on the terminal's last cell.
    fn put_char(
        &mut self,
        ch: char,
        last_row: u16,
        last_col: u16,
        layout: &Layout,
        out: &mut impl Write,
    ) -> Result<bool> {
        write!(out, "{}{}", escape::cursor_to(self.cursor_row, self.cursor_col), ch)?;
        if self.cursor_row >= last_row && self.cursor_col >= last_col {
            return Ok(true);
        }
        self.cursor_col += 1;
        if self.cursor_col >= layout.cols {
            self.cursor_col = 0;
            self.cursor_row += 1;
        }
        Ok(false)
    }

    /// One plotted column per byte, wrapping at the right edge. Each column
    /// is blanked top to bottom before its marker is drawn.
    fn consume_graph(&mut self, bytes: &[u8], layout: &Layout, out: &mut impl Write) -> Result<Outcome> {
        for &byte in bytes {
            if self.cursor_col >= layout.cols.saturating_sub(1) {
                self.cursor_col = 0;
            }
            for row in DATA_START_ROW..layout.rows {
                write!(out, "{} ", escape::cursor_to(row, self.cursor_col))?;
            }
            let row = graph_row(byte, layout);
            write!(out, "{}{}", escape::cursor_to(row, self.cursor_col), GRAPH_MARKER)?;
            self.cursor_row = row;
            self.cursor_col += 1;
        }
        Ok(Outcome::Running)
    }

    /// 16-cells-per-row grid inside the bordered surface, column-major
    /// advance, auto-stop when the interior rows run out
    fn consume_grid(
        &mut self,
        bytes: &[u8],
        params: GridParams,
        layout: &Layout,
        out: &mut impl Write,
    ) -> Result<Outcome> {
        let surface = match self.surface {
            Some(surface) => surface,
            None => {
                if layout.cols <= params.surface_width {
                    self.stop();
                    return Ok(Outcome::TooSmall);
                }
                // A fresh surface supersedes any lingering too-small error
                write!(out, "{}", escape::clear_line(ERROR_ROW))?;
                let surface = GridSurface {
                    top: DATA_START_ROW,
                    left: (layout.cols - params.surface_width + 1) / 2,
                    width: params.surface_width,
                    height: layout.data_rows,
                };
                surface.draw_border(out)?;
                self.surface = Some(surface);
                surface
            }
        };

        for &byte in bytes {
            if self.cursor_col >= GRID_COLUMNS {
                self.cursor_col = 0;
                self.cursor_row += 1;
            }
            if self.cursor_row >= surface.interior_rows() {
                // Preserve the partially filled last row
                self.stop();
                return Ok(Outcome::ScreenFull);
            }
            let row = surface.top + 1 + self.cursor_row;
            let col = surface.left + 2 + self.cursor_col * params.cell_width;
            write!(
                out,
                "{}{}",
                escape::cursor_to(row, col),
                self.mode.format_cell(byte)
            )?;
            self.cursor_col += 1;
        }
        Ok(Outcome::Running)
    }

    #[cfg(test)]
    fn cursor(&self) -> (u16, u16) {
        (self.cursor_row, self.cursor_col)
    }
}

/// How one byte appears in the char log
#[derive(Debug, PartialEq, Eq)]
enum Glyph {
    Newline,
    Literal(char),
    Escaped(String),
}

fn glyph(byte: u8) -> Glyph {
    if byte == b'\n' {
        Glyph::Newline
    } else if (0x20..0x7f).contains(&byte) {
        Glyph::Literal(byte as char)
    } else {
        Glyph::Escaped(format!("<0x{:02X}>", byte))
    }
}

/// Screen row a byte plots on: the signed value range mapped linearly onto
/// the data region, centered on the midpoint, rounded to the nearest row
fn graph_row(byte: u8, layout: &Layout) -> u16 {
    let offset = (f64::from(byte as i8) / layout.graph_scalar).round() as i32;
    let row = i32::from(layout.graph_center) - offset;
    row.clamp(i32::from(DATA_START_ROW), i32::from(layout.rows) - 1) as u16
}
