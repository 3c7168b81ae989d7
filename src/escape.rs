//! ANSI escape sequence constants and helpers
//!
//! This module centralizes all terminal escape sequences used throughout
//! the application, providing readable names for raw control codes.
//!
//! All positioning helpers take 0-indexed screen coordinates; the 1-indexing
//! the terminal expects is applied here and nowhere else.

// === Cursor Control ===

/// Move cursor to home position (top-left)
pub const CURSOR_HOME: &str = "\x1b[H";

/// Move cursor to a specific row and column (0-indexed)
#[inline]
pub fn cursor_to(row: u16, col: u16) -> String {
    format!("\x1b[{};{}H", row + 1, col + 1)
}

// === Erasing ===

/// Clear from the cursor to the end of the current line
pub const CLEAR_TO_EOL: &str = "\x1b[K";

/// Clear from the cursor to the bottom of the screen
pub const CLEAR_BELOW: &str = "\x1b[J";

/// Clear the entire line at the given row (0-indexed)
#[inline]
pub fn clear_line(row: u16) -> String {
    format!("{}{}", cursor_to(row, 0), CLEAR_TO_EOL)
}

// === Box Drawing ===

pub const BOX_TOP_LEFT: char = '┌';
pub const BOX_TOP_RIGHT: char = '┐';
pub const BOX_BOTTOM_LEFT: char = '└';
pub const BOX_BOTTOM_RIGHT: char = '┘';
pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';

/// Horizontal border run of `len` cells
#[inline]
pub fn horizontal_rule(len: u16) -> String {
    std::iter::repeat(BOX_HORIZONTAL).take(len as usize).collect()
}
