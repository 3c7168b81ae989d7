//! One-time screen geometry
//!
//! Everything here is computed once from the terminal size at startup and
//! never changes; the polling loop and the render engine only read it.
//! Rows and columns are 0-indexed throughout.

use anyhow::{bail, Result};

use crate::fields::{BAUD_LABEL, DEVICE_LABEL, SEND_LABEL};

/// Row of the keybinding help line
pub const HELP_ROW: u16 = 7;
/// Row of the dedicated error line
pub const ERROR_ROW: u16 = 9;
/// Row of the status line
pub const STATUS_ROW: u16 = 10;
/// First row of the data region
pub const DATA_START_ROW: u16 = 12;

/// Horizontal margin between the screen edge and the input boxes
const INPUT_PADDING: u16 = 2;

/// Box cells unavailable to text: label offset (2) plus the right border
const BOX_TEXT_OVERHEAD: u16 = 3;

/// Placement of one input box and its text buffer bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldGeometry {
    /// Top row of the 3-row box
    pub row: u16,
    /// Leftmost column of the box
    pub col: u16,
    /// Full box width, borders included
    pub width: u16,
    /// Maximum text length the buffer may hold
    pub capacity: usize,
}

/// Screen geometry shared by the loop, the fields, and the render engine
#[derive(Debug, Clone)]
pub struct Layout {
    pub rows: u16,
    pub cols: u16,
    /// Data region height, forced odd so byte 0 maps to a single center row
    pub data_rows: u16,
    /// Screen row the graph's zero line sits on
    pub graph_center: u16,
    /// Byte-to-row divisor; maps ±128 onto the data region, rounding to the
    /// nearest row (edge rows cover half the range of interior rows)
    pub graph_scalar: f64,
    pub device: FieldGeometry,
    pub baud: FieldGeometry,
    pub send: FieldGeometry,
}

impl Layout {
    pub fn new(cols: u16, rows: u16) -> Result<Self> {
        let mut data_rows = rows.saturating_sub(DATA_START_ROW);
        // Must be odd, or values close to 0 would be split between two rows
        data_rows = data_rows.saturating_sub((data_rows + 1) & 1);

        let graph_center = DATA_START_ROW + data_rows / 2;
        let half_span = (data_rows.saturating_sub(1) / 2).max(1);
        let graph_scalar = f64::from(0x80) / f64::from(half_span);

        // The top row is split between the device box and the baud box; the
        // send box spans the full width. The extra cell on an odd-width
        // terminal goes to the device box.
        let top_half = cols.saturating_sub(3 * INPUT_PADDING) / 2;
        let device_width = top_half + (cols + 1) % 2;
        let baud_width = top_half;
        let send_width = cols.saturating_sub(2 * INPUT_PADDING);

        let device = field_geometry(1, INPUT_PADDING, device_width, DEVICE_LABEL)?;
        let baud = field_geometry(
            1,
            cols.saturating_sub(INPUT_PADDING + baud_width),
            baud_width,
            BAUD_LABEL,
        )?;
        let send = field_geometry(4, INPUT_PADDING, send_width, SEND_LABEL)?;

        Ok(Self {
            rows,
            cols,
            data_rows,
            graph_center,
            graph_scalar,
            device,
            baud,
            send,
        })
    }
}

fn field_geometry(row: u16, col: u16, width: u16, label: &str) -> Result<FieldGeometry> {
    let overhead = label.len() as u16 + BOX_TEXT_OVERHEAD;
    let Some(capacity) = width.checked_sub(overhead) else {
        bail!("Terminal too narrow to host the input fields");
    };
    if capacity == 0 {
        bail!("Terminal too narrow to host the input fields");
    }
    Ok(FieldGeometry {
        row,
        col,
        width,
        capacity: capacity as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_region_height_is_odd() {
        let layout = Layout::new(80, 24).unwrap();
        assert_eq!(layout.data_rows % 2, 1);
        // 24 - 12 = 12, forced down to 11
        assert_eq!(layout.data_rows, 11);
    }

    #[test]
    fn test_graph_center_is_the_middle_row() {
        let layout = Layout::new(80, 24).unwrap();
        assert_eq!(layout.graph_center, DATA_START_ROW + layout.data_rows / 2);
    }

    #[test]
    fn test_graph_scalar_maps_full_range_onto_half_span() {
        let layout = Layout::new(80, 24).unwrap();
        let half_span = f64::from((layout.data_rows - 1) / 2);
        let top_offset = (127.0 / layout.graph_scalar).round();
        assert_eq!(top_offset, half_span);
    }

    #[test]
    fn test_top_row_boxes_share_the_width() {
        let layout = Layout::new(80, 24).unwrap();
        assert_eq!(layout.device.row, 1);
        assert_eq!(layout.baud.row, 1);
        assert_eq!(layout.send.row, 4);
        // Device starts at the left margin, baud ends at the right margin
        assert_eq!(layout.device.col, 2);
        assert_eq!(layout.baud.col + layout.baud.width, 80 - 2);
        assert_eq!(layout.send.width, 80 - 4);
    }

    #[test]
    fn test_odd_width_extra_cell_goes_to_device() {
        let layout = Layout::new(81, 24).unwrap();
        assert_eq!(layout.device.width, layout.baud.width);
        let layout = Layout::new(80, 24).unwrap();
        assert_eq!(layout.device.width, layout.baud.width + 1);
    }

    #[test]
    fn test_capacity_excludes_label_and_border() {
        let layout = Layout::new(80, 24).unwrap();
        let geo = layout.device;
        assert_eq!(geo.capacity, (geo.width as usize) - DEVICE_LABEL.len() - 3);
    }

    #[test]
    fn test_too_narrow_terminal_is_rejected() {
        assert!(Layout::new(10, 24).is_err());
    }
}
