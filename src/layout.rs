#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since board dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow sign loss when going from signed to unsigned types since we validate values are non-negative before casting
    clippy::cast_sign_loss,
    // Allow potential wrapping when casting between types of same size as we validate values are in range
    clippy::cast_possible_wrap
)]

/// Terminal columns per block unit; keeps blocks roughly square.
pub const COLUMNS_PER_UNIT: u16 = 2;

/// Screen placement of the board, recomputed whenever the viewport changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    /// Rows per block (columns per block is `COLUMNS_PER_UNIT` times this).
    pub block_size: u16,
    /// Column of the board's left edge.
    pub offset_x: u16,
    /// Row of the board's top edge.
    pub offset_y: u16,
}

impl BoardLayout {
    /// Sizes blocks to leave room for a side panel of ten units and a
    /// four-row margin, then centers the board plus a six-unit panel
    /// horizontally and drops it one block below vertical center.
    #[must_use]
    pub fn compute(viewport: (u16, u16), grid: (usize, usize)) -> Option<Self> {
        let (columns, rows) = viewport;
        let width_units = i64::from(columns / COLUMNS_PER_UNIT);
        let height = i64::from(rows);
        let grid_w = grid.0 as i64;
        let grid_h = grid.1 as i64;

        let block = (width_units / (grid_w + 10)).min(height / (grid_h + 4));
        if block <= 0 {
            return None;
        }

        let offset_units = ((width_units - block * (grid_w + 6)) / 2).max(0);
        let offset_y = ((height - block * grid_h) / 2).max(0) + block;

        Some(Self {
            block_size: block as u16,
            offset_x: offset_units as u16 * COLUMNS_PER_UNIT,
            offset_y: offset_y as u16,
        })
    }

    #[must_use]
    pub fn block_columns(&self) -> u16 {
        self.block_size * COLUMNS_PER_UNIT
    }

    /// Board interior size in terminal cells.
    #[must_use]
    pub fn board_size(&self, grid: (usize, usize)) -> (u16, u16) {
        (
            grid.0 as u16 * self.block_columns(),
            grid.1 as u16 * self.block_size,
        )
    }
}
