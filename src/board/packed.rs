use super::{walk_line, Board, Cell};
use crate::error::ConfigError;

const FIELD_WIDTH: usize = 3;
const FIELD_MASK: u64 = 0b111;

/// Largest board whose rows fit in a single `u64` at three bits per cell.
pub const MAX_PACKED_SIZE: usize = 64 / FIELD_WIDTH;

/// One `u64` word per row; the cell at column `c` occupies bits `3c..3c + 3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedBoard {
    rows: Vec<u64>,
    size: usize,
    /// Lowest bit of every in-use field.
    field_lows: u64,
}

impl PackedBoard {
    /// One bit (the lowest of each field) set for every column of `row` holding `cell`.
    #[inline]
    fn matching_fields(&self, row: usize, cell: Cell) -> u64 {
        let pattern = self.field_lows * cell.bits();
        let same = !(self.rows[row] ^ pattern);
        same & (same >> 1) & (same >> 2) & self.field_lows
    }

    fn row_line_length(&self, row: usize, col: usize) -> usize {
        let matches = self.matching_fields(row, self.get_cell(row, col));
        let is_match = |c: usize| (matches >> (c * FIELD_WIDTH)) & 1 == 1;

        let mut length = 1;
        let mut c = col + 1;
        while c < self.size && is_match(c) {
            length += 1;
            c += 1;
        }
        let mut c = col;
        while c > 0 && is_match(c - 1) {
            length += 1;
            c -= 1;
        }
        length
    }
}

impl Board for PackedBoard {
    fn with_size(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if size > MAX_PACKED_SIZE {
            return Err(ConfigError::BoardTooLarge {
                size,
                max: MAX_PACKED_SIZE,
            });
        }
        let field_lows = (0..size).fold(0u64, |acc, c| acc | 1 << (c * FIELD_WIDTH));
        Ok(PackedBoard {
            rows: vec![0; size],
            size,
            field_lows,
        })
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn get_cell(&self, row: usize, col: usize) -> Cell {
        debug_assert!(col < self.size);
        Cell::from_bits((self.rows[row] >> (col * FIELD_WIDTH)) & FIELD_MASK)
    }

    #[inline]
    fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(col < self.size);
        let shift = col * FIELD_WIDTH;
        let word = &mut self.rows[row];
        *word = (*word & !(FIELD_MASK << shift)) | (cell.bits() << shift);
    }

    fn line_length(&self, row: usize, col: usize, dr: isize, dc: isize) -> usize {
        if dr == 0 {
            self.row_line_length(row, col)
        } else {
            walk_line(self, row, col, dr, dc)
        }
    }
}
