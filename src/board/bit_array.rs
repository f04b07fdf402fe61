use super::{Board, Cell};
use crate::error::ConfigError;

const BITS_PER_CELL: usize = 2;
const WORD_BITS: usize = 64;

/// Two bits per cell, row-major, in one contiguous bit array.
///
/// A cell never straddles two words because the word width is a multiple of the field width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitArrayBoard {
    words: Vec<u64>,
    size: usize,
}

impl BitArrayBoard {
    #[inline]
    fn locate(&self, row: usize, col: usize) -> (usize, usize) {
        debug_assert!(row < self.size && col < self.size);
        let bit = BITS_PER_CELL * (row * self.size + col);
        (bit / WORD_BITS, bit % WORD_BITS)
    }
}

impl Board for BitArrayBoard {
    fn with_size(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        let total_bits = BITS_PER_CELL * size * size;
        Ok(BitArrayBoard {
            words: vec![0; total_bits.div_ceil(WORD_BITS)],
            size,
        })
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn get_cell(&self, row: usize, col: usize) -> Cell {
        let (word, offset) = self.locate(row, col);
        Cell::from_bits((self.words[word] >> offset) & 0b11)
    }

    #[inline]
    fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        let (word, offset) = self.locate(row, col);
        let slot = &mut self.words[word];
        *slot = (*slot & !(0b11 << offset)) | (cell.bits() << offset);
    }
}
