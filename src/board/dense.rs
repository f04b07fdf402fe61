use super::{Board, Cell};
use crate::error::ConfigError;

/// Plain row-major array of cells. Simple enough to serve as the oracle for the packed
/// encodings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseBoard {
    cells: Vec<Cell>,
    size: usize,
}

impl Board for DenseBoard {
    fn with_size(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        Ok(DenseBoard {
            cells: vec![Cell::Empty; size * size],
            size,
        })
    }

    fn size(&self) -> usize {
        self.size
    }

    fn get_cell(&self, row: usize, col: usize) -> Cell {
        assert!(col < self.size);
        self.cells[row * self.size + col]
    }

    fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        assert!(col < self.size);
        self.cells[row * self.size + col] = cell;
    }
}
