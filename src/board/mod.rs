//! # Board Representations
//!
//! A Gomoku board is a square grid of tri-state cells. The [`Board`] trait captures the
//! capability set the game needs (read, write, deep copy, win check) so the encoding can be
//! swapped without touching game or search code.
//!
//! ## Encodings
//! - [`PackedBoard`]: one `u64` per row, three bits per cell. The default; at most 21 columns.
//! - [`BitArrayBoard`]: two bits per cell in one contiguous bit array. No size limit.
//! - [`DenseBoard`]: one byte-sized [`Cell`] per cell. Used as the reference in tests.
//!
//! All encodings agree on every `get_cell`/`set_cell` result and every win check for the same
//! sequence of writes.

mod bit_array;
mod dense;
mod packed;

pub use bit_array::BitArrayBoard;
pub use dense::DenseBoard;
pub use packed::{PackedBoard, MAX_PACKED_SIZE};

use crate::error::ConfigError;
use std::fmt;

/// The four axes through a cell: horizontal, vertical, and the two diagonals.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Contents of a single board cell.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty = 0,
    Black = 1,
    White = 2,
}

impl Cell {
    pub(crate) fn bits(self) -> u64 {
        self as u64
    }

    pub(crate) fn from_bits(bits: u64) -> Cell {
        match bits {
            1 => Cell::Black,
            2 => Cell::White,
            _ => Cell::Empty,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The player owning a stone in this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }
}

/// One of the two sides. Black moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// Grid storage used by [`GomokuState`](crate::games::gomoku::GomokuState).
///
/// Coordinates outside `0..size()` are a programmer error and panic.
pub trait Board: Clone + fmt::Debug + Send + Sync {
    /// Creates an empty board of `size × size` cells.
    fn with_size(size: usize) -> Result<Self, ConfigError>
    where
        Self: Sized;

    /// Returns the grid dimension.
    fn size(&self) -> usize;

    /// Reads one cell.
    fn get_cell(&self, row: usize, col: usize) -> Cell;

    /// Writes one cell. No legality check is made.
    fn set_cell(&mut self, row: usize, col: usize, cell: Cell);

    /// Length of the contiguous run of the cell's value through `(row, col)` along one axis,
    /// counting the cell itself.
    fn line_length(&self, row: usize, col: usize, dr: isize, dc: isize) -> usize {
        walk_line(self, row, col, dr, dc)
    }

    /// Returns true if any axis through `(row, col)` holds a run of at least `win_length`.
    fn is_winning(&self, row: usize, col: usize, win_length: usize) -> bool {
        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| self.line_length(row, col, dr, dc) >= win_length)
    }
}

/// Cell-by-cell run count along `(dr, dc)` and its opposite.
pub(crate) fn walk_line<B: Board + ?Sized>(
    board: &B,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
) -> usize {
    1 + walk_ray(board, row, col, dr, dc) + walk_ray(board, row, col, -dr, -dc)
}

fn walk_ray<B: Board + ?Sized>(board: &B, row: usize, col: usize, dr: isize, dc: isize) -> usize {
    let target = board.get_cell(row, col);
    let size = board.size() as isize;
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    let mut count = 0;
    while r >= 0 && c >= 0 && r < size && c < size && board.get_cell(r as usize, c as usize) == target
    {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn random_cell(rng: &mut Xoshiro256PlusPlus) -> Cell {
        match rng.random_range(0..3) {
            0 => Cell::Empty,
            1 => Cell::Black,
            _ => Cell::White,
        }
    }

    #[test]
    fn test_encodings_agree_on_random_writes() {
        for seed in 0..20u64 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let size = rng.random_range(3..=MAX_PACKED_SIZE);
            let win_length = rng.random_range(2..=size.min(6));

            let mut packed = PackedBoard::with_size(size).unwrap();
            let mut bits = BitArrayBoard::with_size(size).unwrap();
            let mut dense = DenseBoard::with_size(size).unwrap();

            for _ in 0..size * size * 2 {
                let row = rng.random_range(0..size);
                let col = rng.random_range(0..size);
                let cell = random_cell(&mut rng);
                packed.set_cell(row, col, cell);
                bits.set_cell(row, col, cell);
                dense.set_cell(row, col, cell);

                assert_eq!(packed.get_cell(row, col), dense.get_cell(row, col));
                assert_eq!(bits.get_cell(row, col), dense.get_cell(row, col));

                let expected = dense.is_winning(row, col, win_length);
                assert_eq!(packed.is_winning(row, col, win_length), expected);
                assert_eq!(bits.is_winning(row, col, win_length), expected);
            }

            for row in 0..size {
                for col in 0..size {
                    let expected = dense.get_cell(row, col);
                    assert_eq!(packed.get_cell(row, col), expected);
                    assert_eq!(bits.get_cell(row, col), expected);
                    for &(dr, dc) in &DIRECTIONS {
                        let line = dense.line_length(row, col, dr, dc);
                        assert_eq!(packed.line_length(row, col, dr, dc), line);
                        assert_eq!(bits.line_length(row, col, dr, dc), line);
                    }
                }
            }
        }
    }

    #[test]
    fn test_win_on_each_axis() {
        let lines: [&[(usize, usize)]; 4] = [
            &[(2, 0), (2, 1), (2, 2)],
            &[(0, 3), (1, 3), (2, 3)],
            &[(1, 1), (2, 2), (3, 3)],
            &[(0, 4), (1, 3), (2, 2)],
        ];
        for line in lines {
            let mut board = PackedBoard::with_size(5).unwrap();
            for &(r, c) in line {
                board.set_cell(r, c, Cell::White);
            }
            let (r, c) = line[1];
            assert!(board.is_winning(r, c, 3), "line {:?}", line);
            assert!(!board.is_winning(r, c, 4), "line {:?}", line);
        }
    }

    #[test]
    fn test_run_interrupted_by_opponent() {
        let mut board = DenseBoard::with_size(7).unwrap();
        board.set_cell(3, 0, Cell::Black);
        board.set_cell(3, 1, Cell::Black);
        board.set_cell(3, 2, Cell::White);
        board.set_cell(3, 3, Cell::Black);
        assert_eq!(board.line_length(3, 1, 0, 1), 2);
        assert!(!board.is_winning(3, 1, 3));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = BitArrayBoard::with_size(6).unwrap();
        original.set_cell(1, 1, Cell::Black);
        let mut copy = original.clone();
        copy.set_cell(1, 1, Cell::White);
        copy.set_cell(5, 5, Cell::Black);
        assert_eq!(original.get_cell(1, 1), Cell::Black);
        assert_eq!(original.get_cell(5, 5), Cell::Empty);
    }

    #[test]
    fn test_size_limits() {
        assert_eq!(PackedBoard::with_size(0).unwrap_err(), ConfigError::EmptyBoard);
        assert_eq!(
            PackedBoard::with_size(MAX_PACKED_SIZE + 1).unwrap_err(),
            ConfigError::BoardTooLarge {
                size: MAX_PACKED_SIZE + 1,
                max: MAX_PACKED_SIZE
            }
        );
        assert!(PackedBoard::with_size(MAX_PACKED_SIZE).is_ok());
        assert!(BitArrayBoard::with_size(40).is_ok());
        assert_eq!(DenseBoard::with_size(0).unwrap_err(), ConfigError::EmptyBoard);
    }
}
