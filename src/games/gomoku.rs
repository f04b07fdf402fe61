//! # Gomoku Game Implementation
//!
//! Players alternate placing stones on an N×N grid. The first to form an unbroken line of
//! `win_length` stones horizontally, vertically or diagonally wins; a full board with no such
//! line is a draw.
//!
//! The state is built for simulation throughput: the legal-move set is maintained
//! incrementally (O(1) insert, remove and uniform sampling), moves can be undone so a search
//! worker walks one state back and forth instead of cloning it, and the win check only looks at
//! the four axes through the stone just placed.

use crate::board::{Board, Cell, PackedBoard, Player};
use crate::error::ConfigError;
use crate::eval;
use crate::GameState;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// A stone placement at `(row, col)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct GomokuMove(pub usize, pub usize);

impl GomokuMove {
    pub fn row(&self) -> usize {
        self.0
    }

    pub fn col(&self) -> usize {
        self.1
    }
}

impl fmt::Display for GomokuMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

impl FromStr for GomokuMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err("Expected format: r,c".to_string());
        }
        let r = parts[0].parse::<usize>().map_err(|e| e.to_string())?;
        let c = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
        Ok(GomokuMove(r, c))
    }
}

const VACANT: u32 = u32::MAX;

/// Set of empty cells with O(1) insert, remove, membership and indexed access.
///
/// `slots[row * size + col]` holds the position of that move inside `moves`, or `VACANT`.
#[derive(Clone, Debug)]
struct LegalMoves {
    moves: Vec<GomokuMove>,
    slots: Vec<u32>,
    size: usize,
}

impl LegalMoves {
    fn full(size: usize) -> Self {
        let moves: Vec<GomokuMove> = (0..size)
            .flat_map(|r| (0..size).map(move |c| GomokuMove(r, c)))
            .collect();
        let slots = (0..moves.len() as u32).collect();
        LegalMoves { moves, slots, size }
    }

    #[inline]
    fn slot_index(&self, mv: &GomokuMove) -> Option<usize> {
        (mv.0 < self.size && mv.1 < self.size).then(|| mv.0 * self.size + mv.1)
    }

    #[inline]
    fn contains(&self, mv: &GomokuMove) -> bool {
        self.slot_index(mv)
            .map_or(false, |idx| self.slots[idx] != VACANT)
    }

    fn insert(&mut self, mv: GomokuMove) -> bool {
        match self.slot_index(&mv) {
            Some(idx) if self.slots[idx] == VACANT => {
                self.slots[idx] = self.moves.len() as u32;
                self.moves.push(mv);
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, mv: &GomokuMove) -> bool {
        let Some(idx) = self.slot_index(mv) else {
            return false;
        };
        let slot = self.slots[idx];
        if slot == VACANT {
            return false;
        }
        let slot = slot as usize;
        self.moves.swap_remove(slot);
        if let Some(&moved) = self.moves.get(slot) {
            let moved_idx = moved.0 * self.size + moved.1;
            self.slots[moved_idx] = slot as u32;
        }
        self.slots[idx] = VACANT;
        true
    }

    #[inline]
    fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    fn as_slice(&self) -> &[GomokuMove] {
        &self.moves
    }
}

/// Complete state of a Gomoku game.
///
/// The board encoding is pluggable; [`PackedBoard`] is the default.
#[derive(Debug, Clone)]
pub struct GomokuState<B: Board = PackedBoard> {
    board: B,
    to_move: Player,
    /// Winner's cell, or `Cell::Empty` while no one has won.
    result: Cell,
    legal: LegalMoves,
    win_length: usize,
}

impl GomokuState<PackedBoard> {
    /// Creates an empty game on the default packed board.
    pub fn new(board_size: usize, win_length: usize) -> Result<Self, ConfigError> {
        Self::with_board(board_size, win_length)
    }
}

impl<B: Board> GomokuState<B> {
    /// Creates an empty game on a board of encoding `B`.
    pub fn with_board(board_size: usize, win_length: usize) -> Result<Self, ConfigError> {
        let board = B::with_size(board_size)?;
        if win_length == 0 || win_length > board_size {
            return Err(ConfigError::InvalidWinLength {
                win_length,
                board_size,
            });
        }
        Ok(GomokuState {
            board,
            to_move: Player::Black,
            result: Cell::Empty,
            legal: LegalMoves::full(board_size),
            win_length,
        })
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_size(&self) -> usize {
        self.board.size()
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// The side whose turn it is.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn winner(&self) -> Option<Player> {
        self.result.player()
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.board.get_cell(row, col)
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        let size = self.board.size();
        size * size - self.legal.len()
    }

    /// Adjacent in-grid coordinates of `(row, col)`, up to eight.
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<GomokuMove> {
        let size = self.board.size() as isize;
        let (row, col) = (row as isize, col as isize);
        let mut out = Vec::with_capacity(8);
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (r, c) = (row + dr, col + dc);
                if r >= 0 && c >= 0 && r < size && c < size {
                    out.push(GomokuMove(r as usize, c as usize));
                }
            }
        }
        out
    }

    /// Static pattern score of all stones on the board. See [`eval::evaluate_board`].
    pub fn evaluate_board(&self) -> f64 {
        eval::evaluate_board(&self.board)
    }

    #[inline]
    fn is_terminal(&self) -> bool {
        self.result != Cell::Empty || self.legal.len() == 0
    }
}

impl<B: Board> GameState for GomokuState<B> {
    type Move = GomokuMove;

    fn legal_moves(&self) -> Vec<Self::Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.legal.as_slice().to_vec()
    }

    fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        if self.is_terminal() {
            return None;
        }
        let moves = self.legal.as_slice();
        Some(moves[rng.random_range(0..moves.len())])
    }

    fn is_legal(&self, mv: &Self::Move) -> bool {
        !self.is_terminal() && self.legal.contains(mv)
    }

    fn make_move(&mut self, mv: &Self::Move) {
        if !self.is_legal(mv) {
            return;
        }
        let GomokuMove(row, col) = *mv;
        self.board.set_cell(row, col, self.to_move.into());
        if self.board.is_winning(row, col, self.win_length) {
            self.result = self.to_move.into();
        }
        self.legal.remove(mv);
        self.to_move = self.to_move.opponent();
    }

    fn undo_move(&mut self, mv: &Self::Move) {
        let GomokuMove(row, col) = *mv;
        if row >= self.board.size() || col >= self.board.size() || self.board.get_cell(row, col).is_empty() {
            return;
        }
        self.board.set_cell(row, col, Cell::Empty);
        self.result = Cell::Empty;
        self.legal.insert(*mv);
        self.to_move = self.to_move.opponent();
    }

    fn is_game_over(&self) -> bool {
        self.is_terminal()
    }

    fn result(&self) -> f64 {
        match self.result {
            Cell::White => 1.0,
            Cell::Black => 0.0,
            Cell::Empty => 0.5,
        }
    }

    fn desired_outcome(&self) -> i8 {
        match self.to_move {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    fn has_occupied_neighbor(&self, mv: &Self::Move) -> bool {
        self.neighbors(mv.0, mv.1)
            .iter()
            .any(|n| !self.board.get_cell(n.0, n.1).is_empty())
    }

    fn center(&self) -> Self::Move {
        let mid = self.board.size() / 2;
        GomokuMove(mid, mid)
    }

    fn evaluate(&self) -> f64 {
        eval::evaluate_player(&self.board, Player::White) - eval::evaluate_player(&self.board, Player::Black)
    }
}

impl<B: Board> fmt::Display for GomokuState<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.board.size();
        for r in 0..size {
            for c in 0..size {
                let symbol = match self.board.get_cell(r, c) {
                    Cell::Black => "X",
                    Cell::White => "O",
                    Cell::Empty => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BitArrayBoard, DenseBoard};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::collections::HashSet;

    fn play(state: &mut GomokuState, moves: &[(usize, usize)]) {
        for &(r, c) in moves {
            state.make_move(&GomokuMove(r, c));
        }
    }

    fn snapshot<B: Board>(state: &GomokuState<B>) -> (Vec<Cell>, HashSet<GomokuMove>) {
        let size = state.board_size();
        let cells = (0..size)
            .flat_map(|r| (0..size).map(move |c| (r, c)))
            .map(|(r, c)| state.cell(r, c))
            .collect();
        (cells, state.legal.as_slice().iter().copied().collect())
    }

    #[test]
    fn test_new_game() {
        let game = GomokuState::new(15, 5).unwrap();
        assert_eq!(game.to_move(), Player::Black);
        assert_eq!(game.legal_moves().len(), 225);
        assert_eq!(game.desired_outcome(), -1);
        assert_eq!(game.result(), 0.5);
        assert!(!game.is_game_over());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            GomokuState::new(5, 6),
            Err(ConfigError::InvalidWinLength { .. })
        ));
        assert!(matches!(
            GomokuState::new(22, 5),
            Err(ConfigError::BoardTooLarge { .. })
        ));
        assert!(GomokuState::<BitArrayBoard>::with_board(22, 5).is_ok());
    }

    #[test]
    fn test_three_in_a_row_on_small_board() {
        let mut game = GomokuState::new(5, 3).unwrap();
        play(&mut game, &[(0, 0), (1, 1), (0, 1), (1, 2)]);
        assert!(!game.is_game_over());
        game.make_move(&GomokuMove(0, 2));

        assert_eq!(game.winner(), Some(Player::Black));
        assert!(game.is_game_over());
        assert_eq!(game.result(), 0.0);
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_white_win_codes_high() {
        let mut game = GomokuState::new(5, 3).unwrap();
        play(&mut game, &[(4, 4), (0, 0), (4, 2), (1, 1), (3, 0), (2, 2)]);
        assert_eq!(game.winner(), Some(Player::White));
        assert_eq!(game.result(), 1.0);
    }

    #[test]
    fn test_draw_on_full_board() {
        let mut game = GomokuState::new(3, 3).unwrap();
        play(
            &mut game,
            &[(0, 0), (0, 2), (0, 1), (1, 0), (1, 2), (1, 1), (2, 0), (2, 1), (2, 2)],
        );
        assert!(game.is_game_over());
        assert_eq!(game.winner(), None);
        assert_eq!(game.result(), 0.5);
    }

    #[test]
    fn test_make_move_ignores_illegal_and_terminal() {
        let mut game = GomokuState::new(5, 3).unwrap();
        game.make_move(&GomokuMove(2, 2));
        game.make_move(&GomokuMove(2, 2));
        assert_eq!(game.to_move(), Player::White);
        assert_eq!(game.stone_count(), 1);

        game.make_move(&GomokuMove(7, 7));
        assert_eq!(game.stone_count(), 1);

        play(&mut game, &[(0, 0), (2, 3), (0, 1), (2, 4)]);
        assert!(game.is_game_over());
        let before = snapshot(&game);
        game.make_move(&GomokuMove(4, 4));
        assert_eq!(snapshot(&game), before);
    }

    #[test]
    fn test_legal_move_conservation_and_round_trip() {
        for seed in 0..10u64 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let mut game = GomokuState::new(9, 4).unwrap();
            let mut history = Vec::new();
            let mut snapshots = vec![snapshot(&game)];

            while let Some(mv) = game.random_move(&mut rng) {
                let before = game.legal.len();
                let to_move = game.to_move();
                game.make_move(&mv);
                assert_eq!(game.legal.len(), before - 1);
                assert_eq!(game.to_move(), to_move.opponent());
                assert!(!game.legal.contains(&mv));
                history.push(mv);
                snapshots.push(snapshot(&game));
            }

            snapshots.pop();
            while let Some(mv) = history.pop() {
                game.undo_move(&mv);
                assert_eq!(snapshot(&game), snapshots.pop().unwrap());
                assert!(!game.is_game_over());
            }
            assert_eq!(game.to_move(), Player::Black);
            assert_eq!(game.legal.len(), 81);
        }
    }

    #[test]
    fn test_legal_moves_are_empty_cells() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut game = GomokuState::<DenseBoard>::with_board(8, 5).unwrap();
        for _ in 0..20 {
            if let Some(mv) = game.random_move(&mut rng) {
                game.make_move(&mv);
            }
            for mv in game.legal_moves() {
                assert!(game.cell(mv.0, mv.1).is_empty());
            }
        }
    }

    #[test]
    fn test_clone_independence() {
        let mut game = GomokuState::new(6, 4).unwrap();
        play(&mut game, &[(1, 1), (2, 2)]);
        let original = snapshot(&game);

        let mut copy = game.clone();
        play(&mut copy, &[(3, 3), (4, 4), (5, 5)]);
        copy.undo_move(&GomokuMove(5, 5));
        copy.undo_move(&GomokuMove(4, 4));
        copy.undo_move(&GomokuMove(3, 3));
        copy.undo_move(&GomokuMove(2, 2));

        assert_eq!(snapshot(&game), original);
        assert_eq!(game.cell(2, 2), Cell::White);
    }

    #[test]
    fn test_result_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(99);
        for _ in 0..20 {
            let mut game = GomokuState::new(7, 4).unwrap();
            while let Some(mv) = game.random_move(&mut rng) {
                assert_eq!(game.result(), 0.5);
                game.make_move(&mv);
                let result = game.result();
                assert!((0.0..=1.0).contains(&result));
            }
            assert!(game.is_game_over());
        }
    }

    #[test]
    fn test_neighbors() {
        let game = GomokuState::new(5, 3).unwrap();
        assert_eq!(game.neighbors(0, 0).len(), 3);
        assert_eq!(game.neighbors(0, 2).len(), 5);
        assert_eq!(game.neighbors(2, 2).len(), 8);
        assert!(!game.neighbors(2, 2).contains(&GomokuMove(2, 2)));
    }

    #[test]
    fn test_occupied_neighbor_and_center() {
        let mut game = GomokuState::new(7, 4).unwrap();
        assert_eq!(game.center(), GomokuMove(3, 3));
        assert!(!game.has_occupied_neighbor(&GomokuMove(3, 4)));
        game.make_move(&GomokuMove(3, 3));
        assert!(game.has_occupied_neighbor(&GomokuMove(3, 4)));
        assert!(game.has_occupied_neighbor(&GomokuMove(2, 2)));
        assert!(!game.has_occupied_neighbor(&GomokuMove(3, 5)));
    }

    #[test]
    fn test_evaluate_is_signed() {
        let mut game = GomokuState::new(9, 5).unwrap();
        play(&mut game, &[(0, 0), (8, 8), (0, 1), (8, 6)]);
        assert!(game.evaluate() < 0.0);
        assert_eq!(game.evaluate_board(), 2.0 * eval::TWO_IN_A_ROW);
    }

    #[test]
    fn test_parse_and_display() {
        let mv: GomokuMove = "3, 4".parse().unwrap();
        assert_eq!(mv, GomokuMove(3, 4));
        assert_eq!(mv.to_string(), "(3,4)");
        assert!("3".parse::<GomokuMove>().is_err());
        assert!("a,b".parse::<GomokuMove>().is_err());

        let mut game = GomokuState::new(3, 3).unwrap();
        play(&mut game, &[(0, 0), (1, 1)]);
        assert_eq!(game.to_string(), "X . . \n. O . \n. . . \n");
    }
}
