//! Static pattern heuristic.
//!
//! Every stone contributes, for each of the four axes, a fixed weight looked up by the length
//! of the contiguous run it belongs to. A run of length `k` is therefore counted once per stone
//! in it. Used as the MCTS tie-break and as the alpha-beta leaf evaluation.

use crate::board::{Board, Cell, Player, DIRECTIONS};

pub const TWO_IN_A_ROW: f64 = 100.0;
pub const THREE_IN_A_ROW: f64 = 1_000.0;
pub const FOUR_IN_A_ROW: f64 = 10_000.0;
pub const FIVE_IN_A_ROW: f64 = 1_000_000.0;

/// Weight of a single run. Overlines score like five.
pub fn run_score(length: usize) -> f64 {
    match length {
        0 | 1 => 0.0,
        2 => TWO_IN_A_ROW,
        3 => THREE_IN_A_ROW,
        4 => FOUR_IN_A_ROW,
        _ => FIVE_IN_A_ROW,
    }
}

fn cell_score<B: Board>(board: &B, row: usize, col: usize) -> f64 {
    DIRECTIONS
        .iter()
        .map(|&(dr, dc)| run_score(board.line_length(row, col, dr, dc)))
        .sum()
}

/// Sum of the pattern scores of every occupied cell, regardless of owner.
pub fn evaluate_board<B: Board>(board: &B) -> f64 {
    let size = board.size();
    let mut score = 0.0;
    for row in 0..size {
        for col in 0..size {
            if !board.get_cell(row, col).is_empty() {
                score += cell_score(board, row, col);
            }
        }
    }
    score
}

/// Pattern score of one player's stones only.
pub fn evaluate_player<B: Board>(board: &B, player: Player) -> f64 {
    let target = Cell::from(player);
    let size = board.size();
    let mut score = 0.0;
    for row in 0..size {
        for col in 0..size {
            if board.get_cell(row, col) == target {
                score += cell_score(board, row, col);
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PackedBoard;

    #[test]
    fn test_empty_board_scores_zero() {
        let board = PackedBoard::with_size(9).unwrap();
        assert_eq!(evaluate_board(&board), 0.0);
    }

    #[test]
    fn test_isolated_stone_scores_zero() {
        let mut board = PackedBoard::with_size(9).unwrap();
        board.set_cell(4, 4, Cell::Black);
        assert_eq!(evaluate_board(&board), 0.0);
    }

    #[test]
    fn test_runs_counted_per_stone() {
        let mut board = PackedBoard::with_size(9).unwrap();
        board.set_cell(0, 0, Cell::Black);
        board.set_cell(0, 1, Cell::Black);
        assert_eq!(evaluate_board(&board), 2.0 * TWO_IN_A_ROW);

        board.set_cell(0, 2, Cell::Black);
        assert_eq!(evaluate_board(&board), 3.0 * THREE_IN_A_ROW);
    }

    #[test]
    fn test_player_scores_split_the_board() {
        let mut board = PackedBoard::with_size(9).unwrap();
        board.set_cell(0, 0, Cell::Black);
        board.set_cell(1, 0, Cell::Black);
        board.set_cell(5, 5, Cell::White);
        board.set_cell(5, 6, Cell::White);
        board.set_cell(5, 7, Cell::White);

        let black = evaluate_player(&board, Player::Black);
        let white = evaluate_player(&board, Player::White);
        assert_eq!(black, 2.0 * TWO_IN_A_ROW);
        assert_eq!(white, 3.0 * THREE_IN_A_ROW);
        assert_eq!(black + white, evaluate_board(&board));
    }

    #[test]
    fn test_weights_increase() {
        let weights: Vec<f64> = (1..=6).map(run_score).collect();
        assert!(weights.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(run_score(6), FIVE_IN_A_ROW);
    }
}
