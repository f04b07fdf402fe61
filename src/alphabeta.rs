//! Depth-limited alpha-beta searcher.
//!
//! A single-threaded negamax over one cloned state, driven by make/undo pairs. It serves as a
//! deterministic reference opponent for the MCTS engine.

use crate::error::SearchError;
use crate::eval::FIVE_IN_A_ROW;
use crate::GameState;
use std::time::Instant;
use tracing::debug;

/// Magnitude of a decided game; above any static evaluation.
pub const WIN_SCORE: f64 = FIVE_IN_A_ROW * 100.0;

/// Terminal value, White-positive. Remaining depth is added so faster wins rank higher.
fn terminal_score(result: f64, depth: u32) -> f64 {
    (result - 0.5) * (WIN_SCORE + depth as f64)
}

/// Legal moves next to a stone, or every legal move when none are.
fn candidates<S: GameState>(state: &S) -> Vec<S::Move> {
    let legal = state.legal_moves();
    let near: Vec<S::Move> = legal
        .iter()
        .copied()
        .filter(|mv| state.has_occupied_neighbor(mv))
        .collect();
    if near.is_empty() {
        legal
    } else {
        near
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaBeta {
    max_depth: u32,
}

impl AlphaBeta {
    /// A searcher looking `max_depth` plies ahead (at least one).
    pub fn new(max_depth: u32) -> Self {
        AlphaBeta {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Best move for the side to move in `state`.
    pub fn find_best_move<S: GameState>(&self, state: &S) -> Result<S::Move, SearchError> {
        let start = Instant::now();
        let mut probe = state.clone();
        let mut nodes = 0u64;
        let mut alpha = f64::NEG_INFINITY;
        let mut best = None;

        for mv in candidates(&probe) {
            probe.make_move(&mv);
            let score = -self.negamax(
                &mut probe,
                self.max_depth - 1,
                f64::NEG_INFINITY,
                -alpha,
                &mut nodes,
            );
            probe.undo_move(&mv);
            if best.is_none() || score > alpha {
                alpha = score;
                best = Some(mv);
            }
        }

        debug!(
            depth = self.max_depth,
            nodes,
            score = alpha,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "alpha-beta finished"
        );
        best.ok_or(SearchError::NoLegalMoves)
    }

    /// Value of `state` for the side to move.
    fn negamax<S: GameState>(
        &self,
        state: &mut S,
        depth: u32,
        mut alpha: f64,
        beta: f64,
        nodes: &mut u64,
    ) -> f64 {
        *nodes += 1;
        let sign = state.desired_outcome() as f64;
        if state.is_game_over() {
            return sign * terminal_score(state.result(), depth);
        }
        if depth == 0 {
            return sign * state.evaluate();
        }

        let mut best = f64::NEG_INFINITY;
        for mv in candidates(state) {
            state.make_move(&mv);
            let score = -self.negamax(state, depth - 1, -beta, -alpha, nodes);
            state.undo_move(&mv);
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }
}
