//! # Parallel MCTS Gomoku Engine
//!
//! A multi-threaded Monte Carlo Tree Search engine for N-in-a-row games.
//!
//! ## Architecture
//! - **Fork-join workers**: each search call runs one independent tree per worker on a rayon
//!   pool and merges them into a consensus tree after the join
//! - **Arena trees**: nodes are addressed by [`search::NodeId`]; the parent link is an index
//! - **Selection policies**: BasicUct, UCB1-Tuned, UCB1-Normal and an adjacency heuristic,
//!   chosen per engine
//! - **Pluggable boards**: packed-word, bit-array and dense encodings behind one trait
//!
//! ## Usage
//! ```rust,no_run
//! use mcts::{SearchConfig, MCTS};
//! use mcts::games::gomoku::GomokuState;
//!
//! let config = SearchConfig::default();
//! let engine: MCTS<GomokuState> = MCTS::new(&config)?;
//! let state = config.new_game()?;
//! let (best, stats) = engine.search(&state)?;
//! println!("{} after {} playouts", best, stats.root_visits);
//! # Ok::<(), mcts::Error>(())
//! ```

pub mod alphabeta;
pub mod board;
pub mod config;
pub mod error;
pub mod eval;
pub mod game_controller;
pub mod games;
pub mod search;

pub use alphabeta::AlphaBeta;
pub use config::SearchConfig;
pub use error::{ConfigError, Error, SearchError};
pub use search::{SearchStatistics, SelectionPolicy, MCTS};

use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

/// A two-player, alternating-turn game position the searchers can drive.
///
/// `Send` and `Sync` are required because every search worker owns a clone.
pub trait GameState: Clone + Send + Sync {
    /// The type of a move in the game.
    type Move: Copy + Eq + Hash + Debug + Send + Sync;

    /// All legal moves; empty once the game is over.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// A uniformly random legal move, or `None` once the game is over.
    fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move>;

    fn is_legal(&self, mv: &Self::Move) -> bool;

    /// Plays `mv` for the side to move. Illegal moves and moves after the end are ignored.
    fn make_move(&mut self, mv: &Self::Move);

    /// Takes back `mv`. Only the most recent move may be undone.
    fn undo_move(&mut self, mv: &Self::Move);

    fn is_game_over(&self) -> bool;

    /// Terminal value in `[0, 1]`: 1 when the second player won, 0 when the first player won,
    /// 0.5 for a draw or an unfinished game.
    fn result(&self) -> f64;

    /// `+1` when the side to move wants `result()` high, `-1` when it wants it low.
    fn desired_outcome(&self) -> i8;

    /// Whether a cell next to `mv` is occupied.
    fn has_occupied_neighbor(&self, mv: &Self::Move) -> bool;

    /// The middle of the board, used when a search has nothing better.
    fn center(&self) -> Self::Move;

    /// Static evaluation with the same orientation as `result()`.
    fn evaluate(&self) -> f64;
}
