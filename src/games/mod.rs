//! # Game Implementations Module
//!
//! Games implement the [`GameState`](crate::GameState) trait so the MCTS engine and the
//! alpha-beta searcher can drive them.
//!
//! ## Supported Games
//! - **Gomoku (N in a Row)**: configurable board size and win length, with a pluggable board
//!   encoding
//!
//! ## Adding New Games
//! The engine assumes two players alternating turns, legality of the form "every empty cell",
//! and a terminal result in `[0, 1]`. A new game needs:
//! 1. A `Copy + Eq + Hash` move type
//! 2. A state type implementing `GameState`, including reversible `make_move`/`undo_move`
//! 3. Display and parsing implementations for moves

pub mod gomoku;
