//! # Game Controller Module - Central Game State Management
//!
//! The [`GameController`] owns the authoritative game state. Engines receive clones of it to
//! search; renderers read it or subscribe to per-ply [`BoardChange`] notifications.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      GameController                         │
//! │   authoritative GomokuState + move history + status         │
//! │            │                  │                  │          │
//! │            ▼                  ▼                  ▼          │
//! │   ┌───────────────┐   ┌──────────────┐   ┌──────────────┐   │
//! │   │ Opponent      │   │ Subscribers  │   │ Move input   │   │
//! │   │ (cloned state)│   │ (BoardChange)│   │ (validated)  │   │
//! │   └───────────────┘   └──────────────┘   └──────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every move, human or engine, is validated here before it is applied.

use crate::alphabeta::AlphaBeta;
use crate::board::Player;
use crate::error::SearchError;
use crate::games::gomoku::{GomokuMove, GomokuState};
use crate::search::MCTS;
use crate::GameState;
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        move_made: GomokuMove,
        player: Player,
        /// Whether the game is now over
        game_over: bool,
        /// Winner if game is over (None for draw)
        winner: Option<Player>,
    },
    /// Move was rejected as invalid
    Invalid { reason: MoveValidationError },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// Why a move was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveValidationError {
    #[error("illegal move {0}")]
    IllegalMove(GomokuMove),
    #[error("game is already over")]
    GameAlreadyOver,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    pub timestamp: SystemTime,
    pub player: Player,
    pub move_made: GomokuMove,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: Player, move_made: GomokuMove, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Player),
    Draw,
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// One stone placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardChange {
    pub row: usize,
    pub col: usize,
    pub player: Player,
}

type Subscriber = Box<dyn FnMut(&BoardChange) + Send>;

/// Anything that can pick a move for the side to move.
pub trait Opponent {
    fn name(&self) -> String;
    fn choose_move(&self, state: &GomokuState) -> Result<GomokuMove, SearchError>;
}

impl Opponent for MCTS<GomokuState> {
    fn name(&self) -> String {
        format!("MCTS ({}, {} iterations)", self.policy(), self.iterations())
    }

    fn choose_move(&self, state: &GomokuState) -> Result<GomokuMove, SearchError> {
        self.find_best_move(state)
    }
}

impl Opponent for AlphaBeta {
    fn name(&self) -> String {
        format!("Alpha-beta (depth {})", self.max_depth())
    }

    fn choose_move(&self, state: &GomokuState) -> Result<GomokuMove, SearchError> {
        self.find_best_move(state)
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(GomokuState::new(15, 5)?);
/// controller.subscribe(|change| println!("{:?}", change));
///
/// match controller.try_make_move(GomokuMove(7, 7)) {
///     MoveResult::Success { game_over, winner, .. } => { /* applied */ }
///     MoveResult::Invalid { reason } => { /* rejected */ }
///     MoveResult::GameOver => { /* nothing left to play */ }
/// }
///
/// controller.play_opponent(&engine)?;
/// ```
pub struct GameController {
    initial_state: GomokuState,
    game_state: GomokuState,
    move_history: Vec<MoveHistoryEntry>,
    status: GameStatus,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for GameController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameController")
            .field("game_state", &self.game_state)
            .field("move_history", &self.move_history)
            .field("status", &self.status)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl GameController {
    pub fn new(initial_state: GomokuState) -> Self {
        let status = Self::status_of(&initial_state);
        Self {
            game_state: initial_state.clone(),
            initial_state,
            move_history: Vec::new(),
            status,
            subscribers: Vec::new(),
        }
    }

    fn status_of(state: &GomokuState) -> GameStatus {
        if !state.is_game_over() {
            GameStatus::InProgress
        } else {
            match state.winner() {
                Some(player) => GameStatus::Win(player),
                None => GameStatus::Draw,
            }
        }
    }

    /// Registers a callback invoked after every applied move.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&BoardChange) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &GomokuMove) -> Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if !self.game_state.is_legal(mv) {
            return Err(MoveValidationError::IllegalMove(*mv));
        }
        Ok(())
    }

    /// Validates `mv`, applies it, records it and notifies subscribers.
    pub fn try_make_move(&mut self, mv: GomokuMove) -> MoveResult {
        if let Err(reason) = self.validate_move(&mv) {
            return match reason {
                MoveValidationError::GameAlreadyOver => MoveResult::GameOver,
                reason => MoveResult::Invalid { reason },
            };
        }

        let player = self.game_state.to_move();
        let move_number = self.move_history.len() + 1;
        self.game_state.make_move(&mv);
        self.move_history
            .push(MoveHistoryEntry::new(player, mv, move_number));
        self.status = Self::status_of(&self.game_state);

        let change = BoardChange {
            row: mv.row(),
            col: mv.col(),
            player,
        };
        for subscriber in &mut self.subscribers {
            subscriber(&change);
        }

        let winner = match self.status {
            GameStatus::Win(player) => Some(player),
            _ => None,
        };
        MoveResult::Success {
            move_made: mv,
            player,
            game_over: self.status.is_game_over(),
            winner,
        }
    }

    /// Asks `opponent` for a move on a copy of the current position and plays it.
    pub fn play_opponent(&mut self, opponent: &dyn Opponent) -> Result<MoveResult, SearchError> {
        if self.status.is_game_over() {
            return Ok(MoveResult::GameOver);
        }
        let mv = opponent.choose_move(&self.game_state)?;
        Ok(self.try_make_move(mv))
    }

    /// The authoritative position, for rendering.
    pub fn state(&self) -> &GomokuState {
        &self.game_state
    }

    pub fn current_player(&self) -> Player {
        self.game_state.to_move()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    pub fn history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    pub fn last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    pub fn legal_moves(&self) -> Vec<GomokuMove> {
        self.game_state.legal_moves()
    }

    /// Restores the starting position. Subscribers stay registered.
    pub fn reset(&mut self) {
        self.game_state = self.initial_state.clone();
        self.move_history.clear();
        self.status = Self::status_of(&self.game_state);
    }

    /// Move list and result as plain text.
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!(
            "=== Gomoku {}x{} (win {}) Game History ===\n\n",
            self.game_state.board_size(),
            self.game_state.board_size(),
            self.game_state.win_length()
        );
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number, entry.player, entry.move_made
            ));
        }

        match self.status {
            GameStatus::Win(winner) => output.push_str(&format!("\nResult: {} wins!\n", winner)),
            GameStatus::Draw => output.push_str("\nResult: Draw\n"),
            GameStatus::InProgress => output.push_str(&format!(
                "\n(Game in progress - {} to move)\n",
                self.current_player()
            )),
        }
        output
    }
}
