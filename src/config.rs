//! Search and game configuration.

use crate::board::MAX_PACKED_SIZE;
use crate::error::ConfigError;
use crate::games::gomoku::GomokuState;
use crate::search::SelectionPolicy;

/// Everything needed to set up a game and an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub board_size: usize,
    pub win_length: usize,
    /// Total iterations per search call, split across workers.
    pub iterations: u32,
    pub policy: SelectionPolicy,
    /// The `C` in `sqrt(C · ln N / n)`.
    pub exploration: f64,
    /// Worker threads; 0 uses every logical CPU.
    pub num_threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            board_size: 15,
            win_length: 5,
            iterations: 10_000,
            policy: SelectionPolicy::BasicUct,
            exploration: 5.0,
            num_threads: 0,
        }
    }
}

impl SearchConfig {
    /// A small, fast preset for tests.
    pub fn for_testing() -> Self {
        SearchConfig {
            board_size: 7,
            win_length: 4,
            iterations: 500,
            num_threads: 2,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if self.board_size > MAX_PACKED_SIZE {
            return Err(ConfigError::BoardTooLarge {
                size: self.board_size,
                max: MAX_PACKED_SIZE,
            });
        }
        if self.win_length == 0 || self.win_length > self.board_size {
            return Err(ConfigError::InvalidWinLength {
                win_length: self.win_length,
                board_size: self.board_size,
            });
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        Ok(())
    }

    /// Workers a search will use. UCB1-Normal always runs on one.
    pub fn worker_count(&self) -> usize {
        if self.policy.is_single_threaded() {
            1
        } else if self.num_threads > 0 {
            self.num_threads
        } else {
            num_cpus::get().max(1)
        }
    }

    /// An empty game with this board size and win length.
    pub fn new_game(&self) -> Result<GomokuState, ConfigError> {
        GomokuState::new(self.board_size, self.win_length)
    }
}
