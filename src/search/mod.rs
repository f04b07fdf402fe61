//! # Monte Carlo Tree Search
//!
//! - [`node`]: per-node accumulators and the arena index type
//! - [`tree`]: the arena tree with expansion, backpropagation and merging
//! - [`policy`]: selection formulas and their per-call resolution
//! - [`engine`]: the fork-join driver that runs workers and merges their trees

pub mod engine;
pub mod node;
pub mod policy;
pub mod tree;

pub use engine::{SearchStatistics, MCTS};
pub use node::{NodeId, NodeStats, SearchNode};
pub use policy::SelectionPolicy;
pub use tree::{ChildSummary, SearchTree, TreeStats};
