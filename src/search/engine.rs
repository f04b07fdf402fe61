//! The parallel search driver.
//!
//! Each call forks one task per worker on the engine's rayon pool. Every worker owns a clone of
//! the position, its own RNG and its own tree, so nothing is shared while the search runs. The
//! finished trees are handed back through a mutex-guarded vector and merged into a consensus
//! tree once the scope has joined.

use super::node::NodeId;
use super::policy::{SelectionPolicy, Selector};
use super::tree::{ChildSummary, SearchTree};
use crate::config::SearchConfig;
use crate::error::{ConfigError, SearchError};
use crate::GameState;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Statistics from one search call.
#[derive(Debug, Clone)]
pub struct SearchStatistics<M> {
    /// Workers that ran; 0 when the move was forced.
    pub workers: usize,
    pub iterations: u32,
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
    pub elapsed: Duration,
    pub children: Vec<ChildSummary<M>>,
}

impl<M> SearchStatistics<M> {
    fn forced(elapsed: Duration) -> Self {
        SearchStatistics {
            workers: 0,
            iterations: 0,
            total_nodes: 0,
            root_visits: 0,
            max_depth: 0,
            elapsed,
            children: Vec::new(),
        }
    }

    /// Playouts per second over the whole call.
    pub fn simulations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.root_visits as f64 / secs
        } else {
            0.0
        }
    }
}

/// Multi-threaded Monte Carlo Tree Search engine.
///
/// The policy, iteration budget and worker count are fixed at construction. The engine keeps no
/// tree between calls.
pub struct MCTS<S: GameState> {
    selector: Selector,
    iterations: u32,
    workers: usize,
    pool: ThreadPool,
    _state: PhantomData<fn(&S)>,
}

impl<S: GameState> MCTS<S> {
    /// Builds an engine from a validated configuration.
    ///
    /// # Errors
    /// Any invalid field of `config`, or a failure to start the worker pool.
    pub fn new(config: &SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let workers = config.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mcts-worker-{}", i))
            .build()?;
        debug!(policy = %config.policy, workers, iterations = config.iterations, "engine ready");
        Ok(MCTS {
            selector: Selector::new(config.policy, config.exploration),
            iterations: config.iterations,
            workers,
            pool,
            _state: PhantomData,
        })
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.selector.policy()
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Number of workers each search call forks.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Returns the recommended move for `state`.
    pub fn find_best_move(&self, state: &S) -> Result<S::Move, SearchError> {
        self.search(state).map(|(mv, _)| mv)
    }

    /// Runs one full search and returns the recommended move with statistics.
    ///
    /// `state` is never mutated. A position with a single legal move returns it without
    /// searching.
    pub fn search(&self, state: &S) -> Result<(S::Move, SearchStatistics<S::Move>), SearchError> {
        let start = Instant::now();
        let legal = state.legal_moves();
        match legal.as_slice() {
            [] => return Err(SearchError::NoLegalMoves),
            [only] => {
                debug!(mv = ?only, "single legal move, skipping search");
                return Ok((*only, SearchStatistics::forced(start.elapsed())));
            }
            _ => {}
        }

        let shares = split_iterations(self.iterations, self.workers);
        debug!(
            policy = %self.policy(),
            workers = shares.len(),
            iterations = self.iterations,
            "search started"
        );

        let finished: Mutex<Vec<Result<SearchTree<S::Move>, SearchError>>> =
            Mutex::new(Vec::with_capacity(shares.len()));
        let selector = &self.selector;
        self.pool.scope(|scope| {
            for (worker, &budget) in shares.iter().enumerate() {
                let finished = &finished;
                scope.spawn(move |_| {
                    let outcome = run_worker(state, budget, selector, rand::random());
                    if let Ok(tree) = &outcome {
                        trace!(worker, budget, nodes = tree.len(), "worker finished");
                    }
                    finished.lock().push(outcome);
                });
            }
        });

        let mut trees = finished.into_inner().into_iter();
        let mut consensus = trees.next().ok_or(SearchError::NoMoveFound)??;
        for tree in trees {
            consensus.merge(tree?)?;
        }

        let mv = consensus.best_move(self.policy(), state)?;
        let tree_stats = consensus.stats();
        let stats = SearchStatistics {
            workers: shares.len(),
            iterations: self.iterations,
            total_nodes: tree_stats.total_nodes,
            root_visits: tree_stats.root_visits,
            max_depth: tree_stats.max_depth,
            elapsed: start.elapsed(),
            children: consensus.root_children(),
        };
        debug!(
            mv = ?mv,
            workers = stats.workers,
            nodes = stats.total_nodes,
            root_visits = stats.root_visits,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok((mv, stats))
    }
}

/// Splits `total` iterations over at most `workers` workers, the remainder going one each to
/// the first workers.
pub(crate) fn split_iterations(total: u32, workers: usize) -> Vec<u32> {
    let count = workers.clamp(1, total.max(1) as usize) as u32;
    let base = total / count;
    let remainder = total % count;
    (0..count).map(|i| base + u32::from(i < remainder)).collect()
}

/// Runs `budget` iterations on a private tree rooted at `root`.
pub(crate) fn run_worker<S: GameState>(
    root: &S,
    budget: u32,
    selector: &Selector,
    seed: u64,
) -> Result<SearchTree<S::Move>, SearchError> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut state = root.clone();
    let mut tree = SearchTree::new(state.legal_moves(), -state.desired_outcome());
    let mut applied: Vec<S::Move> = Vec::new();

    for iteration in 1..=budget {
        let mut node = tree.root();

        while tree.get(node).untried().is_empty() {
            let Some(child) = selector.select(&tree, node, &state, iteration) else {
                break;
            };
            let mv = *tree.get(child).mv().ok_or(SearchError::NoMoveFound)?;
            state.make_move(&mv);
            applied.push(mv);
            node = child;
        }

        node = expand(&mut tree, node, &mut state, &mut applied, &mut rng)?;

        while let Some(mv) = state.random_move(&mut rng) {
            state.make_move(&mv);
            applied.push(mv);
        }
        let result = state.result();

        while let Some(mv) = applied.pop() {
            state.undo_move(&mv);
        }
        tree.backpropagate(node, result);
    }

    Ok(tree)
}

/// Materializes one uniformly chosen untried move of `node`, if any remain.
fn expand<S: GameState, R: Rng>(
    tree: &mut SearchTree<S::Move>,
    node: NodeId,
    state: &mut S,
    applied: &mut Vec<S::Move>,
    rng: &mut R,
) -> Result<NodeId, SearchError> {
    let untried = tree.get(node).untried();
    if untried.is_empty() {
        return Ok(node);
    }
    let mv = untried[rng.random_range(0..untried.len())];
    let mover = state.desired_outcome();
    state.make_move(&mv);
    applied.push(mv);
    tree.add_child(node, mv, state.legal_moves(), mover)
}
