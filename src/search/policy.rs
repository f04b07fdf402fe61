//! Selection policies.
//!
//! A [`SelectionPolicy`] is chosen per search call. At the start of the call it is resolved
//! into a [`Selector`]: a plain score function plus an eligibility gate, so descending the
//! tree never re-dispatches on the policy per node.

use super::node::{NodeId, NodeStats};
use super::tree::SearchTree;
use crate::error::ConfigError;
use crate::GameState;
use std::fmt;
use std::str::FromStr;

/// Upper bound on the variance of a reward in `[0, 1]`.
const MAX_BERNOULLI_VARIANCE: f64 = 0.25;

/// Statistical formula used to pick a child during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionPolicy {
    /// Classic UCB1: `mean + sqrt(C · ln N / n)`.
    #[default]
    BasicUct,
    /// UCB1 with the exploration term scaled by the empirical reward variance.
    Ucb1Tuned,
    /// UCB1 for normally distributed rewards. Depends on a shared iteration counter, so it
    /// always runs on a single worker.
    Ucb1Normal,
    /// BasicUct ranking restricted to moves next to existing stones when possible.
    Heuristic,
}

impl SelectionPolicy {
    pub const ALL: [SelectionPolicy; 4] = [
        SelectionPolicy::BasicUct,
        SelectionPolicy::Ucb1Tuned,
        SelectionPolicy::Ucb1Normal,
        SelectionPolicy::Heuristic,
    ];

    /// Whether this policy must run with exactly one worker.
    pub fn is_single_threaded(self) -> bool {
        matches!(self, SelectionPolicy::Ucb1Normal)
    }

    pub fn name(self) -> &'static str {
        match self {
            SelectionPolicy::BasicUct => "basic-uct",
            SelectionPolicy::Ucb1Tuned => "ucb1-tuned",
            SelectionPolicy::Ucb1Normal => "ucb1-normal",
            SelectionPolicy::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "basicuct" | "uct" | "ucb1" => Ok(SelectionPolicy::BasicUct),
            "ucb1tuned" | "tuned" => Ok(SelectionPolicy::Ucb1Tuned),
            "ucb1normal" | "normal" => Ok(SelectionPolicy::Ucb1Normal),
            "heuristic" => Ok(SelectionPolicy::Heuristic),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Scores a child given `ln` of the parent's visit count and the exploration constant.
pub(crate) type ScoreFn = fn(&NodeStats, f64, f64) -> f64;

pub(crate) fn basic_uct(child: &NodeStats, ln_parent: f64, exploration: f64) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }
    let n = child.visits as f64;
    child.mean() + (exploration * ln_parent / n).sqrt()
}

pub(crate) fn ucb1_tuned(child: &NodeStats, ln_parent: f64, _exploration: f64) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }
    let n = child.visits as f64;
    let bound = (child.variance() + (2.0 * ln_parent / n).sqrt()).min(MAX_BERNOULLI_VARIANCE);
    child.mean() + (ln_parent / n * bound).sqrt()
}

/// Expects `ln_parent` to be `ln(max(N - 1, 1))`.
pub(crate) fn ucb1_normal(child: &NodeStats, ln_parent: f64, _exploration: f64) -> f64 {
    if child.visits < 2 {
        return f64::INFINITY;
    }
    let n = child.visits as f64;
    let mean = child.mean();
    let spread = ((child.reward_sq - n * mean * mean) / (n - 1.0)).max(0.0);
    mean + (16.0 * spread * ln_parent / n).sqrt()
}

/// Visits every child needs before UCB1-Normal may score it.
pub(crate) fn normal_visit_threshold(iteration: u32) -> u32 {
    (8.0 * (iteration.max(1) as f64).log10()).ceil() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Every child is eligible.
    Open,
    /// Under-sampled children are force-selected in child order.
    MinVisits,
    /// Prefer children whose move touches an existing stone.
    Adjacent,
}

/// A selection policy resolved for one search call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selector {
    policy: SelectionPolicy,
    score: ScoreFn,
    gate: Gate,
    exploration: f64,
}

impl Selector {
    pub(crate) fn new(policy: SelectionPolicy, exploration: f64) -> Self {
        let (score, gate): (ScoreFn, Gate) = match policy {
            SelectionPolicy::BasicUct => (basic_uct, Gate::Open),
            SelectionPolicy::Ucb1Tuned => (ucb1_tuned, Gate::Open),
            SelectionPolicy::Ucb1Normal => (ucb1_normal, Gate::MinVisits),
            SelectionPolicy::Heuristic => (basic_uct, Gate::Adjacent),
        };
        Selector {
            policy,
            score,
            gate,
            exploration,
        }
    }

    pub(crate) fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Picks a child of `node`. `state` must be the position at `node`; `iteration` is the
    /// 1-based iteration index of the calling worker.
    pub(crate) fn select<S: GameState>(
        &self,
        tree: &SearchTree<S::Move>,
        node: NodeId,
        state: &S,
        iteration: u32,
    ) -> Option<NodeId> {
        let parent = tree.get(node);
        let children = parent.children();
        if children.is_empty() {
            return None;
        }

        let parent_visits = parent.visits().max(1);
        let ln_parent = match self.gate {
            Gate::MinVisits => {
                let threshold = normal_visit_threshold(iteration);
                if let Some(&starved) = children
                    .iter()
                    .find(|&&id| tree.get(id).visits() < threshold)
                {
                    return Some(starved);
                }
                ((parent_visits - 1).max(1) as f64).ln()
            }
            _ => (parent_visits as f64).ln(),
        };

        let mut best: Option<(NodeId, f64)> = None;
        let mut best_adjacent: Option<(NodeId, f64)> = None;
        for &id in children {
            let child = tree.get(id);
            let score = (self.score)(&child.stats(), ln_parent, self.exploration);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((id, score));
            }
            if self.gate == Gate::Adjacent && best_adjacent.map_or(true, |(_, s)| score > s) {
                let touches_stone = child
                    .mv()
                    .map_or(false, |mv| state.has_occupied_neighbor(mv));
                if touches_stone {
                    best_adjacent = Some((id, score));
                }
            }
        }

        best_adjacent.or(best).map(|(id, _)| id)
    }
}
