//! Search tree nodes.

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Visit and reward accumulators of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    pub visits: u32,
    pub reward: f64,
    pub reward_sq: f64,
}

impl NodeStats {
    /// Mean reward, or 0 for an unvisited node.
    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / self.visits as f64
        }
    }

    /// Population variance of the rewards seen so far.
    pub fn variance(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.reward_sq / self.visits as f64 - mean * mean).max(0.0)
    }

    pub(crate) fn absorb(&mut self, other: &NodeStats) {
        self.visits += other.visits;
        self.reward += other.reward;
        self.reward_sq += other.reward_sq;
    }
}

/// One node of a search tree.
///
/// Rewards are stored from the point of view of the side that played `mv`, so a parent always
/// maximizes over its children for the player choosing between them.
#[derive(Debug, Clone)]
pub struct SearchNode<M> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) untried: Vec<M>,
    /// Move leading here from the parent; `None` at the root.
    pub(crate) mv: Option<M>,
    /// Desired-outcome sign of the side that played `mv`.
    pub(crate) mover: i8,
    pub(crate) stats: NodeStats,
}

impl<M> SearchNode<M> {
    pub(crate) fn new_root(untried: Vec<M>, mover: i8) -> Self {
        SearchNode {
            parent: None,
            children: Vec::new(),
            untried,
            mv: None,
            mover,
            stats: NodeStats::default(),
        }
    }

    pub(crate) fn new_child(parent: NodeId, mv: M, untried: Vec<M>, mover: i8) -> Self {
        SearchNode {
            parent: Some(parent),
            children: Vec::new(),
            untried,
            mv: Some(mv),
            mover,
            stats: NodeStats::default(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn untried(&self) -> &[M] {
        &self.untried
    }

    pub fn mv(&self) -> Option<&M> {
        self.mv.as_ref()
    }

    pub fn visits(&self) -> u32 {
        self.stats.visits
    }

    pub fn reward(&self) -> f64 {
        self.stats.reward
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean()
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Records one visit with the given reward.
    pub fn update(&mut self, reward: f64) {
        self.stats.visits += 1;
        self.stats.reward += reward;
        self.stats.reward_sq += reward * reward;
    }

    /// Converts a terminal result in `[0, 1]` (higher favors the +1 side) into this node's
    /// perspective.
    #[inline]
    pub(crate) fn reward_for(&self, result: f64) -> f64 {
        if self.mover > 0 {
            result
        } else {
            1.0 - result
        }
    }
}
