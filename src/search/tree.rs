//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`]. The parent link is a
//! plain index used to walk back up during backpropagation; ownership runs strictly top-down
//! through the arena.

use super::node::{NodeId, SearchNode};
use super::policy::SelectionPolicy;
use crate::error::SearchError;
use crate::GameState;
use std::fmt::Debug;

/// Statistics about a search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}

/// Summary of one child of the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary<M> {
    pub mv: M,
    pub visits: u32,
    pub mean: f64,
}

/// A search tree owned by a single worker, or the consensus tree after merging.
#[derive(Debug, Clone)]
pub struct SearchTree<M> {
    nodes: Vec<SearchNode<M>>,
}

impl<M: Clone + PartialEq + Debug> SearchTree<M> {
    /// Creates a tree holding only a root with the given untried moves. `mover` is the
    /// desired-outcome sign of the side that moved into the root position.
    pub fn new(root_untried: Vec<M>, mover: i8) -> Self {
        SearchTree {
            nodes: vec![SearchNode::new_root(root_untried, mover)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode<M> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<M> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: SearchNode<M>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Expands `mv` from `parent`. `untried` are the legal moves of the resulting position and
    /// `mover` is the desired-outcome sign of the side playing `mv`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        mv: M,
        untried: Vec<M>,
        mover: i8,
    ) -> Result<NodeId, SearchError> {
        let position = self
            .get(parent)
            .untried
            .iter()
            .position(|m| *m == mv)
            .ok_or_else(|| SearchError::MoveNotUntried(format!("{:?}", mv)))?;
        self.get_mut(parent).untried.swap_remove(position);

        let child = self.allocate(SearchNode::new_child(parent, mv, untried, mover));
        self.get_mut(parent).children.push(child);
        Ok(child)
    }

    /// Credits a terminal result to `leaf` and every ancestor, each from its own mover's view.
    pub fn backpropagate(&mut self, leaf: NodeId, result: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            let reward = node.reward_for(result);
            node.update(reward);
            current = node.parent;
        }
    }

    /// The recommended move: the most visited child of the root, ties going to the higher mean.
    ///
    /// Under [`SelectionPolicy::Heuristic`] remaining ties are broken by the static evaluation
    /// after the move, and a root without children falls back to the center cell.
    pub fn best_move<S>(&self, policy: SelectionPolicy, state: &S) -> Result<M, SearchError>
    where
        S: GameState<Move = M>,
    {
        let root = self.get(self.root());
        if root.children.is_empty() {
            if policy == SelectionPolicy::Heuristic {
                let center = state.center();
                if state.is_legal(&center) {
                    return Ok(center);
                }
            }
            return Err(SearchError::NoMoveFound);
        }

        let key = |id: &NodeId| {
            let node = self.get(*id);
            (node.visits(), node.mean())
        };
        let (top_visits, top_mean) = root
            .children
            .iter()
            .map(key)
            .fold((0, f64::NEG_INFINITY), |best, k| {
                if k.0 > best.0 || (k.0 == best.0 && k.1 > best.1) {
                    k
                } else {
                    best
                }
            });
        let leaders: Vec<NodeId> = root
            .children
            .iter()
            .copied()
            .filter(|id| key(id) == (top_visits, top_mean))
            .collect();

        let chosen = if leaders.len() > 1 && policy == SelectionPolicy::Heuristic {
            let mut probe = state.clone();
            let sign = state.desired_outcome() as f64;
            let mut scored = Vec::with_capacity(leaders.len());
            for id in leaders {
                let Some(mv) = self.get(id).mv.clone() else {
                    continue;
                };
                probe.make_move(&mv);
                let score = probe.evaluate() * sign;
                probe.undo_move(&mv);
                scored.push((mv, score));
            }
            scored
                .into_iter()
                .fold(None, |best: Option<(M, f64)>, (mv, score)| match best {
                    Some((_, s)) if s >= score => best,
                    _ => Some((mv, score)),
                })
                .map(|(mv, _)| mv)
        } else {
            leaders.first().and_then(|id| self.get(*id).mv.clone())
        };

        chosen.ok_or(SearchError::NoMoveFound)
    }

    /// Folds `other` into this tree.
    ///
    /// Both trees must be rooted at the same position. Matching nodes (same creating move)
    /// add their accumulators; subtrees present only in `other` are adopted.
    pub fn merge(&mut self, mut other: SearchTree<M>) -> Result<(), SearchError> {
        let other_root = other.root();
        self.merge_node(self.root(), &mut other, other_root)
    }

    pub(crate) fn merge_node(
        &mut self,
        into: NodeId,
        other: &mut SearchTree<M>,
        from: NodeId,
    ) -> Result<(), SearchError> {
        if self.get(into).mv != other.get(from).mv {
            return Err(SearchError::MergeMismatch);
        }
        let stats = other.get(from).stats;
        self.get_mut(into).stats.absorb(&stats);

        let incoming = std::mem::take(&mut other.get_mut(from).children);
        for child in incoming {
            let mv = other.get(child).mv.clone();
            let matching = self
                .get(into)
                .children
                .iter()
                .copied()
                .find(|&id| self.get(id).mv == mv);
            match matching {
                Some(existing) => self.merge_node(existing, other, child)?,
                None => {
                    if let Some(mv) = &mv {
                        self.get_mut(into).untried.retain(|m| m != mv);
                    }
                    let adopted = self.graft(into, other, child);
                    self.get_mut(into).children.push(adopted);
                }
            }
        }
        Ok(())
    }

    /// Moves the subtree at `from` out of `other` and attaches it under `parent`.
    fn graft(&mut self, parent: NodeId, other: &mut SearchTree<M>, from: NodeId) -> NodeId {
        let source = other.get_mut(from);
        let grandchildren = std::mem::take(&mut source.children);
        let node = SearchNode {
            parent: Some(parent),
            children: Vec::with_capacity(grandchildren.len()),
            untried: std::mem::take(&mut source.untried),
            mv: source.mv.take(),
            mover: source.mover,
            stats: source.stats,
        };
        let id = self.allocate(node);
        for grandchild in grandchildren {
            let adopted = self.graft(id, other, grandchild);
            self.get_mut(id).children.push(adopted);
        }
        id
    }

    /// Visit and reward totals of the root's children.
    pub fn root_children(&self) -> Vec<ChildSummary<M>> {
        self.get(self.root())
            .children
            .iter()
            .filter_map(|&id| {
                let node = self.get(id);
                node.mv.clone().map(|mv| ChildSummary {
                    mv,
                    visits: node.visits(),
                    mean: node.mean(),
                })
            })
            .collect()
    }

    pub fn stats(&self) -> TreeStats {
        let mut max_depth = 0;
        let mut stack = vec![(self.root(), 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.get(id).children.iter().map(|&c| (c, depth + 1)));
        }
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: self.get(self.root()).visits(),
            max_depth,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::games::gomoku::{GomokuMove, GomokuState};
    use std::collections::HashMap;

    /// Visit and reward totals keyed by the move path from the root.
    pub(crate) fn path_totals<M: Clone + PartialEq + Debug + std::hash::Hash + Eq>(
        tree: &SearchTree<M>,
    ) -> HashMap<Vec<M>, (u32, f64)> {
        let mut totals = HashMap::new();
        let mut stack = vec![(tree.root(), Vec::new())];
        while let Some((id, path)) = stack.pop() {
            let node = tree.get(id);
            totals.insert(path.clone(), (node.visits(), node.reward()));
            for &child in node.children() {
                let mut next = path.clone();
                if let Some(mv) = tree.get(child).mv() {
                    next.push(mv.clone());
                }
                stack.push((child, next));
            }
        }
        totals
    }

    fn visit(tree: &mut SearchTree<u8>, id: NodeId, times: u32, result: f64) {
        for _ in 0..times {
            tree.backpropagate(id, result);
        }
    }

    #[test]
    fn test_new_tree() {
        let tree: SearchTree<u8> = SearchTree::new(vec![1, 2, 3], -1);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert!(tree.get(tree.root()).parent().is_none());
        assert_eq!(tree.get(tree.root()).untried(), &[1, 2, 3]);
    }

    #[test]
    fn test_add_child_consumes_untried_move() {
        let mut tree: SearchTree<u8> = SearchTree::new(vec![1, 2, 3], -1);
        let child = tree.add_child(tree.root(), 2, vec![1, 3], -1).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(tree.root()).children(), &[child]);
        assert!(!tree.get(tree.root()).untried().contains(&2));
        assert_eq!(tree.get(child).parent(), Some(tree.root()));
        assert_eq!(tree.get(child).mv(), Some(&2));

        let err = tree.add_child(tree.root(), 2, vec![], 1).unwrap_err();
        assert_eq!(err, SearchError::MoveNotUntried("2".to_string()));
    }

    #[test]
    fn test_backpropagate_alternates_perspective() {
        let mut tree: SearchTree<u8> = SearchTree::new(vec![1], 1);
        let black = tree.add_child(tree.root(), 1, vec![2], -1).unwrap();
        let white = tree.add_child(black, 2, vec![], 1).unwrap();

        // White won.
        tree.backpropagate(white, 1.0);
        assert_eq!(tree.get(white).reward(), 1.0);
        assert_eq!(tree.get(black).reward(), 0.0);
        assert_eq!(tree.get(tree.root()).reward(), 1.0);
        for id in [tree.root(), black, white] {
            assert_eq!(tree.get(id).visits(), 1);
        }
    }

    #[test]
    fn test_merge_adds_matching_and_adopts_missing() {
        let mut a: SearchTree<u8> = SearchTree::new(vec![1, 2, 3], -1);
        let a1 = a.add_child(a.root(), 1, vec![2, 3], 1).unwrap();
        visit(&mut a, a1, 3, 1.0);

        let mut b: SearchTree<u8> = SearchTree::new(vec![1, 2, 3], -1);
        let b1 = b.add_child(b.root(), 1, vec![2, 3], 1).unwrap();
        let b2 = b.add_child(b.root(), 2, vec![1, 3], 1).unwrap();
        let b21 = b.add_child(b2, 1, vec![3], -1).unwrap();
        visit(&mut b, b1, 2, 0.0);
        visit(&mut b, b21, 4, 0.5);

        a.merge(b).unwrap();

        let root = a.get(a.root());
        assert_eq!(root.visits(), 9);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.untried(), &[3]);

        let summary = a.root_children();
        let one = summary.iter().find(|c| c.mv == 1).unwrap();
        assert_eq!(one.visits, 5);
        assert!((one.mean - 3.0 / 5.0).abs() < 1e-12);

        let two = summary.iter().find(|c| c.mv == 2).unwrap();
        assert_eq!(two.visits, 4);
        let adopted = a.get(a.root()).children()[1];
        let grandchild = a.get(adopted).children()[0];
        assert_eq!(a.get(grandchild).parent(), Some(adopted));
        assert_eq!(a.get(grandchild).visits(), 4);
        assert_eq!(a.stats().max_depth, 2);
    }

    #[test]
    fn test_merge_rejects_different_moves() {
        let mut a: SearchTree<u8> = SearchTree::new(vec![1, 2], -1);
        let a1 = a.add_child(a.root(), 1, vec![], 1).unwrap();
        let mut b: SearchTree<u8> = SearchTree::new(vec![1, 2], -1);
        let b2 = b.add_child(b.root(), 2, vec![], 1).unwrap();
        assert_eq!(a.merge_node(a1, &mut b, b2), Err(SearchError::MergeMismatch));
    }

    #[test]
    fn test_merge_order_does_not_change_totals() {
        let build = |visits: &[(u8, u32, f64)]| {
            let mut tree: SearchTree<u8> = SearchTree::new(vec![0, 1, 2, 3], -1);
            for &(mv, times, result) in visits {
                let child = tree.add_child(tree.root(), mv, vec![], 1).unwrap();
                visit(&mut tree, child, times, result);
            }
            tree
        };
        let a = build(&[(0, 3, 1.0), (1, 2, 0.0)]);
        let b = build(&[(1, 5, 0.5), (2, 1, 1.0)]);
        let c = build(&[(3, 2, 0.25), (0, 4, 0.0)]);

        let mut forward = a.clone();
        forward.merge(b.clone()).unwrap();
        forward.merge(c.clone()).unwrap();

        let mut backward = c;
        backward.merge(b).unwrap();
        backward.merge(a).unwrap();

        let forward = path_totals(&forward);
        let backward = path_totals(&backward);
        assert_eq!(forward.len(), backward.len());
        for (path, (visits, reward)) in &forward {
            let (other_visits, other_reward) = backward[path];
            assert_eq!(*visits, other_visits, "path {:?}", path);
            assert!((reward - other_reward).abs() < 1e-9, "path {:?}", path);
        }
    }

    #[test]
    fn test_best_move_prefers_most_visited() {
        let state = GomokuState::new(3, 3).unwrap();
        let mut tree = SearchTree::new(state.legal_moves(), 1);
        let a = tree
            .add_child(tree.root(), GomokuMove(0, 0), vec![], -1)
            .unwrap();
        let b = tree
            .add_child(tree.root(), GomokuMove(1, 1), vec![], -1)
            .unwrap();
        for _ in 0..3 {
            tree.backpropagate(a, 1.0);
        }
        for _ in 0..5 {
            tree.backpropagate(b, 1.0);
        }
        for policy in SelectionPolicy::ALL {
            assert_eq!(tree.best_move(policy, &state), Ok(GomokuMove(1, 1)));
        }
    }

    #[test]
    fn test_best_move_without_children() {
        let state = GomokuState::new(7, 4).unwrap();
        let tree: SearchTree<GomokuMove> = SearchTree::new(state.legal_moves(), 1);
        assert_eq!(
            tree.best_move(SelectionPolicy::Heuristic, &state),
            Ok(GomokuMove(3, 3))
        );
        assert_eq!(
            tree.best_move(SelectionPolicy::BasicUct, &state),
            Err(SearchError::NoMoveFound)
        );
    }

    #[test]
    fn test_heuristic_breaks_ties_by_evaluation() {
        let mut state = GomokuState::new(7, 5).unwrap();
        for mv in [GomokuMove(3, 3), GomokuMove(0, 6), GomokuMove(3, 4), GomokuMove(6, 0)] {
            state.make_move(&mv);
        }
        // Black to move; extending the pair scores higher than a distant stone.
        let mut tree = SearchTree::new(state.legal_moves(), 1);
        let far = tree
            .add_child(tree.root(), GomokuMove(6, 6), vec![], -1)
            .unwrap();
        let near = tree
            .add_child(tree.root(), GomokuMove(3, 5), vec![], -1)
            .unwrap();
        tree.backpropagate(far, 0.0);
        tree.backpropagate(near, 0.0);

        assert_eq!(
            tree.best_move(SelectionPolicy::Heuristic, &state),
            Ok(GomokuMove(3, 5))
        );
        assert_eq!(
            tree.best_move(SelectionPolicy::BasicUct, &state),
            Ok(GomokuMove(6, 6))
        );
    }
}
