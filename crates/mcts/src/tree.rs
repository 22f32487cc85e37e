//! Arena-allocated search tree and the four MCTS phases.
//!
//! Using a `Vec<Node>` with indices provides better cache locality and
//! simpler ownership compared to `Rc<RefCell<Node>>`: children are owned
//! through the arena, the parent link is a plain index.
//!
//! # Value convention
//!
//! A node's statistics are kept from the point of view of the player who
//! moved *into* that node, i.e. the player choosing among its siblings.
//! Selection and best-move extraction can therefore maximise a child's
//! average directly, and each level up the tree negates the result.
//!
//! There is no node eviction: the tree grows by one full expansion per
//! second visit of a leaf, and callers must pick a simulation budget that
//! fits the state space.

use crate::error::{Result, SearchError};
use crate::node::{Node, NodeId};
use crate::policy::{rollout, RolloutPolicy};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{trace, warn};
use ucb_core::{GameError, GameState};

/// Root statistics for one candidate move.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStats<M> {
    pub action: M,
    pub visits: u32,
    pub average_value: Option<f32>,
}

/// What a single simulation step did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Leaf reached by selection.
    pub leaf: NodeId,

    /// Node the result was evaluated at (the leaf, or its first new child).
    pub evaluated: NodeId,

    /// Whether the leaf was expanded in this step.
    pub expanded: bool,

    /// Result recorded at `evaluated`.
    pub result: f32,
}

/// Arena-allocated search tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, S::Move: Serialize",
    deserialize = "S: Deserialize<'de>, S::Move: Deserialize<'de>"
))]
pub struct Tree<S: GameState> {
    nodes: Vec<Node<S>>,
}

impl<S: GameState> Tree<S> {
    /// Create a tree holding only an unvisited root for `state`.
    pub fn new(state: S) -> Self {
        Self {
            nodes: vec![Node::root(state)],
        }
    }

    /// Check that the arena links form a tree rooted at `NodeId::ROOT`.
    ///
    /// Every parent index must precede its child, every child must name its
    /// parent back, and children must be in strictly ascending move order.
    /// Trees built by [`Tree::step`] always pass; deserialized ones may not.
    ///
    /// # Errors
    /// Returns `SearchError::CorruptTree` describing the first broken link.
    pub fn validate(&self) -> Result<()> {
        let corrupt = |msg: String| Err(SearchError::CorruptTree(msg));
        let len = self.nodes.len();

        let Some(root) = self.nodes.first() else {
            return corrupt("no root node".to_string());
        };
        if root.parent.is_some() || root.action.is_some() {
            return corrupt("root has a parent link".to_string());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if index > 0 {
                let (Some(parent), Some(action)) = (node.parent, node.action) else {
                    return corrupt(format!("node {index} has no parent link"));
                };
                if parent.0 >= index {
                    return corrupt(format!("node {index} has parent {} after it", parent.0));
                }
                if !self.nodes[parent.0].children.contains(&(action, NodeId(index))) {
                    return corrupt(format!(
                        "node {index} is not a child of its parent {}",
                        parent.0
                    ));
                }
            }

            for &(action, child) in &node.children {
                if child.0 >= len || child.0 <= index {
                    return corrupt(format!(
                        "node {index} has child index {} out of range",
                        child.0
                    ));
                }
                let child_node = &self.nodes[child.0];
                if child_node.parent != Some(NodeId(index)) || child_node.action != Some(action) {
                    return corrupt(format!(
                        "child {} does not link back to node {index}",
                        child.0
                    ));
                }
            }
            if node.children.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
                return corrupt(format!("children of node {index} are not in move order"));
            }
        }

        Ok(())
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.0]
    }

    fn add(&mut self, node: Node<S>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<S> {
        self.get(NodeId::ROOT)
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes with their IDs, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<S>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Child of `id` reached by `action`, if expanded.
    pub fn child(&self, id: NodeId, action: S::Move) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, child)| *child)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).parent;
        }
        depth
    }

    /// Moves leading from the root to `id`, oldest first.
    pub fn history(&self, id: NodeId) -> Vec<S::Move> {
        let mut moves = Vec::new();
        let mut current = id;
        while let Some(action) = self.get(current).action {
            moves.push(action);
            match self.get(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        moves.reverse();
        moves
    }

    /// UCB1 score of `child` as seen from its parent.
    ///
    /// Unvisited children score `+inf` so they are always tried before any
    /// visited sibling.
    pub fn ucb_score(&self, child: NodeId, exploration: f32) -> f32 {
        let node = self.get(child);
        let Some(average) = node.average_value() else {
            return f32::INFINITY;
        };
        let parent_visits = node
            .parent
            .map_or(node.visits(), |parent| self.get(parent).visits());

        average
            + exploration * ((parent_visits as f32).ln() / node.visits() as f32).sqrt()
    }

    /// Select the child of `id` with the highest UCB1 score.
    ///
    /// Ties go to the lowest move. Returns `None` for a node without children.
    pub fn select_child(&self, id: NodeId, exploration: f32) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;

        for &(_, child) in &self.get(id).children {
            let score = self.ucb_score(child, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }

        best.map(|(child, _)| child)
    }

    /// Descend from the root by UCB1 until reaching a node with no children.
    pub fn select(&self, exploration: f32) -> NodeId {
        let mut current = NodeId::ROOT;
        while let Some(child) = self.select_child(current, exploration) {
            current = child;
        }
        current
    }

    /// Add one unvisited child per legal move of `id`.
    ///
    /// Terminal and already-expanded nodes are left untouched.
    ///
    /// # Errors
    /// Returns `GameError::NoLegalMoves` if a non-terminal state offers no
    /// moves, or the game's error if applying a listed move fails.
    pub fn expand(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id);
        if node.is_expanded() || node.is_terminal() {
            return Ok(());
        }

        let mut moves = node.state.legal_moves();
        if moves.is_empty() {
            return Err(GameError::NoLegalMoves.into());
        }
        moves.sort_unstable();
        moves.dedup();

        let children = moves
            .into_iter()
            .map(|mv| Ok((mv, node.state.apply(mv)?)))
            .collect::<std::result::Result<Vec<_>, GameError>>()?;

        for (mv, state) in children {
            let child = self.add(Node::child(state, id, mv));
            self.get_mut(id).children.push((mv, child));
        }
        Ok(())
    }

    /// Estimate the value of `id` for the player who moved into it.
    ///
    /// Terminal nodes are scored from their outcome directly; otherwise a
    /// playout is run on a copy of the node's state.
    pub fn evaluate<P>(&self, id: NodeId, policy: &mut P) -> Result<f32>
    where
        P: RolloutPolicy<S> + ?Sized,
    {
        let state = &self.get(id).state;
        let perspective = state.current_player().opponent();
        let outcome = if state.is_terminal() {
            state.final_outcome()?
        } else {
            rollout(state, policy)?
        };
        Ok(outcome.value_for(perspective))
    }

    /// Record `result` at `id` and every ancestor, flipping its sign at each
    /// level.
    pub fn backpropagate(&mut self, id: NodeId, result: f32) {
        let mut current = Some(id);
        let mut value = result;

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.record(value);
            current = node.parent;
            value = -value;
        }
    }

    /// Run one simulation: select, expand on second visit, roll out,
    /// backpropagate.
    ///
    /// The first visit to a node only rolls it out. The second visit expands
    /// it and rolls out its first new child instead.
    pub fn step<P>(&mut self, policy: &mut P, exploration: f32) -> Result<StepReport>
    where
        P: RolloutPolicy<S> + ?Sized,
    {
        let leaf = self.select(exploration);
        let node = self.get(leaf);
        let expand = node.visits() > 0 && !node.is_terminal();

        let evaluated = if expand {
            self.expand(leaf)?;
            self.select_child(leaf, exploration)
                .ok_or(SearchError::NoLegalMoves)?
        } else {
            leaf
        };

        let result = self.evaluate(evaluated, policy)?;
        self.backpropagate(evaluated, result);

        trace!(
            leaf = leaf.0,
            evaluated = evaluated.0,
            depth = self.depth(evaluated),
            expanded = expand,
            result,
            "simulation complete"
        );

        Ok(StepReport {
            leaf,
            evaluated,
            expanded: expand,
            result,
        })
    }

    /// Move whose child has the highest average value.
    ///
    /// Unvisited children are skipped. Ties go to the lowest move.
    ///
    /// # Errors
    /// Returns `SearchError::NoLegalMoves` if the root is terminal or none of
    /// its children has been visited.
    pub fn best_move(&self) -> Result<S::Move> {
        let root = self.root();
        if root.is_terminal() {
            warn!("best move requested for a terminal position");
            return Err(SearchError::NoLegalMoves);
        }

        let mut best: Option<(S::Move, f32)> = None;
        for &(action, child) in &root.children {
            let Some(average) = self.get(child).average_value() else {
                continue;
            };
            match best {
                Some((_, best_average)) if average <= best_average => {}
                _ => best = Some((action, average)),
            }
        }

        best.map(|(action, _)| action)
            .ok_or(SearchError::NoLegalMoves)
    }

    /// Statistics of the root's children, in move order.
    pub fn root_move_stats(&self) -> Vec<MoveStats<S::Move>> {
        self.root()
            .children
            .iter()
            .map(|&(action, child)| {
                let node = self.get(child);
                MoveStats {
                    action,
                    visits: node.visits(),
                    average_value: node.average_value(),
                }
            })
            .collect()
    }

    /// Render every visited node, depth-first in move order.
    ///
    /// One line per node, indented four spaces per level:
    /// `State: [0, 4] Visits: 3, Wins: -1`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(NodeId::ROOT, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = self.get(id);
            if node.visits() > 0 {
                let history = self
                    .history(id)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                // Writing to a String cannot fail.
                let _ = writeln!(
                    out,
                    "{:indent$}State: [{}] Visits: {}, Wins: {}",
                    "",
                    history,
                    node.visits(),
                    node.win_sum(),
                    indent = depth * 4
                );
            }
            for &(_, child) in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        out
    }
}
