//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices: a node owns its children through the
//! arena and refers to its parent by index only, so there are no reference
//! cycles and the whole tree is a plain, serializable aggregate.

use serde::{Deserialize, Serialize};
use ucb_core::GameState;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Visit statistics for a single node.
///
/// Only backpropagation updates these; the fields are private so no other
/// code path can touch them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    visits: u32,
    win_sum: f32,
}

impl NodeStats {
    /// Number of simulations that passed through this node.
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Sum of simulation results, from the point of view of the player who
    /// moved into this node.
    pub fn win_sum(&self) -> f32 {
        self.win_sum
    }

    /// Mean simulation result, or `None` if the node has never been visited.
    pub fn average_value(&self) -> Option<f32> {
        if self.visits == 0 {
            None
        } else {
            Some(self.win_sum / self.visits as f32)
        }
    }

    pub(crate) fn record(&mut self, result: f32) {
        self.visits += 1;
        self.win_sum += result;
    }
}

/// A node in the search tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, S::Move: Serialize",
    deserialize = "S: Deserialize<'de>, S::Move: Deserialize<'de>"
))]
pub struct Node<S: GameState> {
    /// Game position at this node.
    pub(crate) state: S,

    /// Back-reference to the parent (None for root).
    pub(crate) parent: Option<NodeId>,

    /// Move that led here from the parent (None for root).
    pub(crate) action: Option<S::Move>,

    /// Children in ascending move order. Empty until the node is expanded.
    pub(crate) children: Vec<(S::Move, NodeId)>,

    pub(crate) stats: NodeStats,
}

impl<S: GameState> Node<S> {
    /// Create the root node for a position.
    pub(crate) fn root(state: S) -> Self {
        Self {
            state,
            parent: None,
            action: None,
            children: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    /// Create an unvisited child reached from `parent` by `action`.
    pub(crate) fn child(state: S, parent: NodeId, action: S::Move) -> Self {
        Self {
            state,
            parent: Some(parent),
            action: Some(action),
            children: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn action(&self) -> Option<S::Move> {
        self.action
    }

    /// `(move, child)` pairs in ascending move order.
    pub fn children(&self) -> &[(S::Move, NodeId)] {
        &self.children
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub fn visits(&self) -> u32 {
        self.stats.visits
    }

    pub fn win_sum(&self) -> f32 {
        self.stats.win_sum
    }

    pub fn average_value(&self) -> Option<f32> {
        self.stats.average_value()
    }

    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
