//! Monte Carlo Tree Search driver.
//!
//! `SearchEngine` owns the configuration, the rollout policy (and with it
//! the only random source) and the most recently built tree. Every decision
//! starts from a fresh tree; nothing is reused across decisions.

use crate::{
    config::MctsConfig,
    error::{Result, SearchError},
    policy::RolloutPolicy,
    tree::{MoveStats, Tree},
};
use std::marker::PhantomData;
use tracing::debug;
use ucb_core::GameState;

/// Result of a search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult<M> {
    /// Move with the highest average value at the root.
    pub best_move: M,

    /// Average value of `best_move` for the player to move at the root.
    pub value: f32,

    /// Statistics for each root move, in move order.
    pub move_stats: Vec<MoveStats<M>>,

    /// Number of simulations performed.
    pub simulations: usize,
}

/// Monte Carlo Tree Search with UCB1 selection and random rollouts.
///
/// Generic over:
/// - `S`: The game state being searched
/// - `P`: The rollout policy
pub struct SearchEngine<S: GameState, P: RolloutPolicy<S>> {
    config: MctsConfig,
    policy: P,
    tree: Option<Tree<S>>,
    _state: PhantomData<S>,
}

impl<S, P> SearchEngine<S, P>
where
    S: GameState,
    P: RolloutPolicy<S>,
{
    /// Create a new search engine.
    pub fn new(config: MctsConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            tree: None,
            _state: PhantomData,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Tree built by the last `build_tree` or `search`, if any.
    pub fn tree(&self) -> Option<&Tree<S>> {
        self.tree.as_ref()
    }

    /// Take ownership of the last built tree.
    pub fn take_tree(&mut self) -> Option<Tree<S>> {
        self.tree.take()
    }

    /// Build a fresh tree rooted at `root` with exactly `budget` simulations.
    ///
    /// # Errors
    /// Propagates game errors raised while expanding or rolling out; these
    /// indicate a broken `GameState` or rollout policy.
    pub fn build_tree(&mut self, root: S, budget: usize) -> Result<&Tree<S>> {
        let mut tree = Tree::new(root);
        let exploration = self.config.exploration_constant;

        for _ in 0..budget {
            tree.step(&mut self.policy, exploration)?;
        }

        debug!(
            simulations = budget,
            nodes = tree.len(),
            root_visits = tree.root().visits(),
            "search tree built"
        );

        Ok(&*self.tree.insert(tree))
    }

    /// Best move of the last built tree.
    ///
    /// # Errors
    /// Returns `SearchError::NoTree` before any tree was built, or
    /// `SearchError::NoLegalMoves` if the root is terminal or unexpanded.
    pub fn best_move(&self) -> Result<S::Move> {
        self.tree.as_ref().ok_or(SearchError::NoTree)?.best_move()
    }

    /// Build a tree with the configured budget and extract the best move.
    ///
    /// # Errors
    /// Returns `SearchError::NoLegalMoves` for a terminal `state`.
    pub fn search(&mut self, state: &S) -> Result<SearchResult<S::Move>> {
        if state.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }

        let simulations = self.config.num_simulations;
        let tree = self.build_tree(state.clone(), simulations)?;
        let best_move = tree.best_move()?;
        let move_stats = tree.root_move_stats();
        let value = move_stats
            .iter()
            .find(|stats| stats.action == best_move)
            .and_then(|stats| stats.average_value)
            .unwrap_or(0.0);

        Ok(SearchResult {
            best_move,
            value,
            move_stats,
            simulations,
        })
    }
}
