//! Monte Carlo Tree Search with UCB1 selection.
//!
//! This crate provides a generic MCTS implementation for any two-player game
//! implementing the `ucb_core::GameState` trait.
//!
//! # Features
//!
//! - **UCB1 Selection**: `Q + C * sqrt(ln(N_parent) / N_child)` with `C = sqrt(2)`
//! - **Two-tier expansion**: a leaf is rolled out on its first visit and
//!   expanded (all legal moves at once) on its second
//! - **Random rollouts**: uniform playouts through an injectable, seedable
//!   [`RolloutPolicy`]
//! - **Zero-sum backpropagation**: the result flips sign at every level
//! - **Serializable trees**: [`Tree`] is a plain arena that round-trips
//!   through serde
//! - **Strategies**: random, search-based and externally supplied move
//!   choice behind one [`MoveStrategy`] trait
//!
//! # Example
//!
//! ```
//! use ucb_mcts::{games::TicTacToe, MctsConfig, RandomPolicy, SearchEngine};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let state = TicTacToe::new();
//! let policy = RandomPolicy::new(ChaCha8Rng::seed_from_u64(42));
//! let mut engine = SearchEngine::new(MctsConfig::with_simulations(500), policy);
//!
//! let result = engine.search(&state).expect("empty board has moves");
//! println!("Best move: {}", result.best_move);
//! println!("Value: {}", result.value);
//! ```

pub mod config;
pub mod error;
pub mod games;
mod node;
pub mod policy;
pub mod search;
pub mod strategy;
mod tree;

pub use config::{MctsConfig, MIN_SIMULATIONS};
pub use error::{Result, SearchError};
pub use node::{Node, NodeId, NodeStats};
pub use policy::{rollout, RandomPolicy, RolloutPolicy};
pub use search::{SearchEngine, SearchResult};
pub use strategy::{
    play_game, ExternalStrategy, GameRecord, MctsStrategy, MoveStrategy, RandomStrategy,
};
pub use tree::{MoveStats, StepReport, Tree};
