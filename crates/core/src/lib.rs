//! UCB Core - Game abstractions for Monte Carlo Tree Search
//!
//! This crate provides the [`GameState`] trait that a two-player game must
//! implement to be searched by `ucb_mcts`.
//!
//! # Types
//!
//! - [`GameState`] - Trait for game positions
//! - [`Player`] - The two alternating players
//! - [`Outcome`] - Final result of a finished game

mod error;
mod game;
mod types;

pub use error::{GameError, Result};
pub use game::GameState;
pub use types::{Outcome, Player};
