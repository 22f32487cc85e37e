use crate::{Outcome, Player, Result};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A position in a two-player, alternating-move, zero-sum game.
///
/// States are values: `apply` never mutates `self` and returns the successor
/// position instead, so any number of search nodes can hold independent
/// snapshots of the game.
pub trait GameState: Clone + Debug {
    /// A move in this game.
    ///
    /// The `Ord` implementation defines the "move index" order used to break
    /// ties deterministically during search.
    type Move: Copy + Ord + Hash + Debug + Display;

    /// Returns the player who makes the next move.
    fn current_player(&self) -> Player;

    /// Returns all legal moves in ascending order.
    ///
    /// Must be non-empty whenever `is_terminal()` is false.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Applies a move, returning the successor state.
    ///
    /// # Errors
    /// Returns `GameError::IllegalMove` if `mv` is not in `legal_moves()`.
    fn apply(&self, mv: Self::Move) -> Result<Self>;

    /// Returns true if the game has ended (win or draw).
    fn is_terminal(&self) -> bool;

    /// Returns the final result, or `None` while the game is in progress.
    fn outcome(&self) -> Option<Outcome>;

    /// Returns the final result, or `GameError::NotTerminal`.
    fn final_outcome(&self) -> Result<Outcome> {
        self.outcome().ok_or(crate::GameError::NotTerminal)
    }
}
