//! Rollout (default) policy.
//!
//! The `RolloutPolicy` trait is the single place where randomness enters the
//! search: selection and tie-breaking are deterministic, so seeding the
//! policy's generator makes a whole search reproducible.

use rand::Rng;
use ucb_core::{GameError, GameState, Outcome};

/// Chooses moves during random playouts.
pub trait RolloutPolicy<S: GameState> {
    /// Pick one of `legal_moves` for `state`.
    ///
    /// `legal_moves` is never empty.
    fn choose(&mut self, state: &S, legal_moves: &[S::Move]) -> S::Move;
}

/// Uniform random move choice.
#[derive(Clone, Debug)]
pub struct RandomPolicy<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPolicy<R> {
    /// Create a policy drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<S: GameState, R: Rng> RolloutPolicy<S> for RandomPolicy<R> {
    fn choose(&mut self, _state: &S, legal_moves: &[S::Move]) -> S::Move {
        legal_moves[self.rng.gen_range(0..legal_moves.len())]
    }
}

/// Play `state` out to the end with `policy`.
///
/// A terminal state is returned as-is without applying any move.
///
/// # Errors
/// Returns `GameError::NoLegalMoves` if a non-terminal state offers no moves,
/// or `GameError::IllegalMove` if the policy picks a move the game rejects.
pub fn rollout<S, P>(state: &S, policy: &mut P) -> Result<Outcome, GameError>
where
    S: GameState,
    P: RolloutPolicy<S> + ?Sized,
{
    let mut state = state.clone();

    while !state.is_terminal() {
        let legal_moves = state.legal_moves();
        if legal_moves.is_empty() {
            return Err(GameError::NoLegalMoves);
        }
        let mv = policy.choose(&state, &legal_moves);
        state = state.apply(mv)?;
    }

    state.final_outcome()
}
