//! Move strategies for playing whole games.
//!
//! A strategy proposes one move for a position. The tree search is just one
//! implementation next to uniform random play and moves supplied from outside
//! (e.g. a human at a terminal), so a game loop can mix them freely through
//! `Box<dyn MoveStrategy<S>>`.

use crate::{
    error::{Result, SearchError},
    policy::RolloutPolicy,
    search::SearchEngine,
};
use rand::Rng;
use tracing::debug;
use ucb_core::{GameError, GameState, Outcome, Player};

/// Anything that can choose a move for a position.
pub trait MoveStrategy<S: GameState> {
    /// Propose a legal move for `state`.
    ///
    /// # Errors
    /// Returns `SearchError::NoLegalMoves` if `state` is terminal.
    fn propose(&mut self, state: &S) -> Result<S::Move>;
}

impl<S: GameState, T: MoveStrategy<S> + ?Sized> MoveStrategy<S> for Box<T> {
    fn propose(&mut self, state: &S) -> Result<S::Move> {
        (**self).propose(state)
    }
}

fn ensure_playable<S: GameState>(state: &S) -> Result<Vec<S::Move>> {
    let moves = state.legal_moves();
    if state.is_terminal() || moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    Ok(moves)
}

/// Plays a uniformly random legal move.
pub struct RandomStrategy<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomStrategy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<S: GameState, R: Rng> MoveStrategy<S> for RandomStrategy<R> {
    fn propose(&mut self, state: &S) -> Result<S::Move> {
        let moves = ensure_playable(state)?;
        Ok(moves[self.rng.gen_range(0..moves.len())])
    }
}

/// Plays the best move of a fresh search tree for every decision.
pub struct MctsStrategy<S: GameState, P: RolloutPolicy<S>> {
    engine: SearchEngine<S, P>,
}

impl<S: GameState, P: RolloutPolicy<S>> MctsStrategy<S, P> {
    pub fn new(engine: SearchEngine<S, P>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SearchEngine<S, P> {
        &self.engine
    }
}

impl<S: GameState, P: RolloutPolicy<S>> MoveStrategy<S> for MctsStrategy<S, P> {
    fn propose(&mut self, state: &S) -> Result<S::Move> {
        ensure_playable(state)?;
        let result = self.engine.search(state)?;
        debug!(
            best_move = %result.best_move,
            value = result.value,
            simulations = result.simulations,
            exploration = self.engine.config().exploration_constant,
            "search chose move"
        );
        Ok(result.best_move)
    }
}

/// Plays moves supplied by a callback.
///
/// The callback returns `None` when no move is available (for instance the
/// input stream was closed). Proposals are checked against the legal moves.
pub struct ExternalStrategy<F> {
    source: F,
}

impl<F> ExternalStrategy<F> {
    pub fn new(source: F) -> Self {
        Self { source }
    }
}

impl<S, F> MoveStrategy<S> for ExternalStrategy<F>
where
    S: GameState,
    F: FnMut(&S) -> Option<S::Move>,
{
    fn propose(&mut self, state: &S) -> Result<S::Move> {
        let moves = ensure_playable(state)?;
        let mv = (self.source)(state).ok_or(SearchError::NoMoveProposed)?;
        if !moves.contains(&mv) {
            return Err(GameError::IllegalMove(format!("{mv} is not a legal move")).into());
        }
        Ok(mv)
    }
}

/// A finished game.
#[derive(Clone, Debug)]
pub struct GameRecord<S: GameState> {
    /// Moves in the order they were played.
    pub moves: Vec<S::Move>,

    /// Final position.
    pub final_state: S,

    pub outcome: Outcome,
}

/// Play `state` to the end, `first` moving for player one and `second` for
/// player two.
///
/// # Errors
/// Propagates the first strategy or game error.
pub fn play_game<S: GameState>(
    state: S,
    first: &mut dyn MoveStrategy<S>,
    second: &mut dyn MoveStrategy<S>,
) -> Result<GameRecord<S>> {
    let mut state = state;
    let mut moves = Vec::new();

    while !state.is_terminal() {
        let mv = match state.current_player() {
            Player::One => first.propose(&state)?,
            Player::Two => second.propose(&state)?,
        };
        state = state.apply(mv)?;
        moves.push(mv);
    }

    let outcome = state.final_outcome()?;
    Ok(GameRecord {
        moves,
        final_state: state,
        outcome,
    })
}
