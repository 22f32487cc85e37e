//! Player and outcome types shared by every game.
//!
//! Outcomes are stored in absolute terms (which player won) and converted to
//! a `+1 / 0 / -1` value only relative to a specific player, so the sign
//! convention of the search lives in exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two alternating players.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Player {
    /// The player who moves first.
    One,
    /// The player who moves second.
    Two,
}

impl Player {
    /// Get the opposing player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Absolute encoding: `+1` for the first player, `-1` for the second.
    pub fn sign(self) -> i8 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player one"),
            Player::Two => write!(f, "player two"),
        }
    }
}

/// Final result of a finished game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Outcome {
    PlayerOneWins,
    PlayerTwoWins,
    Draw,
}

impl Outcome {
    /// The outcome in which `player` wins.
    pub fn win_for(player: Player) -> Self {
        match player {
            Player::One => Outcome::PlayerOneWins,
            Player::Two => Outcome::PlayerTwoWins,
        }
    }

    /// The winning player, if the game was not drawn.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::PlayerOneWins => Some(Player::One),
            Outcome::PlayerTwoWins => Some(Player::Two),
            Outcome::Draw => None,
        }
    }

    /// Absolute encoding: `+1` first player win, `-1` second player win, `0` draw.
    pub fn sign(self) -> i8 {
        self.winner().map_or(0, Player::sign)
    }

    /// Value of this outcome from `player`'s point of view.
    ///
    /// Returns `1.0` for a win, `-1.0` for a loss and `0.0` for a draw.
    pub fn value_for(self, player: Player) -> f32 {
        match self.winner() {
            Some(winner) if winner == player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(player) => write!(f, "{} wins", player),
            None => write!(f, "draw"),
        }
    }
}
