//! Tic-tac-toe implementation for MCTS validation.
//!
//! Tic-tac-toe is small enough to reason about exact tree shapes after a
//! handful of simulations, which makes it the reference game for the
//! search tests and for the arena driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use ucb_core::{GameError, GameState, Outcome, Player, Result};

/// Number of cells on the board.
pub const CELLS: usize = 9;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], // top row
    [3, 4, 5], // middle row
    [6, 7, 8], // bottom row
    [0, 3, 6], // left column
    [1, 4, 7], // center column
    [2, 5, 8], // right column
    [0, 4, 8], // main diagonal
    [2, 4, 6], // anti-diagonal
];

/// Tic-tac-toe move: a cell index 0-8, row-major.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Cell(pub u8);

impl Cell {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tic-tac-toe position.
///
/// Player one plays `X`, player two plays `O`.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct TicTacToe {
    /// Board: 9 cells, indexed 0-8 (row-major).
    /// ```text
    /// 0 | 1 | 2
    /// ---------
    /// 3 | 4 | 5
    /// ---------
    /// 6 | 7 | 8
    /// ```
    board: [Option<Player>; CELLS],

    /// Player to move.
    current: Player,

    /// Cached winner (if any).
    winner: Option<Player>,

    /// Moves played so far, oldest first.
    history: Vec<Cell>,
}

impl TicTacToe {
    /// Create a new empty board with player one (X) to move.
    pub fn new() -> Self {
        Self {
            board: [None; CELLS],
            current: Player::One,
            winner: None,
            history: Vec::new(),
        }
    }

    /// Play a sequence of cells from the empty board.
    ///
    /// # Errors
    /// Returns `GameError::IllegalMove` at the first illegal cell.
    pub fn from_moves(cells: &[u8]) -> Result<Self> {
        cells
            .iter()
            .try_fold(Self::new(), |state, &cell| state.apply(Cell(cell)))
    }

    /// Get the winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Get the piece at a cell, if any.
    pub fn get(&self, cell: usize) -> Option<Player> {
        self.board.get(cell).copied().flatten()
    }

    /// Moves played so far, oldest first.
    pub fn history(&self) -> &[Cell] {
        &self.history
    }

    fn check_winner(&self) -> Option<Player> {
        LINES.iter().find_map(|line| {
            let first = self.board[line[0]]?;
            (self.board[line[1]] == Some(first) && self.board[line[2]] == Some(first))
                .then_some(first)
        })
    }

    fn is_full(&self) -> bool {
        self.board.iter().all(|c| c.is_some())
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for TicTacToe {
    type Move = Cell;

    fn current_player(&self) -> Player {
        self.current
    }

    fn legal_moves(&self) -> Vec<Cell> {
        if self.winner.is_some() {
            return Vec::new();
        }
        self.board
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| Cell(i as u8))
            .collect()
    }

    fn apply(&self, mv: Cell) -> Result<Self> {
        if self.winner.is_some() {
            return Err(GameError::IllegalMove(format!(
                "cell {mv}: the game is already over"
            )));
        }
        match self.board.get(mv.index()) {
            None => Err(GameError::IllegalMove(format!(
                "cell {mv} is out of range (0-{})",
                CELLS - 1
            ))),
            Some(Some(_)) => Err(GameError::IllegalMove(format!(
                "cell {mv} is already occupied"
            ))),
            Some(None) => {
                let mut next = self.clone();
                next.board[mv.index()] = Some(self.current);
                next.current = self.current.opponent();
                next.winner = next.check_winner();
                next.history.push(mv);
                Ok(next)
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.is_full()
    }

    fn outcome(&self) -> Option<Outcome> {
        match self.winner {
            Some(player) => Some(Outcome::win_for(player)),
            None if self.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            for col in 0..3 {
                if col > 0 {
                    write!(f, "|")?;
                }
                let cell = row * 3 + col;
                match self.board[cell] {
                    Some(Player::One) => write!(f, " X ")?,
                    Some(Player::Two) => write!(f, " O ")?,
                    None => write!(f, " {} ", cell)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
