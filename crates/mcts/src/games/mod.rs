//! Game implementations used to exercise the search.

pub mod tictactoe;

pub use tictactoe::{Cell, TicTacToe};
