//! A minimax agent for playing the board game 'Tic-Tac-Toe'
//!
//! This agent walks the game tree with alpha-beta pruning to a fixed
//! depth and scores the leaves with a static line heuristic.
//!
//! # Basic Usage
//!
//! ```
//! use tictactoe_ai::{board::Board, cell::Player, search::Searcher};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board: Board = "XX. .O. ...".parse()?;
//! let mut searcher = Searcher::default();
//! let best_move = searcher.best_move(&board, Player::X);
//!
//! assert_eq!(best_move, Some(2));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod cell;

pub mod heuristic;

pub mod board;

pub mod search;

pub mod game;

pub mod analysis;

mod test;

/// The width and height of the game board in cells
pub const SIZE: usize = 3;

/// The number of cells on the game board
pub const NUM_CELLS: usize = SIZE * SIZE;

// the board is exactly 3x3, and positions must fit a base-3 code in a u16
const_assert_eq!(NUM_CELLS, 9);
const_assert!(3usize.pow(NUM_CELLS as u32) <= u16::MAX as usize);
