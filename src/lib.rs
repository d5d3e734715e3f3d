//! A rule-based prover for the board game 'Connect 4'
//!
//! Instead of searching the game tree, this crate tries to show that one side
//! can stop every remaining four-in-a-row of the other side for the rest of
//! the game. It detects static tactical patterns (Claimevens, Verticals,
//! Baseinverses, Befores, ...), turns them into [`Solution`]s that each refute
//! a set of [`Group`]s, and then searches for a set of mutually compatible
//! solutions covering every group.
//!
//! When no such set exists, [`Evaluator::evaluate`] returns `None` and the
//! caller is expected to fall back to a regular game tree search.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_rules::{Board, Evaluator, Player};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board = Board::from_rows(&[
//!     "OOXOOX.",
//!     "XXOXXO.",
//!     "OOXOOX.",
//!     "XXOXXO.",
//!     "OOXOOX.",
//!     "XXOXXO.",
//! ])?;
//!
//! // player two can hold off everything player one still has
//! let proof = Evaluator::new().evaluate(&board, Player::One).expect("proof");
//! assert!(proof.unsolved().is_empty());
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod square_set;

pub mod board;

pub mod groups;

pub mod rules;

pub mod solution;

pub mod combination;

pub mod graph;

pub mod search;

pub mod evaluator;

mod test;

pub use board::{is_true_threat, Board, Cell, Player, Square};
pub use combination::combination_allowed;
pub use evaluator::{evaluate, Evaluator, Proof};
pub use groups::{Group, GroupIndex};
pub use solution::{win_conditions, RuleKind, Solution};
pub use square_set::SquareSet;

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// ensure that a column-major square mask (with one spare bit per column) fits in a u64
const_assert!(WIDTH * (HEIGHT + 1) < 64);
// the odd/even row arguments behind Claimeven and friends need an even number of rows
const_assert!(HEIGHT % 2 == 0);
// a group spans four squares in every direction
const_assert!(WIDTH >= 4 && HEIGHT >= 4);
