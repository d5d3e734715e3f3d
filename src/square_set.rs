use std::fmt;
use std::iter::FromIterator;

use crate::board::Square;
use crate::{HEIGHT, WIDTH};

mod static_masks {
    use crate::{HEIGHT, WIDTH};

    pub const fn bottom_mask() -> u64 {
        let mut mask = 0;
        let mut column = 0;
        while column < WIDTH {
            mask |= 1 << (column * (HEIGHT + 1));
            column += 1;
        }
        mask
    }
    pub const fn full_board_mask() -> u64 {
        bottom_mask() * ((1 << HEIGHT as u64) - 1)
    }
}

/// A set of board squares packed into a single bitmap
///
/// Squares use the column-major layout of a classic Connect 4 bitboard: the
/// square `(row, column)` lives at bit `column * (HEIGHT + 1) + row`, leaving one
/// spare bit on top of every column. Disjointness checks between solutions
/// then reduce to a single `&`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SquareSet(u64);

impl SquareSet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Builds a set from a raw bitmap, silently dropping bits outside the board
    pub const fn from_mask(mask: u64) -> Self {
        Self(mask & static_masks::full_board_mask())
    }

    pub const fn mask(&self) -> u64 {
        self.0
    }

    pub const fn bit(square: Square) -> u64 {
        1 << (square.col() * (HEIGHT + 1) + square.row())
    }

    pub const fn column_mask(column: usize) -> u64 {
        ((1 << HEIGHT) - 1) << (column * (HEIGHT + 1))
    }

    pub const fn full() -> Self {
        Self(static_masks::full_board_mask())
    }

    pub fn insert(&mut self, square: Square) {
        self.0 |= Self::bit(square);
    }

    pub fn with(mut self, square: Square) -> Self {
        self.insert(square);
        self
    }

    pub fn contains(&self, square: Square) -> bool {
        self.0 & Self::bit(square) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_disjoint(&self, other: &SquareSet) -> bool {
        self.0 & other.0 == 0
    }

    pub fn union(&self, other: &SquareSet) -> SquareSet {
        Self(self.0 | other.0)
    }

    pub fn intersection(&self, other: &SquareSet) -> SquareSet {
        Self(self.0 & other.0)
    }

    /// The squares of this set lying in `column`
    pub fn in_column(&self, column: usize) -> SquareSet {
        Self(self.0 & Self::column_mask(column))
    }

    /// The columns holding at least one square of this set, left to right
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..WIDTH).filter(move |&column| self.0 & Self::column_mask(column) != 0)
    }

    /// Iterates the squares column by column, bottom to top
    pub fn iter(&self) -> Squares {
        Squares(self.0)
    }
}

pub struct Squares(u64);

impl Iterator for Squares {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0 {
            0 => None,
            bits => {
                let index = bits.trailing_zeros() as usize;
                // clear the lowest set bit
                self.0 &= bits - 1;
                Some(Square::at(index % (HEIGHT + 1), index / (HEIGHT + 1)))
            }
        }
    }
}

impl<'a> IntoIterator for &'a SquareSet {
    type Item = Square;
    type IntoIter = Squares;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = SquareSet::new();
        for square in iter {
            set.insert(square);
        }
        set
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
