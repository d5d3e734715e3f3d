//! Groups: the 69 lines of four squares on which a game can be won

use std::collections::BTreeSet;
use std::fmt;

use crate::board::{Board, Player, Square};
use crate::square_set::SquareSet;
use crate::{HEIGHT, WIDTH};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Direction {
    Horizontal,
    Vertical,
    /// bottom-left to top-right
    Diagonal,
    /// bottom-right to top-left
    AntiDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Vertical,
        Direction::Horizontal,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];

    // (rows, cols) step between consecutive squares
    fn step(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }
}

/// Four collinear squares
///
/// The squares are kept in the order they are walked from the first one, so
/// two groups are equal exactly when they cover the same line.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Group {
    squares: [Square; 4],
}

impl Group {
    /// The group starting at `start` and walking in `direction`, if it fits on the board
    pub fn new(start: Square, direction: Direction) -> Option<Self> {
        let (rows, cols) = direction.step();
        let mut squares = [start; 4];
        for (i, square) in squares.iter_mut().enumerate().skip(1) {
            *square = start.offset(rows * i as i32, cols * i as i32)?;
        }
        Some(Self { squares })
    }

    pub fn squares(&self) -> &[Square; 4] {
        &self.squares
    }

    pub fn square_set(&self) -> SquareSet {
        self.squares.iter().copied().collect()
    }

    pub fn direction(&self) -> Direction {
        let (first, second) = (self.squares[0], self.squares[1]);
        match (
            second.row() as i32 - first.row() as i32,
            second.col() as i32 - first.col() as i32,
        ) {
            (0, _) => Direction::Horizontal,
            (_, 0) => Direction::Vertical,
            (_, 1) => Direction::Diagonal,
            _ => Direction::AntiDiagonal,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.direction() == Direction::Vertical
    }

    pub fn contains(&self, square: Square) -> bool {
        self.squares.contains(&square)
    }

    /// The squares of the group still empty on `board`, in group order
    pub fn empty_squares(&self, board: &Board) -> Vec<Square> {
        self.squares
            .iter()
            .copied()
            .filter(|&square| board.is_empty(square))
            .collect()
    }

    /// A group is winnable by a side as long as the other side has no token on it
    pub fn is_winnable_by(&self, board: &Board, player: Player) -> bool {
        self.squares
            .iter()
            .all(|&square| board.cell(square).owner() != Some(player.other()))
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.squares.iter()).finish()
    }
}

/// Every line of four on an empty board
pub fn all_groups() -> impl Iterator<Item = Group> {
    Direction::ALL.into_iter().flat_map(|direction| {
        (0..HEIGHT).flat_map(move |row| {
            (0..WIDTH).filter_map(move |col| Group::new(Square::at(row, col), direction))
        })
    })
}

/// The groups `player` can still complete on `board`
pub fn find_groups(board: &Board, player: Player) -> Vec<Group> {
    all_groups()
        .filter(|group| group.is_winnable_by(board, player))
        .collect()
}

/// Maps every square to the groups passing through it
///
/// Squares that no group passes through simply have no entries; lookups
/// never fail.
#[derive(Clone)]
pub struct GroupIndex {
    by_square: Vec<Vec<Group>>,
}

impl GroupIndex {
    pub fn new(groups: &[Group]) -> Self {
        let mut by_square = vec![Vec::new(); WIDTH * HEIGHT];
        for group in groups {
            for square in group.squares() {
                by_square[square.col() + WIDTH * square.row()].push(*group);
            }
        }
        Self { by_square }
    }

    /// Indexes the groups `player` can still complete on `board`
    pub fn for_player(board: &Board, player: Player) -> Self {
        Self::new(&find_groups(board, player))
    }

    pub fn groups(&self, square: Square) -> &[Group] {
        &self.by_square[square.col() + WIDTH * square.row()]
    }

    pub fn has_groups(&self, square: Square) -> bool {
        !self.groups(square).is_empty()
    }

    /// The groups passing through both squares
    pub fn shared(&self, a: Square, b: Square) -> BTreeSet<Group> {
        let others = self.groups(b);
        self.groups(a)
            .iter()
            .filter(|group| others.contains(group))
            .copied()
            .collect()
    }

    /// The groups passing through every square of `squares`
    ///
    /// Returns an empty set when `squares` is empty.
    pub fn common(&self, squares: &[Square]) -> BTreeSet<Group> {
        match squares.split_first() {
            None => BTreeSet::new(),
            Some((first, rest)) => self
                .groups(*first)
                .iter()
                .filter(|group| rest.iter().all(|square| self.groups(*square).contains(group)))
                .copied()
                .collect(),
        }
    }
}
