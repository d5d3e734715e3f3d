use anyhow::{anyhow, Result};

use std::fmt;

use crate::{HEIGHT, WIDTH};

/// One of the two sides of a game
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Player {
    /// The side moving first, drawn as `X`
    One,
    /// The side moving second, drawn as `O`
    Two,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    fn cell(self) -> Cell {
        match self {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn owner(&self) -> Option<Player> {
        match self {
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
            Cell::Empty => None,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'X' | 'x' => Some(Cell::PlayerOne),
            'O' | 'o' => Some(Cell::PlayerTwo),
            '.' => Some(Cell::Empty),
            _ => None,
        }
    }
}

/// A square of the board, row 0 being the bottom row
///
/// Rows are counted from zero, so "even" rows are 0, 2 and 4. The classic
/// pattern names (Claimeven, Oddthreat, ...) count rows from one instead; the
/// docs of each pattern spell out which rows they mean.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a square, rejecting coordinates outside the board
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= HEIGHT || col >= WIDTH {
            return Err(anyhow!(
                "Invalid square ({}, {}), rows must be below {} and columns below {}",
                row,
                col,
                HEIGHT,
                WIDTH
            ));
        }
        Ok(Self::at(row, col))
    }

    // callers guarantee the coordinates are on the board
    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self {
            row: row as u8,
            col: col as u8,
        }
    }

    pub const fn row(&self) -> usize {
        self.row as usize
    }

    pub const fn col(&self) -> usize {
        self.col as usize
    }

    pub fn is_even_row(&self) -> bool {
        self.row % 2 == 0
    }

    pub fn is_top_row(&self) -> bool {
        self.row() == HEIGHT - 1
    }

    /// The square `rows` up and `cols` to the right, if it is on the board
    pub fn offset(&self, rows: i32, cols: i32) -> Option<Square> {
        let row = self.row as i32 + rows;
        let col = self.col as i32 + cols;
        if row < 0 || row >= HEIGHT as i32 || col < 0 || col >= WIDTH as i32 {
            None
        } else {
            Some(Self::at(row as usize, col as usize))
        }
    }

    pub fn above(&self) -> Option<Square> {
        self.offset(1, 0)
    }

    pub fn below(&self) -> Option<Square> {
        self.offset(-1, 0)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Checks whether two squares could both belong to one group
///
/// The squares must be at most three rows and three columns apart, and lie on
/// a common row, column or 45° diagonal. The contents of the board are not
/// looked at.
pub fn is_true_threat(a: Square, b: Square) -> bool {
    let row_diff = (a.row() as i32 - b.row() as i32).abs();
    let col_diff = (a.col() as i32 - b.col() as i32).abs();
    if row_diff > 3 || col_diff > 3 {
        return false;
    }
    row_diff == 0 || col_diff == 0 || row_diff == col_diff
}

/// A Connect 4 position
///
/// Boards can only be built through checked constructors, so every board that
/// reaches the rule detectors is rectangular, respects gravity and only holds
/// squares that exist.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; WIDTH * HEIGHT], // cells are stored left-to-right, bottom-to-top
    heights: [usize; WIDTH],
    num_moves: usize,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; WIDTH * HEIGHT],
            heights: [0; WIDTH],
            num_moves: 0,
        }
    }

    /// Plays a sequence of 1-indexed columns, e.g. `"4455"`, starting with player one
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => board.play_checked(column)?,
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    /// Reads a diagram given top row first, using `X`, `O` and `.`
    ///
    /// ```
    /// # use connect4_rules::{Board, Square, Cell};
    /// let board = Board::from_rows(&[
    ///     ".......",
    ///     ".......",
    ///     ".......",
    ///     ".......",
    ///     "...O...",
    ///     "..XX...",
    /// ]).unwrap();
    /// assert_eq!(board.cell(Square::new(1, 3).unwrap()), Cell::PlayerTwo);
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        if rows.len() != HEIGHT {
            return Err(anyhow!(
                "Invalid diagram, expected {} rows but found {}",
                HEIGHT,
                rows.len()
            ));
        }
        let mut board = Self::new();
        for (index, line) in rows.iter().enumerate() {
            let row = HEIGHT - 1 - index;
            let line = line.as_ref().trim();
            let width = line.chars().count();
            if width != WIDTH {
                return Err(anyhow!(
                    "Invalid diagram, row {} has {} squares instead of {}",
                    row,
                    width,
                    WIDTH
                ));
            }
            for (col, c) in line.chars().enumerate() {
                let cell = Cell::from_char(c)
                    .ok_or_else(|| anyhow!("could not parse '{}' as a square", c))?;
                board.cells[col + WIDTH * row] = cell;
            }
        }

        // tokens must rest on the bottom row or on another token
        for col in 0..WIDTH {
            let height = (0..HEIGHT)
                .take_while(|&row| !board.cells[col + WIDTH * row].is_empty())
                .count();
            if (height..HEIGHT).any(|row| !board.cells[col + WIDTH * row].is_empty()) {
                return Err(anyhow!(
                    "Invalid diagram, column {} has a floating token",
                    col + 1
                ));
            }
            board.heights[col] = height;
            board.num_moves += height;
        }
        Ok(board)
    }

    pub fn cell(&self, square: Square) -> Cell {
        self.cells[square.col() + WIDTH * square.row()]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.cell(square).is_empty()
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    /// The side to move, assuming player one started
    pub fn next_player(&self) -> Player {
        if self.num_moves % 2 == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    pub fn height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn playable(&self, column: usize) -> bool {
        self.heights[column] < HEIGHT
    }

    /// The lowest empty square of `column`, if the column is not full
    pub fn playable_square(&self, column: usize) -> Option<Square> {
        if self.playable(column) {
            Some(Square::at(self.heights[column], column))
        } else {
            None
        }
    }

    /// All directly playable squares, left to right
    pub fn playable_squares(&self) -> Vec<Square> {
        (0..WIDTH)
            .filter_map(|column| self.playable_square(column))
            .collect()
    }

    pub fn is_playable(&self, square: Square) -> bool {
        self.heights[square.col()] == square.row()
    }

    /// Plays a 1-indexed column for the side to move
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<()> {
        if column_one_indexed < 1 || column_one_indexed > WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                WIDTH
            ));
        }
        let column = column_one_indexed - 1;
        if !self.playable(column) {
            return Err(anyhow!("Invalid move, column {} full", column_one_indexed));
        }
        // abort if the position is won at any point
        if self.check_winning_move(column) {
            return Err(anyhow!("Invalid position, game is over"));
        }
        self.play(column);
        Ok(())
    }

    fn play(&mut self, column: usize) {
        let player = self.next_player().cell();
        self.cells[column + WIDTH * self.heights[column]] = player;
        self.heights[column] += 1;
        self.num_moves += 1;
    }

    /// Would playing `column` complete a four-in-a-row for the side to move?
    pub fn check_winning_move(&self, column: usize) -> bool {
        if !self.playable(column) {
            return false;
        }
        let player = self.next_player().cell();
        let height = self.heights[column];
        // check vertical alignment
        if height >= 3
            && self.cells[column + WIDTH * (height - 1)] == player
            && self.cells[column + WIDTH * (height - 2)] == player
            && self.cells[column + WIDTH * (height - 3)] == player
        {
            return true;
        }

        // check horizontal and diagonal alignment
        for dy_dx in -1i32..=1 {
            let mut run = 0;
            for &dx in [-1i32, 1].iter() {
                let mut x = column as i32 + dx;
                let mut y = height as i32 + dx * dy_dx;
                loop {
                    if x < 0
                        || x >= WIDTH as i32
                        || y < 0
                        || y >= HEIGHT as i32
                        || self.cells[x as usize + WIDTH * y as usize] != player
                    {
                        break;
                    }
                    x += dx;
                    y += dx * dy_dx;
                    run += 1;
                }
            }
            if run >= 3 {
                return true;
            }
        }

        false
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            let line: String = (0..WIDTH)
                .map(|col| match self.cells[col + WIDTH * row] {
                    Cell::PlayerOne => 'X',
                    Cell::PlayerTwo => 'O',
                    Cell::Empty => '.',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
