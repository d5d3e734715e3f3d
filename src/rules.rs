//! Detectors for the static Connect 4 patterns
//!
//! Every detector scans a board and returns raw occurrences of one pattern;
//! whether an occurrence is useful is decided later by the solution builder.
//!
//! Pattern names use the traditional convention of counting rows from one,
//! so an "even" square of a Claimeven sits on [`Square::row`] 1, 3 or 5 and an
//! "odd" threat sits on [`Square::row`] 0, 2 or 4. The docs below always give
//! the zero-based rows.

use crate::board::{is_true_threat, Board, Player, Square};
use crate::groups::{find_groups, Direction, Group};
use crate::{HEIGHT, WIDTH};

/// Two empty squares above each other, the lower one on row 0, 2 or 4
///
/// The defender can always answer a move on the lower square with a move on
/// the upper one.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Claimeven {
    pub upper: Square,
    pub lower: Square,
}

/// Two directly playable squares that could belong to one group
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Baseinverse {
    pub first: Square,
    pub second: Square,
}

/// Two empty squares above each other, the lower one on row 1 or 3
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Vertical {
    pub upper: Square,
    pub lower: Square,
}

/// Two Verticals in different columns whose lower squares could share a group
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LowInverse {
    pub first: Vertical,
    pub second: Vertical,
}

/// Two columns with three empty squares each, the lowest on row 1 or 3
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct HighInverse {
    /// lowest square of the first stack
    pub first: Square,
    /// lowest square of the second stack
    pub second: Square,
}

impl HighInverse {
    /// The three squares of each stack, bottom to top
    pub fn stacks(&self) -> [[Square; 3]; 2] {
        let stack = |square: Square| {
            [
                square,
                Square::at(square.row() + 1, square.col()),
                Square::at(square.row() + 2, square.col()),
            ]
        };
        [stack(self.first), stack(self.second)]
    }
}

/// A horizontal group on row 1, 3 or 5 the defender can complete using only
/// the upper squares of Claimevens
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Aftereven {
    pub group: Group,
}

/// Three directly playable squares plus the square above the second one
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Baseclaim {
    pub first: Square,
    pub second: Square,
    pub third: Square,
    /// the square above `second`, on row 1, 3 or 5
    pub fourth: Square,
}

/// A defender group whose empty squares are all claimed through Verticals
/// and Claimevens
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Before {
    pub group: Group,
    pub verticals: Vec<Vertical>,
    pub claimevens: Vec<Claimeven>,
}

impl Before {
    /// The (upper, lower) square pairs claimed by this Before
    pub fn pairs(&self) -> impl Iterator<Item = (Square, Square)> + '_ {
        self.verticals
            .iter()
            .map(|vertical| (vertical.upper, vertical.lower))
            .chain(
                self.claimevens
                    .iter()
                    .map(|claimeven| (claimeven.upper, claimeven.lower)),
            )
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SpecialBefore {
    pub before: Before,
    /// a directly playable empty square of the Before group
    pub internal: Square,
    /// a directly playable square outside the columns of the Before group
    pub external: Square,
}

/// A group of the attacker missing a single square on row 0, 2 or 4 which
/// is not directly playable
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OddThreat {
    pub group: Group,
    pub odd_square: Square,
    /// the directly playable square in the column of `odd_square`
    pub playable: Square,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ThreatCombinationKind {
    EvenAboveOdd,
    OddAboveDirectlyPlayableEven,
    OddAboveNotDirectlyPlayableEven,
}

/// An even threat and an odd threat of the attacker sharing their odd square
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ThreatCombination {
    /// group with its empty squares on rows of both parities
    pub even_threat: Group,
    /// group with both empty squares on row 0, 2 or 4
    pub odd_threat: Group,
    pub shared_square: Square,
    /// the empty square of the even threat on row 1, 3 or 5
    pub even_square: Square,
    /// the unshared square of the odd threat, stacked on or under `even_square`
    pub odd_square: Square,
    pub shared_column_playable: Option<Square>,
    pub stacked_column_playable: Option<Square>,
    pub kind: ThreatCombinationKind,
}

pub fn find_claimevens(board: &Board) -> Vec<Claimeven> {
    let mut claimevens = Vec::new();
    for row in (0..HEIGHT).step_by(2) {
        for col in 0..WIDTH {
            let lower = Square::at(row, col);
            let upper = Square::at(row + 1, col);
            if board.is_empty(lower) && board.is_empty(upper) {
                claimevens.push(Claimeven { upper, lower });
            }
        }
    }
    claimevens
}

pub fn find_baseinverses(board: &Board) -> Vec<Baseinverse> {
    let playable = board.playable_squares();
    let mut baseinverses = Vec::new();
    for (i, &first) in playable.iter().enumerate() {
        for &second in &playable[i + 1..] {
            if is_true_threat(first, second) {
                baseinverses.push(Baseinverse { first, second });
            }
        }
    }
    baseinverses
}

pub fn find_verticals(board: &Board) -> Vec<Vertical> {
    let mut verticals = Vec::new();
    // the top row has nothing above it
    for row in (1..HEIGHT - 1).step_by(2) {
        for col in 0..WIDTH {
            let lower = Square::at(row, col);
            let upper = Square::at(row + 1, col);
            if board.is_empty(lower) && board.is_empty(upper) {
                verticals.push(Vertical { upper, lower });
            }
        }
    }
    verticals
}

pub fn find_low_inverses(verticals: &[Vertical]) -> Vec<LowInverse> {
    let mut low_inverses = Vec::new();
    for (i, &first) in verticals.iter().enumerate() {
        for &second in &verticals[i + 1..] {
            if first.lower.col() != second.lower.col() && is_true_threat(first.lower, second.lower)
            {
                low_inverses.push(LowInverse { first, second });
            }
        }
    }
    low_inverses
}

pub fn find_high_inverses(board: &Board) -> Vec<HighInverse> {
    // lowest squares of empty three-square stacks topping out on row 3 or 5
    let bases: Vec<Square> = (1..HEIGHT - 2)
        .step_by(2)
        .flat_map(|row| (0..WIDTH).map(move |col| Square::at(row, col)))
        .filter(|&square| board.is_empty(square))
        .collect();

    let mut high_inverses = Vec::new();
    for (i, &first) in bases.iter().enumerate() {
        for &second in &bases[i + 1..] {
            if first.col() != second.col() && is_true_threat(first, second) {
                high_inverses.push(HighInverse { first, second });
            }
        }
    }
    high_inverses
}

/// Afterevens of the defender, i.e. the side opposing `player`
pub fn find_afterevens(board: &Board, player: Player) -> Vec<Aftereven> {
    let mut afterevens = Vec::new();
    for row in (1..HEIGHT).step_by(2) {
        for col in 0..=WIDTH - 4 {
            let group = match Group::new(Square::at(row, col), Direction::Horizontal) {
                Some(group) => group,
                None => continue,
            };
            let squares = group.squares();
            let defendable = squares
                .iter()
                .all(|&square| board.cell(square).owner() != Some(player));
            let open = squares.iter().any(|&square| board.is_empty(square));
            if defendable && open {
                afterevens.push(Aftereven { group });
            }
        }
    }
    afterevens
}

pub fn find_baseclaims(board: &Board) -> Vec<Baseclaim> {
    let playable = board.playable_squares();
    let mut baseclaims = Vec::new();
    for (j, &second) in playable.iter().enumerate() {
        let fourth = match second.above() {
            Some(fourth) if !fourth.is_even_row() => fourth,
            _ => continue,
        };
        for (i, &first) in playable.iter().enumerate() {
            for (k, &third) in playable.iter().enumerate().skip(i + 1) {
                if i == j || k == j {
                    continue;
                }
                if is_true_threat(first, fourth) && is_true_threat(second, third) {
                    baseclaims.push(Baseclaim {
                        first,
                        second,
                        third,
                        fourth,
                    });
                }
                if is_true_threat(third, fourth) && is_true_threat(second, first) {
                    baseclaims.push(Baseclaim {
                        first: third,
                        second,
                        third: first,
                        fourth,
                    });
                }
            }
        }
    }
    baseclaims
}

/// Claims `empty` squares one at a time, returning `false` as soon as one of
/// them can't be claimed
fn claim_squares(
    board: &Board,
    empty: &[Square],
    verticals: &mut Vec<Vertical>,
    claimevens: &mut Vec<Claimeven>,
) -> bool {
    let (square, rest) = match empty.split_first() {
        None => return true,
        Some((square, rest)) => (*square, rest),
    };
    let below = square.below().filter(|&below| board.is_empty(below));

    if square.is_even_row() {
        // the square below must be free to form a Vertical with it
        match below {
            Some(lower) => verticals.push(Vertical {
                upper: square,
                lower,
            }),
            None => return false,
        }
    } else {
        match (below, square.above()) {
            (Some(lower), _) => claimevens.push(Claimeven {
                upper: square,
                lower,
            }),
            (None, Some(upper)) => verticals.push(Vertical {
                upper,
                lower: square,
            }),
            (None, None) => return false,
        }
    }
    claim_squares(board, rest, verticals, claimevens)
}

/// Splits a candidate Before group into the Verticals and Claimevens that
/// claim its empty squares
pub fn before_variation(board: &Board, group: Group) -> Option<Before> {
    if group.is_vertical() {
        return None;
    }
    let empty = group.empty_squares(board);
    // the group needs at least one token and one empty square
    if empty.is_empty() || empty.len() == 4 || empty.iter().any(|square| square.is_top_row()) {
        return None;
    }
    let mut verticals = Vec::new();
    let mut claimevens = Vec::new();
    if claim_squares(board, &empty, &mut verticals, &mut claimevens) {
        Some(Before {
            group,
            verticals,
            claimevens,
        })
    } else {
        None
    }
}

/// Befores built on groups of the defender, i.e. the side opposing `player`
pub fn find_befores(board: &Board, player: Player) -> Vec<Before> {
    find_groups(board, player.other())
        .into_iter()
        .filter_map(|group| before_variation(board, group))
        .collect()
}

fn is_special_before(empty: &[Square], external: Square) -> bool {
    empty.iter().all(|&square| {
        square.col() != external.col()
            && square
                .above()
                .map_or(false, |successor| is_true_threat(external, successor))
    })
}

pub fn find_special_befores(board: &Board, befores: &[Before]) -> Vec<SpecialBefore> {
    let playable = board.playable_squares();
    let mut special_befores = Vec::new();
    for before in befores {
        let empty = before.group.empty_squares(board);
        for &internal in empty.iter().filter(|&&square| board.is_playable(square)) {
            for &external in &playable {
                if is_special_before(&empty, external) {
                    special_befores.push(SpecialBefore {
                        before: before.clone(),
                        internal,
                        external,
                    });
                }
            }
        }
    }
    special_befores
}

/// Odd threats of `player`
pub fn find_odd_threats(board: &Board, player: Player) -> Vec<OddThreat> {
    find_groups(board, player)
        .into_iter()
        .filter_map(|group| {
            let empty = group.empty_squares(board);
            match empty.as_slice() {
                &[odd_square] if odd_square.is_even_row() && !board.is_playable(odd_square) => {
                    Some(OddThreat {
                        group,
                        odd_square,
                        playable: board.playable_square(odd_square.col())?,
                    })
                }
                _ => None,
            }
        })
        .collect()
}

/// Threat combinations of `player`
pub fn find_threat_combinations(board: &Board, player: Player) -> Vec<ThreatCombination> {
    // (group, odd square, even square)
    let mut even_threats = Vec::new();
    // (group, first odd square, second odd square)
    let mut odd_threats = Vec::new();
    for group in find_groups(board, player) {
        let empty = group.empty_squares(board);
        if let [first, second] = empty[..] {
            match (first.is_even_row(), second.is_even_row()) {
                (true, true) => odd_threats.push((group, first, second)),
                (true, false) => even_threats.push((group, first, second)),
                (false, true) => even_threats.push((group, second, first)),
                (false, false) => {}
            }
        }
    }

    let mut combinations = Vec::new();
    for &(even_threat, shared_square, even_square) in &even_threats {
        // the shared square must not be directly playable
        if board.is_playable(shared_square) {
            continue;
        }
        for &(odd_threat, first, second) in &odd_threats {
            let odd_square = if first == shared_square {
                second
            } else if second == shared_square {
                first
            } else {
                continue;
            };
            if odd_square.col() != even_square.col() {
                continue;
            }
            let kind = match even_square.row() as i32 - odd_square.row() as i32 {
                1 => ThreatCombinationKind::EvenAboveOdd,
                -1 if board.is_playable(even_square) => {
                    ThreatCombinationKind::OddAboveDirectlyPlayableEven
                }
                -1 => ThreatCombinationKind::OddAboveNotDirectlyPlayableEven,
                _ => continue,
            };
            combinations.push(ThreatCombination {
                even_threat,
                odd_threat,
                shared_square,
                even_square,
                odd_square,
                shared_column_playable: board.playable_square(shared_square.col()),
                stacked_column_playable: board.playable_square(odd_square.col()),
                kind,
            });
        }
    }
    combinations
}
