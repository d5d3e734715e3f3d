//! Solutions: pattern occurrences paired with the groups they refute

use std::collections::BTreeSet;

use crate::board::{Board, Player, Square};
use crate::groups::{Group, GroupIndex};
use crate::rules::*;
use crate::square_set::SquareSet;
use crate::HEIGHT;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum RuleKind {
    Claimeven,
    Baseinverse,
    Vertical,
    Aftereven,
    LowInverse,
    HighInverse,
    Baseclaim,
    Before,
    SpecialBefore,
    OddThreat,
}

/// A rule application together with the groups it refutes
///
/// Two solutions are the same solution when rule, squares and groups agree,
/// which lets identical occurrences found by different detectors collapse.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Solution {
    rule: RuleKind,
    squares: SquareSet,
    groups: BTreeSet<Group>,
}

impl Solution {
    pub fn new(rule: RuleKind, squares: SquareSet, groups: BTreeSet<Group>) -> Self {
        Self {
            rule,
            squares,
            groups,
        }
    }

    pub fn rule(&self) -> RuleKind {
        self.rule
    }

    /// The squares the rule relies on
    pub fn squares(&self) -> &SquareSet {
        &self.squares
    }

    /// The groups refuted by the rule
    pub fn groups(&self) -> &BTreeSet<Group> {
        &self.groups
    }

    // only solutions refuting something are worth keeping
    fn non_empty(rule: RuleKind, squares: SquareSet, groups: BTreeSet<Group>) -> Option<Self> {
        if groups.is_empty() {
            None
        } else {
            Some(Self::new(rule, squares, groups))
        }
    }

    /// A Claimeven refutes every group through its upper square
    pub fn from_claimeven(claimeven: &Claimeven, index: &GroupIndex) -> Option<Self> {
        let groups = index.groups(claimeven.upper).iter().copied().collect();
        Self::non_empty(
            RuleKind::Claimeven,
            SquareSet::new().with(claimeven.upper).with(claimeven.lower),
            groups,
        )
    }

    /// A Baseinverse refutes every group through both of its squares
    pub fn from_baseinverse(baseinverse: &Baseinverse, index: &GroupIndex) -> Option<Self> {
        Self::non_empty(
            RuleKind::Baseinverse,
            SquareSet::new()
                .with(baseinverse.first)
                .with(baseinverse.second),
            index.shared(baseinverse.first, baseinverse.second),
        )
    }

    /// A Vertical refutes every group through both of its squares
    pub fn from_vertical(vertical: &Vertical, index: &GroupIndex) -> Option<Self> {
        Self::non_empty(
            RuleKind::Vertical,
            SquareSet::new().with(vertical.upper).with(vertical.lower),
            index.shared(vertical.upper, vertical.lower),
        )
    }

    /// A Before refutes every group through all successors of the empty
    /// squares of the Before group, plus whatever its own Verticals and
    /// Claimevens refute
    pub fn from_before(board: &Board, before: &Before, index: &GroupIndex) -> Option<Self> {
        let mut successors = Vec::new();
        for square in before.group.empty_squares(board) {
            match square.above() {
                Some(successor) if index.has_groups(successor) => successors.push(successor),
                _ => return None,
            }
        }
        let mut groups = index.common(&successors);
        if groups.is_empty() {
            return None;
        }

        let mut squares = SquareSet::new();
        for vertical in &before.verticals {
            squares = squares.with(vertical.upper).with(vertical.lower);
            if let Some(solution) = Self::from_vertical(vertical, index) {
                groups.extend(solution.groups);
            }
        }
        for claimeven in &before.claimevens {
            squares = squares.with(claimeven.upper).with(claimeven.lower);
            if let Some(solution) = Self::from_claimeven(claimeven, index) {
                groups.extend(solution.groups);
            }
        }
        Self::non_empty(RuleKind::Before, squares, groups)
    }

    /// An Oddthreat of the attacker refutes the defender groups that need a
    /// square of its column the attacker can deny through zugzwang
    ///
    /// `index` holds the groups of the defender.
    pub fn from_odd_threat(odd_threat: &OddThreat, index: &GroupIndex) -> Option<Self> {
        let column = odd_threat.odd_square.col();
        let above = odd_threat.odd_square.row() + 1..HEIGHT;
        let below = odd_threat.playable.row()..odd_threat.odd_square.row();

        let groups = above
            .chain(below)
            .flat_map(|row| index.groups(Square::at(row, column)).iter().copied())
            .collect();
        Self::non_empty(
            RuleKind::OddThreat,
            SquareSet::new().with(odd_threat.odd_square),
            groups,
        )
    }
}

/// Every solution the defender can use against the groups of `player`
///
/// `index` must hold the groups of `player`. Duplicates are removed and the
/// result is sorted, so the same board always yields the same list.
pub fn find_all_solutions(board: &Board, player: Player, index: &GroupIndex) -> Vec<Solution> {
    let mut solutions = BTreeSet::new();

    solutions.extend(
        find_claimevens(board)
            .iter()
            .filter_map(|claimeven| Solution::from_claimeven(claimeven, index)),
    );
    solutions.extend(
        find_baseinverses(board)
            .iter()
            .filter_map(|baseinverse| Solution::from_baseinverse(baseinverse, index)),
    );
    solutions.extend(
        find_verticals(board)
            .iter()
            .filter_map(|vertical| Solution::from_vertical(vertical, index)),
    );
    solutions.extend(
        find_befores(board, player)
            .iter()
            .filter_map(|before| Solution::from_before(board, before, index)),
    );

    solutions.into_iter().collect()
}

/// The Oddthreats `player` can use to win through zugzwang
pub fn win_conditions(board: &Board, player: Player) -> Vec<Solution> {
    let defender_index = GroupIndex::for_player(board, player.other());
    let solutions: BTreeSet<Solution> = find_odd_threats(board, player)
        .iter()
        .filter_map(|odd_threat| Solution::from_odd_threat(odd_threat, &defender_index))
        .collect();
    solutions.into_iter().collect()
}
