//! Which pairs of solutions can be played out side by side

use crate::solution::{RuleKind, Solution};
use crate::square_set::SquareSet;
use crate::WIDTH;

/// Decides whether two solutions can be used together
///
/// Symmetric in its arguments. The match below is exhaustive over both rule
/// kinds, so a new [`RuleKind`] does not compile until its pairings are
/// decided here.
pub fn combination_allowed(a: &Solution, b: &Solution) -> bool {
    use RuleKind::*;

    match (a.rule(), b.rule()) {
        // the zugzwang behind an odd threat is not tracked here
        (OddThreat, _) | (_, OddThreat) => false,

        (Claimeven, _) => allowed_with_claimeven(a, b),
        (_, Claimeven) => allowed_with_claimeven(b, a),

        (Baseinverse, _) | (_, Baseinverse) => disjoint(a, b),
        (Vertical, _) | (_, Vertical) => disjoint(a, b),

        (Before, Before) => column_wise_disjoint_or_equal(a, b),
        (Before, _) | (_, Before) => disjoint(a, b),

        (Baseclaim, _) | (_, Baseclaim) => disjoint(a, b),

        (Aftereven | LowInverse | HighInverse | SpecialBefore, _) => {
            column_wise_disjoint_or_equal(a, b)
        }
    }
}

fn allowed_with_claimeven(claimeven: &Solution, other: &Solution) -> bool {
    use RuleKind::*;

    match other.rule() {
        Claimeven | Baseinverse | Vertical | Aftereven | Baseclaim | Before | SpecialBefore => {
            disjoint(claimeven, other)
        }
        LowInverse | HighInverse => no_claimeven_below_or_at_inverse(claimeven, other),
        OddThreat => false,
    }
}

pub fn disjoint(a: &Solution, b: &Solution) -> bool {
    a.squares().is_disjoint(b.squares())
}

// lowest square of every column the set touches
fn column_bottoms(squares: &SquareSet) -> impl Iterator<Item = (usize, usize)> + '_ {
    squares.columns().filter_map(move |column| {
        squares
            .in_column(column)
            .iter()
            .next()
            .map(|square| (column, square.row()))
    })
}

/// False when a Claimeven starts at or below a square of the inverse in the
/// same column
pub fn no_claimeven_below_or_at_inverse(claimeven: &Solution, inverse: &Solution) -> bool {
    let inverse_squares = inverse.squares();
    column_bottoms(claimeven.squares()).all(|(column, lowest)| {
        inverse_squares
            .in_column(column)
            .iter()
            .all(|square| lowest > square.row())
    })
}

/// Per column, the two solutions use either no common square or exactly the
/// same squares
pub fn column_wise_disjoint_or_equal(a: &Solution, b: &Solution) -> bool {
    (0..WIDTH).all(|column| {
        let left = a.squares().in_column(column);
        let right = b.squares().in_column(column);
        left.is_disjoint(&right) || left == right
    })
}
