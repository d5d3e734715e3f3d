//! Ties the detectors, the conflict graph and the search together

use log::debug;

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::board::{Board, Player, Square};
use crate::graph::ConflictGraph;
use crate::groups::{find_groups, Group, GroupIndex};
use crate::search::{ChosenSetSearch, SearchResult};
use crate::solution::{find_all_solutions, RuleKind, Solution};

/// A strategy for the defender refuting every group of the attacker that can
/// be refuted at all
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    solutions: Vec<Solution>,
    unsolved: Vec<Group>,
}

impl Proof {
    /// The chosen solutions, pairwise compatible
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// Groups no solution on the board refutes
    pub fn unsolved(&self) -> &[Group] {
        &self.unsolved
    }

    /// Every group refuted by the chosen solutions
    pub fn covered_groups(&self) -> BTreeSet<Group> {
        self.solutions
            .iter()
            .flat_map(|solution| solution.groups().iter().copied())
            .collect()
    }

    /// Maps a move of the attacker to the reply the proof calls for
    ///
    /// Only solutions with a fixed follow-up contribute: Claimevens, Verticals
    /// and Befores answer the lower square of each of their pairs with the
    /// square above it, a Baseinverse answers either square with the other.
    pub fn responses(&self) -> BTreeMap<Square, Square> {
        let mut responses = BTreeMap::new();
        for solution in &self.solutions {
            let squares = solution.squares();
            match solution.rule() {
                RuleKind::Claimeven | RuleKind::Vertical | RuleKind::Before => {
                    for column in squares.columns() {
                        let stack: Vec<Square> = squares.in_column(column).iter().collect();
                        for pair in stack.chunks_exact(2) {
                            responses.insert(pair[0], pair[1]);
                        }
                    }
                }
                RuleKind::Baseinverse => {
                    let pair: Vec<Square> = squares.iter().collect();
                    if let [first, second] = pair[..] {
                        responses.insert(first, second);
                        responses.insert(second, first);
                    }
                }
                RuleKind::Aftereven
                | RuleKind::LowInverse
                | RuleKind::HighInverse
                | RuleKind::Baseclaim
                | RuleKind::SpecialBefore
                | RuleKind::OddThreat => {}
            }
        }
        responses
    }
}

/// Tries to prove that the defender can stop every group of a side
///
/// # Notes
/// The evaluator never plays moves. A proof says the defender can answer
/// everything the attacker does from this position on; without one, the
/// position has to be handed to a regular game tree search.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    node_budget: Option<usize>,
    time_budget: Option<Duration>,
    parallel_root: bool,

    /// The number of search nodes visited by this `Evaluator` so far (for diagnostics only)
    pub node_count: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up on a board after visiting `budget` search nodes
    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = Some(budget);
        self
    }

    /// Gives up on a board once `duration` has passed since the search started
    pub fn with_deadline(mut self, duration: Duration) -> Self {
        self.time_budget = Some(duration);
        self
    }

    /// Splits the top of the search across the rayon thread pool
    pub fn with_parallel_root(mut self, parallel_root: bool) -> Self {
        self.parallel_root = parallel_root;
        self
    }

    /// Looks for a proof that `player.other()` can refute every group of
    /// `player`
    ///
    /// Returns `None` when the rules can't show it, including when the search
    /// runs out of budget.
    pub fn evaluate(&mut self, board: &Board, player: Player) -> Option<Proof> {
        let problems = find_groups(board, player);
        let index = GroupIndex::new(&problems);
        let solutions = find_all_solutions(board, player, &index);
        debug!(
            target: "evaluator",
            "{:?}: {} problems, {} solutions",
            player,
            problems.len(),
            solutions.len()
        );

        let graph = ConflictGraph::new(problems, solutions);
        let mut search = ChosenSetSearch::new(&graph).with_parallel_root(self.parallel_root);
        if let Some(budget) = self.node_budget {
            search = search.with_node_budget(budget);
        }
        // a deadline too far out to represent is no deadline at all
        if let Some(deadline) = self
            .time_budget
            .and_then(|duration| Instant::now().checked_add(duration))
        {
            search = search.with_deadline(deadline);
        }

        let result = search.run();
        self.node_count += search.node_count();
        match result {
            SearchResult::Proved(chosen) => {
                let proof = Proof {
                    solutions: chosen
                        .into_iter()
                        .map(|index| graph.solutions()[index].clone())
                        .collect(),
                    unsolved: graph.unsolvable(),
                };
                debug!(
                    target: "evaluator",
                    "proof with {} solutions, slack {}",
                    proof.solutions.len(),
                    graph.slack()
                );
                Some(proof)
            }
            SearchResult::Refuted => {
                debug!(target: "evaluator", "no proof for {:?}", player);
                None
            }
            SearchResult::OutOfBudget => {
                debug!(
                    target: "evaluator",
                    "gave up on {:?} after {} nodes",
                    player,
                    search.node_count()
                );
                None
            }
        }
    }
}

/// Evaluates a single board with the default configuration
pub fn evaluate(board: &Board, player: Player) -> Option<Proof> {
    Evaluator::new().evaluate(board, player)
}
