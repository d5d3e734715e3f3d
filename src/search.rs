//! A backtracking search for a set of compatible solutions covering every problem

use log::trace;
use rayon::prelude::*;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use crate::graph::ConflictGraph;

// the clock is only read every this many nodes
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// The result of a [`ChosenSetSearch`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// Indices of the chosen solutions, in the order they were chosen
    Proved(Vec<usize>),
    /// Every branch failed
    Refuted,
    /// The node budget or the deadline ran out first
    OutOfBudget,
}

// outcome of a single subtree
enum Outcome {
    Found(Vec<usize>),
    Refuted,
    OutOfBudget,
}

/// State of the branch being explored
///
/// Every `choose` is undone by a matching `unchoose` before the caller moves
/// on, so a single `Branch` serves a whole sequential search.
#[derive(Clone)]
struct Branch {
    // how many chosen solutions conflict with each solution
    disallowed: Vec<u32>,
    // how many chosen solutions refute each problem
    covered: Vec<u32>,
    chosen: Vec<usize>,
    // problems nothing chosen refutes yet
    open: usize,
}

impl Branch {
    fn new(graph: &ConflictGraph) -> Self {
        Self {
            disallowed: vec![0; graph.solutions().len()],
            covered: vec![0; graph.problems().len()],
            chosen: Vec::new(),
            open: graph.problems().len(),
        }
    }

    fn choose(&mut self, graph: &ConflictGraph, solution: usize) {
        self.chosen.push(solution);
        for &other in graph.conflicts(solution) {
            self.disallowed[other] += 1;
        }
        for &problem in graph.covers(solution) {
            if self.covered[problem] == 0 {
                self.open -= 1;
            }
            self.covered[problem] += 1;
        }
    }

    fn unchoose(&mut self, graph: &ConflictGraph, solution: usize) {
        let last = self.chosen.pop();
        debug_assert_eq!(last, Some(solution));
        for &other in graph.conflicts(solution) {
            self.disallowed[other] -= 1;
        }
        for &problem in graph.covers(solution) {
            self.covered[problem] -= 1;
            if self.covered[problem] == 0 {
                self.open += 1;
            }
        }
    }

    fn usable(&self, solution: usize) -> bool {
        self.disallowed[solution] == 0
    }
}

/// Looks for a set of pairwise compatible solutions leaving at most `slack`
/// problems open
///
/// # Notes
/// The next problem to work on is always the open one with the fewest usable
/// solutions left; a problem with none left fails the branch straight away.
/// Problems without any solution at all are never picked, they are what the
/// slack pays for.
pub struct ChosenSetSearch<'a> {
    graph: &'a ConflictGraph,
    slack: usize,
    node_budget: Option<usize>,
    deadline: Option<Instant>,
    parallel_root: bool,
    nodes: AtomicUsize,
    aborted: AtomicBool,
}

impl<'a> ChosenSetSearch<'a> {
    pub fn new(graph: &'a ConflictGraph) -> Self {
        Self {
            graph,
            slack: graph.slack(),
            node_budget: None,
            deadline: None,
            parallel_root: false,
            nodes: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    /// Stops the search after visiting `budget` nodes
    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = Some(budget);
        self
    }

    /// Stops the search once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Tries the candidates of the first problem on the rayon thread pool
    pub fn with_parallel_root(mut self, parallel_root: bool) -> Self {
        self.parallel_root = parallel_root;
        self
    }

    /// The number of nodes visited so far (for diagnostics only)
    pub fn node_count(&self) -> usize {
        self.nodes.load(Ordering::Relaxed)
    }

    pub fn run(&self) -> SearchResult {
        let mut root = Branch::new(self.graph);
        let outcome = if self.parallel_root {
            self.search_parallel_root(root)
        } else {
            self.search(&mut root)
        };
        match outcome {
            Outcome::Found(chosen) => SearchResult::Proved(chosen),
            Outcome::Refuted => SearchResult::Refuted,
            Outcome::OutOfBudget => {
                trace!(target: "search", "aborted after {} nodes", self.node_count());
                SearchResult::OutOfBudget
            }
        }
    }

    /// Counts a node, returning `false` once the search has to stop
    fn enter_node(&self) -> bool {
        if self.aborted.load(Ordering::Relaxed) {
            return false;
        }
        let nodes = self.nodes.fetch_add(1, Ordering::Relaxed);
        let exhausted = self.node_budget.map_or(false, |budget| nodes >= budget)
            || (nodes % DEADLINE_CHECK_INTERVAL == 0
                && self.deadline.map_or(false, |deadline| Instant::now() >= deadline));
        if exhausted {
            self.aborted.store(true, Ordering::Relaxed);
        }
        !exhausted
    }

    /// The usable solutions of the most constrained open problem
    ///
    /// An empty result means the branch is dead.
    fn candidates(&self, branch: &Branch) -> Vec<usize> {
        let graph = self.graph;
        let usable = move |problem: usize| {
            graph
                .solvers(problem)
                .iter()
                .copied()
                .filter(move |&solution| branch.usable(solution))
        };

        (0..graph.problems().len())
            .filter(|&problem| branch.covered[problem] == 0 && !graph.solvers(problem).is_empty())
            .min_by_key(|&problem| usable(problem).count())
            .map(|problem| usable(problem).collect())
            .unwrap_or_default()
    }

    fn search(&self, branch: &mut Branch) -> Outcome {
        if !self.enter_node() {
            return Outcome::OutOfBudget;
        }
        if branch.open <= self.slack {
            return Outcome::Found(branch.chosen.clone());
        }

        for solution in self.candidates(branch) {
            branch.choose(self.graph, solution);
            let outcome = self.search(branch);
            branch.unchoose(self.graph, solution);

            match outcome {
                Outcome::Refuted => continue,
                found_or_aborted => return found_or_aborted,
            }
        }
        Outcome::Refuted
    }

    fn search_parallel_root(&self, root: Branch) -> Outcome {
        if !self.enter_node() {
            return Outcome::OutOfBudget;
        }
        if root.open <= self.slack {
            return Outcome::Found(root.chosen);
        }

        let candidates = self.candidates(&root);
        trace!(target: "search", "splitting {} root candidates", candidates.len());
        // the first success in candidate order wins, like the sequential search
        let found = candidates.par_iter().find_map_first(|&solution| {
            let mut branch = root.clone();
            branch.choose(self.graph, solution);
            match self.search(&mut branch) {
                Outcome::Found(chosen) => Some(chosen),
                _ => None,
            }
        });

        match found {
            Some(chosen) => Outcome::Found(chosen),
            None if self.aborted.load(Ordering::Relaxed) => Outcome::OutOfBudget,
            None => Outcome::Refuted,
        }
    }
}
