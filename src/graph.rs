//! The conflict graph shared by every branch of the search

use rayon::prelude::*;

use std::collections::HashMap;

use crate::combination::combination_allowed;
use crate::groups::Group;
use crate::solution::Solution;

/// Links problems to the solutions refuting them, and solutions to the
/// solutions they can't be combined with
///
/// Built once per evaluation; the search only ever reads it.
pub struct ConflictGraph {
    solutions: Vec<Solution>,
    problems: Vec<Group>,
    // solution indices refuting each problem, in solution order
    solvers: Vec<Vec<usize>>,
    // solution indices incompatible with each solution
    conflicts: Vec<Vec<usize>>,
    // problem indices refuted by each solution
    covers: Vec<Vec<usize>>,
}

impl ConflictGraph {
    pub fn new(problems: Vec<Group>, solutions: Vec<Solution>) -> Self {
        let problem_index: HashMap<Group, usize> = problems
            .iter()
            .enumerate()
            .map(|(index, group)| (*group, index))
            .collect();

        let mut solvers = vec![Vec::new(); problems.len()];
        let mut covers = vec![Vec::new(); solutions.len()];
        for (index, solution) in solutions.iter().enumerate() {
            // groups that are not problems can be ignored
            for problem in solution
                .groups()
                .iter()
                .filter_map(|group| problem_index.get(group))
            {
                solvers[*problem].push(index);
                covers[index].push(*problem);
            }
        }

        let conflicts: Vec<Vec<usize>> = (0..solutions.len())
            .into_par_iter()
            .map(|index| {
                (0..solutions.len())
                    .filter(|&other| {
                        other != index && !combination_allowed(&solutions[index], &solutions[other])
                    })
                    .collect()
            })
            .collect();

        Self {
            solutions,
            problems,
            solvers,
            conflicts,
            covers,
        }
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn problems(&self) -> &[Group] {
        &self.problems
    }

    pub fn solvers(&self, problem: usize) -> &[usize] {
        &self.solvers[problem]
    }

    pub fn conflicts(&self, solution: usize) -> &[usize] {
        &self.conflicts[solution]
    }

    pub fn covers(&self, solution: usize) -> &[usize] {
        &self.covers[solution]
    }

    /// The number of problems no solution refutes
    ///
    /// These can never be covered, so a proof has to tolerate that many open
    /// problems.
    pub fn slack(&self) -> usize {
        self.solvers.iter().filter(|solvers| solvers.is_empty()).count()
    }

    /// The problems no solution refutes, in problem order
    pub fn unsolvable(&self) -> Vec<Group> {
        self.problems
            .iter()
            .zip(&self.solvers)
            .filter(|(_, solvers)| solvers.is_empty())
            .map(|(problem, _)| *problem)
            .collect()
    }
}
