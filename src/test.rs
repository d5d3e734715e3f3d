#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::BTreeSet;
    use std::time::Duration;

    use crate::combination::*;
    use crate::graph::ConflictGraph;
    use crate::groups::{all_groups, find_groups, Direction};
    use crate::rules::*;
    use crate::search::{ChosenSetSearch, SearchResult};
    use crate::solution::find_all_solutions;
    use crate::{
        is_true_threat, win_conditions, Board, Cell, Evaluator, Group, GroupIndex, Player,
        RuleKind, Solution, Square, SquareSet,
    };

    fn square(row: usize, col: usize) -> Square {
        Square::at(row, col)
    }

    fn group(row: usize, col: usize, direction: Direction) -> Result<Group> {
        Group::new(square(row, col), direction)
            .ok_or(anyhow!("no group at ({}, {}) going {:?}", row, col, direction))
    }

    fn squares(list: &[(usize, usize)]) -> SquareSet {
        list.iter().map(|&(row, col)| square(row, col)).collect()
    }

    fn solution(rule: RuleKind, list: &[(usize, usize)], groups: &[Group]) -> Solution {
        Solution::new(rule, squares(list), groups.iter().copied().collect())
    }

    // columns 0 to 5 full without any four-in-a-row, column 6 empty
    fn full_columns() -> Result<Board> {
        Board::from_rows(&[
            "OOXOOX.", "XXOXXO.", "OOXOOX.", "XXOXXO.", "OOXOOX.", "XXOXXO.",
        ])
    }

    // player two owns three squares of row 1, the fourth one is empty
    fn before_with_vertical() -> Result<Board> {
        Board::from_rows(&[
            ".......", ".......", ".......", ".......", "OOO....", "XXOX.X.",
        ])
    }

    fn before_with_claimeven() -> Result<Board> {
        Board::from_rows(&[
            ".......", ".......", ".......", ".......", "OOO....", "XXO.XX.",
        ])
    }

    // player one threatens (2, 3) and column 3 is still empty
    fn odd_threat() -> Result<Board> {
        Board::from_rows(&[
            ".......", ".......", ".......", "XXX....", "OXO....", "XOX.OOO",
        ])
    }

    fn threat_combination() -> Result<Board> {
        Board::from_rows(&[
            ".......", ".......", ".......", "XX.....", "OX.....", "XO...OO",
        ])
    }

    #[test]
    pub fn board_from_moves() -> Result<()> {
        let board = Board::from_moves("4455")?;

        assert_eq!(board.cell(square(0, 3)), Cell::PlayerOne);
        assert_eq!(board.cell(square(1, 3)), Cell::PlayerTwo);
        assert_eq!(board.cell(square(0, 4)), Cell::PlayerOne);
        assert_eq!(board.cell(square(1, 4)), Cell::PlayerTwo);
        assert_eq!(board.num_moves(), 4);
        assert_eq!(board.next_player(), Player::One);
        assert_eq!(board.playable_square(3), Some(square(2, 3)));
        assert_eq!(board.playable_squares().len(), 7);
        Ok(())
    }

    #[test]
    pub fn malformed_boards_are_rejected() -> Result<()> {
        assert!(Square::new(6, 0).is_err());
        assert!(Square::new(0, 7).is_err());
        assert!(Square::new(5, 6).is_ok());

        assert!(Board::from_moves("8").is_err());
        assert!(Board::from_moves("0").is_err());
        assert!(Board::from_moves("4a").is_err());
        // seventh token in a column
        assert!(Board::from_moves("1111111").is_err());
        // the seventh move completes a vertical four for player one
        assert!(Board::from_moves("1212121").is_err());

        assert!(Board::from_rows(&["......."; 5]).is_err());
        assert!(Board::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "......",
        ])
        .is_err());
        assert!(Board::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "...Z...",
        ])
        .is_err());
        // floating token
        assert!(Board::from_rows(&[
            ".......", ".......", ".......", ".......", "...X...", ".......",
        ])
        .is_err());
        Ok(())
    }

    #[test]
    pub fn square_sets() -> Result<()> {
        let set = squares(&[(1, 2), (0, 5), (0, 2)]);

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![square(0, 2), square(1, 2), square(0, 5)]
        );
        assert_eq!(set.columns().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(set.in_column(2).len(), 2);
        assert!(set.contains(square(0, 5)));
        assert!(!set.contains(square(1, 5)));
        assert!(set.is_disjoint(&squares(&[(1, 5), (3, 3)])));
        assert!(!set.is_disjoint(&squares(&[(1, 2)])));
        assert_eq!(SquareSet::full().len(), 42);
        Ok(())
    }

    #[test]
    pub fn true_threats() -> Result<()> {
        assert!(is_true_threat(square(0, 0), square(3, 3)));
        assert!(is_true_threat(square(2, 1), square(2, 4)));
        assert!(is_true_threat(square(0, 4), square(3, 4)));
        assert!(is_true_threat(square(3, 3), square(0, 6)));
        assert!(!is_true_threat(square(0, 0), square(4, 4)));
        assert!(!is_true_threat(square(0, 0), square(1, 2)));
        assert!(!is_true_threat(square(1, 0), square(1, 4)));
        Ok(())
    }

    #[test]
    pub fn empty_board() -> Result<()> {
        let board = Board::new();

        assert_eq!(all_groups().count(), 69);
        assert_eq!(find_groups(&board, Player::One).len(), 69);
        assert_eq!(find_groups(&board, Player::Two).len(), 69);

        assert_eq!(find_claimevens(&board).len(), 21);
        assert_eq!(find_verticals(&board).len(), 14);
        assert_eq!(find_baseinverses(&board).len(), 15);
        assert_eq!(find_low_inverses(&find_verticals(&board)).len(), 40);
        assert_eq!(find_high_inverses(&board).len(), 40);
        assert_eq!(find_afterevens(&board, Player::One).len(), 12);

        let baseclaims = find_baseclaims(&board);
        assert!(!baseclaims.is_empty());
        for baseclaim in &baseclaims {
            assert_eq!(baseclaim.second.above(), Some(baseclaim.fourth));
        }

        for player in [Player::One, Player::Two] {
            assert!(find_befores(&board, player).is_empty());
            assert!(find_odd_threats(&board, player).is_empty());
            assert!(find_threat_combinations(&board, player).is_empty());
            assert!(win_conditions(&board, player).is_empty());
        }
        Ok(())
    }

    #[test]
    pub fn claimeven_without_groups_is_discarded() -> Result<()> {
        let board = Board::new();
        let claimeven = Claimeven {
            upper: square(1, 0),
            lower: square(0, 0),
        };

        assert!(Solution::from_claimeven(&claimeven, &GroupIndex::new(&[])).is_none());

        let elsewhere: Vec<Group> = all_groups()
            .filter(|group| !group.contains(claimeven.upper))
            .collect();
        assert!(Solution::from_claimeven(&claimeven, &GroupIndex::new(&elsewhere)).is_none());

        let index = GroupIndex::for_player(&board, Player::One);
        let solution = Solution::from_claimeven(&claimeven, &index)
            .ok_or(anyhow!("claimeven should refute the groups through (1, 0)"))?;
        assert_eq!(solution.rule(), RuleKind::Claimeven);
        assert_eq!(*solution.squares(), squares(&[(0, 0), (1, 0)]));
        assert!(solution.groups().iter().all(|group| group.contains(square(1, 0))));
        Ok(())
    }

    #[test]
    pub fn before_decomposes_into_vertical() -> Result<()> {
        let board = before_with_vertical()?;
        let before_group = group(1, 0, Direction::Horizontal)?;

        let befores = find_befores(&board, Player::One);
        let before = befores
            .iter()
            .find(|before| before.group == before_group)
            .ok_or(anyhow!("missing before on row 1"))?;
        assert_eq!(
            before.verticals,
            vec![Vertical {
                upper: square(2, 3),
                lower: square(1, 3),
            }]
        );
        assert!(before.claimevens.is_empty());

        // befores are built from the groups of the defender only
        assert!(find_befores(&board, Player::Two)
            .iter()
            .all(|before| before.group != before_group));

        let index = GroupIndex::for_player(&board, Player::One);
        let solution = Solution::from_before(&board, before, &index)
            .ok_or(anyhow!("before should refute the groups through (2, 3)"))?;
        assert_eq!(solution.rule(), RuleKind::Before);
        assert_eq!(*solution.squares(), squares(&[(1, 3), (2, 3)]));
        assert!(solution
            .groups()
            .iter()
            .all(|group| group.is_winnable_by(&board, Player::One)));
        assert!(solution.groups().contains(&group(2, 0, Direction::Horizontal)?));
        Ok(())
    }

    #[test]
    pub fn before_decomposes_into_claimeven() -> Result<()> {
        let board = before_with_claimeven()?;
        let before_group = group(1, 0, Direction::Horizontal)?;

        let before = find_befores(&board, Player::One)
            .into_iter()
            .find(|before| before.group == before_group)
            .ok_or(anyhow!("missing before on row 1"))?;
        assert_eq!(
            before.claimevens,
            vec![Claimeven {
                upper: square(1, 3),
                lower: square(0, 3),
            }]
        );
        assert!(before.verticals.is_empty());
        assert_eq!(
            before.pairs().collect::<Vec<_>>(),
            vec![(square(1, 3), square(0, 3))]
        );
        Ok(())
    }

    #[test]
    pub fn special_befores() -> Result<()> {
        let board = before_with_vertical()?;
        let before_group = group(1, 0, Direction::Horizontal)?;

        let befores = find_befores(&board, Player::One);
        let externals: Vec<Square> = find_special_befores(&board, &befores)
            .into_iter()
            .filter(|special| special.before.group == before_group)
            .map(|special| {
                assert_eq!(special.internal, square(1, 3));
                special.external
            })
            .collect();

        // only the playable squares on row 2 line up with (2, 3)
        assert_eq!(externals, vec![square(2, 0), square(2, 1), square(2, 2)]);
        Ok(())
    }

    #[test]
    pub fn afterevens() -> Result<()> {
        let board = before_with_vertical()?;

        // player one may not own a square of an aftereven of player two
        let afterevens = find_afterevens(&board, Player::One);
        assert_eq!(afterevens.len(), 12);

        let afterevens = find_afterevens(&board, Player::Two);
        assert_eq!(afterevens.len(), 9);
        assert!(afterevens.contains(&Aftereven {
            group: group(1, 3, Direction::Horizontal)?,
        }));
        assert!(!afterevens.contains(&Aftereven {
            group: group(1, 0, Direction::Horizontal)?,
        }));
        Ok(())
    }

    #[test]
    pub fn odd_threats() -> Result<()> {
        let board = odd_threat()?;

        let odd_threats = find_odd_threats(&board, Player::One);
        assert_eq!(
            odd_threats,
            vec![OddThreat {
                group: group(2, 0, Direction::Horizontal)?,
                odd_square: square(2, 3),
                playable: square(0, 3),
            }]
        );

        // player two's threat on (0, 3) is directly playable, so it is no odd threat
        assert!(find_odd_threats(&board, Player::Two).is_empty());

        let conditions = win_conditions(&board, Player::One);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].rule(), RuleKind::OddThreat);
        assert_eq!(*conditions[0].squares(), squares(&[(2, 3)]));
        assert!(conditions[0]
            .groups()
            .contains(&group(0, 3, Direction::Horizontal)?));
        assert!(conditions[0]
            .groups()
            .iter()
            .all(|group| group.is_winnable_by(&board, Player::Two)));
        Ok(())
    }

    #[test]
    pub fn threat_combinations() -> Result<()> {
        let board = threat_combination()?;

        let combinations = find_threat_combinations(&board, Player::One);
        assert_eq!(
            combinations,
            vec![ThreatCombination {
                even_threat: group(0, 0, Direction::Diagonal)?,
                odd_threat: group(2, 0, Direction::Horizontal)?,
                shared_square: square(2, 2),
                even_square: square(3, 3),
                odd_square: square(2, 3),
                shared_column_playable: Some(square(0, 2)),
                stacked_column_playable: Some(square(0, 3)),
                kind: ThreatCombinationKind::EvenAboveOdd,
            }]
        );
        Ok(())
    }

    #[test]
    pub fn disjoint_solutions_combine() -> Result<()> {
        let kinds = [
            RuleKind::Claimeven,
            RuleKind::Baseinverse,
            RuleKind::Vertical,
            RuleKind::Aftereven,
            RuleKind::LowInverse,
            RuleKind::HighInverse,
            RuleKind::Baseclaim,
            RuleKind::Before,
            RuleKind::SpecialBefore,
            RuleKind::OddThreat,
        ];
        for &first in &kinds {
            for &second in &kinds {
                let a = solution(first, &[(0, 0), (1, 0)], &[]);
                let b = solution(second, &[(2, 3), (3, 3)], &[]);
                let allowed = combination_allowed(&a, &b);

                assert_eq!(allowed, combination_allowed(&b, &a));
                assert_eq!(
                    allowed,
                    first != RuleKind::OddThreat && second != RuleKind::OddThreat
                );
            }
        }
        Ok(())
    }

    #[test]
    pub fn claimevens_and_inverses() -> Result<()> {
        let low_inverse = solution(
            RuleKind::LowInverse,
            &[(3, 2), (4, 2), (3, 3), (4, 3)],
            &[],
        );

        let below = solution(RuleKind::Claimeven, &[(2, 2), (3, 2)], &[]);
        assert!(!combination_allowed(&below, &low_inverse));
        assert!(!combination_allowed(&low_inverse, &below));

        let above = solution(RuleKind::Claimeven, &[(4, 3), (5, 3)], &[]);
        assert!(!combination_allowed(&above, &low_inverse));

        let high = solution(RuleKind::Claimeven, &[(4, 2), (5, 2)], &[]);
        let low_inverse = solution(
            RuleKind::LowInverse,
            &[(1, 2), (2, 2), (1, 3), (2, 3)],
            &[],
        );
        assert!(combination_allowed(&high, &low_inverse));
        assert!(combination_allowed(&low_inverse, &high));
        Ok(())
    }

    #[test]
    pub fn column_wise_rules() -> Result<()> {
        let a = solution(RuleKind::Before, &[(1, 3), (2, 3), (1, 4), (2, 4)], &[]);
        let b = solution(RuleKind::Before, &[(1, 3), (2, 3), (3, 5), (4, 5)], &[]);
        let c = solution(RuleKind::Before, &[(2, 3), (3, 3)], &[]);

        assert!(combination_allowed(&a, &b));
        assert!(!combination_allowed(&a, &c));
        assert!(!combination_allowed(&c, &b));

        // a before shares nothing with a vertical
        let vertical = solution(RuleKind::Vertical, &[(1, 3), (2, 3)], &[]);
        assert!(!combination_allowed(&a, &vertical));
        assert!(!combination_allowed(&vertical, &b));

        // column-wise the two agree, but a before needs disjoint squares
        let aftereven = solution(RuleKind::Aftereven, &[(1, 4), (2, 4)], &[]);
        assert!(column_wise_disjoint_or_equal(&a, &aftereven));
        assert!(!combination_allowed(&a, &aftereven));
        assert!(!combination_allowed(&aftereven, &a));
        Ok(())
    }

    #[test]
    pub fn unsolvable_problems_use_slack() -> Result<()> {
        let g1 = group(0, 0, Direction::Horizontal)?;
        let g2 = group(0, 0, Direction::Vertical)?;
        let g3 = group(2, 0, Direction::Horizontal)?;

        let graph = ConflictGraph::new(
            vec![g1, g2, g3],
            vec![
                solution(RuleKind::Claimeven, &[(0, 0), (1, 0)], &[g1]),
                solution(RuleKind::Claimeven, &[(0, 5), (1, 5)], &[g2]),
            ],
        );
        assert_eq!(graph.slack(), 1);
        assert_eq!(graph.unsolvable(), vec![g3]);
        assert_eq!(graph.solvers(0), &[0]);
        assert!(graph.conflicts(0).is_empty());

        assert_eq!(
            ChosenSetSearch::new(&graph).run(),
            SearchResult::Proved(vec![0, 1])
        );
        Ok(())
    }

    #[test]
    pub fn conflicting_solutions() -> Result<()> {
        let g1 = group(0, 0, Direction::Horizontal)?;
        let g2 = group(0, 0, Direction::Vertical)?;
        let s1 = solution(RuleKind::Claimeven, &[(0, 0), (1, 0)], &[g1]);
        let s2 = solution(RuleKind::Claimeven, &[(1, 0), (2, 0)], &[g2]);
        let s3 = solution(RuleKind::Claimeven, &[(0, 6), (1, 6)], &[g2]);

        let graph = ConflictGraph::new(vec![g1, g2], vec![s1.clone(), s2.clone()]);
        assert_eq!(graph.slack(), 0);
        assert_eq!(graph.conflicts(0), &[1]);
        assert_eq!(graph.conflicts(1), &[0]);
        assert_eq!(ChosenSetSearch::new(&graph).run(), SearchResult::Refuted);

        let graph = ConflictGraph::new(vec![g1, g2], vec![s1, s2, s3]);
        assert_eq!(
            ChosenSetSearch::new(&graph).run(),
            SearchResult::Proved(vec![0, 2])
        );
        assert_eq!(
            ChosenSetSearch::new(&graph).with_parallel_root(true).run(),
            SearchResult::Proved(vec![0, 2])
        );
        assert_eq!(
            ChosenSetSearch::new(&graph).with_node_budget(0).run(),
            SearchResult::OutOfBudget
        );
        Ok(())
    }

    #[test]
    pub fn full_columns_proof() -> Result<()> {
        let board = full_columns()?;
        let problems = vec![
            group(0, 6, Direction::Vertical)?,
            group(1, 6, Direction::Vertical)?,
            group(2, 6, Direction::Vertical)?,
        ];

        for player in [Player::One, Player::Two] {
            assert_eq!(find_groups(&board, player), problems);
            assert!(find_befores(&board, player).is_empty());
        }
        assert_eq!(find_claimevens(&board).len(), 3);
        assert_eq!(find_verticals(&board).len(), 2);
        assert!(find_baseinverses(&board).is_empty());

        let index = GroupIndex::new(&problems);
        let solutions = find_all_solutions(&board, Player::One, &index);
        assert_eq!(solutions.len(), 5);

        let mut evaluator = Evaluator::new();
        let proof = evaluator
            .evaluate(&board, Player::One)
            .ok_or(anyhow!("player two should hold column 6"))?;
        assert!(proof.unsolved().is_empty());
        assert_eq!(
            proof.covered_groups(),
            problems.iter().copied().collect::<BTreeSet<_>>()
        );
        assert!(evaluator.node_count > 0);

        let responses = proof.responses();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses.get(&square(0, 6)), Some(&square(1, 6)));
        assert_eq!(responses.get(&square(2, 6)), Some(&square(3, 6)));

        let parallel = Evaluator::new()
            .with_parallel_root(true)
            .evaluate(&board, Player::One)
            .ok_or(anyhow!("parallel search should find the same proof"))?;
        assert_eq!(parallel, proof);

        assert!(crate::evaluate(&board, Player::Two).is_some());
        Ok(())
    }

    #[test]
    pub fn exhausted_budgets_give_up() -> Result<()> {
        let board = full_columns()?;

        assert!(Evaluator::new()
            .with_node_budget(0)
            .evaluate(&board, Player::One)
            .is_none());
        assert!(Evaluator::new()
            .with_deadline(Duration::ZERO)
            .evaluate(&board, Player::One)
            .is_none());
        assert!(Evaluator::new()
            .with_deadline(Duration::from_secs(60))
            .evaluate(&board, Player::One)
            .is_some());
        Ok(())
    }

    /// Plays up to `moves` random moves, stopping early rather than ending the game
    fn random_board(rng: &mut StdRng, moves: usize) -> Result<Board> {
        let mut board = Board::new();
        for _ in 0..moves {
            let columns: Vec<usize> = (0..crate::WIDTH)
                .filter(|&column| board.playable(column) && !board.check_winning_move(column))
                .collect();
            if columns.is_empty() {
                break;
            }
            let column = columns[rng.gen_range(0..columns.len())];
            board.play_checked(column + 1)?;
        }
        Ok(board)
    }

    #[test]
    pub fn random_positions() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(20_240_917);

        for _ in 0..40 {
            let moves = rng.gen_range(0..24);
            let board = random_board(&mut rng, moves)?;

            for player in [Player::One, Player::Two] {
                let problems = find_groups(&board, player);
                let index = GroupIndex::new(&problems);
                let solutions = find_all_solutions(&board, player, &index);

                for solution in &solutions {
                    assert!(!solution.groups().is_empty());
                    assert!(solution
                        .groups()
                        .iter()
                        .all(|group| group.is_winnable_by(&board, player)));
                }
                for a in solutions.iter().take(30) {
                    for b in solutions.iter().take(30) {
                        assert_eq!(combination_allowed(a, b), combination_allowed(b, a));
                    }
                }

                let mut evaluator = Evaluator::new().with_node_budget(20_000);
                let proof = match evaluator.evaluate(&board, player) {
                    Some(proof) => proof,
                    None => continue,
                };

                for (i, a) in proof.solutions().iter().enumerate() {
                    for b in &proof.solutions()[i + 1..] {
                        assert!(combination_allowed(a, b), "{:?}\n{:?} and {:?}", board, a, b);
                    }
                }

                let covered = proof.covered_groups();
                for problem in &problems {
                    assert!(covered.contains(problem) || proof.unsolved().contains(problem));
                }
                for group in proof.unsolved() {
                    assert!(solutions.iter().all(|solution| !solution.groups().contains(group)));
                }

                let again = evaluator
                    .evaluate(&board, player)
                    .ok_or(anyhow!("{:?} proved once but not twice", board))?;
                assert_eq!(again.covered_groups(), covered);
            }
        }
        Ok(())
    }
}
