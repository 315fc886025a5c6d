use super::{log_start, SearchOutcome, SearchStats, Solution, Strategy};
use crate::engine::{Board, Move};
use crate::heuristics::Heuristic;
use log::{debug, info};
use std::time::Instant;

/// Iterative-deepening A*.
///
/// Runs depth-first passes bounded by an `f = g + h` threshold, starting at
/// `h(initial)` and raising it to the smallest pruned `f` after each failed
/// pass. Only the current path is kept in memory, and it doubles as the
/// cycle check, so states reachable by several paths are expanded again.
#[derive(Clone, Copy, Debug)]
pub struct IdaStar {
    heuristic: Heuristic,
}

/// Result of one bounded depth-first visit.
enum Pass {
    Found,
    /// Smallest `f` that exceeded the threshold, or `None` when nothing was pruned.
    Exceeded(Option<u32>),
}

/// State of one depth-first pass: the current path and the visit counter.
struct DepthFirst {
    heuristic: Heuristic,
    path: Vec<Board>,
    moves: Vec<Move>,
    visits: u64,
}

impl DepthFirst {
    fn visit(&mut self, g: u32, h: u32, threshold: u32) -> Pass {
        self.visits += 1;
        let f = g + h;
        if f > threshold {
            return Pass::Exceeded(Some(f));
        }
        let Some(state) = self.path.last() else {
            return Pass::Exceeded(None);
        };
        if state.is_goal() {
            return Pass::Found;
        }

        let mut children: Vec<(u32, u32, Move, Board)> = state
            .successors()
            .into_iter()
            .filter(|(_, next)| !self.path.contains(next))
            .map(|(mv, next)| {
                let h = self.heuristic.evaluate(&next);
                (g + 1 + h, h, mv, next)
            })
            .collect();
        children.sort_by_key(|&(f, ..)| f);

        let mut next_threshold: Option<u32> = None;
        for (_, h, mv, next) in children {
            self.path.push(next);
            self.moves.push(mv);
            match self.visit(g + 1, h, threshold) {
                Pass::Found => return Pass::Found,
                Pass::Exceeded(Some(t)) => {
                    next_threshold = Some(next_threshold.map_or(t, |best| best.min(t)));
                }
                Pass::Exceeded(None) => {}
            }
            self.path.pop();
            self.moves.pop();
        }
        Pass::Exceeded(next_threshold)
    }
}

impl IdaStar {
    pub fn new(heuristic: Heuristic) -> Self {
        IdaStar { heuristic }
    }

    /// Runs the search and also returns the threshold of the last pass.
    ///
    /// On success the threshold is an upper bound on the `f` of the goal
    /// node. The two are equal only when the heuristic did not overestimate
    /// along the pass; when it did, the first pass may already reach a goal
    /// well under the starting threshold. On failure it is the last
    /// threshold tried.
    pub fn search_with_threshold(&self, initial: &Board) -> (SearchOutcome, u32) {
        let started = Instant::now();
        let name = self.name();
        log_start(&name, initial);

        let h = self.heuristic.evaluate(initial);
        let mut threshold = h;
        let mut dfs = DepthFirst {
            heuristic: self.heuristic,
            path: vec![initial.clone()],
            moves: Vec::new(),
            visits: 0,
        };

        let found = loop {
            debug!("{}: threshold {}", name, threshold);
            match dfs.visit(0, h, threshold) {
                Pass::Found => break true,
                Pass::Exceeded(Some(next)) => threshold = next,
                Pass::Exceeded(None) => break false,
            }
        };

        let stats = SearchStats {
            nodes_expanded: dfs.visits,
            elapsed: started.elapsed(),
        };
        let solution = if found {
            info!(
                "{}: solved in {} moves at threshold {}, {} nodes visited, {:?}",
                name,
                dfs.moves.len(),
                threshold,
                stats.nodes_expanded,
                stats.elapsed
            );
            Some(Solution {
                states: dfs.path,
                moves: dfs.moves,
                stats,
            })
        } else {
            info!(
                "{}: no solution, {} nodes visited, {:?}",
                name, stats.nodes_expanded, stats.elapsed
            );
            None
        };
        (SearchOutcome { solution, stats }, threshold)
    }
}

impl Strategy for IdaStar {
    fn name(&self) -> String {
        format!("IDA* with {}", self.heuristic)
    }

    fn guarantees_optimal(&self) -> bool {
        self.heuristic.is_admissible()
    }

    fn heuristic(&self) -> Option<Heuristic> {
        Some(self.heuristic)
    }

    fn search(&self, initial: &Board) -> SearchOutcome {
        self.search_with_threshold(initial).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::test_puzzles::*;
    use crate::utils::puzzle_from_str_array;

    #[test]
    fn test_final_threshold_equals_goal_f_without_overestimate() {
        let board = puzzle_from_str_array(TWO_STEP).unwrap();
        let (outcome, threshold) = IdaStar::new(Heuristic::Distance).search_with_threshold(&board);
        let solution = outcome.solution.unwrap();
        let goal = solution.final_state().unwrap();
        let goal_f = solution.len() as u32 + Heuristic::Distance.evaluate(goal);
        assert_eq!(threshold, 2);
        assert_eq!(threshold, goal_f);
        assert!(solution.verify(&board).is_ok());
    }

    #[test]
    fn test_final_threshold_bounds_goal_f() {
        // h(initial) = 3 but one slide of `A` clears the lane: the goal is
        // found in the first pass with f = 1.
        let board = puzzle_from_str_array(BLOCKED_ONCE).unwrap();
        let (outcome, threshold) = IdaStar::new(Heuristic::Distance).search_with_threshold(&board);
        let solution = outcome.solution.unwrap();
        let goal = solution.final_state().unwrap();
        let goal_f = solution.len() as u32 + Heuristic::Distance.evaluate(goal);
        assert_eq!(goal_f, 1);
        assert_eq!(threshold, 3);
        assert!(threshold > goal_f);

        for puzzle in [TWO_STEP, EAGER_PRIMARY] {
            let board = puzzle_from_str_array(puzzle).unwrap();
            for heuristic in [Heuristic::Distance, Heuristic::Blocking] {
                let (outcome, threshold) = IdaStar::new(heuristic).search_with_threshold(&board);
                let solution = outcome.solution.unwrap();
                let goal = solution.final_state().unwrap();
                assert!(threshold >= solution.len() as u32 + heuristic.evaluate(goal));
            }
        }
    }

    #[test]
    fn test_zero_move_threshold() {
        let board = puzzle_from_str_array(ALREADY_SOLVED).unwrap();
        let (outcome, threshold) = IdaStar::new(Heuristic::Blocking).search_with_threshold(&board);
        assert_eq!(threshold, 0);
        assert_eq!(outcome.stats.nodes_expanded, 1);
        assert!(outcome.solution.unwrap().is_empty());
    }

    #[test]
    fn test_children_tried_in_f_order() {
        // h(initial) = 3; the cheapest child is a goal and is tried first.
        let board = puzzle_from_str_array(BLOCKED_ONCE).unwrap();
        let (outcome, threshold) = IdaStar::new(Heuristic::Distance).search_with_threshold(&board);
        assert_eq!(threshold, 3);
        assert_eq!(outcome.stats.nodes_expanded, 2);
        assert_eq!(outcome.solution.unwrap().moves[0].to_string(), "A-up x2");
    }

    #[test]
    fn test_counts_pruned_visits_and_fails_when_nothing_pruned() {
        let board = puzzle_from_str_array(STUCK).unwrap();
        let (outcome, threshold) = IdaStar::new(Heuristic::Distance).search_with_threshold(&board);
        assert!(outcome.solution.is_none());
        assert_eq!(outcome.stats.nodes_expanded, 1);
        assert_eq!(threshold, 2);

        // First pass of the two-step puzzle: root plus every pruned child.
        let board = puzzle_from_str_array(TWO_STEP).unwrap();
        let children = board.successors().len() as u64;
        let outcome = IdaStar::new(Heuristic::Distance).search(&board);
        assert!(outcome.stats.nodes_expanded > 1 + children);
    }
}
