//! Search strategies over Rush Hour boards.
//!
//! Four engines share one contract (the [`Strategy`] trait):
//! - [`UniformCost`]: frontier ordered by path cost, optimal.
//! - [`GreedyBestFirst`]: frontier ordered by heuristic only, fast but not optimal.
//! - [`AStar`]: frontier ordered by `g + h`, optimal with an admissible heuristic.
//! - [`IdaStar`]: iterative deepening on `g + h`, memory bounded by the depth.
//!
//! The best-first engines keep their nodes in a [`SearchTree`] arena and
//! their open list in a [`Frontier`]; a goal node is turned into a
//! [`Solution`] by walking parent indices back to the root.
use crate::engine::{Board, Move};
use crate::error::ReplayError;
use crate::heuristics::Heuristic;
use log::{debug, info};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::ops::Index;
use std::rc::Rc;
use std::time::{Duration, Instant};

mod astar;
mod gbfs;
mod ida_star;
mod ucs;

pub use astar::AStar;
pub use gbfs::GreedyBestFirst;
pub use ida_star::IdaStar;
pub use ucs::UniformCost;

/// Counters reported by every search, successful or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Frontier pops that were not stale, the goal pop included. For IDA*,
    /// every call of the depth-first visit.
    pub nodes_expanded: u64,
    /// Wall-clock time spent in the search.
    pub elapsed: Duration,
}

/// A path from the initial board to a goal board.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Every board along the path, initial and goal included.
    pub states: Vec<Board>,
    /// `moves[i]` turns `states[i]` into `states[i + 1]`.
    pub moves: Vec<Move>,
    pub stats: SearchStats,
}

impl Solution {
    /// Number of moves in the solution.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// `true` when the initial board already is a goal.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The goal board at the end of the path.
    pub fn final_state(&self) -> Option<&Board> {
        self.states.last()
    }

    /// Replays the move labels from `initial` through the successor
    /// generator and checks every recorded state along the way.
    ///
    /// # Errors
    /// Returns the first discrepancy found. Steps are numbered from 1, the
    /// move that produces `states[1]`.
    pub fn verify(&self, initial: &Board) -> Result<(), ReplayError> {
        if self.states.len() != self.moves.len() + 1 {
            return Err(ReplayError::LengthMismatch {
                states: self.states.len(),
                moves: self.moves.len(),
            });
        }
        if self.states.first() != Some(initial) {
            return Err(ReplayError::StateMismatch { step: 0 });
        }

        for (i, mv) in self.moves.iter().enumerate() {
            let step = i + 1;
            let (from, to) = (&self.states[i], &self.states[step]);

            match from.infer_move(to) {
                None => return Err(ReplayError::UnattributedMove { step }),
                Some(inferred) if inferred != *mv => {
                    return Err(ReplayError::IllegalMove {
                        step,
                        label: mv.to_string(),
                    })
                }
                Some(_) => {}
            }

            let replayed = from
                .successors()
                .into_iter()
                .find(|(candidate, _)| candidate == mv)
                .map(|(_, board)| board)
                .ok_or_else(|| ReplayError::IllegalMove {
                    step,
                    label: mv.to_string(),
                })?;
            if replayed != *to {
                return Err(ReplayError::StateMismatch { step });
            }
        }
        Ok(())
    }
}

/// Result of a search: the solution if one was found, and the stats either way.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// Builds the outcome of a best-first search and logs it.
    fn finish(
        strategy: &str,
        tree: &SearchTree,
        goal: Option<usize>,
        nodes_expanded: u64,
        started: Instant,
    ) -> SearchOutcome {
        let stats = SearchStats {
            nodes_expanded,
            elapsed: started.elapsed(),
        };
        let solution = goal.map(|id| tree.build_solution(id, stats));
        match &solution {
            Some(s) => info!(
                "{}: solved in {} moves, {} nodes expanded, {} generated, {:?}",
                strategy,
                s.len(),
                nodes_expanded,
                tree.len(),
                stats.elapsed
            ),
            None => info!(
                "{}: no solution, {} nodes expanded, {} generated, {:?}",
                strategy,
                nodes_expanded,
                tree.len(),
                stats.elapsed
            ),
        }
        SearchOutcome { solution, stats }
    }
}

/// A discovered state together with how it was reached.
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub state: Rc<Board>,
    /// Index of the producing node in the owning [`SearchTree`]; `None` for the root.
    pub parent: Option<usize>,
    pub g: u32,
    pub h: u32,
    /// Slide that produced `state` from the parent's state.
    pub action: Option<Move>,
}

impl SearchNode {
    /// The root node of a search.
    pub fn root(state: Rc<Board>, h: u32) -> Self {
        SearchNode {
            state,
            parent: None,
            g: 0,
            h,
            action: None,
        }
    }

    /// Estimated total cost through this node.
    pub fn f(&self) -> u32 {
        self.g + self.h
    }
}

/// Arena owning every node created during one search.
#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `node` and returns its index.
    pub fn push(&mut self, node: SearchNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Number of nodes created so far.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Walks parent indices from `goal` back to the root and returns the
    /// states and move labels in root-to-goal order.
    pub fn build_solution(&self, goal: usize, stats: SearchStats) -> Solution {
        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(id) = cursor {
            path.push(id);
            cursor = self.nodes[id].parent;
        }
        path.reverse();

        let states = path.iter().map(|&id| self.nodes[id].state.as_ref().clone()).collect();
        let moves = path.iter().filter_map(|&id| self.nodes[id].action).collect();
        Solution { states, moves, stats }
    }
}

impl Index<usize> for SearchTree {
    type Output = SearchNode;

    fn index(&self, id: usize) -> &SearchNode {
        &self.nodes[id]
    }
}

/// Priority queue of node indices, ordered by `K` then insertion order.
///
/// At most one entry per state is live; pushing a state again replaces its
/// live entry, and the old heap entry is skipped when it surfaces.
#[derive(Debug)]
pub struct Frontier<K: Ord> {
    heap: BinaryHeap<Reverse<(K, u64, usize)>>,
    live: HashMap<Rc<Board>, usize>,
    seq: u64,
    stale: u64,
}

impl<K: Ord> Default for Frontier<K> {
    fn default() -> Self {
        Frontier {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            seq: 0,
            stale: 0,
        }
    }
}

impl<K: Ord> Frontier<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds node `id` for `state` with priority `key`, superseding any live
    /// entry for the same state.
    pub fn push(&mut self, key: K, id: usize, state: Rc<Board>) {
        self.heap.push(Reverse((key, self.seq, id)));
        self.seq += 1;
        self.live.insert(state, id);
    }

    /// Node currently queued for `state`, if any.
    pub fn live_node(&self, state: &Board) -> Option<usize> {
        self.live.get(state).copied()
    }

    /// Pops the best live node, discarding stale entries on the way.
    pub fn pop(&mut self, tree: &SearchTree) -> Option<usize> {
        while let Some(Reverse((_, _, id))) = self.heap.pop() {
            let state = tree[id].state.as_ref();
            if self.live.get(state) == Some(&id) {
                self.live.remove(state);
                return Some(id);
            }
            self.stale += 1;
        }
        None
    }

    /// Number of superseded entries dropped so far.
    pub fn stale_skipped(&self) -> u64 {
        self.stale
    }
}

/// Common interface of the search engines.
pub trait Strategy {
    /// Label used in reports, including the heuristic when there is one.
    fn name(&self) -> String;

    /// Whether the engine is classed as optimal: uniform-cost search, or A*
    /// and IDA* guided by a heuristic classed as admissible (see
    /// [`Heuristic::is_admissible`]).
    ///
    /// The flag reflects that classification. With the distance heuristic
    /// A* and IDA* still return longer solutions than uniform-cost search on
    /// some boards, so reports that need the observed shortest length should
    /// compare against [`UniformCost`].
    fn guarantees_optimal(&self) -> bool;

    /// The estimator guiding the search; `None` for uninformed search.
    fn heuristic(&self) -> Option<Heuristic>;

    /// Runs the search from `initial` to completion or exhaustion.
    fn search(&self, initial: &Board) -> SearchOutcome;

    /// Runs the search and keeps only the solution.
    fn solve(&self, initial: &Board) -> Option<Solution> {
        self.search(initial).solution
    }
}

/// Selects a search engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Algorithm {
    Ucs,
    Gbfs,
    Astar,
    Idastar,
}

impl Algorithm {
    /// Builds the engine; uniform-cost search ignores `heuristic`.
    pub fn build(self, heuristic: Heuristic) -> Box<dyn Strategy> {
        match self {
            Algorithm::Ucs => Box::new(UniformCost::new()),
            Algorithm::Gbfs => Box::new(GreedyBestFirst::new(heuristic)),
            Algorithm::Astar => Box::new(AStar::new(heuristic)),
            Algorithm::Idastar => Box::new(IdaStar::new(heuristic)),
        }
    }

    /// Whether the engine consults a heuristic at all.
    pub fn is_informed(self) -> bool {
        !matches!(self, Algorithm::Ucs)
    }
}

/// Logs the start of a search.
fn log_start(strategy: &str, initial: &Board) {
    debug!(
        "{}: searching {}x{} board with {} pieces",
        strategy,
        initial.rows(),
        initial.cols(),
        initial.pieces().len()
    );
}


#[cfg(test)]
mod tests {
    use super::test_puzzles::*;
    use super::*;
    use crate::utils::puzzle_from_str_array;

    fn all_strategies() -> Vec<Box<dyn Strategy>> {
        let mut strategies = vec![Algorithm::Ucs.build(Heuristic::Distance)];
        for algorithm in [Algorithm::Gbfs, Algorithm::Astar, Algorithm::Idastar] {
            for heuristic in [Heuristic::Distance, Heuristic::Blocking] {
                strategies.push(algorithm.build(heuristic));
            }
        }
        strategies
    }

    #[test]
    fn test_optimal_strategies_agree() {
        for puzzle in [BLOCKED_ONCE, TWO_STEP] {
            let board = puzzle_from_str_array(puzzle).unwrap();
            let optimal = UniformCost::new().solve(&board).unwrap().len();
            let astar = AStar::new(Heuristic::Distance).solve(&board).unwrap().len();
            let ida = IdaStar::new(Heuristic::Distance).solve(&board).unwrap().len();
            assert_eq!(astar, optimal, "A* on\n{}", board);
            assert_eq!(ida, optimal, "IDA* on\n{}", board);
        }
    }

    #[test]
    fn test_suboptimal_strategies_never_fail() {
        for puzzle in [BLOCKED_ONCE, TWO_STEP, EAGER_PRIMARY] {
            let board = puzzle_from_str_array(puzzle).unwrap();
            let optimal = UniformCost::new().solve(&board).unwrap().len();
            for strategy in all_strategies() {
                let solution = strategy
                    .solve(&board)
                    .unwrap_or_else(|| panic!("{} failed", strategy.name()));
                assert!(solution.len() >= optimal, "{} beat UCS", strategy.name());
                assert_eq!(solution.verify(&board), Ok(()), "{}", strategy.name());
                assert!(solution.final_state().unwrap().is_goal());
            }
        }
    }

    #[test]
    fn test_concrete_scenario_moves_blocker_first() {
        let board = puzzle_from_str_array(BLOCKED_ONCE).unwrap();
        for strategy in [
            Algorithm::Ucs.build(Heuristic::Distance),
            Algorithm::Astar.build(Heuristic::Distance),
            Algorithm::Idastar.build(Heuristic::Distance),
        ] {
            let solution = strategy.solve(&board).unwrap();
            assert_eq!(solution.len(), 1);
            assert_eq!(solution.moves[0].piece, 'A');
            assert_eq!(solution.moves[0].to_string(), "A-up x2");
        }
    }

    #[test]
    fn test_already_solved_gives_empty_solution() {
        let board = puzzle_from_str_array(ALREADY_SOLVED).unwrap();
        for strategy in all_strategies() {
            let outcome = strategy.search(&board);
            let solution = outcome.solution.unwrap();
            assert!(solution.is_empty());
            assert_eq!(solution.states, vec![board.clone()]);
            assert_eq!(outcome.stats.nodes_expanded, 1, "{}", strategy.name());
        }
    }

    #[test]
    fn test_unsolvable_reports_stats() {
        let board = puzzle_from_str_array(STUCK).unwrap();
        for strategy in all_strategies() {
            let outcome = strategy.search(&board);
            assert!(outcome.solution.is_none(), "{}", strategy.name());
            assert_eq!(outcome.stats.nodes_expanded, 1, "{}", strategy.name());
            assert!(strategy.solve(&board).is_none());
        }
    }

    #[test]
    fn test_searches_are_deterministic() {
        let board = puzzle_from_str_array(TWO_STEP).unwrap();
        for strategy in all_strategies() {
            let a = strategy.search(&board);
            let b = strategy.search(&board);
            assert_eq!(a.stats.nodes_expanded, b.stats.nodes_expanded);
            assert_eq!(a.solution.unwrap().moves, b.solution.unwrap().moves);
        }
    }

    #[test]
    fn test_distance_heuristic_can_mislead_optimal_strategies() {
        let board = puzzle_from_str_array(EAGER_PRIMARY).unwrap();
        let optimal = UniformCost::new().solve(&board).unwrap();
        assert_eq!(optimal.len(), 2);

        // Both are still classed as optimal.
        let astar = AStar::new(Heuristic::Distance);
        let ida = IdaStar::new(Heuristic::Distance);
        assert!(astar.guarantees_optimal());
        assert!(ida.guarantees_optimal());

        let astar_solution = astar.solve(&board).unwrap();
        assert_eq!(astar_solution.len(), 3);
        assert_eq!(astar_solution.moves[0].to_string(), "P-right x3");
        assert_eq!(astar_solution.verify(&board), Ok(()));

        let ida_solution = ida.solve(&board).unwrap();
        assert!(ida_solution.len() > optimal.len());
        assert_eq!(ida_solution.verify(&board), Ok(()));
    }

    #[test]
    fn test_blocking_heuristic_returns_longer_solutions() {
        let board = puzzle_from_str_array(EAGER_PRIMARY).unwrap();
        let optimal = UniformCost::new().solve(&board).unwrap().len();
        for strategy in [
            Algorithm::Astar.build(Heuristic::Blocking),
            Algorithm::Gbfs.build(Heuristic::Blocking),
        ] {
            let solution = strategy.solve(&board).unwrap();
            assert!(solution.len() > optimal, "{} was optimal", strategy.name());
            assert_eq!(solution.len(), 3, "{}", strategy.name());
            assert_eq!(solution.verify(&board), Ok(()));
        }
    }

    #[test]
    fn test_optimality_flags() {
        assert!(Algorithm::Ucs.build(Heuristic::Blocking).guarantees_optimal());
        assert!(!Algorithm::Gbfs.build(Heuristic::Distance).guarantees_optimal());
        assert!(Algorithm::Astar.build(Heuristic::Distance).guarantees_optimal());
        assert!(!Algorithm::Astar.build(Heuristic::Blocking).guarantees_optimal());
        assert!(Algorithm::Idastar.build(Heuristic::Distance).guarantees_optimal());
        assert_eq!(Algorithm::Ucs.build(Heuristic::Blocking).heuristic(), None);
        assert!(!Algorithm::Ucs.is_informed());
    }

    #[test]
    fn test_frontier_replaces_and_skips_stale() {
        let board = Rc::new(puzzle_from_str_array(TWO_STEP).unwrap());
        let other = Rc::new(puzzle_from_str_array(BLOCKED_ONCE).unwrap());
        let mut tree = SearchTree::new();
        let worse = tree.push(SearchNode::root(board.clone(), 0));
        let better = tree.push(SearchNode::root(board.clone(), 0));
        let third = tree.push(SearchNode::root(other.clone(), 0));

        let mut frontier = Frontier::new();
        frontier.push(5, worse, board.clone());
        frontier.push(7, third, other.clone());
        frontier.push(3, better, board.clone());
        assert_eq!(frontier.live_node(&board), Some(better));
        assert_eq!(frontier.live_node(&other), Some(third));

        assert_eq!(frontier.pop(&tree), Some(better));
        assert_eq!(frontier.live_node(&board), None);
        assert_eq!(frontier.pop(&tree), Some(third));
        assert_eq!(frontier.pop(&tree), None);
        assert_eq!(frontier.stale_skipped(), 1);
        assert_eq!(frontier.live_node(&other), None);
    }

    #[test]
    fn test_frontier_fifo_on_ties() {
        let a = Rc::new(puzzle_from_str_array(TWO_STEP).unwrap());
        let b = Rc::new(puzzle_from_str_array(BLOCKED_ONCE).unwrap());
        let c = Rc::new(puzzle_from_str_array(STUCK).unwrap());
        let mut tree = SearchTree::new();
        let ids: Vec<usize> = [&a, &b, &c]
            .iter()
            .map(|s| tree.push(SearchNode::root((*s).clone(), 0)))
            .collect();

        let mut frontier = Frontier::new();
        for (&id, state) in ids.iter().zip([&a, &b, &c]) {
            frontier.push(1, id, state.clone());
        }
        let popped: Vec<usize> = std::iter::from_fn(|| frontier.pop(&tree)).collect();
        assert_eq!(popped, ids);
    }

    #[test]
    fn test_build_solution_walks_parents() {
        let board = puzzle_from_str_array(BLOCKED_ONCE).unwrap();
        let (mv, next) = board.successors().remove(1);
        let mut tree = SearchTree::new();
        let root = tree.push(SearchNode::root(Rc::new(board.clone()), 3));
        let child = tree.push(SearchNode {
            state: Rc::new(next.clone()),
            parent: Some(root),
            g: 1,
            h: 0,
            action: Some(mv),
        });
        assert_eq!(tree[child].f(), 1);
        assert_eq!(tree.len(), 2);

        let solution = tree.build_solution(child, SearchStats::default());
        assert_eq!(solution.states, vec![board.clone(), next]);
        assert_eq!(solution.moves, vec![mv]);
        assert_eq!(solution.verify(&board), Ok(()));
    }

    #[test]
    fn test_verify_detects_tampering() {
        let board = puzzle_from_str_array(TWO_STEP).unwrap();
        let solution = UniformCost::new().solve(&board).unwrap();
        assert_eq!(solution.len(), 2);

        let mut short = solution.clone();
        short.moves.pop();
        assert_eq!(
            short.verify(&board),
            Err(ReplayError::LengthMismatch { states: 3, moves: 1 })
        );

        let mut skipped = solution.clone();
        skipped.states.remove(1);
        skipped.moves.remove(0);
        assert_eq!(
            skipped.verify(&board),
            Err(ReplayError::UnattributedMove { step: 1 })
        );

        let mut relabeled = solution.clone();
        relabeled.moves[1].distance += 1;
        assert!(matches!(
            relabeled.verify(&board),
            Err(ReplayError::IllegalMove { step: 2, .. })
        ));

        let other = puzzle_from_str_array(BLOCKED_ONCE).unwrap();
        assert_eq!(
            solution.verify(&other),
            Err(ReplayError::StateMismatch { step: 0 })
        );
    }
}
