use super::{log_start, Frontier, SearchNode, SearchOutcome, SearchTree, Strategy};
use crate::engine::Board;
use crate::heuristics::Heuristic;
use log::debug;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

/// Greedy best-first search: always expands the node that looks closest to
/// the goal, ignoring the cost already paid. A state is queued at most once.
#[derive(Clone, Copy, Debug)]
pub struct GreedyBestFirst {
    heuristic: Heuristic,
}

impl GreedyBestFirst {
    pub fn new(heuristic: Heuristic) -> Self {
        GreedyBestFirst { heuristic }
    }
}

impl Strategy for GreedyBestFirst {
    fn name(&self) -> String {
        format!("GBFS with {}", self.heuristic)
    }

    fn guarantees_optimal(&self) -> bool {
        false
    }

    fn heuristic(&self) -> Option<Heuristic> {
        Some(self.heuristic)
    }

    fn search(&self, initial: &Board) -> SearchOutcome {
        let started = Instant::now();
        let name = self.name();
        log_start(&name, initial);

        let mut tree = SearchTree::new();
        let mut frontier: Frontier<u32> = Frontier::new();
        // Every state ever queued, expanded or not.
        let mut seen: HashSet<Rc<Board>> = HashSet::new();
        let mut expanded = 0u64;

        let root_state = Rc::new(initial.clone());
        let h = self.heuristic.evaluate(initial);
        let root = tree.push(SearchNode::root(root_state.clone(), h));
        seen.insert(root_state.clone());
        frontier.push(h, root, root_state);

        while let Some(id) = frontier.pop(&tree) {
            expanded += 1;
            let state = tree[id].state.clone();
            let g = tree[id].g;
            if state.is_goal() {
                return SearchOutcome::finish(&name, &tree, Some(id), expanded, started);
            }

            for (mv, next) in state.successors() {
                if seen.contains(&next) {
                    continue;
                }
                let h = self.heuristic.evaluate(&next);
                let next = Rc::new(next);
                seen.insert(next.clone());
                let child = tree.push(SearchNode {
                    state: next.clone(),
                    parent: Some(id),
                    g: g + 1,
                    h,
                    action: Some(mv),
                });
                frontier.push(h, child, next);
            }
        }

        debug!("{}: frontier exhausted after {} states", name, seen.len());
        SearchOutcome::finish(&name, &tree, None, expanded, started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::test_puzzles::*;
    use crate::utils::puzzle_from_str_array;

    #[test]
    fn test_gbfs_follows_heuristic() {
        // Three depth-one states have h = 0; the first generated wins.
        let board = puzzle_from_str_array(BLOCKED_ONCE).unwrap();
        let outcome = GreedyBestFirst::new(Heuristic::Distance).search(&board);
        let solution = outcome.solution.unwrap();
        assert_eq!(solution.moves[0].to_string(), "A-up x2");
        assert_eq!(outcome.stats.nodes_expanded, 2);
    }

    #[test]
    fn test_gbfs_solves_two_step() {
        let board = puzzle_from_str_array(TWO_STEP).unwrap();
        for heuristic in [Heuristic::Distance, Heuristic::Blocking] {
            let solution = GreedyBestFirst::new(heuristic).solve(&board).unwrap();
            assert!(solution.len() >= 2);
            assert!(solution.verify(&board).is_ok());
        }
    }

    #[test]
    fn test_gbfs_name_mentions_heuristic() {
        let gbfs = GreedyBestFirst::new(Heuristic::Blocking);
        assert_eq!(gbfs.name(), "GBFS with Blocking Pieces + Distance (H2)");
        assert_eq!(gbfs.heuristic(), Some(Heuristic::Blocking));
    }
}
