use super::{log_start, Frontier, SearchNode, SearchOutcome, SearchTree, Strategy};
use crate::engine::Board;
use crate::heuristics::Heuristic;
use log::debug;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

/// Uniform-cost search: expands nodes in order of path cost, first come
/// first served among equal costs. Every slide costs one, so this explores
/// the state space breadth first and returns a shortest solution.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformCost;

impl UniformCost {
    pub fn new() -> Self {
        UniformCost
    }
}

impl Strategy for UniformCost {
    fn name(&self) -> String {
        "UCS".to_string()
    }

    fn guarantees_optimal(&self) -> bool {
        true
    }

    fn heuristic(&self) -> Option<Heuristic> {
        None
    }

    fn search(&self, initial: &Board) -> SearchOutcome {
        let started = Instant::now();
        let name = self.name();
        log_start(&name, initial);

        let mut tree = SearchTree::new();
        let mut frontier: Frontier<u32> = Frontier::new();
        let mut explored: HashSet<Rc<Board>> = HashSet::new();
        let mut expanded = 0u64;

        let root_state = Rc::new(initial.clone());
        let root = tree.push(SearchNode::root(root_state.clone(), 0));
        frontier.push(0, root, root_state);

        while let Some(id) = frontier.pop(&tree) {
            expanded += 1;
            let state = tree[id].state.clone();
            let g = tree[id].g;
            if state.is_goal() {
                debug!("{}: {} stale entries skipped", name, frontier.stale_skipped());
                return SearchOutcome::finish(&name, &tree, Some(id), expanded, started);
            }
            explored.insert(state.clone());

            for (mv, next) in state.successors() {
                if explored.contains(&next) {
                    continue;
                }
                let cost = g + 1;
                if let Some(queued) = frontier.live_node(&next) {
                    if tree[queued].g <= cost {
                        continue;
                    }
                }
                let next = Rc::new(next);
                let child = tree.push(SearchNode {
                    state: next.clone(),
                    parent: Some(id),
                    g: cost,
                    h: 0,
                    action: Some(mv),
                });
                frontier.push(cost, child, next);
            }
        }

        debug!("{}: {} stale entries skipped", name, frontier.stale_skipped());
        SearchOutcome::finish(&name, &tree, None, expanded, started)
    }
}
