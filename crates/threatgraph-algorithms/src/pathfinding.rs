//! Pathfinding algorithms
//!
//! Single-source Dijkstra producing a full shortest-path tree, plus the
//! all-pairs table built from one tree per source.

use super::common::{GraphView, NodeIndex};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Distances and predecessors from one source to every node.
///
/// Unreachable nodes have distance `f64::INFINITY` and no predecessor.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    pub source: NodeIndex,
    pub distances: Vec<f64>,
    pub predecessors: Vec<Option<NodeIndex>>,
}

impl ShortestPathTree {
    pub fn distance(&self, target: NodeIndex) -> f64 {
        self.distances[target]
    }

    pub fn is_reachable(&self, target: NodeIndex) -> bool {
        self.distances[target].is_finite()
    }

    /// Walk predecessors from `target` back to the source.
    ///
    /// Returns an empty path when the walk does not end at the source; a
    /// partial path is never returned.
    pub fn path_to(&self, target: NodeIndex) -> Vec<NodeIndex> {
        let mut path = Vec::new();
        let mut curr = Some(target);
        while let Some(idx) = curr {
            path.push(idx);
            if path.len() > self.distances.len() {
                return Vec::new();
            }
            curr = self.predecessors[idx];
        }
        path.reverse();

        if path.first() == Some(&self.source) {
            path
        } else {
            Vec::new()
        }
    }
}

/// State for Dijkstra priority queue
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    /// Insertion sequence, breaks distance ties first-in-first-out
    seq: u64,
    node_idx: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare costs reversed for min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra's Algorithm (Weighted Shortest Path Tree)
///
/// Uses edge weights from GraphView if available, otherwise assumes 1.0.
/// Edges whose weight is not strictly positive are skipped during relaxation.
/// Among equal-cost paths the canonical one is the first discovered: the heap
/// pops equal distances in insertion order and relaxation only accepts a
/// strictly shorter distance.
pub fn dijkstra_tree(view: &GraphView, source: NodeIndex) -> ShortestPathTree {
    let n = view.node_count;
    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors = vec![None; n];

    if source >= n {
        return ShortestPathTree { source, distances, predecessors };
    }

    let mut visited = vec![false; n];
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    distances[source] = 0.0;
    heap.push(State { cost: 0.0, seq, node_idx: source });
    seq += 1;

    while let Some(State { cost, node_idx, .. }) = heap.pop() {
        if visited[node_idx] {
            continue;
        }
        visited[node_idx] = true;

        for (i, &next_idx) in view.successors(node_idx).iter().enumerate() {
            let weight = view.edge_weight(node_idx, i);
            if weight.is_nan() || weight <= 0.0 {
                continue;
            }

            let next_cost = cost + weight;
            if next_cost < distances[next_idx] {
                distances[next_idx] = next_cost;
                predecessors[next_idx] = Some(node_idx);
                heap.push(State { cost: next_cost, seq, node_idx: next_idx });
                seq += 1;
            }
        }
    }

    ShortestPathTree { source, distances, predecessors }
}

/// One shortest-path tree per node, indexed by source.
///
/// Sources are independent and run in parallel.
pub fn all_pairs_shortest_paths(view: &GraphView) -> Vec<ShortestPathTree> {
    (0..view.node_count)
        .into_par_iter()
        .map(|source| dijkstra_tree(view, source))
        .collect()
}

/// Like [`all_pairs_shortest_paths`], but checks `interrupt` before each
/// source and returns `None` as soon as it reports true.
pub fn all_pairs_with_interrupt<F>(view: &GraphView, interrupt: F) -> Option<Vec<ShortestPathTree>>
where
    F: Fn() -> bool + Sync,
{
    (0..view.node_count)
        .into_par_iter()
        .map(|source| {
            if interrupt() {
                None
            } else {
                Some(dijkstra_tree(view, source))
            }
        })
        .collect()
}
