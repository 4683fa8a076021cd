//! Betweenness centrality over canonical shortest paths
//!
//! Only one shortest path per ordered pair is counted (the tree's canonical
//! path), not the Brandes sum over all shortest paths.

use super::pathfinding::ShortestPathTree;
use rayon::prelude::*;

/// Betweenness centrality from a precomputed all-pairs table.
///
/// For every ordered pair (s, t), s != t, each interior node of the canonical
/// s -> t path gets one hit. Counts are divided by (n-1)(n-2), the number of
/// ordered pairs that can route through a given node, so values lie in [0, 1].
pub fn betweenness_from_trees(node_count: usize, trees: &[ShortestPathTree]) -> Vec<f64> {
    if node_count < 3 {
        return vec![0.0; node_count];
    }

    let counts = trees
        .par_iter()
        .map(|tree| {
            let mut local = vec![0.0; node_count];
            for target in 0..node_count {
                if target == tree.source || !tree.is_reachable(target) {
                    continue;
                }
                let mut curr = tree.predecessors[target];
                while let Some(idx) = curr {
                    if idx == tree.source {
                        break;
                    }
                    local[idx] += 1.0;
                    curr = tree.predecessors[idx];
                }
            }
            local
        })
        .reduce(
            || vec![0.0; node_count],
            |mut acc, local| {
                for (a, l) in acc.iter_mut().zip(local) {
                    *a += l;
                }
                acc
            },
        );

    let normalizer = ((node_count - 1) * (node_count - 2)) as f64;
    counts.into_iter().map(|c| c / normalizer).collect()
}
