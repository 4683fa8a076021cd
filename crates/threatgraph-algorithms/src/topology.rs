//! Graph topology analysis algorithms
//!
//! Local clustering coefficient, density and average path length.

use super::common::GraphView;
use super::pathfinding::ShortestPathTree;
use rayon::prelude::*;

/// Local clustering coefficient per node.
///
/// Neighbourhood = out-neighbours, self-loops excluded. A neighbour pair counts
/// as connected when an edge exists in either direction. Nodes with fewer than
/// two neighbours get 0.
pub fn clustering_coefficient(view: &GraphView) -> Vec<f64> {
    (0..view.node_count)
        .into_par_iter()
        .map(|u| {
            let neighbors: Vec<usize> = view
                .successors(u)
                .iter()
                .copied()
                .filter(|&v| v != u)
                .collect();

            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }

            let mut links = 0usize;
            for i in 0..k {
                for j in (i + 1)..k {
                    let (a, b) = (neighbors[i], neighbors[j]);
                    if view.has_edge(a, b) || view.has_edge(b, a) {
                        links += 1;
                    }
                }
            }

            let possible = (k * (k - 1) / 2) as f64;
            links as f64 / possible
        })
        .collect()
}

/// 2|E| / (n(n-1)), zero for fewer than two nodes
pub fn graph_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let n = node_count as f64;
    (2.0 * edge_count as f64) / (n * (n - 1.0))
}

/// Mean of all finite, strictly positive pairwise distances.
///
/// Self-pairs (distance 0) and unreachable pairs are excluded; returns 0 when
/// nothing qualifies.
pub fn average_path_length(trees: &[ShortestPathTree]) -> f64 {
    let (total, count) = trees
        .iter()
        .flat_map(|tree| tree.distances.iter())
        .filter(|d| d.is_finite() && **d > 0.0)
        .fold((0.0, 0usize), |(total, count), d| (total + d, count + 1));

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
