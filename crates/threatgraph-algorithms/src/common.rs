//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the graph topology for algorithm execution.

use ndarray::Array2;

/// Dense node index (0..N). Callers own the mapping back to their identifiers.
pub type NodeIndex = usize;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,

    /// Edge weights: aligned with `out_targets`
    pub weights: Option<Vec<f64>>,
}

impl GraphView {
    /// Build a view from a dense adjacency matrix.
    ///
    /// Only strictly positive entries are edges; zero, negative and NaN cells
    /// are treated as absent. Neighbour lists come out in ascending index order,
    /// which the pathfinding tie-break relies on.
    pub fn from_dense(matrix: &Array2<f64>) -> Self {
        let (rows, cols) = matrix.dim();
        let node_count = rows.min(cols);

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut weights = Vec::new();

        out_offsets.push(0);
        for u in 0..node_count {
            for v in 0..node_count {
                let w = matrix[[u, v]];
                if w > 0.0 {
                    out_targets.push(v);
                    weights.push(w);
                }
            }
            out_offsets.push(out_targets.len());
        }

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();

        in_offsets.push(0);
        for v in 0..node_count {
            for u in 0..node_count {
                if matrix[[u, v]] > 0.0 {
                    in_sources.push(u);
                }
            }
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            weights: Some(weights),
        }
    }

    /// Helper to create GraphView from adjacency lists (test support)
    pub fn from_adjacency_list(
        outgoing: Vec<Vec<usize>>,
        weights: Option<Vec<Vec<f64>>>,
    ) -> Self {
        let node_count = outgoing.len();
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (u, targets) in outgoing.iter().enumerate() {
            for &v in targets {
                incoming[v].push(u);
            }
        }

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();
        let mut flat_weights = if weights.is_some() { Some(Vec::new()) } else { None };

        out_offsets.push(0);
        for (i, neighbors) in outgoing.into_iter().enumerate() {
            out_targets.extend(neighbors);
            out_offsets.push(out_targets.len());

            if let Some(ref mut w_flat) = flat_weights {
                if let Some(w_row) = weights.as_ref().map(|w| &w[i]) {
                    w_flat.extend(w_row.iter());
                }
            }
        }

        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            weights: flat_weights,
        }
    }

    /// Total number of edges in the view
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Get weights for outgoing edges of a node
    pub fn weights(&self, idx: usize) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| {
            let start = self.out_offsets[idx];
            let end = self.out_offsets[idx + 1];
            &w[start..end]
        })
    }

    /// Weight of the `i`-th outgoing edge of `idx`, 1.0 for unweighted views
    pub fn edge_weight(&self, idx: usize, i: usize) -> f64 {
        self.weights(idx).map(|w| w[i]).unwrap_or(1.0)
    }

    /// Whether a directed edge `u -> v` exists
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.successors(u).contains(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_view_from_dense_skips_non_positive_cells() {
        let matrix = array![
            [0.0, 2.0, -1.0],
            [0.0, 0.0, 5.0],
            [1.0, 0.0, 0.0],
        ];
        let view = GraphView::from_dense(&matrix);

        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 3);
        assert_eq!(view.successors(0), &[1]);
        assert_eq!(view.weights(1), Some(&[5.0][..]));
        assert_eq!(view.predecessors(0), &[2]);
        assert!(!view.has_edge(0, 2));
        assert!(view.has_edge(2, 0));
    }

    #[test]
    fn test_view_from_adjacency_list() {
        // 0 -> 1 -> 2, 0 -> 2
        let view = GraphView::from_adjacency_list(vec![vec![1, 2], vec![2], vec![]], None);

        assert_eq!(view.out_degree(0), 2);
        assert_eq!(view.in_degree(2), 2);
        assert_eq!(view.predecessors(2), &[0, 1]);
        assert_eq!(view.edge_weight(0, 1), 1.0);
    }
}
