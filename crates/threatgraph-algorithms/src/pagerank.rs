//! PageRank algorithm implementation
//!
//! Damped power iteration with max-delta convergence.

use super::common::GraphView;
use rayon::prelude::*;

/// What happens to the rank held by nodes without outgoing edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingPolicy {
    /// Spread dangling rank uniformly over all nodes; scores keep summing to 1
    Redistribute,
    /// Dangling rank leaks out of the system each iteration
    Drop,
}

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Maximum number of iterations
    pub iterations: usize,
    /// Stop once the largest per-node change falls below this
    pub tolerance: f64,
    pub dangling: DanglingPolicy,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 20,
            tolerance: 1e-6,
            dangling: DanglingPolicy::Redistribute,
        }
    }
}

/// Scores by node index plus iteration bookkeeping
#[derive(Debug, Clone)]
pub struct PageRankResult {
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Calculate PageRank for the graph view
pub fn page_rank(view: &GraphView, config: PageRankConfig) -> PageRankResult {
    match page_rank_with_interrupt(view, config, || false) {
        Some(result) => result,
        None => unreachable!("interrupt never fires"),
    }
}

/// Calculate PageRank, checking `interrupt` before every iteration.
///
/// Returns `None` if the interrupt fired before the iteration finished.
pub fn page_rank_with_interrupt<F>(
    view: &GraphView,
    config: PageRankConfig,
    interrupt: F,
) -> Option<PageRankResult>
where
    F: Fn() -> bool,
{
    let n = view.node_count;

    if n == 0 {
        return Some(PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        });
    }

    let n_f = n as f64;
    let d = config.damping_factor;
    let mut scores = vec![1.0 / n_f; n];
    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..config.iterations {
        if interrupt() {
            return None;
        }

        let dangling_mass: f64 = match config.dangling {
            DanglingPolicy::Redistribute => (0..n)
                .filter(|&i| view.out_degree(i) == 0)
                .map(|i| scores[i])
                .sum(),
            DanglingPolicy::Drop => 0.0,
        };
        let base_score = (1.0 - d) / n_f + d * dangling_mass / n_f;

        let next_scores: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|i| {
                let sum_incoming: f64 = view
                    .predecessors(i)
                    .iter()
                    .map(|&source_idx| scores[source_idx] / view.out_degree(source_idx) as f64)
                    .sum();
                base_score + d * sum_incoming
            })
            .collect();

        let max_diff = next_scores
            .iter()
            .zip(&scores)
            .map(|(next, prev)| (next - prev).abs())
            .fold(0.0, f64::max);

        scores = next_scores;
        iterations += 1;

        if max_diff < config.tolerance {
            converged = true;
            break;
        }
    }

    Some(PageRankResult {
        scores,
        iterations,
        converged,
    })
}
