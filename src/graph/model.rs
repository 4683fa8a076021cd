//! Normalized graph model for one analysis run
//!
//! Resolves the closed id set (explicit nodes plus every edge endpoint),
//! assigns each id a dense index and a semantic type, and builds the dense
//! adjacency matrix that every algorithm stage reads.

use super::features::{FeatureRecord, FeatureStore};
use super::input::{EdgeInput, NodeInput, DEFAULT_CRITICALITY};
use super::property::PropertyMap;
use super::types::{classify_node_type, NodeType};
use indexmap::IndexSet;
use ndarray::Array2;
use rustc_hash::FxBuildHasher;

/// A node after id resolution and classification
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub id: String,
    pub node_type: NodeType,
    pub criticality: f64,
    pub attributes: PropertyMap,
    /// False for nodes materialized only because an edge referenced them
    pub explicit: bool,
}

impl ResolvedNode {
    fn from_input(input: &NodeInput) -> Self {
        let node_type = input
            .node_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_else(|| classify_node_type(&input.id));

        ResolvedNode {
            id: input.id.clone(),
            node_type,
            criticality: input.criticality.unwrap_or(DEFAULT_CRITICALITY),
            attributes: input.attributes.clone(),
            explicit: true,
        }
    }

    fn implicit(id: &str) -> Self {
        ResolvedNode {
            id: id.to_string(),
            node_type: classify_node_type(id),
            criticality: DEFAULT_CRITICALITY,
            attributes: PropertyMap::new(),
            explicit: false,
        }
    }
}

/// Immutable graph snapshot: ids, node metadata, edges and adjacency matrix
#[derive(Debug, Clone)]
pub struct GraphModel {
    ids: IndexSet<String, FxBuildHasher>,
    nodes: Vec<ResolvedNode>,
    edges: Vec<EdgeInput>,
    /// `(source_idx, target_idx)` per edge, aligned with `edges`
    endpoints: Vec<(usize, usize)>,
    adjacency: Array2<f64>,
}

impl GraphModel {
    /// Build the model.
    ///
    /// Id order: explicit nodes in input order, then unseen edge endpoints in
    /// edge order (source before target). When an id is listed twice, the
    /// first listing defines it. Parallel edges collapse in the adjacency
    /// matrix to the last-seen weight; they are not summed.
    pub fn build(nodes: &[NodeInput], edges: &[EdgeInput]) -> Self {
        let mut ids: IndexSet<String, FxBuildHasher> =
            IndexSet::with_capacity_and_hasher(nodes.len(), FxBuildHasher);
        let mut resolved = Vec::with_capacity(nodes.len());

        for node in nodes {
            if ids.insert(node.id.clone()) {
                resolved.push(ResolvedNode::from_input(node));
            }
        }

        let mut endpoints = Vec::with_capacity(edges.len());
        for edge in edges {
            let (s, inserted) = ids.insert_full(edge.source.clone());
            if inserted {
                resolved.push(ResolvedNode::implicit(&edge.source));
            }
            let (t, inserted) = ids.insert_full(edge.target.clone());
            if inserted {
                resolved.push(ResolvedNode::implicit(&edge.target));
            }
            endpoints.push((s, t));
        }

        let n = ids.len();
        let mut adjacency = Array2::zeros((n, n));
        for (edge, &(s, t)) in edges.iter().zip(&endpoints) {
            adjacency[[s, t]] = edge.weight_or_default();
        }

        GraphModel {
            ids,
            nodes: resolved,
            edges: edges.to_vec(),
            endpoints,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Raw edge count, parallel edges included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    pub fn id(&self, idx: usize) -> &str {
        &self.nodes[idx].id
    }

    pub fn node(&self, idx: usize) -> &ResolvedNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[ResolvedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeInput] {
        &self.edges
    }

    /// Edges paired with their resolved endpoint indices
    pub fn indexed_edges(&self) -> impl Iterator<Item = (&EdgeInput, usize, usize)> {
        self.edges
            .iter()
            .zip(&self.endpoints)
            .map(|(edge, &(s, t))| (edge, s, t))
    }

    /// Edges that touch `idx` as source or target (a self-loop once)
    pub fn incident_edges(&self, idx: usize) -> impl Iterator<Item = &EdgeInput> {
        self.indexed_edges()
            .filter(move |&(_, s, t)| s == idx || t == idx)
            .map(|(edge, _, _)| edge)
    }

    pub fn adjacency(&self) -> &Array2<f64> {
        &self.adjacency
    }

    /// Matrix weight for `u -> v`; 0 when absent
    pub fn weight(&self, u: usize, v: usize) -> f64 {
        self.adjacency[[u, v]]
    }

    /// Fresh feature records with degree counters from one pass over the edges
    pub fn init_features(&self) -> FeatureStore {
        let mut store = FeatureStore::with_capacity(self.node_count());
        for node in &self.nodes {
            store.push(FeatureRecord::new(node.id.clone(), node.node_type, node.criticality));
        }

        for &(s, t) in &self.endpoints {
            if let Some(record) = store.by_index_mut(s) {
                record.out_degree += 1;
            }
            if let Some(record) = store.by_index_mut(t) {
                record.in_degree += 1;
            }
        }

        for record in store.iter_mut() {
            record.total_degree = record.in_degree + record.out_degree;
        }

        store
    }
}
