//! Per-node feature records
//!
//! One record per node, created when the model is built and then filled in
//! place by each analysis stage. Records are never replaced.

use super::types::NodeType;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

/// Metrics accumulated for a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub criticality: f64,
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_degree: usize,
    pub page_rank: f64,
    pub betweenness_centrality: f64,
    pub clustering_coefficient: f64,
    pub anomaly_score: f64,
    pub reasons: Vec<String>,
    pub dread_score: f64,
}

impl FeatureRecord {
    pub fn new(id: impl Into<String>, node_type: NodeType, criticality: f64) -> Self {
        FeatureRecord {
            id: id.into(),
            node_type,
            criticality,
            in_degree: 0,
            out_degree: 0,
            total_degree: 0,
            page_rank: 0.0,
            betweenness_centrality: 0.0,
            clustering_coefficient: 0.0,
            anomaly_score: 0.0,
            reasons: Vec::new(),
            dread_score: 0.0,
        }
    }
}

/// Feature records for one analysis run, in node index order.
///
/// Owned by the run that created it; stages receive it by reference.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    records: IndexMap<String, FeatureRecord, FxBuildHasher>,
}

impl FeatureStore {
    pub fn with_capacity(capacity: usize) -> Self {
        FeatureStore {
            records: IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Append a record and return its index
    pub(crate) fn push(&mut self, record: FeatureRecord) -> usize {
        let (idx, _) = self.records.insert_full(record.id.clone(), record);
        idx
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FeatureRecord> {
        self.records.get(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.records.get_index_of(id)
    }

    pub fn by_index(&self, idx: usize) -> Option<&FeatureRecord> {
        self.records.get_index(idx).map(|(_, r)| r)
    }

    pub fn by_index_mut(&mut self, idx: usize) -> Option<&mut FeatureRecord> {
        self.records.get_index_mut(idx).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FeatureRecord> {
        self.records.values_mut()
    }

    /// Write one value per node, in index order
    pub fn assign<F>(&mut self, values: &[f64], mut apply: F)
    where
        F: FnMut(&mut FeatureRecord, f64),
    {
        for (record, &value) in self.records.values_mut().zip(values) {
            apply(record, value);
        }
    }

    /// Snapshot for the report
    pub fn to_map(&self) -> IndexMap<String, FeatureRecord> {
        self.records
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keeps_insertion_order() {
        let mut store = FeatureStore::with_capacity(3);
        store.push(FeatureRecord::new("b", NodeType::User, 5.0));
        store.push(FeatureRecord::new("a", NodeType::Server, 5.0));

        assert_eq!(store.index_of("b"), Some(0));
        assert_eq!(store.by_index(1).map(|r| r.id.as_str()), Some("a"));

        store.assign(&[0.25, 0.75], |r, v| r.page_rank = v);
        assert_eq!(store.get("a").unwrap().page_rank, 0.75);

        let ids: Vec<_> = store.to_map().keys().cloned().collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = FeatureRecord::new("svc", NodeType::Service, 4.0);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "SERVICE");
        assert_eq!(json["inDegree"], 0);
        assert!(json.get("betweennessCentrality").is_some());
    }
}
