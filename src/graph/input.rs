//! Raw node and edge records as handed over by callers
//!
//! These mirror the loose JSON shape produced by log extraction: ids may be
//! strings or numbers, every other field is optional.

use super::property::{PropertyMap, PropertyValue};
use serde::{Deserialize, Deserializer, Serialize};

/// Default criticality for nodes that don't declare one
pub const DEFAULT_CRITICALITY: f64 = 5.0;

/// Default weight for edges that don't declare one
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Integer(i) => i.to_string(),
        RawId::Float(f) => f.to_string(),
    })
}

/// A node as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Explicit type name; classified from the id when absent or unrecognised
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<f64>,

    /// Domain attributes (DREAD factors and anything else)
    #[serde(flatten)]
    pub attributes: PropertyMap,
}

impl NodeInput {
    pub fn new(id: impl Into<String>) -> Self {
        NodeInput {
            id: id.into(),
            node_type: None,
            criticality: None,
            attributes: PropertyMap::new(),
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_criticality(mut self, criticality: f64) -> Self {
        self.criticality = Some(criticality);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// An observed interaction `source -> target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    #[serde(deserialize_with = "deserialize_id")]
    pub source: String,

    #[serde(deserialize_with = "deserialize_id")]
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Free-form tag such as `HTTP_500`, `HTTP_200` or `RETRY`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

impl EdgeInput {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        EdgeInput {
            source: source.into(),
            target: target.into(),
            weight: None,
            edge_type: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = Some(edge_type.into());
        self
    }

    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_EDGE_WEIGHT)
    }

    fn tag_contains(&self, needle: &str) -> bool {
        self.edge_type
            .as_deref()
            .map(|t| t.to_ascii_lowercase().contains(needle))
            .unwrap_or(false)
    }

    /// Tag marks a server-side error response ("500" / "5xx")
    pub fn is_error(&self) -> bool {
        self.tag_contains("500") || self.tag_contains("5xx")
    }

    /// Tag marks a successful response ("200")
    pub fn is_success(&self) -> bool {
        self.tag_contains("200")
    }

    /// Tag marks a retried call
    pub fn is_retry(&self) -> bool {
        self.tag_contains("retry")
    }
}

/// A complete graph snapshot: the request body for one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
}

impl GraphInput {
    pub fn new(nodes: Vec<NodeInput>, edges: Vec<EdgeInput>) -> Self {
        GraphInput { nodes, edges }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}
