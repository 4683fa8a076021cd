//! Node attribute values
//!
//! Attributes are free-form, but only numbers matter to scoring. A value is
//! either a number, a string that may hold one, or any other JSON value kept
//! verbatim so it survives a report round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl PropertyValue {
    /// Numeric reading of the value; numeric strings parse after trimming
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse().ok(),
            PropertyValue::Other(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// Attribute map attached to a node
pub type PropertyMap = HashMap<String, PropertyValue>;
