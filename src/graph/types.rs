//! Core type definitions for the event graph

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Semantic role of a node in the event graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    User,
    Server,
    Service,
    Endpoint,
    Database,
    Network,
    Alert,
    Attacker,
    Attack,
    Resource,
    Unknown,
}

impl NodeType {
    pub const ALL: [NodeType; 11] = [
        NodeType::User,
        NodeType::Server,
        NodeType::Service,
        NodeType::Endpoint,
        NodeType::Database,
        NodeType::Network,
        NodeType::Alert,
        NodeType::Attacker,
        NodeType::Attack,
        NodeType::Resource,
        NodeType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::User => "USER",
            NodeType::Server => "SERVER",
            NodeType::Service => "SERVICE",
            NodeType::Endpoint => "ENDPOINT",
            NodeType::Database => "DATABASE",
            NodeType::Network => "NETWORK",
            NodeType::Alert => "ALERT",
            NodeType::Attacker => "ATTACKER",
            NodeType::Attack => "ATTACK",
            NodeType::Resource => "RESOURCE",
            NodeType::Unknown => "UNKNOWN",
        }
    }

    /// ATTACK or ATTACKER
    pub fn is_hostile(&self) -> bool {
        matches!(self, NodeType::Attack | NodeType::Attacker)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a type name is not one of the known node types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeType(pub String);

impl fmt::Display for UnknownNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node type '{}'", self.0)
    }
}

impl std::error::Error for UnknownNodeType {}

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownNodeType(s.to_string()))
    }
}

/// Identifier patterns, tested in order. ATTACKER precedes ATTACK because
/// every "attacker" id also contains "attack".
const CLASSIFICATION_PATTERNS: [(NodeType, &str); 10] = [
    (NodeType::User, r"^(user|client|account|person)"),
    (NodeType::Server, r"^(server|host|machine|vm|instance)"),
    (NodeType::Service, r"^(service|api|microservice|app)"),
    (NodeType::Endpoint, r"^(/|endpoint|route|url)"),
    (NodeType::Database, r"(db|database|mongo|sql|redis)"),
    (NodeType::Network, r"(router|switch|gateway|firewall|balancer)"),
    (NodeType::Alert, r"(alert|warning|notification|alarm)"),
    (NodeType::Attacker, r"(attacker|hacker|threat|malicious)"),
    (NodeType::Attack, r"(attack|malware|breach|exploit|intrusion)"),
    (NodeType::Resource, r"(resource|file|storage|bucket|volume)"),
];

fn classification_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSetBuilder::new(CLASSIFICATION_PATTERNS.iter().map(|(_, p)| *p))
            .case_insensitive(true)
            .build()
            .expect("classification patterns are valid regexes")
    })
}

/// Classify a node by its identifier.
///
/// Pure and total: the first matching pattern wins, anything else is
/// `Unknown`.
pub fn classify_node_type(id: &str) -> NodeType {
    classification_set()
        .matches(id)
        .iter()
        .next()
        .map(|i| CLASSIFICATION_PATTERNS[i].0)
        .unwrap_or(NodeType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_prefixes() {
        assert_eq!(classify_node_type("user1"), NodeType::User);
        assert_eq!(classify_node_type("Client-42"), NodeType::User);
        assert_eq!(classify_node_type("server1"), NodeType::Server);
        assert_eq!(classify_node_type("vm-07"), NodeType::Server);
        assert_eq!(classify_node_type("service1"), NodeType::Service);
        assert_eq!(classify_node_type("api-gateway"), NodeType::Service);
        assert_eq!(classify_node_type("/login"), NodeType::Endpoint);
    }

    #[test]
    fn test_classification_contains() {
        assert_eq!(classify_node_type("orders-db"), NodeType::Database);
        assert_eq!(classify_node_type("cache-REDIS"), NodeType::Database);
        assert_eq!(classify_node_type("edge-firewall"), NodeType::Network);
        assert_eq!(classify_node_type("cpu-alert"), NodeType::Alert);
        assert_eq!(classify_node_type("attacker1"), NodeType::Attacker);
        assert_eq!(classify_node_type("sql-injection-attack"), NodeType::Database);
        assert_eq!(classify_node_type("malware-x"), NodeType::Attack);
        assert_eq!(classify_node_type("s3-bucket"), NodeType::Resource);
        assert_eq!(classify_node_type("10.0.0.4"), NodeType::Unknown);
        assert_eq!(classify_node_type(""), NodeType::Unknown);
    }

    #[test]
    fn test_first_match_wins() {
        // Prefix rule for SERVICE fires before the DATABASE substring rule
        assert_eq!(classify_node_type("app-db"), NodeType::Service);
        // ATTACKER is tested before ATTACK
        assert_eq!(classify_node_type("known-attacker"), NodeType::Attacker);
        assert_eq!(classify_node_type("attack-7"), NodeType::Attack);
    }

    #[test]
    fn test_classification_is_pure() {
        for id in ["user1", "mystery", "hacker-9", "/api/v1"] {
            let first = classify_node_type(id);
            for _ in 0..5 {
                assert_eq!(classify_node_type(id), first);
            }
        }
    }

    #[test]
    fn test_node_type_parse_and_display() {
        assert_eq!("attacker".parse::<NodeType>(), Ok(NodeType::Attacker));
        assert_eq!(" SERVICE ".parse::<NodeType>(), Ok(NodeType::Service));
        assert!("firewall".parse::<NodeType>().is_err());
        assert_eq!(format!("{}", NodeType::Database), "DATABASE");
        assert_eq!(serde_json::to_string(&NodeType::Alert).unwrap(), "\"ALERT\"");
    }
}
