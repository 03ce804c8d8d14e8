//! Planned-operation ingestion record.
//!
//! An [`Operation`] is what the caller hands the rule evaluator; it is not the graph's [`Node`]
//! directly, since the caller's `spec` is opaque to this engine and rules may derive more than one
//! node property from it.

use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One planned operation as handed to the rule evaluator.
///
/// `spec` is opaque to the engine: it is read only by rule closures the caller supplies, never
/// inspected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub name: String,
    pub resource_kind: String,
    pub resource_name: String,
    pub spec: serde_json::Value,
    pub properties: HashMap<String, serde_json::Value>,
    pub metadata: HashMap<String, String>,
}

impl Operation {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        resource_kind: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_kind: resource_kind.into(),
            resource_name: resource_name.into(),
            spec: serde_json::Value::Null,
            properties: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A bare [`Node`] carrying this operation's identity and resource kind; rules enrich it
    /// further (duration, risk, destructive, etc.) before it's added to the graph.
    pub fn to_node(&self) -> crate::error::Result<Node> {
        Node::new(self.id.clone(), self.name.clone(), self.resource_kind.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_node_carries_identity_and_kind() {
        let op = Operation::new("op-1", "Create VPC", "vpc", "prod-vpc");
        let node = op.to_node().unwrap();
        assert_eq!(node.id, "op-1");
        assert_eq!(node.resource_kind, "vpc");
    }
}
