//! Network definition file types.
//!
//! A network file lists nodes in dependency order. Each node names its
//! parents (which must appear earlier in the list) and carries its table:
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "name": "rain",
//!   "nodes": [
//!     { "name": "Chuva", "domain": ["sim", "não"],
//!       "table": { "sim": 0.2, "não": 0.8 } },
//!     { "name": "GramaMolhada", "domain": ["sim", "não"], "parents": ["Chuva"],
//!       "table": [
//!         { "given": ["sim"], "probabilities": { "sim": 0.9, "não": 0.1 } },
//!         { "given": ["não"], "probabilities": { "sim": 0.1, "não": 0.9 } }
//!       ] }
//!   ]
//! }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete network file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkSpec {
    pub schema_version: String,

    /// Short identifier used in logs and output.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Nodes in insertion order. Parents must precede their children.
    pub nodes: Vec<NodeSpec>,
}

/// One random variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NodeSpec {
    pub name: String,

    /// Value labels, in iteration order.
    pub domain: Vec<String>,

    #[serde(default)]
    pub parents: Vec<String>,

    pub table: TableSpec,
}

/// On-disk table: a plain map for root nodes, a list of rows otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TableSpec {
    /// P(node) for a node without parents.
    Marginal(BTreeMap<String, f64>),
    /// P(node | parents), one row per parent-value combination.
    Conditional(Vec<RowSpec>),
}

/// One row of a conditional table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RowSpec {
    /// Parent values, in the node's parent order.
    pub given: Vec<String>,

    /// Distribution over the node's own domain for this parent combination.
    pub probabilities: BTreeMap<String, f64>,
}

impl TableSpec {
    /// Whether this is the root-node shape.
    pub fn is_marginal(&self) -> bool {
        matches!(self, TableSpec::Marginal(_))
    }
}

impl NetworkSpec {
    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Number of parent → child edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.parents.len()).sum()
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// JSON Schema for network files.
pub fn network_json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(NetworkSpec);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}
