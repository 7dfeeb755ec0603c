//! Network model: nodes, domains, parent relations, and probability tables.
//!
//! Nodes are added in dependency order. A parent must already exist when a
//! child names it, so the graph is acyclic by construction and insertion
//! order is a topological order. That order is the canonical enumeration
//! order used by the joint evaluator and the inference engine.
//!
//! Tables are attached separately with [`Network::set_cpt`] and are not
//! checked on insert. Gaps surface at evaluation time as
//! [`InferenceError::MissingTableEntry`](crate::inference::InferenceError),
//! or all at once through [`Network::validate`].

use std::collections::{BTreeMap, HashMap, HashSet};

use bn_math::{is_probability, RowSum, PROBABILITY_TOLERANCE};
use serde::Serialize;
use thiserror::Error;

use crate::inference::combinations::combinations;
use crate::inference::ErrorKind;

/// Node name → value. Full when it covers every node, partial otherwise.
pub type Assignment = BTreeMap<String, String>;

/// Distribution over one node's domain: value → probability.
pub type Distribution = BTreeMap<String, f64>;

/// A discrete random variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    /// Value labels in iteration order.
    pub domain: Vec<String>,
    /// Parent names in the order their values key the table.
    pub parents: Vec<String>,
    /// Nodes that declared this one as a parent, in insertion order.
    pub children: Vec<String>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.domain.iter().any(|v| v == value)
    }
}

/// Conditional probability table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cpt {
    /// P(node) for a root.
    Unconditional(Distribution),
    /// P(node | parents), keyed by parent values in parent order.
    Conditional(BTreeMap<Vec<String>, Distribution>),
}

impl Cpt {
    /// Build a root table from `(value, probability)` pairs.
    pub fn unconditional<K: Into<String>>(probs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Cpt::Unconditional(probs.into_iter().map(|(k, p)| (k.into(), p)).collect())
    }

    /// Build a conditional table from `(parent values, distribution)` rows.
    pub fn conditional<G, K, P>(rows: impl IntoIterator<Item = (Vec<G>, P)>) -> Self
    where
        G: Into<String>,
        K: Into<String>,
        P: IntoIterator<Item = (K, f64)>,
    {
        Cpt::Conditional(
            rows.into_iter()
                .map(|(given, probs)| {
                    (
                        given.into_iter().map(Into::into).collect(),
                        probs.into_iter().map(|(k, p)| (k.into(), p)).collect(),
                    )
                })
                .collect(),
        )
    }

    /// P(value | parent_values), or `None` when the row or cell is absent.
    ///
    /// Unconditional tables ignore `parent_values`.
    pub fn probability_of(&self, value: &str, parent_values: &[String]) -> Option<f64> {
        match self {
            Cpt::Unconditional(dist) => dist.get(value).copied(),
            Cpt::Conditional(rows) => rows.get(parent_values)?.get(value).copied(),
        }
    }

    /// Number of rows (1 for an unconditional table).
    pub fn row_count(&self) -> usize {
        match self {
            Cpt::Unconditional(_) => 1,
            Cpt::Conditional(rows) => rows.len(),
        }
    }

    /// Iterate rows as `(parent values, distribution)`; the single row of an
    /// unconditional table has no parent values.
    pub fn rows(&self) -> Box<dyn Iterator<Item = (&[String], &Distribution)> + '_> {
        match self {
            Cpt::Unconditional(dist) => Box::new(std::iter::once((&[][..], dist))),
            Cpt::Conditional(rows) => Box::new(rows.iter().map(|(k, d)| (k.as_slice(), d))),
        }
    }
}

/// Structural errors and table validation findings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),

    #[error("node '{0}' has an empty domain")]
    EmptyDomain(String),

    #[error("node '{node}' lists value '{value}' more than once")]
    DuplicateValue { node: String, value: String },

    #[error("node '{node}' names parent '{parent}', which has not been added")]
    UnknownParent { node: String, parent: String },

    #[error("node '{node}' lists parent '{parent}' more than once")]
    DuplicateParent { node: String, parent: String },

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("node '{0}' has no probability table")]
    TableNotSet(String),

    #[error("table for '{node}' does not fit the node: {message}")]
    TableShapeMismatch { node: String, message: String },

    #[error("table for '{node}' row {row:?} sums to {sum}, expected 1")]
    RowNotNormalized {
        node: String,
        row: Vec<String>,
        sum: f64,
    },

    #[error("table for '{node}' has no row for parent values {row:?}")]
    MissingRow { node: String, row: Vec<String> },

    #[error("table for '{node}' row {row:?} has no entry for '{value}'")]
    MissingCell {
        node: String,
        row: Vec<String>,
        value: String,
    },

    #[error("table for '{node}' row {row:?} gives '{value}' probability {probability}, outside [0, 1]")]
    ProbabilityOutOfRange {
        node: String,
        row: Vec<String>,
        value: String,
        probability: f64,
    },
}

impl NetworkError {
    /// Error kind shared with the inference errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetworkError::TableNotSet(_)
            | NetworkError::MissingRow { .. }
            | NetworkError::MissingCell { .. } => ErrorKind::MissingTableEntry,
            _ => ErrorKind::Structural,
        }
    }

    /// Whether the finding is about a table rather than the graph.
    pub fn is_table_error(&self) -> bool {
        matches!(
            self,
            NetworkError::TableNotSet(_)
                | NetworkError::TableShapeMismatch { .. }
                | NetworkError::RowNotNormalized { .. }
                | NetworkError::MissingRow { .. }
                | NetworkError::MissingCell { .. }
                | NetworkError::ProbabilityOutOfRange { .. }
        )
    }
}

impl From<NetworkError> for bn_common::Error {
    fn from(err: NetworkError) -> Self {
        if err.is_table_error() {
            bn_common::Error::IncompleteTable(err.to_string())
        } else {
            bn_common::Error::Structural(err.to_string())
        }
    }
}

/// A directed acyclic graph of discrete variables with their tables.
///
/// Mutators take `&mut self`; once built, a `&Network` can be shared across
/// threads for concurrent inference.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: HashMap<String, Node>,
    cpts: HashMap<String, Cpt>,
    order: Vec<String>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node whose parents are all already present.
    ///
    /// Registers the new node as a child of each parent.
    pub fn add_node<N, V, P>(
        &mut self,
        name: N,
        domain: impl IntoIterator<Item = V>,
        parents: impl IntoIterator<Item = P>,
    ) -> Result<(), NetworkError>
    where
        N: Into<String>,
        V: Into<String>,
        P: Into<String>,
    {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(NetworkError::DuplicateNode(name));
        }

        let domain: Vec<String> = domain.into_iter().map(Into::into).collect();
        if domain.is_empty() {
            return Err(NetworkError::EmptyDomain(name));
        }
        let mut seen = HashSet::with_capacity(domain.len());
        for value in &domain {
            if !seen.insert(value.as_str()) {
                return Err(NetworkError::DuplicateValue {
                    node: name,
                    value: value.clone(),
                });
            }
        }

        let parents: Vec<String> = parents.into_iter().map(Into::into).collect();
        if let Some(missing) = parents.iter().find(|p| !self.nodes.contains_key(*p)) {
            return Err(NetworkError::UnknownParent {
                node: name,
                parent: missing.clone(),
            });
        }
        let mut seen = HashSet::with_capacity(parents.len());
        if let Some(repeated) = parents.iter().find(|p| !seen.insert(p.as_str())) {
            return Err(NetworkError::DuplicateParent {
                node: name,
                parent: repeated.clone(),
            });
        }

        for parent in &parents {
            if let Some(p) = self.nodes.get_mut(parent) {
                if !p.children.contains(&name) {
                    p.children.push(name.clone());
                }
            }
        }

        self.order.push(name.clone());
        self.nodes.insert(
            name.clone(),
            Node {
                name,
                domain,
                parents,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Attach (or replace) the table for an existing node.
    pub fn set_cpt(&mut self, name: &str, table: Cpt) -> Result<(), NetworkError> {
        if !self.nodes.contains_key(name) {
            return Err(NetworkError::UnknownNode(name.to_string()));
        }
        self.cpts.insert(name.to_string(), table);
        Ok(())
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn domain(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(|n| n.domain.as_slice())
    }

    pub fn parents(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(|n| n.parents.as_slice())
    }

    pub fn children(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(|n| n.children.as_slice())
    }

    pub fn cpt(&self, name: &str) -> Option<&Cpt> {
        self.cpts.get(name)
    }

    /// Node names in insertion order (a topological order).
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|n| self.nodes.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Parent → child pairs, grouped by child in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.nodes()
            .flat_map(|n| n.parents.iter().map(move |p| (p.as_str(), n.name.as_str())))
            .collect()
    }

    /// Check every table against its node with the in-memory tolerance.
    pub fn validate(&self) -> Result<(), NetworkError> {
        self.validate_with_tolerance(PROBABILITY_TOLERANCE)
    }

    /// Check every table: set, shaped for the node, one row per parent
    /// combination, one cell per domain value, each cell in [0, 1], and
    /// each row summing to 1 within `tol`.
    ///
    /// Returns the first problem found, visiting nodes in insertion order.
    pub fn validate_with_tolerance(&self, tol: f64) -> Result<(), NetworkError> {
        for node in self.nodes() {
            let cpt = self
                .cpts
                .get(&node.name)
                .ok_or_else(|| NetworkError::TableNotSet(node.name.clone()))?;
            self.validate_table(node, cpt, tol)?;
        }
        Ok(())
    }

    fn validate_table(&self, node: &Node, cpt: &Cpt, tol: f64) -> Result<(), NetworkError> {
        match cpt {
            Cpt::Unconditional(dist) => {
                if !node.is_root() {
                    return Err(NetworkError::TableShapeMismatch {
                        node: node.name.clone(),
                        message: format!(
                            "node has parents {:?} but the table is unconditional",
                            node.parents
                        ),
                    });
                }
                validate_row(node, &[], dist, tol)
            }
            Cpt::Conditional(rows) => {
                for key in rows.keys() {
                    self.check_row_key(node, key)?;
                }
                let parent_combos = combinations(self, &node.parents)
                    .map_err(|e| NetworkError::UnknownNode(e.to_string()))?;
                for combo in parent_combos {
                    let key: Vec<String> = node
                        .parents
                        .iter()
                        .filter_map(|p| combo.get(p).cloned())
                        .collect();
                    let dist = rows.get(&key).ok_or_else(|| NetworkError::MissingRow {
                        node: node.name.clone(),
                        row: key.clone(),
                    })?;
                    validate_row(node, &key, dist, tol)?;
                }
                Ok(())
            }
        }
    }

    fn check_row_key(&self, node: &Node, key: &[String]) -> Result<(), NetworkError> {
        if key.len() != node.parents.len() {
            return Err(NetworkError::TableShapeMismatch {
                node: node.name.clone(),
                message: format!(
                    "row {:?} has {} values but the node has {} parents",
                    key,
                    key.len(),
                    node.parents.len()
                ),
            });
        }
        for (value, parent) in key.iter().zip(&node.parents) {
            let known = self.nodes.get(parent).is_some_and(|p| p.has_value(value));
            if !known {
                return Err(NetworkError::TableShapeMismatch {
                    node: node.name.clone(),
                    message: format!(
                        "row {:?} uses '{}', not a value of parent '{}'",
                        key, value, parent
                    ),
                });
            }
        }
        Ok(())
    }
}

fn validate_row(
    node: &Node,
    key: &[String],
    dist: &Distribution,
    tol: f64,
) -> Result<(), NetworkError> {
    if let Some(extra) = dist.keys().find(|v| !node.has_value(v)) {
        return Err(NetworkError::TableShapeMismatch {
            node: node.name.clone(),
            message: format!("row {:?} has an entry for unknown value '{}'", key, extra),
        });
    }
    let mut values = Vec::with_capacity(node.domain.len());
    for value in &node.domain {
        let p = dist
            .get(value)
            .copied()
            .ok_or_else(|| NetworkError::MissingCell {
                node: node.name.clone(),
                row: key.to_vec(),
                value: value.clone(),
            })?;
        if !is_probability(p) {
            return Err(NetworkError::ProbabilityOutOfRange {
                node: node.name.clone(),
                row: key.to_vec(),
                value: value.clone(),
                probability: p,
            });
        }
        values.push(p);
    }
    let sum = RowSum::of(&values);
    if !sum.is_normalized(tol) {
        return Err(NetworkError::RowNotNormalized {
            node: node.name.clone(),
            row: key.to_vec(),
            sum: sum.sum,
        });
    }
    Ok(())
}
