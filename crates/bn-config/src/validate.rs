//! Network file validation errors and semantic validation.
//!
//! These checks run on the file-level types before any network is built,
//! so error messages can point at node names and row positions as written.
//! Coverage of every parent combination is left to the network builder.

use std::collections::{BTreeMap, HashSet};

use bn_math::{is_probability, RowSum, FILE_PROBABILITY_TOLERANCE};
use thiserror::Error;

use crate::network::{NetworkSpec, NodeSpec, TableSpec};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Network file validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a network file semantically.
pub fn validate_network_spec(spec: &NetworkSpec) -> ValidationResult<()> {
    if spec.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: spec.schema_version.clone(),
        });
    }

    if spec.nodes.is_empty() {
        return Err(ValidationError::SemanticError(format!(
            "network '{}' has no nodes",
            spec.name
        )));
    }

    // Domains of nodes seen so far; parents must already be in here.
    let mut seen: BTreeMap<&str, &[String]> = BTreeMap::new();

    for node in &spec.nodes {
        if seen.contains_key(node.name.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "duplicate node name '{}'",
                node.name
            )));
        }
        validate_domain(node)?;

        let mut parent_domains = Vec::with_capacity(node.parents.len());
        for (i, parent) in node.parents.iter().enumerate() {
            if node.parents[..i].contains(parent) {
                return Err(ValidationError::SemanticError(format!(
                    "node '{}' lists parent '{}' more than once",
                    node.name, parent
                )));
            }
            match seen.get(parent.as_str()) {
                Some(domain) => parent_domains.push(*domain),
                None => {
                    return Err(ValidationError::SemanticError(format!(
                        "node '{}' lists parent '{}' which is not declared before it",
                        node.name, parent
                    )))
                }
            }
        }

        validate_table(node, &parent_domains)?;
        seen.insert(node.name.as_str(), node.domain.as_slice());
    }

    Ok(())
}

fn validate_domain(node: &NodeSpec) -> ValidationResult<()> {
    if node.domain.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.domain", node.name),
            message: "domain must list at least one value".to_string(),
        });
    }
    let mut values = HashSet::new();
    for value in &node.domain {
        if !values.insert(value.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.domain", node.name),
                message: format!("value '{}' appears more than once", value),
            });
        }
    }
    Ok(())
}

fn validate_table(node: &NodeSpec, parent_domains: &[&[String]]) -> ValidationResult<()> {
    match (&node.table, node.parents.is_empty()) {
        (TableSpec::Marginal(probs), true) => {
            validate_distribution(node, &format!("{}.table", node.name), probs)
        }
        (TableSpec::Conditional(rows), false) => {
            let mut seen_rows = HashSet::new();
            for (i, row) in rows.iter().enumerate() {
                let field = format!("{}.table[{}]", node.name, i);
                if row.given.len() != node.parents.len() {
                    return Err(ValidationError::InvalidValue {
                        field,
                        message: format!(
                            "'given' has {} values but the node has {} parents",
                            row.given.len(),
                            node.parents.len()
                        ),
                    });
                }
                for ((value, parent), domain) in
                    row.given.iter().zip(&node.parents).zip(parent_domains)
                {
                    if !domain.contains(value) {
                        return Err(ValidationError::InvalidValue {
                            field,
                            message: format!(
                                "'{}' is not in the domain of parent '{}'",
                                value, parent
                            ),
                        });
                    }
                }
                if !seen_rows.insert(row.given.clone()) {
                    return Err(ValidationError::InvalidValue {
                        field,
                        message: format!("duplicate row for {:?}", row.given),
                    });
                }
                validate_distribution(node, &field, &row.probabilities)?;
            }
            Ok(())
        }
        (TableSpec::Marginal(_), false) => Err(ValidationError::SemanticError(format!(
            "node '{}' has parents {:?} but its table is a single distribution",
            node.name, node.parents
        ))),
        (TableSpec::Conditional(_), true) => Err(ValidationError::SemanticError(format!(
            "node '{}' has no parents but its table is a list of rows",
            node.name
        ))),
    }
}

fn validate_distribution(
    node: &NodeSpec,
    field: &str,
    probs: &BTreeMap<String, f64>,
) -> ValidationResult<()> {
    for (label, p) in probs {
        if !node.domain.contains(label) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("'{}' is not in the domain of '{}'", label, node.name),
            });
        }
        if !is_probability(*p) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("probability of '{}' must be in [0, 1], got {}", label, p),
            });
        }
    }
    let values: Vec<f64> = probs.values().copied().collect();
    let row = RowSum::of(&values);
    if !row.is_normalized(FILE_PROBABILITY_TOLERANCE) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("probabilities sum to {}, expected 1.0", row.sum),
        });
    }
    Ok(())
}
