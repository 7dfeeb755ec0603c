//! Exact inference by enumeration.
//!
//! - [`joint`]: product of every node's conditional probability
//! - [`combinations`]: lazy Cartesian product over variable domains
//! - [`enumeration`]: posterior of one query variable given evidence
//! - [`posterior`]: the result type

pub mod combinations;
pub mod enumeration;
pub mod joint;
pub mod posterior;

use serde::Serialize;
use thiserror::Error;

use crate::network::Assignment;

pub use combinations::{combinations, Combinations};
pub use enumeration::{infer, marginals};
pub use joint::{joint_probability, log_joint_probability};
pub use posterior::{Outcome, Posterior};

/// Coarse error classes shared by network and inference errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Graph construction problem (duplicate node, bad domain, unknown parent).
    Structural,
    /// A table lacks the row or cell evaluation needed, or holds a value
    /// that is not a probability.
    MissingTableEntry,
    /// An assignment lacks a value for some node.
    MissingAssignment,
    /// The query or evidence does not fit the network.
    InvalidQuery,
    /// The evidence has probability zero under the model.
    ZeroEvidenceProbability,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Structural => "structural",
            ErrorKind::MissingTableEntry => "missing_table_entry",
            ErrorKind::MissingAssignment => "missing_assignment",
            ErrorKind::InvalidQuery => "invalid_query",
            ErrorKind::ZeroEvidenceProbability => "zero_evidence_probability",
        };
        f.write_str(s)
    }
}

/// Errors raised while evaluating or querying a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("no table entry for {node}={value} given parents {parent_values:?}")]
    MissingTableEntry {
        node: String,
        parent_values: Vec<String>,
        value: String,
    },

    #[error("assignment has no value for '{node}'")]
    MissingAssignment { node: String },

    #[error("query variable '{0}' is not in the network")]
    UnknownQueryVariable(String),

    #[error("evidence variable '{0}' is not in the network")]
    UnknownEvidenceVariable(String),

    #[error("evidence {node}={value} is outside the domain {domain:?}")]
    EvidenceValueOutOfDomain {
        node: String,
        value: String,
        domain: Vec<String>,
    },

    #[error("query variable '{0}' is also observed as evidence")]
    QueryInEvidence(String),

    #[error("variable '{0}' is not in the network")]
    UnknownVariable(String),

    #[error("variable '{0}' is listed more than once")]
    RepeatedVariable(String),

    #[error("evidence {} has probability zero, so P({query} | evidence) is undefined", format_assignment(.evidence))]
    ZeroEvidenceProbability { query: String, evidence: Assignment },

    #[error("score for {query}={value} is {score}; a table holds a value outside [0, 1]")]
    InvalidScore {
        query: String,
        value: String,
        score: String,
    },
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::MissingTableEntry { .. } | InferenceError::InvalidScore { .. } => {
                ErrorKind::MissingTableEntry
            }
            InferenceError::MissingAssignment { .. } => ErrorKind::MissingAssignment,
            InferenceError::UnknownQueryVariable(_)
            | InferenceError::UnknownEvidenceVariable(_)
            | InferenceError::EvidenceValueOutOfDomain { .. }
            | InferenceError::QueryInEvidence(_)
            | InferenceError::UnknownVariable(_)
            | InferenceError::RepeatedVariable(_) => ErrorKind::InvalidQuery,
            InferenceError::ZeroEvidenceProbability { .. } => ErrorKind::ZeroEvidenceProbability,
        }
    }
}

impl From<InferenceError> for bn_common::Error {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ZeroEvidenceProbability { ref evidence, .. } => {
                bn_common::Error::ZeroEvidence {
                    evidence: format_assignment(evidence),
                }
            }
            InferenceError::MissingTableEntry { .. } => {
                bn_common::Error::MissingTableEntry(err.to_string())
            }
            InferenceError::InvalidScore { .. } => {
                bn_common::Error::IncompleteTable(err.to_string())
            }
            InferenceError::MissingAssignment { .. } => {
                bn_common::Error::MissingAssignment(err.to_string())
            }
            _ => bn_common::Error::InvalidQuery(err.to_string()),
        }
    }
}

/// Render an assignment as `A=a, B=b` (or `{}` when empty).
pub fn format_assignment(assignment: &Assignment) -> String {
    if assignment.is_empty() {
        return "{}".to_string();
    }
    assignment
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_query_errors() {
        assert_eq!(
            InferenceError::QueryInEvidence("A".into()).kind(),
            ErrorKind::InvalidQuery
        );
        assert_eq!(
            InferenceError::UnknownVariable("A".into()).kind(),
            ErrorKind::InvalidQuery
        );
        assert_eq!(
            InferenceError::MissingAssignment { node: "A".into() }.kind(),
            ErrorKind::MissingAssignment
        );
    }

    #[test]
    fn zero_evidence_message_lists_evidence() {
        let mut evidence = Assignment::new();
        evidence.insert("B".into(), "sim".into());
        let err = InferenceError::ZeroEvidenceProbability {
            query: "A".into(),
            evidence,
        };
        let msg = err.to_string();
        assert!(msg.contains("B=sim"), "{}", msg);
        assert!(msg.contains("P(A | evidence)"), "{}", msg);
    }

    #[test]
    fn converts_to_application_codes() {
        let zero: bn_common::Error = InferenceError::ZeroEvidenceProbability {
            query: "A".into(),
            evidence: Assignment::new(),
        }
        .into();
        assert_eq!(zero.code(), 33);

        let query: bn_common::Error = InferenceError::QueryInEvidence("A".into()).into();
        assert_eq!(query.code(), 30);

        let missing: bn_common::Error = InferenceError::MissingTableEntry {
            node: "B".into(),
            parent_values: vec!["sim".into()],
            value: "não".into(),
        }
        .into();
        assert_eq!(missing.code(), 31);

        let invalid = InferenceError::InvalidScore {
            query: "A".into(),
            value: "x".into(),
            score: "-0.5".into(),
        };
        assert_eq!(invalid.kind(), ErrorKind::MissingTableEntry);
        let invalid: bn_common::Error = invalid.into();
        assert_eq!(invalid.code(), 21);
    }

    #[test]
    fn format_assignment_is_sorted() {
        let mut a = Assignment::new();
        a.insert("Z".into(), "1".into());
        a.insert("A".into(), "0".into());
        assert_eq!(format_assignment(&a), "A=0, Z=1");
        assert_eq!(format_assignment(&Assignment::new()), "{}");
    }
}
