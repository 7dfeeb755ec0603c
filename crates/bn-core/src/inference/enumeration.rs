//! Posterior inference by full enumeration.
//!
//! For each value `v` of the query variable Q:
//!
//! ```text
//! score(v) = Σ_h P(Q = v, evidence, hidden = h)
//! P(Q = v | evidence) = score(v) / Σ_v' score(v')
//! ```
//!
//! where `h` ranges over every combination of the hidden variables (all
//! nodes that are neither the query nor observed). Cost is
//! O(|dom(Q)| · Π|dom(hidden)| · n), which is exponential in the number of
//! hidden variables; there is no caching between query values.

use bn_math::normalize;
use tracing::{debug, trace};

use crate::logging::event_names;
use crate::network::{Assignment, Network};

use super::combinations::combinations;
use super::joint::joint_probability;
use super::posterior::{Outcome, Posterior};
use super::InferenceError;

/// Reject queries and evidence that do not fit the network.
fn check_query(network: &Network, query: &str, evidence: &Assignment) -> Result<(), InferenceError> {
    if !network.contains(query) {
        return Err(InferenceError::UnknownQueryVariable(query.to_string()));
    }
    if evidence.contains_key(query) {
        return Err(InferenceError::QueryInEvidence(query.to_string()));
    }
    check_evidence(network, evidence)
}

fn check_evidence(network: &Network, evidence: &Assignment) -> Result<(), InferenceError> {
    for (name, value) in evidence {
        let node = network
            .node(name)
            .ok_or_else(|| InferenceError::UnknownEvidenceVariable(name.clone()))?;
        if !node.has_value(value) {
            return Err(InferenceError::EvidenceValueOutOfDomain {
                node: name.clone(),
                value: value.clone(),
                domain: node.domain.clone(),
            });
        }
    }
    Ok(())
}

/// P(query | evidence) by summing the joint over every hidden combination.
///
/// The network is only read; concurrent calls on a shared `&Network` are
/// safe. Results are deterministic for a given network and inputs.
pub fn infer(
    network: &Network,
    query: &str,
    evidence: &Assignment,
) -> Result<Posterior, InferenceError> {
    check_query(network, query, evidence)?;

    let hidden: Vec<String> = network
        .node_names()
        .iter()
        .filter(|n| n.as_str() != query && !evidence.contains_key(*n))
        .cloned()
        .collect();
    let hidden_combos = combinations(network, &hidden)?;
    let domain = network
        .domain(query)
        .ok_or_else(|| InferenceError::UnknownQueryVariable(query.to_string()))?;

    debug!(
        target: event_names::INFER_STARTED,
        query,
        evidence = evidence.len(),
        hidden = hidden.len(),
        combinations = hidden_combos.total(),
        "enumeration started"
    );

    let mut scores = Vec::with_capacity(domain.len());
    let mut enumerated: u64 = 0;
    for value in domain {
        let mut extended = evidence.clone();
        extended.insert(query.to_string(), value.clone());

        let mut score = 0.0;
        enumerated = 0;
        for combo in hidden_combos.clone() {
            let mut full = extended.clone();
            full.extend(combo);
            score += joint_probability(network, &full)?;
            enumerated += 1;
        }
        trace!(
            target: event_names::INFER_VALUE_SCORED,
            query,
            value = value.as_str(),
            score,
            "query value scored"
        );
        scores.push(score);
    }

    if let Some((value, score)) = domain
        .iter()
        .zip(&scores)
        .find(|(_, s)| s.is_nan() || **s < 0.0 || s.is_infinite())
    {
        return Err(InferenceError::InvalidScore {
            query: query.to_string(),
            value: value.clone(),
            score: score.to_string(),
        });
    }

    let total: f64 = scores.iter().sum();
    if total == 0.0 {
        debug!(
            target: event_names::INFER_ZERO_EVIDENCE,
            query,
            evidence = evidence.len(),
            "evidence has zero probability"
        );
        return Err(InferenceError::ZeroEvidenceProbability {
            query: query.to_string(),
            evidence: evidence.clone(),
        });
    }
    let Some(probabilities) = normalize(&scores) else {
        return Err(InferenceError::InvalidScore {
            query: query.to_string(),
            value: "total".to_string(),
            score: total.to_string(),
        });
    };

    let outcomes = domain
        .iter()
        .zip(probabilities)
        .map(|(value, probability)| Outcome {
            value: value.clone(),
            probability,
        })
        .collect();

    debug!(
        target: event_names::INFER_FINISHED,
        query,
        evidence_probability = total,
        enumerated,
        "enumeration finished"
    );

    Ok(Posterior {
        query: query.to_string(),
        evidence: evidence.clone(),
        outcomes,
        evidence_probability: total,
        hidden_variables: hidden,
        hidden_combinations: enumerated,
    })
}

/// Posterior of every unobserved node, in insertion order.
///
/// Returns an empty list when every node is observed.
pub fn marginals(network: &Network, evidence: &Assignment) -> Result<Vec<Posterior>, InferenceError> {
    check_evidence(network, evidence)?;
    network
        .node_names()
        .iter()
        .filter(|n| !evidence.contains_key(*n))
        .map(|n| infer(network, n, evidence))
        .collect()
}
