//! Joint probability of a full assignment.
//!
//! P(x1..xn) = Π P(xi | parents(xi)), taken over nodes in insertion order.

use bn_math::log_product;

use crate::network::{Assignment, Network};

use super::InferenceError;

/// P(node = assignment[node] | parents) for one node.
fn conditional_probability(
    network: &Network,
    name: &str,
    assignment: &Assignment,
) -> Result<f64, InferenceError> {
    let missing = |node: &str| InferenceError::MissingAssignment {
        node: node.to_string(),
    };

    let value = assignment.get(name).ok_or_else(|| missing(name))?;
    let parents = network
        .parents(name)
        .ok_or_else(|| InferenceError::UnknownVariable(name.to_string()))?;
    let parent_values = parents
        .iter()
        .map(|p| assignment.get(p).cloned().ok_or_else(|| missing(p.as_str())))
        .collect::<Result<Vec<_>, _>>()?;

    network
        .cpt(name)
        .and_then(|cpt| cpt.probability_of(value, &parent_values))
        .ok_or_else(|| InferenceError::MissingTableEntry {
            node: name.to_string(),
            parent_values,
            value: value.clone(),
        })
}

/// Product of every node's conditional probability under `assignment`.
///
/// The assignment must give a value to every node. Extra keys are ignored.
/// A zero factor does not stop evaluation, so table gaps later in the order
/// are still reported.
pub fn joint_probability(network: &Network, assignment: &Assignment) -> Result<f64, InferenceError> {
    let mut p = 1.0;
    for name in network.node_names() {
        p *= conditional_probability(network, name, assignment)?;
    }
    Ok(p)
}

/// ln of [`joint_probability`], summed in log space.
///
/// Returns negative infinity when any factor is zero.
pub fn log_joint_probability(
    network: &Network,
    assignment: &Assignment,
) -> Result<f64, InferenceError> {
    let factors = network
        .node_names()
        .iter()
        .map(|name| conditional_probability(network, name, assignment))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(log_product(&factors))
}
