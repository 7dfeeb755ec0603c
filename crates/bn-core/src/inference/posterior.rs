//! Posterior distribution of a single query variable.

use bn_math::entropy_bits;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::network::Assignment;

/// One value of the query variable and its posterior probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Outcome {
    pub value: String,
    pub probability: f64,
}

/// P(query | evidence), in the query node's domain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Posterior {
    pub query: String,
    pub evidence: Assignment,
    pub outcomes: Vec<Outcome>,
    /// Marginal probability of the evidence, P(evidence).
    pub evidence_probability: f64,
    /// Variables summed out, in enumeration order.
    pub hidden_variables: Vec<String>,
    /// Hidden-variable combinations enumerated for each query value.
    pub hidden_combinations: u64,
}

impl Posterior {
    /// Probability of `value`, or `None` if it is not in the query's domain.
    pub fn probability(&self, value: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.probability)
    }

    /// Highest-probability outcome; ties go to the earlier domain value.
    pub fn most_likely(&self) -> Option<&Outcome> {
        self.outcomes.iter().fold(None, |best: Option<&Outcome>, o| match best {
            Some(b) if b.probability >= o.probability => Some(b),
            _ => Some(o),
        })
    }

    /// `(value, probability)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.outcomes
            .iter()
            .map(|o| (o.value.as_str(), o.probability))
    }

    /// Sum of all outcome probabilities (1 up to rounding).
    pub fn total(&self) -> f64 {
        self.outcomes.iter().map(|o| o.probability).sum()
    }

    /// Shannon entropy of the posterior, in bits.
    pub fn entropy_bits(&self) -> f64 {
        let probs: Vec<f64> = self.outcomes.iter().map(|o| o.probability).collect();
        entropy_bits(&probs)
    }
}

impl<'a> IntoIterator for &'a Posterior {
    type Item = (&'a str, f64);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, f64)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
