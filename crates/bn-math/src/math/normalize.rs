//! Normalization and range checks for discrete distributions.

use serde::{Deserialize, Serialize};

/// Tolerance for in-memory distributions (row sums, posterior sums).
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Looser tolerance for hand-written network files, where decimals like
/// 0.1 + 0.2 + 0.7 are expected to pass.
pub const FILE_PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Outcome of summing one row of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowSum {
    /// Sum of the row's probabilities.
    pub sum: f64,
    /// Absolute distance from 1.0.
    pub deviation: f64,
}

impl RowSum {
    /// Sum the given probabilities.
    pub fn of(values: &[f64]) -> Self {
        let sum: f64 = values.iter().sum();
        Self {
            sum,
            deviation: (sum - 1.0).abs(),
        }
    }

    /// Whether the row sums to 1 within `tol`.
    pub fn is_normalized(&self, tol: f64) -> bool {
        self.sum.is_finite() && self.deviation <= tol
    }
}

/// True when the values sum to 1 within `tol`.
pub fn sums_to_one(values: &[f64], tol: f64) -> bool {
    RowSum::of(values).is_normalized(tol)
}

/// True for finite values in [0, 1].
pub fn is_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

/// Divide each weight by the total.
///
/// Returns `None` when the input is empty, any weight is negative or NaN,
/// or the total is zero or non-finite. A zero total means the weights carry
/// no information and there is no distribution to return.
pub fn normalize(weights: &[f64]) -> Option<Vec<f64>> {
    if weights.is_empty() {
        return None;
    }
    if weights.iter().any(|w| w.is_nan() || *w < 0.0) {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(weights.iter().map(|w| w / total).collect())
}
