//! Lazy Cartesian product over variable domains.
//!
//! The iterator keeps one index per variable and advances them like an
//! odometer: the last variable turns fastest, the first slowest. The
//! sequence is the same one a recursive "first variable outermost"
//! enumeration would produce, without materializing it.

use crate::network::{Assignment, Network};

use super::InferenceError;

/// Iterator over every assignment to a fixed list of variables.
///
/// Cloning restarts from the clone's position; [`Combinations::restart`]
/// rewinds to the first assignment.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    variables: Vec<(&'a str, &'a [String])>,
    indices: Vec<usize>,
    remaining: usize,
    total: usize,
}

/// Build the iterator for `variables`, resolving domains from `network`.
///
/// An empty list yields exactly one empty assignment. Names must be
/// distinct.
pub fn combinations<'a>(
    network: &'a Network,
    variables: &[String],
) -> Result<Combinations<'a>, InferenceError> {
    let mut resolved = Vec::with_capacity(variables.len());
    for name in variables {
        let node = network
            .node(name)
            .ok_or_else(|| InferenceError::UnknownVariable(name.clone()))?;
        if resolved.iter().any(|(n, _)| *n == name.as_str()) {
            return Err(InferenceError::RepeatedVariable(name.clone()));
        }
        resolved.push((node.name.as_str(), node.domain.as_slice()));
    }
    Ok(Combinations::new(resolved))
}

impl<'a> Combinations<'a> {
    fn new(variables: Vec<(&'a str, &'a [String])>) -> Self {
        let total = variables
            .iter()
            .fold(1usize, |acc, (_, d)| acc.saturating_mul(d.len()));
        Self {
            indices: vec![0; variables.len()],
            variables,
            remaining: total,
            total,
        }
    }

    /// Number of assignments in a full pass.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rewind to the first assignment.
    pub fn restart(&mut self) {
        self.indices.iter_mut().for_each(|i| *i = 0);
        self.remaining = self.total;
    }

    fn current(&self) -> Assignment {
        self.variables
            .iter()
            .zip(&self.indices)
            .map(|((name, domain), &i)| (name.to_string(), domain[i].clone()))
            .collect()
    }

    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.variables[pos].1.len() {
                return;
            }
            self.indices[pos] = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.remaining == 0 {
            return None;
        }
        let assignment = self.current();
        self.remaining -= 1;
        self.advance();
        Some(assignment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

impl std::iter::FusedIterator for Combinations<'_> {}
