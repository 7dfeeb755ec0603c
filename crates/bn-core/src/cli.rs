//! Argument helpers for the bn-core binary.

use bn_common::Error;

use crate::network::Assignment;

/// Parse `Node=value` pairs into an assignment.
///
/// Each item may itself hold several comma-separated pairs, so
/// `--evidence A=sim,B=não` and `--evidence A=sim --evidence B=não` are
/// equivalent. Whitespace around names and values is trimmed. Assigning
/// the same node twice is accepted only when both values agree.
pub fn parse_assignment<S: AsRef<str>>(items: &[S]) -> Result<Assignment, Error> {
    let mut assignment = Assignment::new();
    for item in items {
        for pair in item.as_ref().split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidArgument(format!("expected Node=value, got '{}'", pair))
            })?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "expected Node=value, got '{}'",
                    pair
                )));
            }
            if let Some(previous) = assignment.insert(name.to_string(), value.to_string()) {
                if previous != value {
                    return Err(Error::InvalidArgument(format!(
                        "'{}' is assigned both '{}' and '{}'",
                        name, previous, value
                    )));
                }
            }
        }
    }
    Ok(assignment)
}
