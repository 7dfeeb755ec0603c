//! Fuzz target for network file parsing and building.
//!
//! Arbitrary JSON must be rejected with an error, never a panic. Small
//! networks that load are also queried once.

#![no_main]

use bn_config::NetworkSpec;
use bn_core::config::build_network;
use bn_core::{infer, Assignment};
use libfuzzer_sys::fuzz_target;

/// Keeps enumeration cheap enough for the fuzzer.
const MAX_NODES: usize = 8;

fuzz_target!(|data: &[u8]| {
    let Ok(spec) = serde_json::from_slice::<NetworkSpec>(data) else {
        return;
    };
    if spec.nodes.len() > MAX_NODES || spec.nodes.iter().any(|n| n.domain.len() > 4) {
        return;
    }
    if let Ok(network) = build_network(&spec, "fuzz") {
        if let Some(first) = network.node_names().first() {
            let _ = infer(&network, first, &Assignment::new());
        }
    }
});
