//! Fuzz target for posterior queries against the built-in networks.
//!
//! Any query and evidence drawn from the network's own names and values
//! either fails with an error or yields a normalized posterior.

#![no_main]

use arbitrary::Arbitrary;
use bn_config::{get_preset, PresetName};
use bn_core::{infer, Assignment, Network};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    preset: u8,
    query: u8,
    /// (node index, value index) pairs.
    evidence: Vec<(u8, u8)>,
}

fuzz_target!(|input: Input| {
    let preset = PresetName::ALL[input.preset as usize % PresetName::ALL.len()];
    let Ok(network) = Network::from_spec(&get_preset(preset)) else {
        return;
    };
    let names = network.node_names();
    let query = &names[input.query as usize % names.len()];

    let mut evidence = Assignment::new();
    for (node, value) in input.evidence.iter().take(names.len()) {
        let name = &names[*node as usize % names.len()];
        if let Some(domain) = network.domain(name) {
            evidence.insert(name.clone(), domain[*value as usize % domain.len()].clone());
        }
    }

    if let Ok(posterior) = infer(&network, query, &evidence) {
        assert!((posterior.total() - 1.0).abs() < 1e-9);
    }
});
