//! Fuzz target for `Node=value` argument parsing.

#![no_main]

use bn_core::cli::parse_assignment;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_assignment(&[text]);
    }
});
