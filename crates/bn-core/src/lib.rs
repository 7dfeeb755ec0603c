//! bayesnet core library.
//!
//! Discrete Bayesian networks with exact inference by enumeration:
//! - Network model with insertion-order (topological) nodes and tables
//! - Joint probability of full assignments
//! - Posterior of a query variable given evidence
//! - Network loading from files and presets
//! - Structured logging and CLI exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod cli;
pub mod config;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod network;
pub mod output;

pub use inference::{
    combinations, infer, joint_probability, marginals, ErrorKind, InferenceError, Posterior,
};
pub use network::{Assignment, Cpt, Network, NetworkError};
