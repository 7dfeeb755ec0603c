//! Core math modules.

pub mod normalize;
pub mod stable;
