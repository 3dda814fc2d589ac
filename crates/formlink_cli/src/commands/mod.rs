//! CLI command implementations.

pub mod check;
pub mod codecs;
pub mod normalize;
pub mod resolve;
