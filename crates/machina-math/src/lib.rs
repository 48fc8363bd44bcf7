//! Mathematical primitives for the Machina simulation core.

pub mod integrate;
pub mod lhs;
pub mod oscillator;
pub mod special;
pub mod stats;
pub mod theodorsen;
