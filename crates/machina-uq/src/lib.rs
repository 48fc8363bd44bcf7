// ─────────────────────────────────────────────────────────────────────
// Machina — Uncertainty Quantification
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Uncertainty propagation through the simulation pipeline.
//!
//! Samples are a pure function of (base seed, index), evaluated as a
//! parallel map and reduced into statistics after each checkpoint.

pub mod engine;
pub mod input;
pub mod sampling;
pub mod sensitivity;

pub use engine::{CancellationToken, FnModel, UqConfig, UqEngine, UqModel};
pub use input::{InputSource, ResolvedInput, StochasticInput};
