// ─────────────────────────────────────────────────────────────────────
// Machina — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Invention registry and the invocation pipeline.
//!
//! `Pipeline::run` takes an invention id, parameters and a fidelity level
//! and returns the raw result with optional compliance and uncertainty
//! reports.

pub mod inventions;
pub mod pipeline;
pub mod registry;

pub use pipeline::{Pipeline, PipelineConfig, RunOutput};
pub use registry::{InventionKind, InventionSpec, Registry, SimulationContext};
