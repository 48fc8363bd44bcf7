// ─────────────────────────────────────────────────────────────────────
// Machina — Aero
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Aerodynamic models.
//!
//! Oscillating lifting surfaces (Theodorsen/Wagner) and rotating ones
//! (blade-element/momentum with an optional prescribed vortex wake).

pub mod kinematics;
pub mod rotor;
pub mod unsteady;
pub mod wake;
