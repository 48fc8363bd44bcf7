// ─────────────────────────────────────────────────────────────────────
// Machina — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// ISA sea-level air density (kg/m³).
pub const RHO_AIR_SEA_LEVEL: f64 = 1.225;

/// Standard gravity (m/s²).
pub const G_STANDARD: f64 = 9.80665;

/// Thin-airfoil lift-curve slope (1/rad).
pub const THIN_AIRFOIL_SLOPE: f64 = 2.0 * std::f64::consts::PI;

/// Jones approximation of the Wagner function: φ(s) = 1 − A1·e^(−b1·s) − A2·e^(−b2·s).
pub const WAGNER_A1: f64 = 0.165;
pub const WAGNER_B1: f64 = 0.0455;
pub const WAGNER_A2: f64 = 0.335;
pub const WAGNER_B2: f64 = 0.3;

/// Asymptotic bounds of |C(k)|: 1 at k = 0, 1/2 as k → ∞.
pub const THEODORSEN_MAG_MAX: f64 = 1.0;
pub const THEODORSEN_MAG_MIN: f64 = 0.5;

/// Reduced frequency above which the flow is treated as fully unsteady.
pub const K_UNSTEADY_LIMIT: f64 = 1.0;

/// Samples per input dimension below which Monte Carlo coverage is inadequate.
pub const LHS_REQUIRED_BELOW_PER_DIM: usize = 200;

/// Floor on the Prandtl loss factor to keep the momentum closure finite.
pub const PRANDTL_FLOOR: f64 = 1e-3;
