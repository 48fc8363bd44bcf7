// ─────────────────────────────────────────────────────────────────────
// Machina — Validate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Historical validator: constraint predicates over derived metrics,
//! evaluated against a recorded catalog snapshot.

pub mod constraint;
pub mod validator;

pub use constraint::{Constraint, ConstraintCategory, Limit, Quantity, Severity};
pub use validator::{Validator, ValidatorConfig};
