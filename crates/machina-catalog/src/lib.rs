// ─────────────────────────────────────────────────────────────────────
// Machina — Catalog
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Material & constraint catalog.
//!
//! Every physical input the solvers consume is looked up here by key and
//! carries a nominal value, an uncertainty distribution and a citation.

pub mod catalog;
pub mod global;
pub mod material;
pub mod period;

pub use catalog::Catalog;
pub use global::CatalogSnapshot;
pub use material::{Distribution, MaterialProperty, Support};
