// ─────────────────────────────────────────────────────────────────────
// Machina — Structure
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Simplified structural response and fluid-structure coupling.

pub mod beam;
pub mod coupling;
pub mod membrane;
