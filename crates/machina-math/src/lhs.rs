// ─────────────────────────────────────────────────────────────────────
// Machina — Latin Hypercube
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Stratified unit-cube designs for the uncertainty engine.

use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;

/// Latin hypercube design in [0, 1)^n_dims.
///
/// Each column holds exactly one point in each of the `n_samples` equal
/// strata, jittered uniformly inside its stratum and shuffled independently.
pub fn latin_hypercube_with_rng<R: Rng + ?Sized>(
    n_samples: usize,
    n_dims: usize,
    rng: &mut R,
) -> Array2<f64> {
    let mut samples = Array2::zeros((n_samples, n_dims));
    if n_samples == 0 || n_dims == 0 {
        return samples;
    }
    for dim in 0..n_dims {
        let mut values: Vec<f64> = (0..n_samples)
            .map(|i| (i as f64 + rng.gen::<f64>()) / n_samples as f64)
            .collect();
        values.shuffle(rng);
        for (i, v) in values.into_iter().enumerate() {
            samples[[i, dim]] = v;
        }
    }
    samples
}
