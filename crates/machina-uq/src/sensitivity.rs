//! Variance-based and one-at-a-time sensitivity estimators.
//!
//! Sobol indices use the A/B/AB_i radial design: first order by the
//! Saltelli (2010) estimator, total order by Jansen's. Rows where any
//! of the needed evaluations failed are dropped per input.

use machina_math::stats::{mean, variance};
use machina_types::state::SensitivityIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SobolPair {
    pub first_order: f64,
    pub total_order: f64,
}

/// Indices of every input for one output.
///
/// `f_ab[i][j]` is the output of row j of A with column i taken from B.
pub fn sobol_indices(f_a: &[Option<f64>], f_b: &[Option<f64>], f_ab: &[Vec<Option<f64>>]) -> Vec<SobolPair> {
    let pooled: Vec<f64> = f_a.iter().chain(f_b).filter_map(|v| *v).collect();
    let var = if pooled.len() > 1 { variance(&pooled) } else { 0.0 };
    // Centring f_B leaves the estimator unbiased and cuts its variance.
    let centre = if pooled.is_empty() { 0.0 } else { mean(&pooled) };
    f_ab.iter()
        .map(|ab| {
            if !(var > 0.0) {
                return SobolPair { first_order: 0.0, total_order: 0.0 };
            }
            let mut first = 0.0;
            let mut total = 0.0;
            let mut n = 0usize;
            for ((a, b), ab) in f_a.iter().zip(f_b).zip(ab) {
                if let (Some(a), Some(b), Some(ab)) = (a, b, ab) {
                    first += (b - centre) * (ab - a);
                    total += (a - ab) * (a - ab);
                    n += 1;
                }
            }
            if n == 0 {
                return SobolPair { first_order: 0.0, total_order: 0.0 };
            }
            SobolPair {
                first_order: first / n as f64 / var,
                total_order: 0.5 * total / n as f64 / var,
            }
        })
        .collect()
}

/// Swing shares s_i² / Σ s², comparable with first-order variance shares.
pub fn tornado_shares(swings: &[f64]) -> Vec<f64> {
    let total: f64 = swings.iter().map(|s| s * s).sum();
    if total > 0.0 {
        swings.iter().map(|s| s * s / total).collect()
    } else {
        vec![0.0; swings.len()]
    }
}

/// Rank inputs by total order when available, else first order.
pub fn rank(output: &str, inputs: &[String], first: &[f64], total: Option<&[f64]>) -> Vec<SensitivityIndex> {
    let key = |i: usize| total.map(|t| t[i]).unwrap_or(first[i]);
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    order.sort_by(|&a, &b| key(b).total_cmp(&key(a)).then(a.cmp(&b)));
    order
        .into_iter()
        .enumerate()
        .map(|(r, i)| SensitivityIndex {
            output: output.to_string(),
            input: inputs[i].clone(),
            first_order: first[i],
            total_order: total.map(|t| t[i]),
            rank: r + 1,
        })
        .collect()
}
