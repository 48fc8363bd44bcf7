// ─────────────────────────────────────────────────────────────────────
// Machina — UQ Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Parallel sample fan-out with checkpointed cooperative cancellation.
//!
//! Samples are evaluated in batches of `checkpoint_interval` with rayon.
//! Each sample checks the cancellation token before starting; a batch in
//! which any sample was skipped is discarded whole, so a cancelled run
//! reports statistics over the deterministic prefix 0..k·checkpoint.

use crate::input::ResolvedInput;
use crate::sampling::{derived_seed, resolve_method, SamplePlan};
use crate::sensitivity::{rank, sobol_indices, tornado_shares};
use machina_math::stats::summarize;
use machina_types::config::{SamplingMethod, SensitivityMethod};
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::{OutputStatistics, PercentileBands, SampleFailure, SensitivityIndex, UncertaintyReport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UqConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_method")]
    pub method: SamplingMethod,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: SensitivityMethod,
    /// Samples per checkpoint batch.
    #[serde(default = "default_checkpoint")]
    pub checkpoint_interval: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_samples() -> usize {
    256
}
fn default_method() -> SamplingMethod {
    SamplingMethod::Auto
}
fn default_sensitivity() -> SensitivityMethod {
    SensitivityMethod::Tornado
}
fn default_checkpoint() -> usize {
    64
}

impl Default for UqConfig {
    fn default() -> Self {
        UqConfig {
            samples: default_samples(),
            method: default_method(),
            sensitivity: default_sensitivity(),
            checkpoint_interval: default_checkpoint(),
            seed: 0,
        }
    }
}

impl UqConfig {
    pub fn validate(&self) -> MachinaResult<()> {
        if self.samples < 2 {
            return Err(MachinaError::Configuration(format!(
                "UQ needs at least 2 samples, got {}",
                self.samples
            )));
        }
        if self.checkpoint_interval == 0 {
            return Err(MachinaError::Configuration(
                "checkpoint interval must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shared flag polled by workers between samples.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deterministic map from input values to named outputs.
pub trait UqModel: Sync {
    fn outputs(&self) -> Vec<String>;
    fn evaluate(&self, inputs: &[f64]) -> MachinaResult<Vec<f64>>;
}

/// Closure-backed model.
pub struct FnModel<F> {
    names: Vec<String>,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&[f64]) -> MachinaResult<Vec<f64>> + Sync,
{
    pub fn new(names: &[&str], f: F) -> Self {
        FnModel {
            names: names.iter().map(|s| s.to_string()).collect(),
            f,
        }
    }
}

impl<F> UqModel for FnModel<F>
where
    F: Fn(&[f64]) -> MachinaResult<Vec<f64>> + Sync,
{
    fn outputs(&self) -> Vec<String> {
        self.names.clone()
    }

    fn evaluate(&self, inputs: &[f64]) -> MachinaResult<Vec<f64>> {
        (self.f)(inputs)
    }
}

type Outcome = Result<Vec<f64>, String>;

fn evaluate_checked<M: UqModel + ?Sized>(model: &M, values: &[f64], n_outputs: usize) -> Outcome {
    let out = model.evaluate(values).map_err(|e| e.to_string())?;
    if out.len() != n_outputs {
        return Err(format!("model returned {} outputs, expected {n_outputs}", out.len()));
    }
    if let Some(bad) = out.iter().position(|v| !v.is_finite()) {
        return Err(format!("output {bad} is not finite"));
    }
    Ok(out)
}

pub struct UqEngine {
    config: UqConfig,
    token: CancellationToken,
}

impl UqEngine {
    pub fn new(config: UqConfig) -> MachinaResult<Self> {
        Self::with_cancellation(config, CancellationToken::new())
    }

    pub fn with_cancellation(config: UqConfig, token: CancellationToken) -> MachinaResult<Self> {
        config.validate()?;
        Ok(UqEngine { config, token })
    }

    pub fn config(&self) -> &UqConfig {
        &self.config
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn run<M: UqModel + ?Sized>(&self, inputs: &[ResolvedInput], model: &M) -> MachinaResult<UncertaintyReport> {
        if inputs.is_empty() {
            return Err(MachinaError::Configuration(
                "UQ needs at least one stochastic input".to_string(),
            ));
        }
        let names = model.outputs();
        if names.is_empty() {
            return Err(MachinaError::Configuration("UQ model exposes no outputs".to_string()));
        }
        let n = self.config.samples;
        let d = inputs.len();
        let seed = self.config.seed;
        let (method, coverage_warning) = resolve_method(self.config.method, n, d);
        if coverage_warning {
            warn!(
                samples = n,
                dims = d,
                "Monte Carlo below 200 samples per input; coverage may be poor, Latin hypercube recommended"
            );
        }
        info!(samples = n, dims = d, ?method, seed, "UQ run started");

        let plan = SamplePlan::new(method, seed, n, d);
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(n);
        let mut outcomes: Vec<Outcome> = Vec::with_capacity(n);
        let mut incomplete = false;
        let mut start = 0;
        while start < n {
            if self.token.is_cancelled() {
                incomplete = true;
                break;
            }
            let end = (start + self.config.checkpoint_interval).min(n);
            let batch: Vec<Option<(Vec<f64>, Outcome)>> = (start..end)
                .into_par_iter()
                .map(|i| {
                    if self.token.is_cancelled() {
                        return None;
                    }
                    Some(match plan.draw(inputs, i) {
                        Ok(values) => {
                            let out = evaluate_checked(model, &values, names.len());
                            (values, out)
                        }
                        Err(e) => (Vec::new(), Err(e.to_string())),
                    })
                })
                .collect();
            if batch.iter().any(Option::is_none) {
                incomplete = true;
                break;
            }
            for (values, out) in batch.into_iter().flatten() {
                rows.push(values);
                outcomes.push(out);
            }
            start = end;
            debug!(completed = start, "UQ checkpoint reached");
        }
        if incomplete {
            warn!(kept = outcomes.len(), requested = n, "UQ run cancelled, keeping completed checkpoints");
        }

        let failures: Vec<SampleFailure> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, o)| o.as_ref().err().map(|e| SampleFailure { index, error: e.clone() }))
            .collect();
        let successes: Vec<&Vec<f64>> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
        if !incomplete && successes.len() < 2 {
            let first = failures.first().map(|f| f.error.as_str()).unwrap_or("no samples");
            return Err(MachinaError::Configuration(format!(
                "only {} of {n} UQ samples succeeded; first failure: {first}",
                successes.len()
            )));
        }

        let outputs: Vec<OutputStatistics> = if successes.is_empty() {
            Vec::new()
        } else {
            names
                .iter()
                .enumerate()
                .map(|(k, name)| {
                    let column: Vec<f64> = successes.iter().map(|o| o[k]).collect();
                    statistics(name, &column)
                })
                .collect()
        };

        let sensitivity = if incomplete {
            Vec::new()
        } else {
            match self.config.sensitivity {
                SensitivityMethod::Sobol => match self.sobol(method, inputs, model, &rows, &outcomes, &names) {
                    Some(s) => s,
                    None => {
                        incomplete = true;
                        warn!("UQ cancelled during Sobol evaluation, sensitivity omitted");
                        Vec::new()
                    }
                },
                SensitivityMethod::Tornado => self.tornado(inputs, model, &names),
                SensitivityMethod::None => Vec::new(),
            }
        };

        info!(
            completed = successes.len(),
            failed = failures.len(),
            incomplete,
            "UQ run finished"
        );
        Ok(UncertaintyReport {
            seed,
            method,
            sensitivity_method: self.config.sensitivity,
            requested_samples: n,
            completed_samples: successes.len(),
            failures,
            outputs,
            sensitivity,
            incomplete,
            coverage_warning,
        })
    }

    /// Saltelli design on top of the main sample (matrix A).
    /// `None` when cancelled part-way.
    fn sobol<M: UqModel + ?Sized>(
        &self,
        method: SamplingMethod,
        inputs: &[ResolvedInput],
        model: &M,
        rows_a: &[Vec<f64>],
        outcomes_a: &[Outcome],
        names: &[String],
    ) -> Option<Vec<SensitivityIndex>> {
        let n = rows_a.len();
        let d = inputs.len();
        let plan_b = SamplePlan::new(method, derived_seed(self.config.seed, 1), n, d);

        // Job (0, j) is row j of B; job (i + 1, j) is row j of AB_i.
        let jobs: Vec<(usize, usize)> = (0..=d).flat_map(|m| (0..n).map(move |j| (m, j))).collect();
        let results: Vec<Option<Outcome>> = jobs
            .par_iter()
            .map(|&(m, j)| {
                if self.token.is_cancelled() {
                    return None;
                }
                let b = match plan_b.draw(inputs, j) {
                    Ok(b) => b,
                    Err(e) => return Some(Err(e.to_string())),
                };
                if m == 0 {
                    return Some(evaluate_checked(model, &b, names.len()));
                }
                let a = &rows_a[j];
                if a.len() != d {
                    return Some(Err("row of A unavailable".to_string()));
                }
                let mut ab = a.clone();
                ab[m - 1] = b[m - 1];
                Some(evaluate_checked(model, &ab, names.len()))
            })
            .collect();
        if results.iter().any(Option::is_none) {
            return None;
        }
        let results: Vec<Outcome> = results.into_iter().flatten().collect();

        let input_names: Vec<String> = inputs.iter().map(|i| i.name.clone()).collect();
        let mut indices = Vec::new();
        for (k, name) in names.iter().enumerate() {
            let pick = |o: &Outcome| o.as_ref().ok().map(|v| v[k]);
            let f_a: Vec<Option<f64>> = outcomes_a.iter().map(pick).collect();
            let f_b: Vec<Option<f64>> = results[..n].iter().map(pick).collect();
            let f_ab: Vec<Vec<Option<f64>>> = (1..=d)
                .map(|m| results[m * n..(m + 1) * n].iter().map(pick).collect())
                .collect();
            let pairs = sobol_indices(&f_a, &f_b, &f_ab);
            let first: Vec<f64> = pairs.iter().map(|p| p.first_order).collect();
            let total: Vec<f64> = pairs.iter().map(|p| p.total_order).collect();
            indices.extend(rank(name, &input_names, &first, Some(&total)));
        }
        Some(indices)
    }

    /// One-at-a-time swing between the 5th and 95th percentiles.
    fn tornado<M: UqModel + ?Sized>(&self, inputs: &[ResolvedInput], model: &M, names: &[String]) -> Vec<SensitivityIndex> {
        let nominal: Vec<f64> = inputs.iter().map(|i| i.nominal()).collect();
        let swings: Vec<Vec<f64>> = (0..inputs.len())
            .into_par_iter()
            .map(|i| {
                let at = |u: f64| -> Outcome {
                    let mut x = nominal.clone();
                    x[i] = inputs[i].at_quantile(u).map_err(|e| e.to_string())?;
                    evaluate_checked(model, &x, names.len())
                };
                match (at(0.05), at(0.95)) {
                    (Ok(lo), Ok(hi)) => lo.iter().zip(&hi).map(|(a, b)| (b - a).abs()).collect(),
                    (lo, hi) => {
                        let err = lo.err().or(hi.err()).unwrap_or_default();
                        warn!(input = %inputs[i].name, error = %err, "tornado evaluation failed, swing set to zero");
                        vec![0.0; names.len()]
                    }
                }
            })
            .collect();

        let input_names: Vec<String> = inputs.iter().map(|i| i.name.clone()).collect();
        names
            .iter()
            .enumerate()
            .flat_map(|(k, name)| {
                let column: Vec<f64> = swings.iter().map(|s| s[k]).collect();
                rank(name, &input_names, &tornado_shares(&column), None)
            })
            .collect()
    }
}

fn statistics(name: &str, values: &[f64]) -> OutputStatistics {
    let s = summarize(values);
    let std_dev = s.variance.max(0.0).sqrt();
    OutputStatistics {
        name: name.to_string(),
        mean: s.mean,
        variance: s.variance,
        std_dev,
        std_error: std_dev / (values.len() as f64).sqrt(),
        min: s.min,
        max: s.max,
        percentiles: PercentileBands {
            p05: s.p05,
            p25: s.p25,
            p50: s.p50,
            p75: s.p75,
            p95: s.p95,
        },
    }
}
