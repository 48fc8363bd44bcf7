// ─────────────────────────────────────────────────────────────────────
// Machina — Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Invocation interface: simulate, validate and quantify one invention.
//!
//! Fidelity gates the stages:
//! - educational: quasi-steady wing sections, loss-free BEMT
//! - advanced: unsteady wake memory, BEMT with tip/root loss and optional vortex wake
//! - research: adds fluid-structure coupling and uncertainty quantification
//!
//! Local recovery is limited to the iterative solvers. A BEMT convergence
//! failure is retried once with relaxed settings; a failed two-way
//! coupling loop falls back to the one-way response. Both are flagged on
//! the result.

use crate::registry::{InventionSpec, Registry, SimulationContext};
use machina_aero::rotor::{OperatingPoint, RotorGeometry, RotorSolver};
use machina_catalog::global::{self, CatalogSnapshot};
use machina_catalog::Catalog;
use machina_structure::beam::CantileverBeam;
use machina_structure::coupling::{couple, one_way, AeroLoadModel};
use machina_types::config::{
    CouplingConfig, CouplingMode, FidelityLevel, RotorSolverConfig, SimulationParameters, UnsteadyConfig,
};
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::{
    ComplianceReport, ResultFlags, RotorSolution, SimulationResult, StructuralResponse, UncertaintyReport,
};
use machina_uq::input::resolve_all;
use machina_uq::{CancellationToken, InputSource, ResolvedInput, StochasticInput, UqConfig, UqEngine, UqModel};
use machina_validate::{Quantity, Validator, ValidatorConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{info, warn};

/// Solver settings shared by every invention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub unsteady: UnsteadyConfig,
    #[serde(default)]
    pub rotor: RotorSolverConfig,
    #[serde(default = "default_coupling")]
    pub coupling: CouplingConfig,
    /// Catalog membrane for wing covers, e.g. `"linen"`.
    #[serde(default = "default_membrane")]
    pub membrane: String,
    #[serde(default)]
    pub validator: ValidatorConfig,
    /// Produce a compliance report.
    #[serde(default = "default_true")]
    pub compliance: bool,
    /// Seed is taken from the simulation parameters, not from here.
    #[serde(default)]
    pub uq: UqConfig,
}

fn default_coupling() -> CouplingConfig {
    CouplingConfig {
        mode: CouplingMode::TwoWay,
        ..CouplingConfig::default()
    }
}

fn default_membrane() -> String {
    "linen".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            unsteady: UnsteadyConfig::default(),
            rotor: RotorSolverConfig::default(),
            coupling: default_coupling(),
            membrane: default_membrane(),
            validator: ValidatorConfig::default(),
            compliance: true,
            uq: UqConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> MachinaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MachinaResult<()> {
        self.validator.validate()?;
        self.uq.validate()?;
        RotorSolver::new(self.rotor.clone())?;
        if self.membrane.trim().is_empty() {
            return Err(MachinaError::Configuration(
                "membrane key must not be empty".to_string(),
            ));
        }
        if self.coupling.stations < 3 {
            return Err(MachinaError::Configuration(format!(
                "coupling needs at least 3 structural stations, got {}",
                self.coupling.stations
            )));
        }
        Ok(())
    }
}

/// What one invocation returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub result: SimulationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyReport>,
}

pub struct Pipeline {
    registry: Registry,
    config: PipelineConfig,
    validator: Validator,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> MachinaResult<Self> {
        Self::with_registry(Registry::builtin(), config)
    }

    pub fn with_registry(registry: Registry, config: PipelineConfig) -> MachinaResult<Self> {
        config.validate()?;
        let validator = Validator::new(config.validator.clone())?;
        Ok(Pipeline {
            registry,
            config,
            validator,
            cancel: CancellationToken::new(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Token that stops uncertainty runs at their next checkpoint.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one invention against an explicit catalog snapshot.
    pub fn run(
        &self,
        invention: &str,
        params: &SimulationParameters,
        fidelity: FidelityLevel,
        snapshot: &CatalogSnapshot,
    ) -> MachinaResult<RunOutput> {
        params.validate()?;
        let spec = self.registry.lookup(invention)?;
        info!(invention, ?fidelity, seed = params.seed, "simulation started");

        let ctx = SimulationContext {
            params,
            fidelity,
            catalog: &snapshot.catalog,
            config: &self.config,
        };
        let result = (spec.simulate)(&ctx)?;

        let compliance = if self.config.compliance {
            let constraints = (spec.constraints)(params, &snapshot.catalog)?;
            Some(self.validator.evaluate(spec.kind.id(), &result.metrics, &constraints, snapshot)?)
        } else {
            None
        };

        let uncertainty = if fidelity.uncertainty() {
            Some(self.quantify(spec, params, fidelity, &snapshot.catalog)?)
        } else {
            None
        };

        info!(
            invention,
            relaxed_tolerance = result.flags.relaxed_tolerance,
            structural_fallback = result.flags.structural_fallback,
            "simulation finished"
        );
        Ok(RunOutput {
            result,
            compliance,
            uncertainty,
        })
    }

    /// Run against the process-wide catalog.
    pub fn run_installed(
        &self,
        invention: &str,
        params: &SimulationParameters,
        fidelity: FidelityLevel,
    ) -> MachinaResult<RunOutput> {
        let snapshot = global::current()?;
        self.run(invention, params, fidelity, &snapshot)
    }

    /// Independent runs in parallel. Outputs keep the order of `jobs`.
    pub fn run_batch(
        &self,
        jobs: &[(String, SimulationParameters)],
        fidelity: FidelityLevel,
        snapshot: &CatalogSnapshot,
    ) -> Vec<MachinaResult<RunOutput>> {
        jobs.par_iter()
            .map(|(invention, params)| self.run(invention, params, fidelity, snapshot))
            .collect()
    }

    fn quantify(
        &self,
        spec: &InventionSpec,
        params: &SimulationParameters,
        fidelity: FidelityLevel,
        catalog: &Catalog,
    ) -> MachinaResult<UncertaintyReport> {
        let stochastic = (spec.stochastic_inputs)(params);
        let resolved = resolve_all(&stochastic, catalog)?;
        let model = InventionModel {
            spec,
            params,
            fidelity,
            catalog,
            config: &self.config,
            stochastic: &stochastic,
            outputs: (spec.uq_outputs)(),
        };
        let engine = UqEngine::with_cancellation(
            UqConfig {
                seed: params.seed,
                ..self.config.uq.clone()
            },
            self.cancel.clone(),
        )?;
        engine.run(&resolved, &model)
    }
}

/// One invention seen by the uncertainty engine: sampled values in,
/// selected metrics out.
struct InventionModel<'a> {
    spec: &'a InventionSpec,
    params: &'a SimulationParameters,
    fidelity: FidelityLevel,
    catalog: &'a Catalog,
    config: &'a PipelineConfig,
    stochastic: &'a [StochasticInput],
    outputs: Vec<Quantity>,
}

impl UqModel for InventionModel<'_> {
    fn outputs(&self) -> Vec<String> {
        self.outputs.iter().map(Quantity::label).collect()
    }

    fn evaluate(&self, values: &[f64]) -> MachinaResult<Vec<f64>> {
        let mut params = self.params.clone();
        let mut catalog = Cow::Borrowed(self.catalog);
        for (input, value) in self.stochastic.iter().zip(values) {
            if let InputSource::Catalog { key } = &input.source {
                catalog = Cow::Owned(catalog.with_nominal(key, *value)?);
            }
            (self.spec.apply_input)(&mut params, &input.name, *value)?;
        }
        params.validate()?;

        let ctx = SimulationContext {
            params: &params,
            fidelity: self.fidelity,
            catalog: &catalog,
            config: self.config,
        };
        let result = (self.spec.simulate)(&ctx)?;
        self.outputs
            .iter()
            .map(|q| {
                q.measure(&result.metrics, &catalog)?.ok_or_else(|| {
                    MachinaError::Configuration(format!("{} is not produced by {}", q.label(), self.spec.kind))
                })
            })
            .collect()
    }
}

/// BEMT solve with one relaxed retry after `ConvergenceFailure`.
///
/// Returns the solution and the solver settings that produced it.
pub(crate) fn solve_rotor_with_retry(
    config: &RotorSolverConfig,
    geometry: &RotorGeometry,
    op: &OperatingPoint,
    flags: &mut ResultFlags,
) -> MachinaResult<(RotorSolution, RotorSolverConfig)> {
    match RotorSolver::new(config.clone())?.solve(geometry, op) {
        Ok(solution) => Ok((solution, config.clone())),
        Err(MachinaError::ConvergenceFailure {
            iterations, residual, ..
        }) => {
            let relaxed = config.relaxed();
            warn!(
                iterations,
                residual,
                tolerance = relaxed.tolerance,
                "BEMT did not converge, retrying with relaxed tolerance"
            );
            let solution = RotorSolver::new(relaxed.clone())?.solve(geometry, op)?;
            flags.relaxed_tolerance = true;
            flags.warnings.push(format!(
                "BEMT accepted at relaxed tolerance {:.1e} after residual {residual:.3e}",
                relaxed.tolerance
            ));
            Ok((solution, relaxed))
        }
        Err(e) => Err(e),
    }
}

/// Coupled structural response, falling back to one-way when the
/// two-way loop diverges or runs out of iterations.
pub(crate) fn couple_with_fallback<A: AeroLoadModel + ?Sized>(
    aero: &mut A,
    beam: &CantileverBeam,
    config: &CouplingConfig,
    flags: &mut ResultFlags,
) -> MachinaResult<StructuralResponse> {
    match couple(aero, beam, config) {
        Ok(solution) => Ok(solution.response),
        Err(e) if config.mode == CouplingMode::TwoWay && e.is_retryable() => {
            warn!(error = %e, "two-way coupling failed, reporting one-way response");
            flags.structural_fallback = true;
            flags.warnings.push(format!("one-way structural fallback: {e}"));
            Ok(one_way(aero, beam)?.response)
        }
        Err(e) => Err(e),
    }
}

/// Resolve the stochastic inputs an invention would sample, without running.
pub fn stochastic_inputs(
    registry: &Registry,
    invention: &str,
    params: &SimulationParameters,
    catalog: &Catalog,
) -> MachinaResult<Vec<ResolvedInput>> {
    let spec = registry.lookup(invention)?;
    resolve_all(&(spec.stochastic_inputs)(params), catalog)
}
