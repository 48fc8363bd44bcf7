// ─────────────────────────────────────────────────────────────────────
// Machina — Fluid-Structure Coupling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Loose fluid-structure coupling.
//!
//! One-way: aerodynamic loads on the rigid shape deform the beam once.
//! Two-way: the elastic twist is fed back into the aerodynamic model and
//! the outer loop repeats until the deflection change between passes
//! drops below the displacement tolerance.

use crate::beam::{BeamDeflection, CantileverBeam};
use machina_types::config::{CouplingConfig, CouplingMode};
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::StructuralResponse;
use tracing::{debug, warn};

/// Spanwise distributed loads at the beam stations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanLoads {
    /// Lift per unit span [N/m].
    pub lift: Vec<f64>,
    /// Nose-up torque per unit span about the spar [N·m/m].
    pub torque: Vec<f64>,
}

/// Aerodynamic side of the coupling loop.
pub trait AeroLoadModel {
    /// Loads at `stations` [m from root] with the given elastic twist [rad].
    fn span_loads(&mut self, stations: &[f64], elastic_twist: &[f64]) -> MachinaResult<SpanLoads>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoupledSolution {
    pub response: StructuralResponse,
    pub loads: SpanLoads,
}

fn to_response(
    mode: CouplingMode,
    beam: &CantileverBeam,
    d: BeamDeflection,
    outer_iterations: usize,
) -> StructuralResponse {
    StructuralResponse {
        mode,
        stations: beam.stations().to_vec(),
        deflection: d.deflection,
        twist: d.twist,
        root_moment: d.root_moment,
        peak_stress: d.peak_stress,
        tip_deflection: d.tip_deflection,
        outer_iterations,
        membrane: None,
    }
}

pub fn couple<A: AeroLoadModel + ?Sized>(
    aero: &mut A,
    beam: &CantileverBeam,
    config: &CouplingConfig,
) -> MachinaResult<CoupledSolution> {
    match config.mode {
        CouplingMode::OneWay => one_way(aero, beam),
        CouplingMode::TwoWay => two_way(aero, beam, config),
    }
}

pub fn one_way<A: AeroLoadModel + ?Sized>(aero: &mut A, beam: &CantileverBeam) -> MachinaResult<CoupledSolution> {
    let n = beam.stations().len();
    let loads = aero.span_loads(beam.stations(), &vec![0.0; n])?;
    let d = beam.solve(&loads.lift, &loads.torque)?;
    debug!(tip_deflection = d.tip_deflection, peak_stress = d.peak_stress, "one-way coupling");
    Ok(CoupledSolution {
        response: to_response(CouplingMode::OneWay, beam, d, 1),
        loads,
    })
}

fn two_way<A: AeroLoadModel + ?Sized>(
    aero: &mut A,
    beam: &CantileverBeam,
    config: &CouplingConfig,
) -> MachinaResult<CoupledSolution> {
    if !(config.relaxation > 0.0 && config.relaxation <= 1.0) {
        return Err(MachinaError::Configuration(format!(
            "coupling relaxation must be in (0, 1], got {}",
            config.relaxation
        )));
    }
    let n = beam.stations().len();
    let mut twist = vec![0.0; n];
    let mut previous: Option<Vec<f64>> = None;
    let mut last_change = f64::INFINITY;
    let mut growing = 0;

    for iteration in 1..=config.max_outer_iterations {
        let loads = aero.span_loads(beam.stations(), &twist)?;
        let d = beam.solve(&loads.lift, &loads.torque)?;

        let peak_twist = d.twist.iter().fold(0.0_f64, |m, t| m.max(t.abs()));
        if !peak_twist.is_finite() || peak_twist > config.max_twist {
            return Err(MachinaError::StructuralInstability {
                iteration,
                message: format!(
                    "elastic twist {peak_twist:.4} rad exceeds limit {:.4} rad",
                    config.max_twist
                ),
            });
        }

        let change = match &previous {
            Some(prev) => prev
                .iter()
                .zip(&d.deflection)
                .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs())),
            None => f64::INFINITY,
        };
        if change.is_finite() && last_change.is_finite() && change > last_change {
            growing += 1;
            if growing >= 3 {
                return Err(MachinaError::StructuralInstability {
                    iteration,
                    message: format!("deflection change growing ({change:.3e} m after {last_change:.3e} m)"),
                });
            }
        } else {
            growing = 0;
        }

        if change < config.displacement_tolerance {
            debug!(iterations = iteration, change, "two-way coupling converged");
            return Ok(CoupledSolution {
                response: to_response(CouplingMode::TwoWay, beam, d, iteration),
                loads,
            });
        }

        for (t, target) in twist.iter_mut().zip(&d.twist) {
            *t += config.relaxation * (target - *t);
        }
        previous = Some(d.deflection);
        last_change = change;
    }

    warn!(
        iterations = config.max_outer_iterations,
        change = last_change,
        "two-way coupling exhausted its outer iterations"
    );
    Err(MachinaError::ConvergenceFailure {
        iterations: config.max_outer_iterations,
        residual: last_change,
        context: "two-way fluid-structure coupling".to_string(),
    })
}
