//! Prescribed helical vortex wake.
//!
//! Starting from the BEMT inflow, the blade circulation is shed as
//! trailing filaments from every element edge and convected on rigid
//! helices at the local axial velocity. Induced velocity at each blade
//! element is the Biot–Savart sum over all filaments of all blades. The
//! inflow is relaxed toward that sum and the helices are rebuilt until
//! the inflow settles.

use crate::rotor::{assemble, element_state, Annulus, OperatingPoint, RotorGeometry, RotorSolver};
use machina_types::config::WakeConfig;
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::RotorSolution;
use std::f64::consts::PI;
use tracing::{debug, warn};

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Velocity induced at `p` by a straight filament a→b of strength `gamma`,
/// with a cut-off core of radius `core`.
pub fn segment_velocity(p: Vec3, a: Vec3, b: Vec3, gamma: f64, core: f64) -> Vec3 {
    let r1 = sub(p, a);
    let r2 = sub(p, b);
    let r0 = sub(b, a);
    let n1 = dot(r1, r1).sqrt();
    let n2 = dot(r2, r2).sqrt();
    let l2 = dot(r0, r0);
    if n1 < 1e-12 || n2 < 1e-12 || l2 < 1e-24 {
        return [0.0; 3];
    }
    let c = cross(r1, r2);
    let denom = dot(c, c) + core * core * l2;
    if denom < 1e-300 {
        return [0.0; 3];
    }
    let k = gamma / (4.0 * PI * denom) * (dot(r0, r1) / n1 - dot(r0, r2) / n2);
    [c[0] * k, c[1] * k, c[2] * k]
}

/// Filament nodes of one helix, young to old.
fn helix(radius: f64, azimuth0: f64, descent_per_radian: f64, nodes: usize, d_age: f64) -> Vec<Vec3> {
    (0..nodes)
        .map(|m| {
            let age = m as f64 * d_age;
            let psi = azimuth0 - age;
            [radius * psi.cos(), radius * psi.sin(), -descent_per_radian * age]
        })
        .collect()
}

/// Axial induced velocity (positive down through the disk) at each element.
fn induced_from_wake(
    annuli: &[Annulus],
    circulation: &[f64],
    inflow: &[f64],
    geometry: &RotorGeometry,
    op: &OperatingPoint,
    config: &WakeConfig,
) -> Vec<f64> {
    let n = annuli.len();
    let d_age = 2.0 * PI / config.segments_per_revolution as f64;
    let nodes = (config.revolutions * config.segments_per_revolution as f64).ceil() as usize + 1;
    let core = config.core_radius * geometry.radius;
    let min_convection = 1e-3 * op.rotation_rate * geometry.radius;

    // Edge j sits between element j−1 and j; strength Γ_in − Γ_out.
    let mut edges = Vec::with_capacity(n + 1);
    for j in 0..=n {
        let radius = if j < n {
            annuli[j].r - 0.5 * annuli[j].dr
        } else {
            annuli[n - 1].r + 0.5 * annuli[n - 1].dr
        };
        let inner = if j > 0 { circulation[j - 1] } else { 0.0 };
        let outer = if j < n { circulation[j] } else { 0.0 };
        let v_edge = match j {
            0 => inflow[0],
            j if j == n => inflow[n - 1],
            j => 0.5 * (inflow[j - 1] + inflow[j]),
        };
        let convection = (op.axial_velocity + v_edge).max(min_convection);
        edges.push((radius, inner - outer, convection / op.rotation_rate));
    }

    let blades = geometry.blade_count;
    let mut filaments = Vec::with_capacity(blades * edges.len());
    for b in 0..blades {
        let azimuth0 = 2.0 * PI * b as f64 / blades as f64;
        for &(radius, strength, descent) in &edges {
            if strength != 0.0 {
                filaments.push((strength, helix(radius, azimuth0, descent, nodes, d_age)));
            }
        }
    }

    annuli
        .iter()
        .map(|an| {
            let p = [an.r, 0.0, 0.0];
            let w: f64 = filaments
                .iter()
                .map(|(gamma, pts)| {
                    pts.windows(2)
                        .map(|s| segment_velocity(p, s[0], s[1], *gamma, core)[2])
                        .sum::<f64>()
                })
                .sum();
            -w
        })
        .collect()
}

pub(crate) fn refine(
    solver: &RotorSolver,
    geometry: &RotorGeometry,
    op: &OperatingPoint,
    annuli: &[Annulus],
    bemt: RotorSolution,
    config: &WakeConfig,
) -> MachinaResult<RotorSolution> {
    if config.segments_per_revolution < 4 || !(config.revolutions > 0.0) {
        return Err(MachinaError::Configuration(
            "vortex wake needs >= 4 segments per revolution and > 0 revolutions".to_string(),
        ));
    }
    if !(config.relaxation > 0.0 && config.relaxation <= 1.0) {
        return Err(MachinaError::Configuration(format!(
            "wake relaxation must be in (0, 1], got {}",
            config.relaxation
        )));
    }

    let mut inflow: Vec<f64> = bemt.elements.iter().map(|e| e.induced_velocity).collect();
    let mut iterations = 0;
    let mut change = f64::INFINITY;
    while iterations < config.max_iterations {
        iterations += 1;
        let circulation: Vec<f64> = annuli
            .iter()
            .zip(&inflow)
            .map(|(an, &v)| solver.loads(an, geometry, op, v).circulation)
            .collect();
        let target = induced_from_wake(annuli, &circulation, &inflow, geometry, op, config);
        let scale = inflow.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1e-9);
        change = 0.0;
        for (v, t) in inflow.iter_mut().zip(&target) {
            let dv = config.relaxation * (t - *v);
            change = f64::max(change, dv.abs() / scale);
            *v += dv;
        }
        if inflow.iter().any(|v| !v.is_finite()) {
            return Err(MachinaError::NumericalInstability {
                step: iterations,
                quantity: "wake induced velocity".to_string(),
                context: "prescribed vortex wake".to_string(),
            });
        }
        if change < config.tolerance {
            break;
        }
    }
    if change >= config.tolerance {
        warn!(
            iterations,
            change, "vortex wake did not settle, keeping the BEMT inflow"
        );
        return Ok(bemt);
    }

    let mut momentum = 0.0;
    let elements = annuli
        .iter()
        .zip(&inflow)
        .map(|(an, &v)| {
            let loads = solver.loads(an, geometry, op, v);
            momentum += loads.thrust_momentum;
            element_state(an, &loads, v, iterations)
        })
        .collect();
    let solution = assemble(elements, momentum, geometry, op, bemt.iterations.max(iterations), true);
    debug!(
        bemt_thrust = bemt.thrust,
        wake_thrust = solution.thrust,
        iterations,
        "vortex wake refinement finished"
    );
    Ok(solution)
}
