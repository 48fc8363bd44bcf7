// ─────────────────────────────────────────────────────────────────────
// Machina — Rotor BEMT
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Blade-element/momentum theory for an axially moving rotor.
//!
//! Each annulus balances the blade-element thrust against the momentum
//! thrust 4πρ r F |Vc + v| v dr by under-relaxed fixed-point iteration
//! on the induced velocity v. Prandtl's tip and root factors F account
//! for the finite blade count.

use machina_types::config::RotorSolverConfig;
use machina_types::constants::PRANDTL_FLOOR;
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::{RotorElementState, RotorSolution};
use std::f64::consts::PI;
use tracing::debug;

/// Halvings allowed when bracketing the uniform inflow.
const MOMENTUM_BISECTIONS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChordDistribution {
    Constant(f64),
    /// Linear taper between root cutout and tip [m].
    Linear { root: f64, tip: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TwistDistribution {
    /// Linear washout between root cutout and tip [rad].
    Linear { root: f64, tip: f64 },
    /// θ(r) = θ_tip·R/r, uniform inflow in hover.
    Ideal { tip: f64 },
    /// Constant-pitch screw surface, θ(r) = atan(p / 2πr).
    Helical { pitch: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorGeometry {
    pub radius: f64,
    /// Root cutout as a fraction of radius.
    pub root_cutout: f64,
    pub blade_count: usize,
    pub chord: ChordDistribution,
    pub twist: TwistDistribution,
}

/// One radial strip used by the solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Annulus {
    pub r: f64,
    pub dr: f64,
    pub chord: f64,
    pub twist: f64,
}

impl RotorGeometry {
    pub fn validate(&self) -> MachinaResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "rotor radius must be > 0, got {}",
                self.radius
            )));
        }
        if !(0.0..0.9).contains(&self.root_cutout) {
            return Err(MachinaError::Configuration(format!(
                "root cutout must be in [0, 0.9), got {}",
                self.root_cutout
            )));
        }
        if self.blade_count == 0 {
            return Err(MachinaError::Configuration(
                "rotor needs at least one blade".to_string(),
            ));
        }
        let chords = match self.chord {
            ChordDistribution::Constant(c) => [c, c],
            ChordDistribution::Linear { root, tip } => [root, tip],
        };
        if chords.iter().any(|c| !(c.is_finite() && *c > 0.0)) {
            return Err(MachinaError::Configuration("blade chord must be > 0".to_string()));
        }
        if let TwistDistribution::Helical { pitch } = self.twist {
            if !(pitch.is_finite() && pitch > 0.0) {
                return Err(MachinaError::Configuration(format!(
                    "screw pitch must be > 0, got {pitch}"
                )));
            }
        }
        Ok(())
    }

    pub fn root_radius(&self) -> f64 {
        self.root_cutout * self.radius
    }

    pub fn disk_area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// Swept area excluding the root cutout.
    pub fn annulus_area(&self) -> f64 {
        PI * (self.radius * self.radius - self.root_radius().powi(2))
    }

    /// Blade solidity Bc̄/(πR).
    pub fn solidity(&self) -> f64 {
        let mean_chord = match self.chord {
            ChordDistribution::Constant(c) => c,
            ChordDistribution::Linear { root, tip } => 0.5 * (root + tip),
        };
        self.blade_count as f64 * mean_chord / (PI * self.radius)
    }

    pub fn chord_at(&self, r: f64) -> f64 {
        match self.chord {
            ChordDistribution::Constant(c) => c,
            ChordDistribution::Linear { root, tip } => root + (tip - root) * self.span_fraction(r),
        }
    }

    pub fn twist_at(&self, r: f64) -> f64 {
        match self.twist {
            TwistDistribution::Linear { root, tip } => root + (tip - root) * self.span_fraction(r),
            TwistDistribution::Ideal { tip } => tip * self.radius / r,
            TwistDistribution::Helical { pitch } => pitch.atan2(2.0 * PI * r),
        }
    }

    fn span_fraction(&self, r: f64) -> f64 {
        let r0 = self.root_radius();
        (r - r0) / (self.radius - r0)
    }

    /// Equal-width strips from root cutout to tip, with optional elastic
    /// twist added per strip.
    pub(crate) fn annuli(&self, n: usize, elastic_twist: &[f64]) -> MachinaResult<Vec<Annulus>> {
        if !elastic_twist.is_empty() && elastic_twist.len() != n {
            return Err(MachinaError::Configuration(format!(
                "elastic twist has {} entries for {n} blade elements",
                elastic_twist.len()
            )));
        }
        let r0 = self.root_radius();
        let dr = (self.radius - r0) / n as f64;
        Ok((0..n)
            .map(|i| {
                let r = r0 + (i as f64 + 0.5) * dr;
                let offset = elastic_twist.get(i).copied().unwrap_or(0.0);
                Annulus {
                    r,
                    dr,
                    chord: self.chord_at(r),
                    twist: self.twist_at(r) + offset,
                }
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    /// Shaft speed Ω [rad/s].
    pub rotation_rate: f64,
    /// Axial (climb) velocity Vc [m/s].
    pub axial_velocity: f64,
    pub density: f64,
}

impl OperatingPoint {
    pub fn validate(&self) -> MachinaResult<()> {
        if !(self.rotation_rate.is_finite() && self.rotation_rate > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "rotation rate must be > 0, got {}",
                self.rotation_rate
            )));
        }
        // Descent through the vortex-ring state is outside momentum theory.
        if !(self.axial_velocity.is_finite() && self.axial_velocity >= 0.0) {
            return Err(MachinaError::Configuration(format!(
                "axial velocity must be >= 0, got {}",
                self.axial_velocity
            )));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "air density must be > 0, got {}",
                self.density
            )));
        }
        Ok(())
    }
}

/// Blade-element loads on one annulus at a given induced velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnnulusLoads {
    pub inflow_angle: f64,
    pub angle_of_attack: f64,
    pub lift_coefficient: f64,
    pub loss_factor: f64,
    pub thrust_blade_element: f64,
    pub thrust_momentum: f64,
    pub torque: f64,
    pub circulation: f64,
}

/// Combined Prandtl tip and root loss factor, floored away from zero.
pub fn prandtl_loss(
    blades: usize,
    r: f64,
    tip_radius: f64,
    root_radius: f64,
    inflow_angle: f64,
    tip: bool,
    root: bool,
) -> f64 {
    let s = (r * inflow_angle.sin()).abs();
    if s < 1e-12 {
        return 1.0;
    }
    let half_b = 0.5 * blades as f64;
    let factor = |distance: f64| (2.0 / PI) * (-(half_b * distance / s)).exp().acos();
    let mut f = 1.0;
    if tip {
        f *= factor(tip_radius - r);
    }
    if root && root_radius > 0.0 {
        f *= factor(r - root_radius);
    }
    f.max(PRANDTL_FLOOR)
}

/// Induced velocity satisfying |Vc + v|·v = k.
fn invert_momentum(k: f64, vc: f64) -> f64 {
    let disc = 0.25 * vc * vc + k;
    if disc >= 0.0 {
        -0.5 * vc + disc.sqrt()
    } else {
        -0.5 * (vc + (vc * vc - 4.0 * k).sqrt())
    }
}

/// Thrust of an ideal actuator disk, T = 2ρA(Vc + v)v.
pub fn actuator_disk_thrust(density: f64, area: f64, axial_velocity: f64, induced_velocity: f64) -> f64 {
    2.0 * density * area * (axial_velocity + induced_velocity) * induced_velocity
}

/// Ideal hover induced velocity for thrust T, v = √(T / 2ρA).
pub fn hover_induced_velocity(thrust: f64, density: f64, area: f64) -> f64 {
    (thrust.max(0.0) / (2.0 * density * area)).sqrt()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotorSolver {
    config: RotorSolverConfig,
}

impl RotorSolver {
    pub fn new(config: RotorSolverConfig) -> MachinaResult<Self> {
        if config.elements < 2 {
            return Err(MachinaError::Configuration(
                "BEMT needs at least 2 blade elements".to_string(),
            ));
        }
        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "BEMT tolerance must be > 0, got {}",
                config.tolerance
            )));
        }
        if config.max_iterations == 0 {
            return Err(MachinaError::Configuration(
                "BEMT max_iterations must be >= 1".to_string(),
            ));
        }
        if !(config.relaxation > 0.0 && config.relaxation <= 1.0) {
            return Err(MachinaError::Configuration(format!(
                "BEMT relaxation must be in (0, 1], got {}",
                config.relaxation
            )));
        }
        if !(config.lift_slope > 0.0 && config.cl_max > 0.0) {
            return Err(MachinaError::Configuration(
                "blade lift slope and cl_max must be > 0".to_string(),
            ));
        }
        Ok(RotorSolver { config })
    }

    pub fn config(&self) -> &RotorSolverConfig {
        &self.config
    }

    pub fn solve(&self, geometry: &RotorGeometry, op: &OperatingPoint) -> MachinaResult<RotorSolution> {
        self.solve_deformed(geometry, op, &[])
    }

    /// Uniform-inflow momentum estimate. A single induced velocity is
    /// found where the summed blade-element thrust equals the actuator-disk
    /// thrust over the swept annulus. Power is the ideal induced power plus
    /// the σCd₀/8 profile term.
    pub fn momentum_estimate(&self, geometry: &RotorGeometry, op: &OperatingPoint) -> MachinaResult<RotorSolution> {
        geometry.validate()?;
        op.validate()?;
        let annuli = geometry.annuli(self.config.elements, &[])?;
        let area = geometry.annulus_area();
        let excess = |v: f64| {
            let blade: f64 = annuli
                .iter()
                .map(|an| self.loads(an, geometry, op, v).thrust_blade_element)
                .sum();
            blade - actuator_disk_thrust(op.density, area, op.axial_velocity, v)
        };

        let (mut lo, mut hi) = (0.0, op.rotation_rate * geometry.radius);
        let mut iterations = 0;
        if excess(lo) > 0.0 {
            while excess(hi) > 0.0 {
                hi *= 2.0;
                iterations += 1;
                if iterations > 60 {
                    return Err(MachinaError::ConvergenceFailure {
                        iterations,
                        residual: excess(hi),
                        context: "uniform inflow bracket".to_string(),
                    });
                }
            }
            while hi - lo > self.config.tolerance * 1e-3 * hi && iterations < MOMENTUM_BISECTIONS {
                let mid = 0.5 * (lo + hi);
                if excess(mid) > 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
                iterations += 1;
            }
        } else {
            hi = 0.0;
        }
        let v = 0.5 * (lo + hi);

        let elements: Vec<RotorElementState> = annuli
            .iter()
            .map(|an| element_state(an, &self.loads(an, geometry, op, v), v, iterations))
            .collect();
        let thrust_blade_element: f64 = elements.iter().map(|e| e.thrust).sum();
        let thrust = actuator_disk_thrust(op.density, area, op.axial_velocity, v);
        let tip_speed = op.rotation_rate * geometry.radius;
        let profile = geometry.solidity() * self.config.profile_drag / 8.0
            * op.density
            * geometry.disk_area()
            * tip_speed.powi(3);
        let power = thrust * (op.axial_velocity + v) + profile;
        let (ct, cp, fm) = coefficients(thrust, power, geometry, op);
        debug!(thrust, power, induced_velocity = v, iterations, "momentum estimate");
        Ok(RotorSolution {
            elements,
            thrust,
            torque: power / op.rotation_rate,
            power,
            thrust_blade_element,
            thrust_momentum: thrust,
            thrust_coefficient: ct,
            power_coefficient: cp,
            figure_of_merit: fm,
            mean_induced_velocity: v,
            iterations,
            residual: if thrust.abs() > 0.0 {
                (thrust_blade_element - thrust).abs() / thrust.abs()
            } else {
                0.0
            },
            wake_refined: false,
        })
    }

    /// Solve with per-element elastic twist added to the blade pitch.
    pub fn solve_deformed(
        &self,
        geometry: &RotorGeometry,
        op: &OperatingPoint,
        elastic_twist: &[f64],
    ) -> MachinaResult<RotorSolution> {
        geometry.validate()?;
        op.validate()?;
        let annuli = geometry.annuli(self.config.elements, elastic_twist)?;

        let mut elements = Vec::with_capacity(annuli.len());
        let mut momentum_total = 0.0;
        let mut allowance = f64::EPSILON;
        let mut max_iterations = 0;
        for (i, annulus) in annuli.iter().enumerate() {
            let (v, iterations) = self.balance_annulus(i, annulus, geometry, op)?;
            let loads = self.loads(annulus, geometry, op, v);
            momentum_total += loads.thrust_momentum;
            allowance += self.config.tolerance
                * loads.thrust_blade_element.abs().max(thrust_floor(annulus, geometry, op));
            max_iterations = max_iterations.max(iterations);
            elements.push(element_state(annulus, &loads, v, iterations));
        }

        let solution = assemble(elements, momentum_total, geometry, op, max_iterations, false);
        let imbalance = (solution.thrust_blade_element - solution.thrust_momentum).abs();
        if imbalance > allowance {
            return Err(MachinaError::ConvergenceFailure {
                iterations: max_iterations,
                residual: solution.residual,
                context: "rotor thrust balance".to_string(),
            });
        }
        debug!(
            thrust = solution.thrust,
            power = solution.power,
            ct = solution.thrust_coefficient,
            iterations = max_iterations,
            "BEMT converged"
        );

        match &self.config.wake {
            Some(wake) => crate::wake::refine(self, geometry, op, &annuli, solution, wake),
            None => Ok(solution),
        }
    }

    /// Fixed-point iteration on one annulus. Returns (v, iterations).
    fn balance_annulus(
        &self,
        index: usize,
        annulus: &Annulus,
        geometry: &RotorGeometry,
        op: &OperatingPoint,
    ) -> MachinaResult<(f64, usize)> {
        let floor = thrust_floor(annulus, geometry, op);
        let mut v = 0.0;
        let mut residual = f64::INFINITY;
        for iteration in 1..=self.config.max_iterations {
            let loads = self.loads(annulus, geometry, op, v);
            let be = loads.thrust_blade_element;
            let mt = loads.thrust_momentum;
            residual = (be - mt).abs() / be.abs().max(floor);
            if residual <= self.config.tolerance {
                return Ok((v, iteration));
            }
            let k = be / (4.0 * PI * op.density * annulus.r * loads.loss_factor * annulus.dr);
            let target = invert_momentum(k, op.axial_velocity);
            v += self.config.relaxation * (target - v);
            if !v.is_finite() {
                return Err(MachinaError::NumericalInstability {
                    step: iteration,
                    quantity: "induced velocity".to_string(),
                    context: format!("BEMT element {index} at r = {:.4} m", annulus.r),
                });
            }
        }
        Err(MachinaError::ConvergenceFailure {
            iterations: self.config.max_iterations,
            residual,
            context: format!("BEMT element {index} at r = {:.4} m", annulus.r),
        })
    }

    pub(crate) fn loads(
        &self,
        annulus: &Annulus,
        geometry: &RotorGeometry,
        op: &OperatingPoint,
        v: f64,
    ) -> AnnulusLoads {
        let blades = geometry.blade_count as f64;
        let tangential = op.rotation_rate * annulus.r;
        let axial = op.axial_velocity + v;
        let phi = axial.atan2(tangential);
        let alpha = annulus.twist - phi;
        let cl = (self.config.lift_slope * alpha).clamp(-self.config.cl_max, self.config.cl_max);
        let cd = self.config.profile_drag;
        let w2 = tangential * tangential + axial * axial;
        let f = prandtl_loss(
            geometry.blade_count,
            annulus.r,
            geometry.radius,
            geometry.root_radius(),
            phi,
            self.config.tip_loss,
            self.config.root_loss,
        );
        let q_c_dr = 0.5 * op.density * w2 * annulus.chord * annulus.dr;
        AnnulusLoads {
            inflow_angle: phi,
            angle_of_attack: alpha,
            lift_coefficient: cl,
            loss_factor: f,
            thrust_blade_element: blades * q_c_dr * (cl * phi.cos() - cd * phi.sin()),
            thrust_momentum: 4.0 * PI * op.density * annulus.r * f * axial.abs() * v * annulus.dr,
            torque: blades * q_c_dr * (cl * phi.sin() + cd * phi.cos()) * annulus.r,
            circulation: 0.5 * w2.sqrt() * annulus.chord * cl,
        }
    }
}

/// Thrust magnitude below which an annulus counts as unloaded [N].
fn thrust_floor(annulus: &Annulus, geometry: &RotorGeometry, op: &OperatingPoint) -> f64 {
    1e-9 * op.density * (op.rotation_rate * geometry.radius).powi(2) * annulus.chord * annulus.dr
}

pub(crate) fn element_state(annulus: &Annulus, loads: &AnnulusLoads, v: f64, iterations: usize) -> RotorElementState {
    RotorElementState {
        radius: annulus.r,
        width: annulus.dr,
        chord: annulus.chord,
        twist: annulus.twist,
        induced_velocity: v,
        inflow_angle: loads.inflow_angle,
        angle_of_attack: loads.angle_of_attack,
        lift_coefficient: loads.lift_coefficient,
        loss_factor: loads.loss_factor,
        thrust: loads.thrust_blade_element,
        torque: loads.torque,
        circulation: loads.circulation,
        iterations,
    }
}

/// Thrust coefficient, power coefficient and figure of merit.
fn coefficients(thrust: f64, power: f64, geometry: &RotorGeometry, op: &OperatingPoint) -> (f64, f64, f64) {
    let area = geometry.disk_area();
    let tip_speed = op.rotation_rate * geometry.radius;
    let ct = thrust / (op.density * area * tip_speed.powi(2));
    let cp = power / (op.density * area * tip_speed.powi(3));
    let fm = if ct > 0.0 && cp > 0.0 {
        ct.powf(1.5) / (std::f64::consts::SQRT_2 * cp)
    } else {
        0.0
    };
    (ct, cp, fm)
}

/// Integrate element loads into rotor totals and non-dimensional coefficients.
pub(crate) fn assemble(
    elements: Vec<RotorElementState>,
    thrust_momentum: f64,
    geometry: &RotorGeometry,
    op: &OperatingPoint,
    iterations: usize,
    wake_refined: bool,
) -> RotorSolution {
    let thrust: f64 = elements.iter().map(|e| e.thrust).sum();
    let torque: f64 = elements.iter().map(|e| e.torque).sum();
    let power = torque * op.rotation_rate;
    let (ct, cp, fm) = coefficients(thrust, power, geometry, op);
    let weight: f64 = elements.iter().map(|e| e.radius * e.width).sum();
    let mean_induced_velocity = if weight > 0.0 {
        elements.iter().map(|e| e.induced_velocity * e.radius * e.width).sum::<f64>() / weight
    } else {
        0.0
    };
    let residual = if thrust.abs() > 0.0 {
        (thrust - thrust_momentum).abs() / thrust.abs()
    } else {
        0.0
    };
    RotorSolution {
        elements,
        thrust,
        torque,
        power,
        thrust_blade_element: thrust,
        thrust_momentum,
        thrust_coefficient: ct,
        power_coefficient: cp,
        figure_of_merit: fm,
        mean_induced_velocity,
        iterations,
        residual,
        wake_refined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hover_rotor() -> RotorGeometry {
        RotorGeometry {
            radius: 2.0,
            root_cutout: 0.15,
            blade_count: 3,
            chord: ChordDistribution::Constant(0.2),
            twist: TwistDistribution::Linear {
                root: 12f64.to_radians(),
                tip: 6f64.to_radians(),
            },
        }
    }

    fn hover_op() -> OperatingPoint {
        OperatingPoint {
            rotation_rate: 5.0,
            axial_velocity: 0.0,
            density: 1.225,
        }
    }

    #[test]
    fn test_hover_matches_actuator_disk() {
        let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        let geom = hover_rotor();
        let sol = solver.solve(&geom, &hover_op()).unwrap();
        assert!(sol.thrust > 0.0);
        let disk = actuator_disk_thrust(1.225, geom.annulus_area(), 0.0, sol.mean_induced_velocity);
        assert!(
            (disk - sol.thrust).abs() / sol.thrust < 0.15,
            "BEMT {} vs actuator disk {}",
            sol.thrust,
            disk
        );
        assert!(sol.iterations < 50, "iterations {}", sol.iterations);
        assert!(sol.residual < 1e-3);
    }

    #[test]
    fn test_momentum_estimate_is_an_actuator_disk() {
        let config = RotorSolverConfig {
            tip_loss: false,
            root_loss: false,
            ..RotorSolverConfig::default()
        };
        let solver = RotorSolver::new(config).unwrap();
        let geometry = hover_rotor();
        let op = hover_op();
        let est = solver.momentum_estimate(&geometry, &op).unwrap();
        let v = est.mean_induced_velocity;
        assert!(v > 0.0);
        assert!(est.elements.iter().all(|e| e.induced_velocity == v));
        let disk = actuator_disk_thrust(op.density, geometry.annulus_area(), 0.0, v);
        assert!((est.thrust - disk).abs() <= 1e-12 * disk);
        assert!(est.residual < 1e-3, "residual {}", est.residual);
        assert!(est.power > est.thrust * v);
        assert!(!est.wake_refined);

        let bemt = solver.solve(&geometry, &op).unwrap();
        let rel = (est.thrust - bemt.thrust).abs() / bemt.thrust;
        assert!(rel < 0.15, "momentum {} vs bemt {}", est.thrust, bemt.thrust);
    }

    #[test]
    fn test_blade_element_and_momentum_thrust_agree() {
        let config = RotorSolverConfig::default();
        let solver = RotorSolver::new(config.clone()).unwrap();
        let sol = solver.solve(&hover_rotor(), &hover_op()).unwrap();
        let rel = (sol.thrust_blade_element - sol.thrust_momentum).abs() / sol.thrust_blade_element;
        assert!(rel <= config.tolerance, "imbalance {rel}");
        for e in &sol.elements {
            assert!(e.loss_factor >= PRANDTL_FLOOR && e.loss_factor <= 1.0);
        }
    }

    #[test]
    fn test_figure_of_merit_below_one() {
        let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        let sol = solver.solve(&hover_rotor(), &hover_op()).unwrap();
        assert!(sol.figure_of_merit > 0.0 && sol.figure_of_merit < 1.0);
        assert!(sol.power > 0.0);
    }

    #[test]
    fn test_tip_loss_reduces_thrust() {
        let with = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        let without = RotorSolver::new(RotorSolverConfig {
            tip_loss: false,
            root_loss: false,
            ..RotorSolverConfig::default()
        })
        .unwrap();
        let a = with.solve(&hover_rotor(), &hover_op()).unwrap();
        let b = without.solve(&hover_rotor(), &hover_op()).unwrap();
        assert!(a.thrust < b.thrust);
        assert!(b.elements.iter().all(|e| e.loss_factor == 1.0));
    }

    #[test]
    fn test_climb_reduces_thrust() {
        let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        let hover = solver.solve(&hover_rotor(), &hover_op()).unwrap();
        let climb = solver
            .solve(
                &hover_rotor(),
                &OperatingPoint {
                    axial_velocity: 1.0,
                    ..hover_op()
                },
            )
            .unwrap();
        assert!(climb.thrust < hover.thrust);
    }

    #[test]
    fn test_helical_screw_twist() {
        let geom = RotorGeometry {
            radius: 2.4,
            root_cutout: 0.3,
            blade_count: 2,
            chord: ChordDistribution::Constant(0.6),
            twist: TwistDistribution::Helical { pitch: 1.2 },
        };
        let r = 1.2;
        assert!((geom.twist_at(r) - (1.2f64 / (2.0 * PI * r)).atan()).abs() < 1e-12);
        let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        let sol = solver
            .solve(
                &geom,
                &OperatingPoint {
                    rotation_rate: 2.0,
                    axial_velocity: 0.0,
                    density: 1.225,
                },
            )
            .unwrap();
        assert!(sol.thrust > 0.0 && sol.thrust.is_finite());
    }

    #[test]
    fn test_ideal_twist_gives_near_uniform_inflow() {
        let geom = RotorGeometry {
            root_cutout: 0.3,
            twist: TwistDistribution::Ideal { tip: 5f64.to_radians() },
            ..hover_rotor()
        };
        let solver = RotorSolver::new(RotorSolverConfig {
            tip_loss: false,
            root_loss: false,
            ..RotorSolverConfig::default()
        })
        .unwrap();
        let sol = solver.solve(&geom, &hover_op()).unwrap();
        let v: Vec<f64> = sol.elements.iter().map(|e| e.induced_velocity).collect();
        let max = v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = v.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!((max - min) / max < 0.05, "inflow spread {min}..{max}");
    }

    #[test]
    fn test_iteration_budget_exhaustion() {
        let solver = RotorSolver::new(RotorSolverConfig {
            max_iterations: 2,
            tolerance: 1e-12,
            ..RotorSolverConfig::default()
        })
        .unwrap();
        match solver.solve(&hover_rotor(), &hover_op()) {
            Err(MachinaError::ConvergenceFailure { iterations, residual, .. }) => {
                assert_eq!(iterations, 2);
                assert!(residual > 0.0);
            }
            other => panic!("expected ConvergenceFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_operating_point() {
        let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        for op in [
            OperatingPoint { rotation_rate: 0.0, ..hover_op() },
            OperatingPoint { axial_velocity: -1.0, ..hover_op() },
        ] {
            assert!(matches!(
                solver.solve(&hover_rotor(), &op),
                Err(MachinaError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_elastic_twist_length_checked() {
        let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();
        assert!(solver.solve_deformed(&hover_rotor(), &hover_op(), &[0.0; 3]).is_err());
        let nose_up = vec![0.01; RotorSolverConfig::default().elements];
        let base = solver.solve(&hover_rotor(), &hover_op()).unwrap();
        let twisted = solver.solve_deformed(&hover_rotor(), &hover_op(), &nose_up).unwrap();
        assert!(twisted.thrust > base.thrust);
    }

    #[test]
    fn test_momentum_inversion() {
        for (k, vc) in [(4.0, 0.0), (4.0, 2.0), (-1.0, 3.0), (-4.0, 0.0), (-4.0, 1.0)] {
            let v = invert_momentum(k, vc);
            assert!(((vc + v).abs() * v - k).abs() < 1e-10, "k {k}, vc {vc}, v {v}");
        }
    }
}
