// ─────────────────────────────────────────────────────────────────────
// Machina — Unsteady Aerodynamics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thin-airfoil unsteady lift for an oscillating wing section.
//!
//! Circulatory lift follows the Wagner indicial response, integrated as a
//! Duhamel superposition with two recursive deficiency states. Its
//! harmonic limit is Theodorsen's C(k). Non-circulatory (added-mass)
//! lift and moment come from Theodorsen's closed form.
//!
//! Sign conventions: plunge h positive down, pitch α nose up, lift up,
//! moment nose up about the elastic axis at x = a·b aft of mid-chord.

use crate::kinematics::{KinematicSample, Kinematics};
use machina_math::theodorsen::{theodorsen, WagnerDeficiency};
use machina_types::config::UnsteadyConfig;
use machina_types::constants::{K_UNSTEADY_LIMIT, WAGNER_A1, WAGNER_A2, WAGNER_B1, WAGNER_B2};
use machina_types::error::{ensure_finite, MachinaError, MachinaResult};
use machina_types::state::{AeroHistory, AerodynamicState};
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Rigid 2D section geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingSection {
    /// Semi-chord b [m].
    pub semi_chord: f64,
    /// Elastic axis position a in semi-chords from mid-chord (−1 = leading edge).
    pub elastic_axis: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsteadyModel {
    pub section: WingSection,
    /// Freestream speed V [m/s].
    pub airspeed: f64,
    pub density: f64,
    pub config: UnsteadyConfig,
}

impl UnsteadyModel {
    pub fn new(
        section: WingSection,
        airspeed: f64,
        density: f64,
        config: UnsteadyConfig,
    ) -> MachinaResult<Self> {
        if !(airspeed.is_finite() && airspeed > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "airspeed must be > 0 for unsteady aerodynamics, got {airspeed}"
            )));
        }
        if !(section.semi_chord.is_finite() && section.semi_chord > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "semi-chord must be > 0, got {}",
                section.semi_chord
            )));
        }
        if !(-1.0..=1.0).contains(&section.elastic_axis) {
            return Err(MachinaError::Configuration(format!(
                "elastic axis must lie on the chord (−1 ≤ a ≤ 1), got {}",
                section.elastic_axis
            )));
        }
        if !(density.is_finite() && density > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "air density must be > 0, got {density}"
            )));
        }
        if !(config.lift_slope.is_finite() && config.lift_slope > 0.0) {
            return Err(MachinaError::Configuration(
                "section lift slope must be > 0".to_string(),
            ));
        }
        Ok(UnsteadyModel {
            section,
            airspeed,
            density,
            config,
        })
    }

    /// k = ωb/V for an oscillation at `frequency` Hz.
    pub fn reduced_frequency(&self, frequency: f64) -> f64 {
        2.0 * PI * frequency * self.section.semi_chord / self.airspeed
    }

    /// Dynamic pressure times chord, the lift normalisation [N/m].
    fn lift_scale(&self) -> f64 {
        self.density * self.airspeed * self.airspeed * self.section.semi_chord
    }

    /// Step-by-step integrator starting from an empty wake.
    pub fn stepper(&self, reduced_frequency: f64) -> UnsteadyStepper<'_> {
        // A₁ + A₂ = ½ with decaying states keeps the circulatory fraction of
        // a step input in [0.5, 1], the same band as |C(k)|.
        debug_assert!(WAGNER_A1 + WAGNER_A2 == 0.5 && WAGNER_B1 > 0.0 && WAGNER_B2 > 0.0);
        UnsteadyStepper {
            model: self,
            deficiency: WagnerDeficiency::default(),
            previous: None,
            step: 0,
            reduced_frequency,
        }
    }

    /// Integrate the full kinematic history and average the final cycle.
    pub fn simulate(&self, kinematics: &Kinematics) -> MachinaResult<AeroHistory> {
        let frequency = kinematics.frequency();
        let k = self.reduced_frequency(frequency);
        if k > K_UNSTEADY_LIMIT {
            warn!(
                reduced_frequency = k,
                "reduced frequency beyond thin-airfoil validity, loads are indicative only"
            );
        }
        let steady_time =
            self.config.steady_distance * self.section.semi_chord / self.airspeed;
        let (dt, samples) = kinematics.discretize(
            self.config.steps_per_cycle,
            self.config.cycles,
            steady_time,
        )?;

        let mut stepper = self.stepper(k);
        let mut states = Vec::with_capacity(samples.len());
        let mut power = Vec::with_capacity(samples.len());
        for sample in &samples {
            let state = stepper.step(sample)?;
            power.push(state.lift * sample.h_dot - state.moment * sample.alpha_dot);
            states.push(state);
        }

        let window = if frequency > 0.0 {
            ((1.0 / (frequency * dt)).round() as usize).clamp(1, states.len())
        } else {
            (states.len() / 4).max(1)
        };
        let tail = &states[states.len() - window..];
        let mean = |f: fn(&AerodynamicState) -> f64| tail.iter().map(f).sum::<f64>() / window as f64;
        let mean_lift = mean(|s| s.lift);
        let mean_thrust = mean(|s| s.thrust);
        let mean_power = power[power.len() - window..].iter().sum::<f64>() / window as f64;
        let peak_lift = tail.iter().map(|s| s.lift.abs()).fold(0.0, f64::max);

        debug!(
            reduced_frequency = k,
            mean_lift,
            mean_thrust,
            mean_power,
            steps = states.len(),
            "unsteady section simulated"
        );

        Ok(AeroHistory {
            states,
            mean_lift,
            mean_thrust,
            mean_power,
            peak_lift,
            reduced_frequency: k,
            quasi_steady: self.config.quasi_steady,
        })
    }
}

/// Incremental time-marching state. Memory is constant in history length.
#[derive(Debug, Clone)]
pub struct UnsteadyStepper<'a> {
    model: &'a UnsteadyModel,
    deficiency: WagnerDeficiency,
    /// (time, quasi-steady angle) of the previous step.
    previous: Option<(f64, f64)>,
    step: usize,
    reduced_frequency: f64,
}

impl UnsteadyStepper<'_> {
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn step(&mut self, s: &KinematicSample) -> MachinaResult<AerodynamicState> {
        let m = self.model;
        let b = m.section.semi_chord;
        let a = m.section.elastic_axis;
        let v = m.airspeed;
        let rho = m.density;

        // Downwash at the three-quarter chord expressed as an angle.
        let alpha_qs = s.alpha + s.h_dot / v + b * (0.5 - a) * s.alpha_dot / v;

        let alpha_effective = if m.config.quasi_steady {
            alpha_qs
        } else {
            match self.previous {
                None => {
                    let start = if m.config.impulsive_start { 0.0 } else { alpha_qs };
                    self.deficiency.update(alpha_qs - start, 0.0);
                }
                Some((t_prev, alpha_prev)) => {
                    let ds = v * (s.t - t_prev) / b;
                    self.deficiency.update(alpha_qs - alpha_prev, ds);
                }
            }
            if !self.deficiency.is_finite() {
                return Err(MachinaError::NumericalInstability {
                    step: self.step,
                    quantity: "wake deficiency".to_string(),
                    context: format!("t = {:.6} s, alpha_qs = {alpha_qs}", s.t),
                });
            }
            alpha_qs - self.deficiency.total()
        };

        let circulatory_cl = m.config.lift_slope * alpha_effective;
        let circulatory = m.lift_scale() * circulatory_cl;
        let added_mass = PI * rho * b * b * (s.h_ddot + v * s.alpha_dot - b * a * s.alpha_ddot);
        let lift = ensure_finite(
            circulatory + added_mass,
            self.step,
            "lift",
            "unsteady section",
        )?;
        let moment = b * (a + 0.5) * circulatory
            + PI * rho
                * b
                * b
                * (b * a * s.h_ddot
                    - v * b * (0.5 - a) * s.alpha_dot
                    - b * b * (0.125 + a * a) * s.alpha_ddot);
        let moment = ensure_finite(moment, self.step, "moment", "unsteady section")?;

        // Knoller–Betz: the lift vector tilts forward while the wing plunges.
        let inflow = s.h_dot.atan2(v);
        let relative_q = 0.5 * rho * (v * v + s.h_dot * s.h_dot) * 2.0 * b;
        let drag = relative_q * m.config.profile_drag;
        let thrust = circulatory * inflow.sin() - drag * inflow.cos();

        let state = AerodynamicState {
            time: s.t,
            alpha: s.alpha,
            alpha_quasi_steady: alpha_qs,
            alpha_effective,
            reduced_frequency: self.reduced_frequency,
            circulation: circulatory / (rho * v),
            lift_coefficient: lift / m.lift_scale(),
            lift,
            moment,
            thrust,
            added_mass_force: added_mass,
            wake_deficit: self.deficiency.total(),
        };
        self.previous = Some((s.t, alpha_qs));
        self.step += 1;
        Ok(state)
    }
}

/// Steady-state harmonic loads from Theodorsen's frequency-domain solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicLoads {
    pub reduced_frequency: f64,
    pub theodorsen: Complex64,
    pub mean_lift: f64,
    /// Lift oscillation amplitude [N/m].
    pub lift_amplitude: f64,
    /// Phase of lift relative to sin(ωt) [rad].
    pub lift_phase: f64,
    pub moment_amplitude: f64,
    pub moment_phase: f64,
}

/// Closed-form response to harmonic pitch/plunge, used to cross-check the
/// time-domain integrator and for quick educational estimates.
pub fn harmonic_response(
    model: &UnsteadyModel,
    kinematics: &crate::kinematics::HarmonicKinematics,
) -> HarmonicLoads {
    let b = model.section.semi_chord;
    let a = model.section.elastic_axis;
    let v = model.airspeed;
    let rho = model.density;
    let w = kinematics.omega();
    let k = model.reduced_frequency(kinematics.frequency);
    let c = if model.config.quasi_steady {
        Complex64::new(1.0, 0.0)
    } else {
        theodorsen(k)
    };

    // Phasors against e^{iωt}; sin(ωt + φ) ↔ −i·e^{iφ}.
    let i = Complex64::i();
    let h = i * kinematics.plunge_amplitude;
    let alpha = -i * Complex64::from_polar(kinematics.alpha_amplitude, kinematics.phase_lead);
    let h_dot = i * w * h;
    let h_ddot = -w * w * h;
    let alpha_dot = i * w * alpha;
    let alpha_ddot = -w * w * alpha;

    let q = alpha + h_dot / v + alpha_dot * (b * (0.5 - a) / v);
    let circulatory = model.lift_scale() * model.config.lift_slope * c * q;
    let added_mass = PI * rho * b * b * (h_ddot + v * alpha_dot - b * a * alpha_ddot);
    let lift = circulatory + added_mass;
    let moment = b * (a + 0.5) * circulatory
        + PI * rho
            * b
            * b
            * (b * a * h_ddot - v * b * (0.5 - a) * alpha_dot - b * b * (0.125 + a * a) * alpha_ddot);

    // Re(X·e^{iωt}) = |X|·sin(ωt + arg X + π/2)
    HarmonicLoads {
        reduced_frequency: k,
        theodorsen: c,
        mean_lift: model.lift_scale() * model.config.lift_slope * kinematics.mean_alpha,
        lift_amplitude: lift.norm(),
        lift_phase: lift.arg() + PI / 2.0,
        moment_amplitude: moment.norm(),
        moment_phase: moment.arg() + PI / 2.0,
    }
}
