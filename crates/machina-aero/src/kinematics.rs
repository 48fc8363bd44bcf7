//! Pitch/plunge motion histories fed to the unsteady model.
//!
//! Plunge is specified positive UP (the usual flapping convention) and
//! converted to Theodorsen's positive-down convention in the samples.

use machina_math::integrate::gradient;
use machina_types::error::{MachinaError, MachinaResult};
use std::f64::consts::PI;

/// Instantaneous kinematic state at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicSample {
    pub t: f64,
    pub alpha: f64,
    pub alpha_dot: f64,
    pub alpha_ddot: f64,
    /// Plunge velocity, positive down [m/s].
    pub h_dot: f64,
    /// Plunge acceleration, positive down [m/s²].
    pub h_ddot: f64,
}

/// Closed-form sinusoidal pitch/plunge.
///
///   h_up(t) = h0·sin(ωt)
///   α(t)    = ᾱ + α0·sin(ωt + φ)
///
/// A frequency of zero means steady flight at ᾱ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicKinematics {
    pub mean_alpha: f64,
    pub alpha_amplitude: f64,
    /// Plunge amplitude [m].
    pub plunge_amplitude: f64,
    /// Frequency [Hz].
    pub frequency: f64,
    /// Phase by which pitch leads plunge [rad].
    pub phase_lead: f64,
}

impl HarmonicKinematics {
    pub fn steady(alpha: f64) -> Self {
        HarmonicKinematics {
            mean_alpha: alpha,
            alpha_amplitude: 0.0,
            plunge_amplitude: 0.0,
            frequency: 0.0,
            phase_lead: 0.0,
        }
    }

    pub fn omega(&self) -> f64 {
        2.0 * PI * self.frequency
    }

    pub fn sample(&self, t: f64) -> KinematicSample {
        if self.frequency == 0.0 {
            return KinematicSample {
                t,
                alpha: self.mean_alpha,
                ..Default::default()
            };
        }
        let w = self.omega();
        let wt = w * t;
        let pitch_phase = wt + self.phase_lead;
        KinematicSample {
            t,
            alpha: self.mean_alpha + self.alpha_amplitude * pitch_phase.sin(),
            alpha_dot: self.alpha_amplitude * w * pitch_phase.cos(),
            alpha_ddot: -self.alpha_amplitude * w * w * pitch_phase.sin(),
            h_dot: -self.plunge_amplitude * w * wt.cos(),
            h_ddot: self.plunge_amplitude * w * w * wt.sin(),
        }
    }
}

/// Uniformly sampled measured or externally generated motion.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledKinematics {
    pub dt: f64,
    pub alpha: Vec<f64>,
    /// Plunge velocity, positive UP [m/s].
    pub h_dot: Vec<f64>,
    /// Dominant frequency [Hz]; estimated from mean crossings when absent.
    pub frequency: Option<f64>,
}

impl SampledKinematics {
    fn validate(&self) -> MachinaResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "sampled kinematics dt must be > 0, got {}",
                self.dt
            )));
        }
        if self.alpha.len() != self.h_dot.len() || self.alpha.len() < 3 {
            return Err(MachinaError::Configuration(
                "sampled kinematics need matching alpha/h_dot series of at least 3 points".to_string(),
            ));
        }
        if self.alpha.iter().chain(&self.h_dot).any(|v| !v.is_finite()) {
            return Err(MachinaError::Configuration(
                "sampled kinematics contain non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Dominant frequency from the number of mean crossings of α.
    pub fn estimated_frequency(&self) -> f64 {
        if let Some(f) = self.frequency {
            return f;
        }
        let n = self.alpha.len();
        if n < 3 {
            return 0.0;
        }
        let mean = self.alpha.iter().sum::<f64>() / n as f64;
        let crossings = self
            .alpha
            .windows(2)
            .filter(|w| (w[0] - mean) * (w[1] - mean) < 0.0)
            .count();
        let duration = self.dt * (n - 1) as f64;
        crossings as f64 / (2.0 * duration)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kinematics {
    Harmonic(HarmonicKinematics),
    Sampled(SampledKinematics),
}

impl Kinematics {
    /// Dominant frequency [Hz].
    pub fn frequency(&self) -> f64 {
        match self {
            Kinematics::Harmonic(h) => h.frequency,
            Kinematics::Sampled(s) => s.estimated_frequency(),
        }
    }

    /// Time step and sample sequence.
    ///
    /// Harmonic motion is sampled `steps_per_cycle` times per period over
    /// `cycles` periods; steady motion covers `steady_time` seconds.
    pub fn discretize(
        &self,
        steps_per_cycle: usize,
        cycles: usize,
        steady_time: f64,
    ) -> MachinaResult<(f64, Vec<KinematicSample>)> {
        match self {
            Kinematics::Harmonic(h) => {
                if !(h.frequency.is_finite() && h.frequency >= 0.0) {
                    return Err(MachinaError::Configuration(format!(
                        "flapping frequency must be >= 0, got {}",
                        h.frequency
                    )));
                }
                if steps_per_cycle < 8 || cycles == 0 {
                    return Err(MachinaError::Configuration(
                        "need at least 8 steps per cycle and one cycle".to_string(),
                    ));
                }
                let (dt, n) = if h.frequency > 0.0 {
                    (1.0 / (h.frequency * steps_per_cycle as f64), steps_per_cycle * cycles)
                } else {
                    (steady_time / steps_per_cycle as f64, steps_per_cycle)
                };
                let samples = (0..=n).map(|i| h.sample(i as f64 * dt)).collect();
                Ok((dt, samples))
            }
            Kinematics::Sampled(s) => {
                s.validate()?;
                let t: Vec<f64> = (0..s.alpha.len()).map(|i| i as f64 * s.dt).collect();
                let alpha_dot = gradient(&t, &s.alpha);
                let alpha_ddot = gradient(&t, &alpha_dot);
                let h_ddot_up = gradient(&t, &s.h_dot);
                let samples = (0..s.alpha.len())
                    .map(|i| KinematicSample {
                        t: t[i],
                        alpha: s.alpha[i],
                        alpha_dot: alpha_dot[i],
                        alpha_ddot: alpha_ddot[i],
                        h_dot: -s.h_dot[i],
                        h_ddot: -h_ddot_up[i],
                    })
                    .collect();
                Ok((s.dt, samples))
            }
        }
    }
}
