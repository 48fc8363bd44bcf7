//! Elastic wing membrane as a single-mode damped oscillator.
//!
//! The membrane stores energy on one half-stroke and hands it back on the
//! next. Modal properties come from the catalog keys
//! `membrane.<name>.{natural_frequency, damping_ratio, areal_density}`.

use machina_catalog::Catalog;
use machina_math::oscillator::{DampedOscillator, OscillatorState};
use machina_types::config::CouplingConfig;
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::MembraneResponse;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Membrane {
    /// Natural frequency [Hz].
    pub natural_frequency: f64,
    pub damping_ratio: f64,
    /// Mass per unit area [kg/m²].
    pub areal_density: f64,
    /// Loaded area [m²].
    pub area: f64,
}

impl Membrane {
    pub fn new(natural_frequency: f64, damping_ratio: f64, areal_density: f64, area: f64) -> MachinaResult<Self> {
        if !(natural_frequency.is_finite() && natural_frequency > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "membrane natural frequency must be > 0, got {natural_frequency}"
            )));
        }
        if !(damping_ratio.is_finite() && damping_ratio >= 0.0) {
            return Err(MachinaError::Configuration(format!(
                "membrane damping ratio must be >= 0, got {damping_ratio}"
            )));
        }
        if !(areal_density > 0.0 && area > 0.0) {
            return Err(MachinaError::Configuration(
                "membrane areal density and area must be > 0".to_string(),
            ));
        }
        Ok(Membrane {
            natural_frequency,
            damping_ratio,
            areal_density,
            area,
        })
    }

    pub fn catalog_keys(name: &str) -> [String; 3] {
        [
            format!("membrane.{name}.natural_frequency"),
            format!("membrane.{name}.damping_ratio"),
            format!("membrane.{name}.areal_density"),
        ]
    }

    pub fn from_catalog(catalog: &Catalog, name: &str, area: f64) -> MachinaResult<Self> {
        let [f, z, rho] = Self::catalog_keys(name);
        Membrane::new(catalog.nominal(&f)?, catalog.nominal(&z)?, catalog.nominal(&rho)?, area)
    }

    pub fn oscillator(&self) -> DampedOscillator {
        DampedOscillator {
            omega_n: 2.0 * PI * self.natural_frequency,
            zeta: self.damping_ratio,
        }
    }

    /// Reject excitation inside the resonance band when damping is too low.
    pub fn check_resonance(&self, excitation_frequency: f64, config: &CouplingConfig) -> MachinaResult<f64> {
        let ratio = excitation_frequency / self.natural_frequency;
        if (ratio - 1.0).abs() < config.resonance_band && self.damping_ratio < config.min_damping_ratio {
            return Err(MachinaError::StructuralInstability {
                iteration: 0,
                message: format!(
                    "membrane excited at {:.3} of its natural frequency with damping ratio {:.3} < {:.3}",
                    ratio, self.damping_ratio, config.min_damping_ratio
                ),
            });
        }
        Ok(ratio)
    }

    /// Response to a uniformly sampled pressure history [Pa].
    pub fn respond(
        &self,
        pressure: &[f64],
        dt: f64,
        excitation_frequency: f64,
        config: &CouplingConfig,
    ) -> MachinaResult<MembraneResponse> {
        self.check_resonance(excitation_frequency, config)?;
        if pressure.len() < 2 || !(dt > 0.0) {
            return Err(MachinaError::Configuration(
                "membrane forcing needs at least two samples and dt > 0".to_string(),
            ));
        }
        let osc = self.oscillator();
        let forcing: Vec<f64> = pressure.iter().map(|p| p / self.areal_density).collect();
        let trajectory = osc.integrate(&forcing, dt, OscillatorState::default());
        if let Some(step) = trajectory.iter().position(|s| !(s.x.is_finite() && s.v.is_finite())) {
            return Err(MachinaError::NumericalInstability {
                step,
                quantity: "membrane displacement".to_string(),
                context: format!("f_n = {} Hz", self.natural_frequency),
            });
        }

        let stiffness = self.areal_density * osc.omega_n * osc.omega_n * self.area;
        let potential: Vec<f64> = trajectory.iter().map(|s| 0.5 * stiffness * s.x * s.x).collect();
        let window = if excitation_frequency > 0.0 {
            ((1.0 / (excitation_frequency * dt)).round() as usize).clamp(2, potential.len())
        } else {
            potential.len()
        };
        let tail = &potential[potential.len() - window..];
        let returned: f64 = tail.windows(2).map(|w| (w[0] - w[1]).max(0.0)).sum();

        Ok(MembraneResponse {
            natural_frequency: self.natural_frequency,
            damping_ratio: self.damping_ratio,
            excitation_frequency,
            peak_displacement: trajectory.iter().map(|s| s.x.abs()).fold(0.0, f64::max),
            peak_stored_energy: tail.iter().cloned().fold(0.0, f64::max),
            energy_returned_per_cycle: returned,
        })
    }
}
