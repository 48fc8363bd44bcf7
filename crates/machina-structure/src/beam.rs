//! Euler–Bernoulli cantilever with uncoupled St-Venant torsion.
//!
//! Loads are distributed per unit span. Shear and moment are integrated
//! inward from the free tip, curvature M/EI outward from the clamped root.

use machina_math::integrate::{cumtrapz, cumtrapz_from_end};
use machina_types::config::SparSection;
use machina_types::error::{MachinaError, MachinaResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSection {
    /// Young's modulus E [Pa].
    pub modulus: f64,
    /// Shear modulus G [Pa].
    pub shear_modulus: f64,
    /// Second moment of area I [m⁴].
    pub second_moment: f64,
    /// Torsion constant J [m⁴].
    pub torsion_constant: f64,
    /// Distance from neutral axis to extreme fibre c [m].
    pub extreme_fibre: f64,
}

impl BeamSection {
    /// Rectangular spar of an isotropic material, G = E / 2(1 + ν).
    pub fn from_spar(spar: &SparSection, modulus: f64, poisson_ratio: f64) -> MachinaResult<Self> {
        if !(modulus.is_finite() && modulus > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "elastic modulus must be > 0, got {modulus}"
            )));
        }
        if !(0.0..0.5).contains(&poisson_ratio) {
            return Err(MachinaError::Configuration(format!(
                "Poisson ratio must be in [0, 0.5), got {poisson_ratio}"
            )));
        }
        if !(spar.width > 0.0 && spar.depth > 0.0) {
            return Err(MachinaError::Configuration(
                "spar width and depth must be > 0".to_string(),
            ));
        }
        Ok(BeamSection {
            modulus,
            shear_modulus: modulus / (2.0 * (1.0 + poisson_ratio)),
            second_moment: spar.second_moment(),
            torsion_constant: spar.torsion_constant(),
            extreme_fibre: spar.extreme_fibre(),
        })
    }

    pub fn bending_stiffness(&self) -> f64 {
        self.modulus * self.second_moment
    }

    pub fn torsional_stiffness(&self) -> f64 {
        self.shear_modulus * self.torsion_constant
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeamDeflection {
    pub deflection: Vec<f64>,
    pub slope: Vec<f64>,
    /// Elastic twist, positive with the applied torque [rad].
    pub twist: Vec<f64>,
    pub shear: Vec<f64>,
    pub moment: Vec<f64>,
    pub root_moment: f64,
    /// Largest |M|·c/I along the span [Pa].
    pub peak_stress: f64,
    pub tip_deflection: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CantileverBeam {
    pub length: f64,
    pub section: BeamSection,
    stations: Vec<f64>,
}

impl CantileverBeam {
    pub fn new(length: f64, section: BeamSection, n_stations: usize) -> MachinaResult<Self> {
        if !(length.is_finite() && length > 0.0) {
            return Err(MachinaError::Configuration(format!(
                "beam length must be > 0, got {length}"
            )));
        }
        if n_stations < 3 {
            return Err(MachinaError::Configuration(
                "beam needs at least 3 stations".to_string(),
            ));
        }
        let step = length / (n_stations - 1) as f64;
        let stations = (0..n_stations).map(|i| i as f64 * step).collect();
        Ok(CantileverBeam {
            length,
            section,
            stations,
        })
    }

    /// Spanwise stations from the root [m].
    pub fn stations(&self) -> &[f64] {
        &self.stations
    }

    /// Static response to distributed lift `q` [N/m] and torque `t` [N·m/m].
    pub fn solve(&self, q: &[f64], t: &[f64]) -> MachinaResult<BeamDeflection> {
        let n = self.stations.len();
        if q.len() != n || t.len() != n {
            return Err(MachinaError::Configuration(format!(
                "beam loads must have {n} stations (lift {}, torque {})",
                q.len(),
                t.len()
            )));
        }
        if q.iter().chain(t).any(|v| !v.is_finite()) {
            return Err(MachinaError::NumericalInstability {
                step: 0,
                quantity: "beam load".to_string(),
                context: "non-finite distributed load".to_string(),
            });
        }
        let x = &self.stations;
        let shear = cumtrapz_from_end(x, q);
        let moment = cumtrapz_from_end(x, &shear);
        let ei = self.section.bending_stiffness();
        let curvature: Vec<f64> = moment.iter().map(|m| m / ei).collect();
        let slope = cumtrapz(x, &curvature);
        let deflection = cumtrapz(x, &slope);

        let internal_torque = cumtrapz_from_end(x, t);
        let gj = self.section.torsional_stiffness();
        let rate: Vec<f64> = internal_torque.iter().map(|tq| tq / gj).collect();
        let twist = cumtrapz(x, &rate);

        let c_over_i = self.section.extreme_fibre / self.section.second_moment;
        let peak_stress = moment.iter().map(|m| m.abs() * c_over_i).fold(0.0, f64::max);
        Ok(BeamDeflection {
            root_moment: moment[0],
            tip_deflection: deflection[n - 1],
            deflection,
            slope,
            twist,
            shear,
            moment,
            peak_stress,
        })
    }
}
