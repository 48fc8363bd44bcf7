// ─────────────────────────────────────────────────────────────────────
// Machina — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Result records exchanged with downstream consumers.
//!
//! Field names and units are a stable interface: CAD, plotting and
//! reporting code reads these as plain structured data.

use crate::config::{CouplingMode, FidelityLevel, SamplingMethod, SensitivityMethod};
use serde::{Deserialize, Serialize};

/// One time step of the unsteady aerodynamics model. Forces are per unit span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AerodynamicState {
    /// Time [s].
    pub time: f64,
    /// Geometric angle of attack [rad].
    pub alpha: f64,
    /// Quasi-steady 3/4-chord angle, including plunge and pitch rate [rad].
    pub alpha_quasi_steady: f64,
    /// Effective angle after wake deficiency [rad].
    pub alpha_effective: f64,
    /// Reduced frequency k = ωb/V.
    pub reduced_frequency: f64,
    /// Bound circulation [m²/s].
    pub circulation: f64,
    /// Total lift coefficient (circulatory + added mass).
    pub lift_coefficient: f64,
    /// Lift per span [N/m].
    pub lift: f64,
    /// Pitching moment about the elastic axis per span [N·m/m].
    pub moment: f64,
    /// Propulsive force per span [N/m].
    pub thrust: f64,
    /// Non-circulatory (added-mass) lift per span [N/m].
    pub added_mass_force: f64,
    /// Sum of the two Wagner deficiency states [rad].
    pub wake_deficit: f64,
}

/// Time history and cycle averages of a wing-section simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroHistory {
    pub states: Vec<AerodynamicState>,
    /// Averaged over the final full cycle [N/m].
    pub mean_lift: f64,
    pub mean_thrust: f64,
    /// Input power to sustain the motion [W/m].
    pub mean_power: f64,
    pub peak_lift: f64,
    pub reduced_frequency: f64,
    pub quasi_steady: bool,
}

/// One blade annulus of a converged rotor solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotorElementState {
    /// Element mid radius [m].
    pub radius: f64,
    /// Annulus width [m].
    pub width: f64,
    pub chord: f64,
    /// Geometric pitch angle [rad].
    pub twist: f64,
    /// Axial induced velocity [m/s].
    pub induced_velocity: f64,
    /// Inflow angle φ [rad].
    pub inflow_angle: f64,
    pub angle_of_attack: f64,
    pub lift_coefficient: f64,
    /// Combined Prandtl tip/root loss factor.
    pub loss_factor: f64,
    /// Element thrust, all blades [N].
    pub thrust: f64,
    /// Element torque, all blades [N·m].
    pub torque: f64,
    /// Bound circulation per blade [m²/s].
    pub circulation: f64,
    pub iterations: usize,
}

/// Integrated rotor performance. Elements are ordered root to tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotorSolution {
    pub elements: Vec<RotorElementState>,
    /// Accepted thrust [N].
    pub thrust: f64,
    pub torque: f64,
    /// Shaft power [W].
    pub power: f64,
    pub thrust_blade_element: f64,
    pub thrust_momentum: f64,
    pub thrust_coefficient: f64,
    pub power_coefficient: f64,
    pub figure_of_merit: f64,
    /// Area-weighted mean induced velocity [m/s].
    pub mean_induced_velocity: f64,
    /// Largest per-element iteration count.
    pub iterations: usize,
    pub residual: f64,
    pub wake_refined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembraneResponse {
    pub natural_frequency: f64,
    pub damping_ratio: f64,
    pub excitation_frequency: f64,
    /// Peak membrane displacement [m].
    pub peak_displacement: f64,
    /// Peak elastic energy [J].
    pub peak_stored_energy: f64,
    /// Elastic energy handed back to the flow per cycle [J].
    pub energy_returned_per_cycle: f64,
}

/// Deformed shape of the primary structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralResponse {
    pub mode: CouplingMode,
    /// Spanwise stations from root [m].
    pub stations: Vec<f64>,
    pub deflection: Vec<f64>,
    /// Elastic twist, nose up positive [rad].
    pub twist: Vec<f64>,
    pub root_moment: f64,
    /// Peak bending stress [Pa].
    pub peak_stress: f64,
    pub tip_deflection: f64,
    pub outer_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membrane: Option<MembraneResponse>,
}

/// Scalar quantities checked by the validator. SI units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub required_power: Option<f64>,
    pub thrust: Option<f64>,
    pub lift: Option<f64>,
    pub weight: Option<f64>,
    pub peak_stress: Option<f64>,
    pub tip_deflection: Option<f64>,
    pub span: Option<f64>,
    pub radius: Option<f64>,
    pub tip_speed: Option<f64>,
    pub airspeed: Option<f64>,
    pub disk_loading: Option<f64>,
    pub reduced_frequency: Option<f64>,
}

impl DerivedMetrics {
    /// Vertical force over weight.
    pub fn lift_to_weight(&self) -> Option<f64> {
        let weight = self.weight.filter(|w| *w > 0.0)?;
        self.lift.or(self.thrust).map(|f| f / weight)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultFlags {
    /// Some stage stopped early; downstream must not treat values as final.
    pub incomplete: bool,
    /// Two-way coupling diverged and one-way results were reported instead.
    pub structural_fallback: bool,
    /// BEMT only converged after a relaxed retry.
    pub relaxed_tolerance: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub invention: String,
    pub fidelity: FidelityLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aero: Option<AeroHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotor: Option<RotorSolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructuralResponse>,
    pub metrics: DerivedMetrics,
    pub flags: ResultFlags,
    /// Catalog keys every physical output was derived from.
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    /// Measured value must be ≤ bound.
    Max,
    /// Measured value must be ≥ bound.
    Min,
}

/// Catalog identity a report was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStamp {
    pub version: u64,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintOutcome {
    pub constraint_id: String,
    pub description: String,
    pub measured: f64,
    pub allowed: f64,
    pub bound: BoundKind,
    pub passed: bool,
    /// Signed headroom in the units of the bound; negative means violation.
    pub margin: f64,
    pub mandatory: bool,
    pub weight: f64,
    /// Credit in [0, 1] contributed to the score.
    pub credit: f64,
    pub citation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Compliant,
    Partial,
    Infeasible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub invention: String,
    pub catalog: CatalogStamp,
    pub outcomes: Vec<ConstraintOutcome>,
    /// Weighted compliance score in [0, 1].
    pub score: f64,
    /// Unweighted fraction of constraints passed.
    pub pass_rate: f64,
    pub verdict: Verdict,
    /// Constraints whose quantity this fidelity tier does not produce.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl ComplianceReport {
    pub fn mandatory_failures(&self) -> impl Iterator<Item = &ConstraintOutcome> {
        self.outcomes.iter().filter(|o| o.mandatory && !o.passed)
    }

    pub fn outcome(&self, constraint_id: &str) -> Option<&ConstraintOutcome> {
        self.outcomes.iter().find(|o| o.constraint_id == constraint_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBands {
    pub p05: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStatistics {
    pub name: String,
    pub mean: f64,
    /// Unbiased sample variance.
    pub variance: f64,
    pub std_dev: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: PercentileBands,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityIndex {
    pub output: String,
    pub input: String,
    /// First-order Sobol index, or normalised tornado swing.
    pub first_order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_order: Option<f64>,
    /// 1 = dominant input for this output.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFailure {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyReport {
    pub seed: u64,
    pub method: SamplingMethod,
    pub sensitivity_method: SensitivityMethod,
    pub requested_samples: usize,
    /// Samples included in the statistics.
    pub completed_samples: usize,
    pub failures: Vec<SampleFailure>,
    pub outputs: Vec<OutputStatistics>,
    pub sensitivity: Vec<SensitivityIndex>,
    /// Run was cancelled; statistics cover a prefix of sample indices.
    pub incomplete: bool,
    /// Monte Carlo was forced below the per-dimension coverage threshold.
    pub coverage_warning: bool,
}

impl UncertaintyReport {
    pub fn output(&self, name: &str) -> Option<&OutputStatistics> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Input ranked first for `output`.
    pub fn dominant_input(&self, output: &str) -> Option<&str> {
        self.sensitivity
            .iter()
            .find(|s| s.output == output && s.rank == 1)
            .map(|s| s.input.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, passed: bool, mandatory: bool) -> ConstraintOutcome {
        ConstraintOutcome {
            constraint_id: id.to_string(),
            description: String::new(),
            measured: 1.0,
            allowed: 2.0,
            bound: BoundKind::Max,
            passed,
            margin: if passed { 1.0 } else { -1.0 },
            mandatory,
            weight: 1.0,
            credit: if passed { 1.0 } else { 0.0 },
            citation: String::new(),
        }
    }

    #[test]
    fn test_mandatory_failures_filter() {
        let report = ComplianceReport {
            invention: "glider".into(),
            catalog: CatalogStamp {
                version: 1,
                fingerprint: "abc".into(),
            },
            outcomes: vec![
                outcome("a", true, true),
                outcome("b", false, true),
                outcome("c", false, false),
            ],
            score: 0.4,
            pass_rate: 1.0 / 3.0,
            verdict: Verdict::Infeasible,
            skipped: vec![],
        };
        let failed: Vec<_> = report.mandatory_failures().map(|o| o.constraint_id.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
        assert!(report.outcome("c").is_some());
        assert!(report.outcome("z").is_none());
    }

    #[test]
    fn test_lift_to_weight_prefers_lift() {
        let m = DerivedMetrics {
            lift: Some(500.0),
            thrust: Some(100.0),
            weight: Some(1000.0),
            ..Default::default()
        };
        assert_eq!(m.lift_to_weight(), Some(0.5));
        let rotor = DerivedMetrics {
            thrust: Some(2000.0),
            weight: Some(1000.0),
            ..Default::default()
        };
        assert_eq!(rotor.lift_to_weight(), Some(2.0));
        assert_eq!(DerivedMetrics::default().lift_to_weight(), None);
    }

    #[test]
    fn test_dominant_input_lookup() {
        let report = UncertaintyReport {
            seed: 1,
            method: SamplingMethod::LatinHypercube,
            sensitivity_method: SensitivityMethod::Tornado,
            requested_samples: 10,
            completed_samples: 10,
            failures: vec![],
            outputs: vec![],
            sensitivity: vec![
                SensitivityIndex {
                    output: "thrust".into(),
                    input: "density".into(),
                    first_order: 0.2,
                    total_order: None,
                    rank: 2,
                },
                SensitivityIndex {
                    output: "thrust".into(),
                    input: "chord".into(),
                    first_order: 0.8,
                    total_order: None,
                    rank: 1,
                },
            ],
            incomplete: false,
            coverage_warning: false,
        };
        assert_eq!(report.dominant_input("thrust"), Some("chord"));
        assert_eq!(report.dominant_input("power"), None);
    }

    #[test]
    fn test_result_serializes_without_empty_sections() {
        let result = SimulationResult {
            invention: "glider".into(),
            fidelity: FidelityLevel::Educational,
            aero: None,
            rotor: None,
            structure: None,
            metrics: DerivedMetrics::default(),
            flags: ResultFlags::default(),
            citations: vec!["material.ash.modulus".into()],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\"rotor\""));
        let back: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
