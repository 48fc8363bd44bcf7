// ─────────────────────────────────────────────────────────────────────
// Machina — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{G_STANDARD, RHO_AIR_SEA_LEVEL};
use crate::error::{MachinaError, MachinaResult};
use serde::{Deserialize, Serialize};

/// Immutable input record for one simulation run.
///
/// Owned by the caller and passed by value into every solver call.
/// Field names and units are part of the stable result interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub geometry: Geometry,
    pub kinematics: KinematicParams,
    /// Catalog material key, e.g. `"ash"` resolves `material.ash.*` entries.
    pub material: String,
    #[serde(default)]
    pub environment: Environment,
    /// Base seed for every stochastic stage.
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Total wing span tip to tip [m].
    pub span: f64,
    /// Wing or blade chord [m].
    pub chord: f64,
    /// Rotor radius [m].
    pub radius: f64,
    /// Helix pitch of a screw rotor, axial advance per turn [m].
    pub pitch: f64,
    /// Root cutout as a fraction of rotor radius.
    #[serde(default = "default_root_cutout")]
    pub root_cutout: f64,
    #[serde(default = "default_blade_count")]
    pub blade_count: usize,
    /// Elastic axis position in semi-chords aft of mid-chord (Theodorsen `a`).
    #[serde(default = "default_elastic_axis")]
    pub elastic_axis: f64,
    /// Rectangular spar carrying bending and torsion.
    pub spar: SparSection,
    /// Gross mass including crew [kg].
    pub vehicle_mass: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparSection {
    /// Spar width [m].
    pub width: f64,
    /// Spar depth in the bending direction [m].
    pub depth: f64,
}

impl SparSection {
    /// Second moment of area about the bending axis [m⁴].
    pub fn second_moment(&self) -> f64 {
        self.width * self.depth.powi(3) / 12.0
    }

    /// Saint-Venant torsion constant for a thin rectangle [m⁴].
    pub fn torsion_constant(&self) -> f64 {
        let (long, short) = if self.width >= self.depth {
            (self.width, self.depth)
        } else {
            (self.depth, self.width)
        };
        long * short.powi(3) * (1.0 / 3.0 - 0.21 * short / long * (1.0 - short.powi(4) / (12.0 * long.powi(4))))
    }

    /// Distance from neutral axis to the extreme fibre [m].
    pub fn extreme_fibre(&self) -> f64 {
        0.5 * self.depth
    }

    pub fn area(&self) -> f64 {
        self.width * self.depth
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicParams {
    /// Flapping frequency [Hz]. Zero means steady flight.
    #[serde(default)]
    pub flap_frequency: f64,
    /// Flapping stroke half-angle [rad].
    #[serde(default)]
    pub flap_amplitude: f64,
    /// Pitch oscillation amplitude [rad].
    #[serde(default)]
    pub pitch_amplitude: f64,
    /// Mean angle of attack [rad].
    #[serde(default)]
    pub mean_pitch: f64,
    /// Phase by which pitch leads plunge [rad].
    #[serde(default = "default_phase_lead")]
    pub phase_lead: f64,
    /// Rotor rotation rate [rad/s].
    #[serde(default)]
    pub rotation_rate: f64,
    /// Forward flight speed [m/s].
    #[serde(default)]
    pub airspeed: f64,
    /// Axial (climb) velocity through a rotor disk [m/s].
    #[serde(default)]
    pub climb_velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Air density [kg/m³].
    #[serde(default = "default_air_density")]
    pub air_density: f64,
    /// Gravitational acceleration [m/s²].
    #[serde(default = "default_gravity")]
    pub gravity: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            air_density: default_air_density(),
            gravity: default_gravity(),
        }
    }
}

/// Which sub-models a run is allowed to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FidelityLevel {
    /// Quasi-steady and momentum theory only.
    Educational,
    /// Full unsteady aerodynamics and BEMT.
    Advanced,
    /// Adds structural coupling and uncertainty quantification.
    Research,
}

impl FidelityLevel {
    pub fn unsteady(self) -> bool {
        !matches!(self, FidelityLevel::Educational)
    }

    pub fn structural_coupling(self) -> bool {
        matches!(self, FidelityLevel::Research)
    }

    pub fn uncertainty(self) -> bool {
        matches!(self, FidelityLevel::Research)
    }
}

fn default_root_cutout() -> f64 {
    0.1
}
fn default_blade_count() -> usize {
    2
}
fn default_elastic_axis() -> f64 {
    -0.5
}
fn default_phase_lead() -> f64 {
    std::f64::consts::FRAC_PI_2
}
fn default_air_density() -> f64 {
    RHO_AIR_SEA_LEVEL
}
fn default_gravity() -> f64 {
    G_STANDARD
}

impl SimulationParameters {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> MachinaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject non-finite or physically meaningless inputs.
    pub fn validate(&self) -> MachinaResult<()> {
        let g = &self.geometry;
        let k = &self.kinematics;
        let finite = [
            ("span", g.span),
            ("chord", g.chord),
            ("radius", g.radius),
            ("pitch", g.pitch),
            ("root_cutout", g.root_cutout),
            ("elastic_axis", g.elastic_axis),
            ("spar.width", g.spar.width),
            ("spar.depth", g.spar.depth),
            ("vehicle_mass", g.vehicle_mass),
            ("flap_frequency", k.flap_frequency),
            ("flap_amplitude", k.flap_amplitude),
            ("pitch_amplitude", k.pitch_amplitude),
            ("mean_pitch", k.mean_pitch),
            ("phase_lead", k.phase_lead),
            ("rotation_rate", k.rotation_rate),
            ("airspeed", k.airspeed),
            ("climb_velocity", k.climb_velocity),
            ("air_density", self.environment.air_density),
            ("gravity", self.environment.gravity),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(MachinaError::Configuration(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        let non_negative = [
            ("span", g.span),
            ("chord", g.chord),
            ("radius", g.radius),
            ("pitch", g.pitch),
            ("vehicle_mass", g.vehicle_mass),
            ("flap_frequency", k.flap_frequency),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(MachinaError::Configuration(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
        }
        if g.spar.width <= 0.0 || g.spar.depth <= 0.0 {
            return Err(MachinaError::Configuration(
                "spar dimensions must be > 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&g.root_cutout) {
            return Err(MachinaError::Configuration(format!(
                "root_cutout must lie in [0, 1), got {}",
                g.root_cutout
            )));
        }
        if !(-1.0..=1.0).contains(&g.elastic_axis) {
            return Err(MachinaError::Configuration(format!(
                "elastic_axis must lie in [-1, 1], got {}",
                g.elastic_axis
            )));
        }
        if g.blade_count == 0 {
            return Err(MachinaError::Configuration(
                "blade_count must be >= 1".to_string(),
            ));
        }
        if self.environment.air_density <= 0.0 || self.environment.gravity <= 0.0 {
            return Err(MachinaError::Configuration(
                "air_density and gravity must be > 0".to_string(),
            ));
        }
        if self.material.trim().is_empty() {
            return Err(MachinaError::Configuration(
                "material key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Time-domain unsteady aerodynamics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsteadyConfig {
    #[serde(default = "default_steps_per_cycle")]
    pub steps_per_cycle: usize,
    #[serde(default = "default_cycles")]
    pub cycles: usize,
    /// Semi-chords of travel simulated when there is no oscillation.
    #[serde(default = "default_steady_distance")]
    pub steady_distance: f64,
    /// Start from rest (Wagner build-up) instead of an established flow.
    #[serde(default)]
    pub impulsive_start: bool,
    /// Drop the wake-memory states and use C(k) = 1.
    #[serde(default)]
    pub quasi_steady: bool,
    /// Section lift-curve slope [1/rad].
    #[serde(default = "default_section_lift_slope")]
    pub lift_slope: f64,
    /// Profile drag coefficient.
    #[serde(default = "default_profile_drag")]
    pub profile_drag: f64,
}

fn default_steps_per_cycle() -> usize {
    400
}
fn default_cycles() -> usize {
    4
}
fn default_steady_distance() -> f64 {
    40.0
}
fn default_section_lift_slope() -> f64 {
    2.0 * std::f64::consts::PI
}
fn default_profile_drag() -> f64 {
    0.02
}

impl Default for UnsteadyConfig {
    fn default() -> Self {
        UnsteadyConfig {
            steps_per_cycle: default_steps_per_cycle(),
            cycles: default_cycles(),
            steady_distance: default_steady_distance(),
            impulsive_start: false,
            quasi_steady: false,
            lift_slope: default_section_lift_slope(),
            profile_drag: default_profile_drag(),
        }
    }
}

/// Blade-element/momentum solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotorSolverConfig {
    #[serde(default = "default_elements")]
    pub elements: usize,
    /// Relative thrust balance tolerance ε.
    #[serde(default = "default_rotor_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_rotor_max_iterations")]
    pub max_iterations: usize,
    /// Under-relaxation factor on the induced-velocity update, in (0, 1].
    #[serde(default = "default_rotor_relaxation")]
    pub relaxation: f64,
    #[serde(default = "default_true")]
    pub tip_loss: bool,
    #[serde(default = "default_true")]
    pub root_loss: bool,
    /// Blade section lift-curve slope [1/rad].
    #[serde(default = "default_blade_lift_slope")]
    pub lift_slope: f64,
    #[serde(default = "default_blade_drag")]
    pub profile_drag: f64,
    /// Stall ceiling on |Cl|.
    #[serde(default = "default_cl_max")]
    pub cl_max: f64,
    /// Optional free-wake refinement after momentum convergence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake: Option<WakeConfig>,
}

fn default_elements() -> usize {
    24
}
fn default_rotor_tolerance() -> f64 {
    1e-4
}
fn default_rotor_max_iterations() -> usize {
    200
}
fn default_rotor_relaxation() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_blade_lift_slope() -> f64 {
    5.73
}
fn default_blade_drag() -> f64 {
    0.011
}
fn default_cl_max() -> f64 {
    1.2
}

impl Default for RotorSolverConfig {
    fn default() -> Self {
        RotorSolverConfig {
            elements: default_elements(),
            tolerance: default_rotor_tolerance(),
            max_iterations: default_rotor_max_iterations(),
            relaxation: default_rotor_relaxation(),
            tip_loss: true,
            root_loss: true,
            lift_slope: default_blade_lift_slope(),
            profile_drag: default_blade_drag(),
            cl_max: default_cl_max(),
            wake: None,
        }
    }
}

impl RotorSolverConfig {
    /// Looser settings used for a single local retry after `ConvergenceFailure`.
    pub fn relaxed(&self) -> Self {
        RotorSolverConfig {
            tolerance: self.tolerance * 10.0,
            relaxation: self.relaxation * 0.5,
            max_iterations: self.max_iterations * 2,
            ..self.clone()
        }
    }
}

/// Prescribed-helix vortex wake settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeConfig {
    /// Rotor revolutions of wake convected downstream.
    #[serde(default = "default_wake_revolutions")]
    pub revolutions: f64,
    #[serde(default = "default_segments_per_revolution")]
    pub segments_per_revolution: usize,
    /// Vortex core radius as a fraction of rotor radius.
    #[serde(default = "default_core_radius")]
    pub core_radius: f64,
    #[serde(default = "default_wake_iterations")]
    pub max_iterations: usize,
    /// Relative change in induced velocity that ends refinement.
    #[serde(default = "default_wake_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_wake_relaxation")]
    pub relaxation: f64,
}

fn default_wake_revolutions() -> f64 {
    4.0
}
fn default_segments_per_revolution() -> usize {
    36
}
fn default_core_radius() -> f64 {
    0.02
}
fn default_wake_iterations() -> usize {
    12
}
fn default_wake_tolerance() -> f64 {
    1e-3
}
fn default_wake_relaxation() -> f64 {
    0.5
}

impl Default for WakeConfig {
    fn default() -> Self {
        WakeConfig {
            revolutions: default_wake_revolutions(),
            segments_per_revolution: default_segments_per_revolution(),
            core_radius: default_core_radius(),
            max_iterations: default_wake_iterations(),
            tolerance: default_wake_tolerance(),
            relaxation: default_wake_relaxation(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingMode {
    OneWay,
    TwoWay,
}

/// Fluid-structure coupling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingConfig {
    #[serde(default = "default_coupling_mode")]
    pub mode: CouplingMode,
    /// Spanwise structural stations.
    #[serde(default = "default_stations")]
    pub stations: usize,
    /// Max change in deflection between outer iterations [m].
    #[serde(default = "default_displacement_tolerance")]
    pub displacement_tolerance: f64,
    #[serde(default = "default_outer_iterations")]
    pub max_outer_iterations: usize,
    #[serde(default = "default_coupling_relaxation")]
    pub relaxation: f64,
    /// Elastic twist beyond which the loop is declared divergent [rad].
    #[serde(default = "default_max_twist")]
    pub max_twist: f64,
    #[serde(default = "default_poisson_ratio")]
    pub poisson_ratio: f64,
    /// Minimum damping ratio tolerated near resonance.
    #[serde(default = "default_min_damping")]
    pub min_damping_ratio: f64,
    /// Relative band |ω_exc/ω_n − 1| treated as resonant.
    #[serde(default = "default_resonance_band")]
    pub resonance_band: f64,
}

fn default_coupling_mode() -> CouplingMode {
    CouplingMode::OneWay
}
fn default_stations() -> usize {
    16
}
fn default_displacement_tolerance() -> f64 {
    1e-5
}
fn default_outer_iterations() -> usize {
    30
}
fn default_coupling_relaxation() -> f64 {
    0.7
}
fn default_max_twist() -> f64 {
    0.35
}
fn default_poisson_ratio() -> f64 {
    0.3
}
fn default_min_damping() -> f64 {
    0.05
}
fn default_resonance_band() -> f64 {
    0.1
}

impl Default for CouplingConfig {
    fn default() -> Self {
        CouplingConfig {
            mode: default_coupling_mode(),
            stations: default_stations(),
            displacement_tolerance: default_displacement_tolerance(),
            max_outer_iterations: default_outer_iterations(),
            relaxation: default_coupling_relaxation(),
            max_twist: default_max_twist(),
            poisson_ratio: default_poisson_ratio(),
            min_damping_ratio: default_min_damping(),
            resonance_band: default_resonance_band(),
        }
    }
}

/// Sampling strategy for the uncertainty engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    /// Latin hypercube below the per-dimension coverage threshold, Monte Carlo above.
    Auto,
    MonteCarlo,
    LatinHypercube,
}

/// Sensitivity ranking strategy for the uncertainty engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMethod {
    /// Variance-based first- and total-order indices.
    Sobol,
    /// One-at-a-time swing between the 5th and 95th percentiles.
    Tornado,
    None,
}
