// ─────────────────────────────────────────────────────────────────────
// Machina — Inventions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Built-in reconstructions.
//!
//! Wings use strip theory at a representative station: the section at
//! 75% semi-span carries the spanwise-mean plunge, and per-span loads are
//! multiplied by the full span. Structural loads use the peak section
//! lift at every beam station instead.

use crate::pipeline::{couple_with_fallback, solve_rotor_with_retry};
use crate::registry::{InventionKind, InventionSpec, SimulationContext};
use machina_aero::kinematics::{HarmonicKinematics, Kinematics};
use machina_aero::rotor::{ChordDistribution, OperatingPoint, RotorGeometry, RotorSolver, TwistDistribution};
use machina_aero::unsteady::{UnsteadyModel, WingSection};
use machina_catalog::catalog::material_key;
use machina_catalog::{Catalog, Distribution, MaterialProperty};
use machina_structure::beam::{BeamSection, CantileverBeam};
use machina_structure::coupling::{AeroLoadModel, SpanLoads};
use machina_structure::membrane::Membrane;
use machina_types::config::{KinematicParams, RotorSolverConfig, SimulationParameters, UnsteadyConfig};
use machina_types::constants::K_UNSTEADY_LIMIT;
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::{AeroHistory, DerivedMetrics, MembraneResponse, ResultFlags, SimulationResult};
use machina_uq::StochasticInput;
use machina_validate::{Constraint, ConstraintCategory, Limit, Quantity};
use tracing::{debug, warn};

/// Spanwise position of the representative wing section.
const REFERENCE_STATION: f64 = 0.75;

const AIR_DENSITY_KEY: &str = "environment.air_density";

pub fn builtin() -> Vec<InventionSpec> {
    vec![ornithopter_wing(), aerial_screw(), glider()]
}

fn ornithopter_wing() -> InventionSpec {
    InventionSpec {
        kind: InventionKind::OrnithopterWing,
        title: "Ornithopter flapping wing",
        source: "Paris Manuscript B, ff. 74v-75r",
        simulate: simulate_ornithopter,
        constraints: ornithopter_constraints,
        stochastic_inputs: wing_inputs,
        apply_input,
        uq_outputs: || vec![Quantity::Lift, Quantity::Thrust, Quantity::RequiredPower, Quantity::PeakStress],
    }
}

fn aerial_screw() -> InventionSpec {
    InventionSpec {
        kind: InventionKind::AerialScrew,
        title: "Aerial screw",
        source: "Paris Manuscript B, f. 83v",
        simulate: simulate_aerial_screw,
        constraints: aerial_screw_constraints,
        stochastic_inputs: screw_inputs,
        apply_input,
        uq_outputs: || vec![Quantity::Thrust, Quantity::RequiredPower, Quantity::PeakStress],
    }
}

fn glider() -> InventionSpec {
    InventionSpec {
        kind: InventionKind::Glider,
        title: "Fixed-wing glider",
        source: "Codex Atlanticus, f. 846v",
        simulate: simulate_glider,
        constraints: glider_constraints,
        stochastic_inputs: wing_inputs,
        apply_input,
        uq_outputs: || vec![Quantity::Lift, Quantity::RequiredPower, Quantity::PeakStress],
    }
}

// ── Shared pieces ────────────────────────────────────────────────────

fn weight(p: &SimulationParameters) -> f64 {
    p.geometry.vehicle_mass * p.environment.gravity
}

/// Catalog keys of the selected material; fails if any is missing.
fn material_citations(catalog: &Catalog, material: &str) -> MachinaResult<Vec<String>> {
    ["density", "modulus", "fatigue_limit"]
        .iter()
        .map(|prop| {
            catalog.material(material, prop)?;
            Ok(material_key(material, prop))
        })
        .collect()
}

fn spar_beam(ctx: &SimulationContext<'_>, length: f64) -> MachinaResult<CantileverBeam> {
    let modulus = ctx.catalog.material(&ctx.params.material, "modulus")?.nominal;
    let section = BeamSection::from_spar(&ctx.params.geometry.spar, modulus, ctx.config.coupling.poisson_ratio)?;
    CantileverBeam::new(length, section, ctx.config.coupling.stations)
}

fn wing_model(ctx: &SimulationContext<'_>) -> MachinaResult<UnsteadyModel> {
    let p = ctx.params;
    let config = UnsteadyConfig {
        quasi_steady: ctx.config.unsteady.quasi_steady || !ctx.fidelity.unsteady(),
        ..ctx.config.unsteady.clone()
    };
    UnsteadyModel::new(
        WingSection {
            semi_chord: 0.5 * p.geometry.chord,
            elastic_axis: p.geometry.elastic_axis,
        },
        p.kinematics.airspeed,
        p.environment.air_density,
        config,
    )
}

/// Flapping motion seen by the section `r` metres from the wing root.
fn flapping_at(k: &KinematicParams, r: f64, elastic_twist: f64) -> HarmonicKinematics {
    HarmonicKinematics {
        mean_alpha: k.mean_pitch + elastic_twist,
        alpha_amplitude: k.pitch_amplitude,
        plunge_amplitude: r * k.flap_amplitude.sin(),
        frequency: k.flap_frequency,
        phase_lead: k.phase_lead,
    }
}

fn semi_span(p: &SimulationParameters) -> MachinaResult<f64> {
    let s = 0.5 * p.geometry.span;
    if s > 0.0 {
        Ok(s)
    } else {
        Err(MachinaError::Configuration(format!(
            "wing span must be > 0, got {}",
            p.geometry.span
        )))
    }
}

/// Linear interpolation on ascending `xs`, held constant past the ends.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    match n {
        0 => 0.0,
        1 => ys[0],
        _ if x <= xs[0] => ys[0],
        _ if x >= xs[n - 1] => ys[n - 1],
        _ => {
            let i = xs[..n].partition_point(|v| *v <= x).clamp(1, n - 1);
            let t = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
            ys[i - 1] + t * (ys[i] - ys[i - 1])
        }
    }
}

/// Wing strips re-simulated at each beam station with the elastic twist
/// added to the mean pitch.
struct WingLoads<'a> {
    model: &'a UnsteadyModel,
    kinematics: &'a KinematicParams,
    flapping: bool,
}

impl AeroLoadModel for WingLoads<'_> {
    fn span_loads(&mut self, stations: &[f64], elastic_twist: &[f64]) -> MachinaResult<SpanLoads> {
        let mut loads = SpanLoads {
            lift: Vec::with_capacity(stations.len()),
            torque: Vec::with_capacity(stations.len()),
        };
        for (i, r) in stations.iter().enumerate() {
            let twist = elastic_twist.get(i).copied().unwrap_or(0.0);
            let kin = if self.flapping {
                flapping_at(self.kinematics, *r, twist)
            } else {
                HarmonicKinematics::steady(self.kinematics.mean_pitch + twist)
            };
            let history = self.model.simulate(&Kinematics::Harmonic(kin))?;
            // Design load: the instant of peak lift.
            let peak = history
                .states
                .iter()
                .max_by(|a, b| a.lift.abs().total_cmp(&b.lift.abs()));
            let (lift, moment) = peak.map(|s| (s.lift, s.moment)).unwrap_or((0.0, 0.0));
            loads.lift.push(lift);
            loads.torque.push(moment);
        }
        Ok(loads)
    }
}

fn membrane_response(
    ctx: &SimulationContext<'_>,
    history: &AeroHistory,
    flags: &mut ResultFlags,
    citations: &mut Vec<String>,
) -> MachinaResult<Option<MembraneResponse>> {
    let g = &ctx.params.geometry;
    let name = &ctx.config.membrane;
    let membrane = Membrane::from_catalog(ctx.catalog, name, g.span * g.chord)?;
    citations.extend(Membrane::catalog_keys(name));
    let dt = match history.states.as_slice() {
        [a, b, ..] => b.time - a.time,
        _ => return Ok(None),
    };
    let pressure: Vec<f64> = history.states.iter().map(|s| s.lift / g.chord).collect();
    match membrane.respond(&pressure, dt, ctx.params.kinematics.flap_frequency, &ctx.config.coupling) {
        Ok(response) => Ok(Some(response)),
        Err(e @ MachinaError::StructuralInstability { .. }) => {
            warn!(membrane = %name, error = %e, "membrane response dropped");
            flags.structural_fallback = true;
            flags.warnings.push(e.to_string());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// ── Ornithopter ──────────────────────────────────────────────────────

fn simulate_ornithopter(ctx: &SimulationContext<'_>) -> MachinaResult<SimulationResult> {
    let p = ctx.params;
    let k = &p.kinematics;
    let semi_span = semi_span(p)?;
    let mut citations = material_citations(ctx.catalog, &p.material)?;
    let mut flags = ResultFlags::default();

    let model = wing_model(ctx)?;
    let history = model.simulate(&Kinematics::Harmonic(flapping_at(k, REFERENCE_STATION * semi_span, 0.0)))?;
    debug!(
        reduced_frequency = history.reduced_frequency,
        mean_lift = history.mean_lift,
        mean_thrust = history.mean_thrust,
        "ornithopter section simulated"
    );

    let span = p.geometry.span;
    let mut metrics = DerivedMetrics {
        lift: Some(history.mean_lift * span),
        thrust: Some(history.mean_thrust * span),
        required_power: Some(history.mean_power * span),
        weight: Some(weight(p)),
        span: Some(span),
        airspeed: Some(k.airspeed),
        reduced_frequency: Some(history.reduced_frequency),
        ..DerivedMetrics::default()
    };

    let structure = if ctx.fidelity.structural_coupling() {
        let beam = spar_beam(ctx, semi_span)?;
        let mut aero = WingLoads {
            model: &model,
            kinematics: k,
            flapping: true,
        };
        let mut response = couple_with_fallback(&mut aero, &beam, &ctx.config.coupling, &mut flags)?;
        response.membrane = membrane_response(ctx, &history, &mut flags, &mut citations)?;
        metrics.peak_stress = Some(response.peak_stress);
        metrics.tip_deflection = Some(response.tip_deflection);
        Some(response)
    } else {
        None
    };

    Ok(SimulationResult {
        invention: InventionKind::OrnithopterWing.id().to_string(),
        fidelity: ctx.fidelity,
        aero: Some(history),
        rotor: None,
        structure,
        metrics,
        flags,
        citations,
    })
}

fn ornithopter_constraints(p: &SimulationParameters, _catalog: &Catalog) -> MachinaResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::at_most(
            "ornithopter.span",
            "Span within the 20-braccia layout",
            Quantity::Span,
            catalog_limit("manuscript.ornithopter.span_max", 1.0),
            ConstraintCategory::Geometry,
        ),
        Constraint::at_most(
            "ornithopter.spar_length",
            "Each semi-span spar cut from one seasoned timber",
            Quantity::Span,
            catalog_limit("process.timber.max_spar_length", 2.0),
            ConstraintCategory::Process,
        ),
        Constraint::at_most(
            "ornithopter.power_burst",
            "Flapping power within one pilot's short-burst output",
            Quantity::RequiredPower,
            catalog_limit("power.human.short_burst", 1.0),
            ConstraintCategory::Power,
        ),
        Constraint::at_most(
            "ornithopter.power_sustained",
            "Flapping power sustainable for more than a few minutes",
            Quantity::RequiredPower,
            catalog_limit("power.human.sustained", 1.0),
            ConstraintCategory::Power,
        )
        .soft(),
        Constraint::at_most(
            "ornithopter.spar_stress",
            "Peak spar bending stress below the timber fatigue limit",
            Quantity::PeakStress,
            catalog_limit(&material_key(&p.material, "fatigue_limit"), 1.0),
            ConstraintCategory::Material,
        ),
        // The ratio is taken over the full span; the allowance is per semi-span.
        Constraint::at_most(
            "ornithopter.tip_deflection",
            "Wing tip deflection within the spar allowance",
            Quantity::TipDeflectionRatio,
            catalog_limit("limit.structure.tip_deflection_ratio", 0.5),
            ConstraintCategory::Material,
        )
        .soft(),
        Constraint::at_least(
            "ornithopter.lift",
            "Mean lift carries the gross weight",
            Quantity::LiftToWeight,
            fixed_limit(1.0, "Level flight requires L >= W"),
            ConstraintCategory::Performance,
        )
        .soft(),
        Constraint::at_most(
            "ornithopter.reduced_frequency",
            "Flapping within the thin-airfoil unsteady range",
            Quantity::ReducedFrequency,
            fixed_limit(K_UNSTEADY_LIMIT, "Theodorsen, NACA Report 496 (1935)"),
            ConstraintCategory::Performance,
        )
        .soft(),
    ])
}

// ── Aerial screw ─────────────────────────────────────────────────────

fn screw_geometry(p: &SimulationParameters) -> RotorGeometry {
    let g = &p.geometry;
    RotorGeometry {
        radius: g.radius,
        root_cutout: g.root_cutout,
        blade_count: g.blade_count,
        chord: ChordDistribution::Constant(g.chord),
        twist: TwistDistribution::Helical { pitch: g.pitch },
    }
}

/// Blade loads from a BEMT solve with elastic twist per element.
struct BladeLoads<'a> {
    solver: RotorSolver,
    geometry: &'a RotorGeometry,
    op: &'a OperatingPoint,
    /// Aerodynamic-centre lever arm ahead of the spar [m].
    lever: f64,
}

impl AeroLoadModel for BladeLoads<'_> {
    fn span_loads(&mut self, stations: &[f64], elastic_twist: &[f64]) -> MachinaResult<SpanLoads> {
        let n = self.solver.config().elements;
        let r0 = self.geometry.root_radius();
        let dr = (self.geometry.radius - r0) / n as f64;
        let element_twist: Vec<f64> = (0..n)
            .map(|i| interpolate(stations, elastic_twist, (i as f64 + 0.5) * dr))
            .collect();
        let solution = self.solver.solve_deformed(self.geometry, self.op, &element_twist)?;

        let blades = self.geometry.blade_count as f64;
        let positions: Vec<f64> = solution.elements.iter().map(|e| e.radius - r0).collect();
        let per_span: Vec<f64> = solution
            .elements
            .iter()
            .map(|e| e.thrust / (blades * e.width))
            .collect();
        let lift: Vec<f64> = stations.iter().map(|s| interpolate(&positions, &per_span, *s)).collect();
        let torque = lift.iter().map(|l| l * self.lever).collect();
        Ok(SpanLoads { lift, torque })
    }
}

fn simulate_aerial_screw(ctx: &SimulationContext<'_>) -> MachinaResult<SimulationResult> {
    let p = ctx.params;
    let mut citations = material_citations(ctx.catalog, &p.material)?;
    let mut flags = ResultFlags::default();

    let geometry = screw_geometry(p);
    let op = OperatingPoint {
        rotation_rate: p.kinematics.rotation_rate,
        axial_velocity: p.kinematics.climb_velocity,
        density: p.environment.air_density,
    };
    let (rotor, accepted) = if ctx.fidelity.unsteady() {
        solve_rotor_with_retry(&ctx.config.rotor, &geometry, &op, &mut flags)?
    } else {
        // Uniform-inflow momentum theory: no loss factors, no wake.
        let config = RotorSolverConfig {
            tip_loss: false,
            root_loss: false,
            wake: None,
            ..ctx.config.rotor.clone()
        };
        let rotor = RotorSolver::new(config.clone())?.momentum_estimate(&geometry, &op)?;
        (rotor, config)
    };

    let tip_speed = op.rotation_rate * geometry.radius;
    let mut metrics = DerivedMetrics {
        thrust: Some(rotor.thrust),
        required_power: Some(rotor.power),
        weight: Some(weight(p)),
        radius: Some(geometry.radius),
        tip_speed: Some(tip_speed),
        disk_loading: Some(rotor.thrust / geometry.disk_area()),
        ..DerivedMetrics::default()
    };

    let structure = if ctx.fidelity.structural_coupling() {
        let beam = spar_beam(ctx, geometry.radius - geometry.root_radius())?;
        let mut aero = BladeLoads {
            solver: RotorSolver::new(accepted)?,
            geometry: &geometry,
            op: &op,
            lever: 0.5 * p.geometry.chord * (p.geometry.elastic_axis + 0.5),
        };
        let response = couple_with_fallback(&mut aero, &beam, &ctx.config.coupling, &mut flags)?;
        metrics.peak_stress = Some(response.peak_stress);
        metrics.tip_deflection = Some(response.tip_deflection);
        Some(response)
    } else {
        None
    };
    citations.push("manuscript.aerial_screw.crew".to_string());

    Ok(SimulationResult {
        invention: InventionKind::AerialScrew.id().to_string(),
        fidelity: ctx.fidelity,
        aero: None,
        rotor: Some(rotor),
        structure,
        metrics,
        flags,
        citations,
    })
}

fn aerial_screw_constraints(p: &SimulationParameters, catalog: &Catalog) -> MachinaResult<Vec<Constraint>> {
    let crew = catalog.nominal("manuscript.aerial_screw.crew")?;
    Ok(vec![
        Constraint::at_most(
            "aerial_screw.crew_power",
            "Shaft power within the sustained output of the capstan crew",
            Quantity::RequiredPower,
            catalog_limit("power.human.sustained", crew),
            ConstraintCategory::Power,
        ),
        Constraint::at_least(
            "aerial_screw.lift_off",
            "Screw thrust lifts the machine and its crew",
            Quantity::LiftToWeight,
            fixed_limit(1.0, "Vertical take-off requires T >= W"),
            ConstraintCategory::Performance,
        ),
        Constraint::at_most(
            "aerial_screw.spar_stress",
            "Peak blade-spar bending stress below the fatigue limit",
            Quantity::PeakStress,
            catalog_limit(&material_key(&p.material, "fatigue_limit"), 1.0),
            ConstraintCategory::Material,
        ),
        Constraint::at_most(
            "aerial_screw.radius",
            "Radius close to the 8-braccia diameter",
            Quantity::Radius,
            catalog_limit("manuscript.aerial_screw.radius", 1.05),
            ConstraintCategory::Geometry,
        )
        .soft(),
        Constraint::at_most(
            "aerial_screw.tip_deflection",
            "Blade tip deflection within the spar allowance",
            Quantity::TipDeflectionRatio,
            catalog_limit("limit.structure.tip_deflection_ratio", 1.0),
            ConstraintCategory::Material,
        )
        .soft(),
    ])
}

// ── Glider ───────────────────────────────────────────────────────────

fn simulate_glider(ctx: &SimulationContext<'_>) -> MachinaResult<SimulationResult> {
    let p = ctx.params;
    let k = &p.kinematics;
    let semi_span = semi_span(p)?;
    let citations = material_citations(ctx.catalog, &p.material)?;
    let mut flags = ResultFlags::default();

    let model = wing_model(ctx)?;
    let history = model.simulate(&Kinematics::Harmonic(HarmonicKinematics::steady(k.mean_pitch)))?;

    let span = p.geometry.span;
    // Steady flight: thrust is minus the profile drag.
    let drag = -history.mean_thrust * span;
    let mut metrics = DerivedMetrics {
        lift: Some(history.mean_lift * span),
        thrust: Some(history.mean_thrust * span),
        required_power: Some(drag.max(0.0) * k.airspeed),
        weight: Some(weight(p)),
        span: Some(span),
        airspeed: Some(k.airspeed),
        reduced_frequency: Some(history.reduced_frequency),
        ..DerivedMetrics::default()
    };

    let structure = if ctx.fidelity.structural_coupling() {
        let beam = spar_beam(ctx, semi_span)?;
        let mut aero = WingLoads {
            model: &model,
            kinematics: k,
            flapping: false,
        };
        let response = couple_with_fallback(&mut aero, &beam, &ctx.config.coupling, &mut flags)?;
        metrics.peak_stress = Some(response.peak_stress);
        metrics.tip_deflection = Some(response.tip_deflection);
        Some(response)
    } else {
        None
    };

    Ok(SimulationResult {
        invention: InventionKind::Glider.id().to_string(),
        fidelity: ctx.fidelity,
        aero: Some(history),
        rotor: None,
        structure,
        metrics,
        flags,
        citations,
    })
}

fn glider_constraints(p: &SimulationParameters, _catalog: &Catalog) -> MachinaResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::at_most(
            "glider.span",
            "Span within the drawn layout",
            Quantity::Span,
            catalog_limit("manuscript.glider.span_max", 1.0),
            ConstraintCategory::Geometry,
        ),
        Constraint::at_most(
            "glider.spar_length",
            "Each semi-span spar cut from one seasoned timber",
            Quantity::Span,
            catalog_limit("process.timber.max_spar_length", 2.0),
            ConstraintCategory::Process,
        ),
        Constraint::at_most(
            "glider.spar_stress",
            "Peak spar bending stress below the timber fatigue limit",
            Quantity::PeakStress,
            catalog_limit(&material_key(&p.material, "fatigue_limit"), 1.0),
            ConstraintCategory::Material,
        ),
        Constraint::at_most(
            "glider.tip_deflection",
            "Wing tip deflection within the spar allowance",
            Quantity::TipDeflectionRatio,
            catalog_limit("limit.structure.tip_deflection_ratio", 0.5),
            ConstraintCategory::Material,
        )
        .soft(),
        Constraint::at_least(
            "glider.lift",
            "Lift carries the gross weight at the chosen airspeed",
            Quantity::LiftToWeight,
            fixed_limit(1.0, "Level flight requires L >= W"),
            ConstraintCategory::Performance,
        )
        .soft(),
    ])
}

fn catalog_limit(key: &str, scale: f64) -> Limit {
    Limit::Catalog {
        key: key.to_string(),
        scale,
    }
}

fn fixed_limit(value: f64, citation: &str) -> Limit {
    Limit::Fixed {
        value,
        citation: citation.to_string(),
    }
}

// ── Stochastic inputs ────────────────────────────────────────────────

/// Uniform workshop tolerance of ±`relative` around `nominal`.
fn tolerance(name: &str, unit: &str, nominal: f64, relative: f64, citation: &str) -> StochasticInput {
    StochasticInput::tolerance(
        name,
        MaterialProperty {
            name: name.to_string(),
            unit: unit.to_string(),
            nominal,
            distribution: Distribution::Uniform {
                low: nominal * (1.0 - relative),
                high: nominal * (1.0 + relative),
            },
            support: None,
            citation: citation.to_string(),
        },
    )
}

const JOINERY_TOLERANCE: &str = "Hand-sawn and planed timber, about one dito in a braccio";

fn wing_inputs(p: &SimulationParameters) -> Vec<StochasticInput> {
    vec![
        StochasticInput::catalog("modulus", &material_key(&p.material, "modulus")),
        StochasticInput::catalog("air_density", AIR_DENSITY_KEY),
        tolerance("chord", "m", p.geometry.chord, 0.02, JOINERY_TOLERANCE),
    ]
}

fn screw_inputs(p: &SimulationParameters) -> Vec<StochasticInput> {
    vec![
        StochasticInput::catalog("modulus", &material_key(&p.material, "modulus")),
        StochasticInput::catalog("air_density", AIR_DENSITY_KEY),
        tolerance("pitch", "m", p.geometry.pitch, 0.03, "Helix laid out on a wooden former, Ms. B f. 83v"),
        tolerance("chord", "m", p.geometry.chord, 0.02, JOINERY_TOLERANCE),
    ]
}

/// Inputs backed by catalog entries take effect through the catalog; the
/// rest land in the parameter copy here.
fn apply_input(p: &mut SimulationParameters, name: &str, value: f64) -> MachinaResult<()> {
    match name {
        "modulus" => {}
        "air_density" => p.environment.air_density = value,
        "chord" => p.geometry.chord = value,
        "pitch" => p.geometry.pitch = value,
        other => {
            return Err(MachinaError::Configuration(format!(
                "stochastic input {other} has no parameter mapping"
            )))
        }
    }
    Ok(())
}
