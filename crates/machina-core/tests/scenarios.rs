// ─────────────────────────────────────────────────────────────────────
// Machina — End-to-End Scenarios
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Invocation-level tests: hover rotor against actuator-disk theory,
//! steady wing against the static lift slope, an infeasible catalog
//! entry, and Monte Carlo against Latin hypercube on a full invention.

use machina_aero::rotor::{actuator_disk_thrust, hover_induced_velocity};
use machina_catalog::global::{self, CatalogSnapshot};
use machina_catalog::period::period_catalog;
use machina_core::inventions;
use machina_core::{InventionKind, Pipeline, PipelineConfig, Registry};
use machina_types::config::{
    CouplingMode, Environment, FidelityLevel, Geometry, KinematicParams, SamplingMethod, SensitivityMethod,
    SimulationParameters, SparSection, UnsteadyConfig,
};
use machina_types::state::Verdict;
use machina_uq::UqConfig;
use machina_validate::{Constraint, ConstraintCategory, Limit, Quantity};
use std::f64::consts::{FRAC_PI_2, PI};

fn snapshot() -> CatalogSnapshot {
    CatalogSnapshot::new(period_catalog().unwrap(), 1).unwrap()
}

fn quick_config(samples: usize) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.unsteady = UnsteadyConfig {
        steps_per_cycle: 64,
        cycles: 3,
        ..UnsteadyConfig::default()
    };
    config.coupling.stations = 9;
    config.uq = UqConfig {
        samples,
        sensitivity: SensitivityMethod::None,
        ..UqConfig::default()
    };
    config
}

fn wing(material: &str) -> SimulationParameters {
    SimulationParameters {
        geometry: Geometry {
            span: 9.0,
            chord: 1.2,
            radius: 0.0,
            pitch: 0.0,
            root_cutout: 0.1,
            blade_count: 2,
            elastic_axis: -0.5,
            spar: SparSection { width: 0.08, depth: 0.14 },
            vehicle_mass: 95.0,
        },
        kinematics: KinematicParams {
            flap_frequency: 0.8,
            flap_amplitude: 0.3,
            pitch_amplitude: 0.12,
            mean_pitch: 0.1,
            phase_lead: FRAC_PI_2,
            rotation_rate: 0.0,
            airspeed: 11.0,
            climb_velocity: 0.0,
        },
        material: material.to_string(),
        environment: Environment::default(),
        seed: 2024,
    }
}

fn hover_screw() -> SimulationParameters {
    let mut p = wing("oak");
    p.geometry.radius = 2.0;
    p.geometry.root_cutout = 0.15;
    p.geometry.blade_count = 3;
    p.geometry.chord = 0.2;
    // Small pitch: θ = atan(p / 2πr) is close to ideal twist.
    p.geometry.pitch = 0.8;
    p.kinematics.rotation_rate = 5.0;
    p.kinematics.airspeed = 0.0;
    p
}

#[test]
fn scenario_a_hover_rotor_matches_actuator_disk() {
    let pipeline = Pipeline::new(quick_config(32)).unwrap();
    let out = pipeline
        .run("aerial_screw", &hover_screw(), FidelityLevel::Advanced, &snapshot())
        .unwrap();
    let rotor = out.result.rotor.as_ref().unwrap();
    assert!(rotor.thrust > 0.0);
    assert!(rotor.iterations < 50, "iterations {}", rotor.iterations);
    assert!(!out.result.flags.relaxed_tolerance);

    let r0 = 0.15 * 2.0;
    let area = PI * (2.0f64.powi(2) - r0 * r0);
    let disk = actuator_disk_thrust(1.225, area, 0.0, rotor.mean_induced_velocity);
    assert!(
        (disk - rotor.thrust).abs() / rotor.thrust < 0.15,
        "BEMT {} vs actuator disk {}",
        rotor.thrust,
        disk
    );
    let ideal = hover_induced_velocity(rotor.thrust, 1.225, area);
    assert!((ideal - rotor.mean_induced_velocity).abs() / ideal < 0.1);
}

#[test]
fn scenario_b_steady_wing_matches_lift_slope() {
    let pipeline = Pipeline::new(quick_config(32)).unwrap();
    let p = wing("spruce");
    let out = pipeline.run("glider", &p, FidelityLevel::Advanced, &snapshot()).unwrap();
    let aero = out.result.aero.as_ref().unwrap();
    assert_eq!(aero.reduced_frequency, 0.0);
    let q = 0.5 * 1.225 * p.kinematics.airspeed.powi(2);
    let static_lift = q * p.geometry.chord * 2.0 * PI * p.kinematics.mean_pitch;
    assert!((aero.mean_lift - static_lift).abs() / static_lift < 1e-3);
    for s in aero.states.iter().skip(1) {
        assert!((s.alpha_effective - p.kinematics.mean_pitch).abs() < 1e-6);
    }
}

fn with_fatigue_floor(_: &SimulationParameters, _: &machina_catalog::Catalog) -> machina_types::error::MachinaResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::at_least(
            "material.fatigue_floor",
            "Spar timber endurance at least 15 MPa",
            Quantity::CatalogNominal("material.pine.fatigue_limit".to_string()),
            Limit::Fixed {
                value: 15.0e6,
                citation: "Workshop acceptance test".to_string(),
            },
            ConstraintCategory::Material,
        ),
        Constraint::at_most(
            "glider.span",
            "Span within the drawn layout",
            Quantity::Span,
            Limit::Catalog {
                key: "manuscript.glider.span_max".to_string(),
                scale: 1.0,
            },
            ConstraintCategory::Geometry,
        )
        .soft(),
    ])
}

#[test]
fn scenario_c_catalog_value_below_mandatory_minimum_is_infeasible() {
    let mut registry = Registry::new();
    for mut spec in inventions::builtin() {
        if spec.kind == InventionKind::Glider {
            spec.constraints = with_fatigue_floor;
        }
        registry.register(spec).unwrap();
    }
    let pipeline = Pipeline::with_registry(registry, quick_config(32)).unwrap();
    let catalog = period_catalog().unwrap().with_nominal("material.pine.fatigue_limit", 13.0e6).unwrap();
    let snapshot = CatalogSnapshot::new(catalog, 2).unwrap();

    let out = pipeline.run("glider", &wing("pine"), FidelityLevel::Advanced, &snapshot).unwrap();
    let report = out.compliance.unwrap();
    assert_eq!(report.verdict, Verdict::Infeasible);
    let failed: Vec<_> = report.mandatory_failures().map(|o| o.constraint_id.as_str()).collect();
    assert_eq!(failed, vec!["material.fatigue_floor"]);
    assert!(report.outcome("glider.span").unwrap().passed);
    assert_eq!(report.catalog.version, 2);
    assert_eq!(report.catalog.fingerprint, snapshot.fingerprint);
}

#[test]
fn scenario_d_monte_carlo_and_lhs_agree_on_the_mean() {
    let snapshot = snapshot();
    let p = wing("ash");
    let mut mc_means = Vec::new();
    let mut lhs_means = Vec::new();
    for seed in 0..6u64 {
        let params = SimulationParameters { seed, ..p.clone() };
        for (method, means) in [
            (SamplingMethod::MonteCarlo, &mut mc_means),
            (SamplingMethod::LatinHypercube, &mut lhs_means),
        ] {
            let mut config = quick_config(500);
            config.uq.method = method;
            config.coupling.mode = CouplingMode::OneWay;
            let out = Pipeline::new(config)
                .unwrap()
                .run("glider", &params, FidelityLevel::Research, &snapshot)
                .unwrap();
            let report = out.uncertainty.unwrap();
            assert_eq!(report.method, method);
            assert_eq!(report.coverage_warning, method == SamplingMethod::MonteCarlo);
            assert_eq!(report.completed_samples + report.failures.len(), 500);
            means.push(report.output("lift").unwrap().mean);
        }
    }
    let avg = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    let spread = |v: &[f64]| {
        let m = avg(v);
        v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (v.len() - 1) as f64
    };
    let (m_mc, m_lhs) = (avg(&mc_means), avg(&lhs_means));
    assert!((m_mc - m_lhs).abs() / m_lhs < 0.05, "MC {m_mc} vs LHS {m_lhs}");
    assert!(
        spread(&lhs_means) < spread(&mc_means),
        "LHS spread {} vs MC spread {}",
        spread(&lhs_means),
        spread(&mc_means)
    );
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let pipeline = Pipeline::new(quick_config(24)).unwrap();
    let snapshot = snapshot();
    let p = wing("ash");
    let a = pipeline.run("ornithopter_wing", &p, FidelityLevel::Research, &snapshot).unwrap();
    let b = pipeline.run("ornithopter_wing", &p, FidelityLevel::Research, &snapshot).unwrap();
    assert_eq!(a, b);
}

#[test]
fn fidelity_gates_stages() {
    let pipeline = Pipeline::new(quick_config(24)).unwrap();
    let snapshot = snapshot();
    let p = wing("ash");

    let edu = pipeline.run("ornithopter_wing", &p, FidelityLevel::Educational, &snapshot).unwrap();
    assert!(edu.result.aero.as_ref().unwrap().quasi_steady);
    assert!(edu.result.structure.is_none() && edu.uncertainty.is_none());
    // Stress constraints are skipped without a structural model.
    assert!(edu.compliance.as_ref().unwrap().skipped.contains(&"ornithopter.spar_stress".to_string()));

    let adv = pipeline.run("ornithopter_wing", &p, FidelityLevel::Advanced, &snapshot).unwrap();
    assert!(!adv.result.aero.as_ref().unwrap().quasi_steady);
    assert!(adv.result.structure.is_none() && adv.uncertainty.is_none());
    assert_ne!(edu.result.metrics.thrust, adv.result.metrics.thrust);

    let research = pipeline.run("ornithopter_wing", &p, FidelityLevel::Research, &snapshot).unwrap();
    assert!(research.result.structure.is_some());
    let uq = research.uncertainty.unwrap();
    assert_eq!(uq.seed, p.seed);
    assert_eq!(uq.outputs.len(), 4);
    assert!(research.compliance.unwrap().skipped.is_empty());
}

#[test]
fn educational_aerial_screw_uses_momentum_theory() {
    let pipeline = Pipeline::new(quick_config(24)).unwrap();
    let p = hover_screw();
    let snapshot = snapshot();
    let edu = pipeline.run("aerial_screw", &p, FidelityLevel::Educational, &snapshot).unwrap();
    let rotor = edu.result.rotor.as_ref().unwrap();
    let v = rotor.mean_induced_velocity;
    assert!(v > 0.0);
    assert!(rotor.elements.iter().all(|e| e.induced_velocity == v));
    assert!(!rotor.wake_refined);
    assert!(edu.result.structure.is_none() && edu.uncertainty.is_none());

    let rho = p.environment.air_density;
    let area = PI * (2.0f64.powi(2) - 0.3f64.powi(2));
    let disk = actuator_disk_thrust(rho, area, 0.0, v);
    assert!((rotor.thrust - disk).abs() <= 1e-9 * disk, "thrust {} vs {}", rotor.thrust, disk);
    assert!((hover_induced_velocity(rotor.thrust, rho, area) - v).abs() <= 1e-6 * v);
    assert!(rotor.power > rotor.thrust * v);
    assert_eq!(edu.result.metrics.thrust, Some(rotor.thrust));
    assert_eq!(edu.result.metrics.required_power, Some(rotor.power));

    let adv = pipeline.run("aerial_screw", &p, FidelityLevel::Advanced, &snapshot).unwrap();
    let bemt = adv.result.rotor.as_ref().unwrap();
    assert!(bemt.elements.iter().any(|e| e.induced_velocity != bemt.elements[0].induced_velocity));
}

#[test]
fn aerial_screw_is_infeasible_on_crew_power() {
    let pipeline = Pipeline::new(quick_config(24)).unwrap();
    let mut p = hover_screw();
    p.geometry.radius = 2.34;
    p.geometry.chord = 0.5;
    p.geometry.blade_count = 2;
    p.geometry.pitch = 1.5;
    p.geometry.vehicle_mass = 400.0;
    p.kinematics.rotation_rate = 4.0;
    let out = pipeline.run("aerial_screw", &p, FidelityLevel::Advanced, &snapshot()).unwrap();
    let report = out.compliance.unwrap();
    // A screw of this size lifts nowhere near four men and its frame.
    assert!(!report.outcome("aerial_screw.lift_off").unwrap().passed);
    assert_eq!(report.verdict, Verdict::Infeasible);
}

#[test]
fn cancelled_pipeline_reports_incomplete_uncertainty() {
    let pipeline = Pipeline::new(quick_config(64)).unwrap();
    pipeline.cancellation_token().cancel();
    let out = pipeline
        .run("glider", &wing("ash"), FidelityLevel::Research, &snapshot())
        .unwrap();
    let uq = out.uncertainty.unwrap();
    assert!(uq.incomplete);
    assert_eq!(uq.completed_samples, 0);
    assert!(out.result.metrics.lift.unwrap() > 0.0);
}

#[test]
fn batch_runs_keep_job_order() {
    let pipeline = Pipeline::new(quick_config(16)).unwrap();
    let jobs = vec![
        ("glider".to_string(), wing("ash")),
        ("aerial_screw".to_string(), hover_screw()),
        ("steam_cannon".to_string(), wing("ash")),
        ("ornithopter_wing".to_string(), wing("oak")),
    ];
    let outputs = pipeline.run_batch(&jobs, FidelityLevel::Advanced, &snapshot());
    assert_eq!(outputs.len(), 4);
    assert_eq!(outputs[0].as_ref().unwrap().result.invention, "glider");
    assert_eq!(outputs[1].as_ref().unwrap().result.invention, "aerial_screw");
    assert!(outputs[2].is_err());
    assert_eq!(outputs[3].as_ref().unwrap().result.invention, "ornithopter_wing");
}

#[test]
fn installed_catalog_is_used_and_reset() {
    global::reset();
    let pipeline = Pipeline::new(quick_config(16)).unwrap();
    assert!(pipeline.run_installed("glider", &wing("ash"), FidelityLevel::Educational).is_err());
    let installed = global::install(period_catalog().unwrap()).unwrap();
    let out = pipeline
        .run_installed("glider", &wing("ash"), FidelityLevel::Educational)
        .unwrap();
    assert_eq!(out.compliance.unwrap().catalog.version, installed.version);
    global::reset();
}

#[test]
fn invalid_parameters_surface_as_configuration_errors() {
    let pipeline = Pipeline::new(quick_config(16)).unwrap();
    let mut p = wing("ash");
    p.kinematics.airspeed = 0.0;
    let err = pipeline.run("glider", &p, FidelityLevel::Advanced, &snapshot()).unwrap_err();
    assert!(matches!(err, machina_types::error::MachinaError::Configuration(_)));
    p.kinematics.airspeed = f64::NAN;
    assert!(pipeline.run("glider", &p, FidelityLevel::Advanced, &snapshot()).is_err());
}
