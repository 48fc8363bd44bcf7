use criterion::{criterion_group, criterion_main, Criterion};
use machina_aero::kinematics::{HarmonicKinematics, Kinematics};
use machina_aero::rotor::{ChordDistribution, OperatingPoint, RotorGeometry, RotorSolver, TwistDistribution};
use machina_aero::unsteady::{UnsteadyModel, WingSection};
use machina_types::config::{RotorSolverConfig, UnsteadyConfig, WakeConfig};
use std::hint::black_box;

fn screw() -> (RotorGeometry, OperatingPoint) {
    (
        RotorGeometry {
            radius: 2.4,
            root_cutout: 0.2,
            blade_count: 2,
            chord: ChordDistribution::Constant(0.5),
            twist: TwistDistribution::Helical { pitch: 1.5 },
        },
        OperatingPoint {
            rotation_rate: 3.0,
            axial_velocity: 0.0,
            density: 1.225,
        },
    )
}

fn bench_unsteady_section(c: &mut Criterion) {
    let model = UnsteadyModel::new(
        WingSection {
            semi_chord: 0.5,
            elastic_axis: -0.5,
        },
        10.0,
        1.225,
        UnsteadyConfig::default(),
    )
    .unwrap();
    let kin = Kinematics::Harmonic(HarmonicKinematics {
        mean_alpha: 0.05,
        alpha_amplitude: 0.1,
        plunge_amplitude: 0.4,
        frequency: 1.0,
        phase_lead: std::f64::consts::FRAC_PI_2,
    });

    c.bench_function("unsteady_4_cycles_400_steps", |b| {
        b.iter(|| black_box(model.simulate(&kin).unwrap().mean_thrust))
    });
}

fn bench_bemt(c: &mut Criterion) {
    let (geometry, op) = screw();
    let solver = RotorSolver::new(RotorSolverConfig::default()).unwrap();

    c.bench_function("bemt_24_elements", |b| {
        b.iter(|| black_box(solver.solve(&geometry, &op).unwrap().thrust))
    });
}

fn bench_vortex_wake(c: &mut Criterion) {
    let (geometry, op) = screw();
    let solver = RotorSolver::new(RotorSolverConfig {
        wake: Some(WakeConfig::default()),
        ..RotorSolverConfig::default()
    })
    .unwrap();

    let mut group = c.benchmark_group("vortex_wake");
    group.sample_size(10);
    group.bench_function("bemt_plus_wake_4_revs", |b| {
        b.iter(|| black_box(solver.solve(&geometry, &op).unwrap().thrust))
    });
    group.finish();
}

criterion_group!(benches, bench_unsteady_section, bench_bemt, bench_vortex_wake);
criterion_main!(benches);
