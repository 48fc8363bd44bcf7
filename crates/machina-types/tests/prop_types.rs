// ─────────────────────────────────────────────────────────────────────
// Machina — Property-Based Tests (proptest) for machina-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for machina-types using proptest.
//!
//! Covers: spar section invariants, parameter validation,
//! configuration serialization roundtrip.

use machina_types::config::{
    Environment, Geometry, KinematicParams, SimulationParameters, SparSection,
};
use proptest::prelude::*;

fn params(span: f64, chord: f64, airspeed: f64, seed: u64) -> SimulationParameters {
    SimulationParameters {
        geometry: Geometry {
            span,
            chord,
            radius: 2.0,
            pitch: 1.5,
            root_cutout: 0.1,
            blade_count: 2,
            elastic_axis: -0.5,
            spar: SparSection {
                width: 0.05,
                depth: 0.08,
            },
            vehicle_mass: 100.0,
        },
        kinematics: KinematicParams {
            flap_frequency: 0.5,
            flap_amplitude: 0.4,
            pitch_amplitude: 0.1,
            mean_pitch: 0.05,
            phase_lead: 1.5,
            rotation_rate: 5.0,
            airspeed,
            climb_velocity: 0.0,
        },
        material: "ash".to_string(),
        environment: Environment::default(),
        seed,
    }
}

// ── Spar Section Invariants ──────────────────────────────────────────

proptest! {
    /// Doubling depth multiplies the bending stiffness by eight.
    #[test]
    fn second_moment_scales_with_depth_cubed(
        width in 0.01f64..0.5,
        depth in 0.01f64..0.5,
    ) {
        let a = SparSection { width, depth };
        let b = SparSection { width, depth: 2.0 * depth };
        let ratio = b.second_moment() / a.second_moment();
        prop_assert!((ratio - 8.0).abs() < 1e-9, "ratio = {}", ratio);
    }

    /// Torsion constant is positive and symmetric in width/depth.
    #[test]
    fn torsion_constant_symmetric(
        width in 0.01f64..0.5,
        depth in 0.01f64..0.5,
    ) {
        let a = SparSection { width, depth };
        let b = SparSection { width: depth, depth: width };
        prop_assert!(a.torsion_constant() > 0.0);
        prop_assert!((a.torsion_constant() - b.torsion_constant()).abs() < 1e-15);
    }
}

// ── Parameter Validation ─────────────────────────────────────────────

proptest! {
    /// Any finite, positive geometry validates.
    #[test]
    fn positive_geometry_validates(
        span in 0.1f64..40.0,
        chord in 0.05f64..5.0,
        airspeed in 0.0f64..60.0,
    ) {
        prop_assert!(params(span, chord, airspeed, 1).validate().is_ok());
    }

    /// Negative spans are always rejected.
    #[test]
    fn negative_span_rejected(span in -40.0f64..-1e-6) {
        prop_assert!(params(span, 1.0, 5.0, 1).validate().is_err());
    }

    /// JSON roundtrip preserves every field exactly.
    #[test]
    fn json_roundtrip_identity(
        span in 0.1f64..40.0,
        chord in 0.05f64..5.0,
        seed in any::<u64>(),
    ) {
        let p = params(span, chord, 7.0, seed);
        let json = serde_json::to_string(&p).unwrap();
        let back: SimulationParameters = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, p);
    }
}
