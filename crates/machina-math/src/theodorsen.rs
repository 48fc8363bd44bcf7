// ─────────────────────────────────────────────────────────────────────
// Machina — Theodorsen and Wagner Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Theodorsen lift deficiency C(k) and the Wagner indicial function.
//!
//! Both use R.T. Jones' two-pole rational fit, so the frequency-domain
//! C(k) and the time-domain Wagner recursion are exact transforms of
//! each other:
//!
//!   φ(s) = 1 − A1·e^(−b1·s) − A2·e^(−b2·s)
//!   C(k) = 1 − A1·ik/(ik + b1) − A2·ik/(ik + b2)

use machina_types::constants::{
    THEODORSEN_MAG_MAX, THEODORSEN_MAG_MIN, WAGNER_A1, WAGNER_A2, WAGNER_B1, WAGNER_B2,
};
use num_complex::Complex64;

/// Unclamped Jones approximation of C(k).
pub fn theodorsen_jones(k: f64) -> Complex64 {
    let ik = Complex64::new(0.0, k);
    Complex64::new(1.0, 0.0)
        - ik * WAGNER_A1 / (ik + WAGNER_B1)
        - ik * WAGNER_A2 / (ik + WAGNER_B2)
}

/// C(k) with the asymptotic magnitude bounds enforced.
///
/// k ≤ 0 returns the steady value 1. Non-finite or very large k returns the
/// high-frequency limit 1/2 instead of extrapolating the fit.
pub fn theodorsen(k: f64) -> Complex64 {
    if k.is_nan() || k <= 0.0 {
        return Complex64::new(THEODORSEN_MAG_MAX, 0.0);
    }
    if !k.is_finite() {
        return Complex64::new(THEODORSEN_MAG_MIN, 0.0);
    }
    let c = theodorsen_jones(k);
    let mag = c.norm();
    if mag > THEODORSEN_MAG_MAX {
        c * (THEODORSEN_MAG_MAX / mag)
    } else if mag < THEODORSEN_MAG_MIN {
        c * (THEODORSEN_MAG_MIN / mag)
    } else {
        c
    }
}

/// Wagner function φ(s), s in semi-chords travelled.
pub fn wagner(s: f64) -> f64 {
    if s <= 0.0 {
        return 1.0 - WAGNER_A1 - WAGNER_A2;
    }
    1.0 - WAGNER_A1 * (-WAGNER_B1 * s).exp() - WAGNER_A2 * (-WAGNER_B2 * s).exp()
}

/// Two-state wake deficiency for a recursively stepped Duhamel integral.
///
/// Each state is an exponential filter of the input increments, so memory
/// stays O(1) regardless of how long the history is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WagnerDeficiency {
    pub x1: f64,
    pub x2: f64,
}

impl WagnerDeficiency {
    /// Advance both states by a step of `ds` semi-chords with input change `delta`.
    ///
    /// Mid-point rule: X_n = X_{n−1}·e^(−b·Δs) + A·Δα·e^(−b·Δs/2).
    pub fn update(&mut self, delta: f64, ds: f64) {
        let e1 = (-WAGNER_B1 * ds).exp();
        let e2 = (-WAGNER_B2 * ds).exp();
        self.x1 = self.x1 * e1 + WAGNER_A1 * delta * (-0.5 * WAGNER_B1 * ds).exp();
        self.x2 = self.x2 * e2 + WAGNER_A2 * delta * (-0.5 * WAGNER_B2 * ds).exp();
    }

    pub fn total(&self) -> f64 {
        self.x1 + self.x2
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.x2.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_limit_is_unity() {
        let c = theodorsen(0.0);
        assert_eq!(c, Complex64::new(1.0, 0.0));
        let c_small = theodorsen(1e-6);
        assert!((c_small.re - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_jones_matches_tabulated_values() {
        // Exact Theodorsen: C(0.1) = 0.832 − 0.172i, C(0.5) = 0.598 − 0.151i.
        let c1 = theodorsen(0.1);
        assert!((c1.re - 0.832).abs() < 0.01, "F(0.1) = {}", c1.re);
        assert!((c1.im + 0.172).abs() < 0.015, "G(0.1) = {}", c1.im);
        let c5 = theodorsen(0.5);
        assert!((c5.re - 0.598).abs() < 0.02, "F(0.5) = {}", c5.re);
        assert!((c5.im + 0.151).abs() < 0.02, "G(0.5) = {}", c5.im);
    }

    #[test]
    fn test_high_frequency_bounded() {
        for k in [1.0, 5.0, 50.0, 1e6, f64::INFINITY] {
            let mag = theodorsen(k).norm();
            assert!(
                (THEODORSEN_MAG_MIN - 1e-12..=THEODORSEN_MAG_MAX).contains(&mag),
                "|C({k})| = {mag}"
            );
        }
        assert!((theodorsen(f64::INFINITY).re - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wagner_limits() {
        assert!((wagner(0.0) - 0.5).abs() < 1e-12);
        assert!((wagner(1e4) - 1.0).abs() < 1e-9);
        assert!(wagner(5.0) > wagner(1.0));
    }

    #[test]
    fn test_deficiency_decays_after_step() {
        let mut d = WagnerDeficiency::default();
        d.update(0.1, 0.05);
        let initial = d.total();
        assert!(initial > 0.0);
        for _ in 0..4000 {
            d.update(0.0, 0.05);
        }
        assert!(d.total().abs() < 1e-3 * initial);
    }

    #[test]
    fn test_deficiency_reproduces_wagner_step() {
        // α_e(s) = α·φ(s) after a unit step applied at s = 0.
        let ds = 0.01;
        let mut d = WagnerDeficiency::default();
        d.update(1.0, ds);
        let mut s = ds;
        for _ in 0..999 {
            d.update(0.0, ds);
            s += ds;
        }
        let alpha_e = 1.0 - d.total();
        assert!((alpha_e - wagner(s - 0.5 * ds)).abs() < 1e-3);
    }
}
