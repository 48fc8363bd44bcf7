//! Damped, force-driven single-degree-of-freedom oscillator.
//!
//!   ẍ + 2ζω_n·ẋ + ω_n²·x = f(t)
//!
//! Stepped with classical RK4; the forcing is linearly interpolated
//! inside each step from the sampled history.

/// Oscillator phase-space state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OscillatorState {
    pub x: f64,
    pub v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedOscillator {
    /// Natural circular frequency ω_n [rad/s].
    pub omega_n: f64,
    /// Damping ratio ζ.
    pub zeta: f64,
}

impl DampedOscillator {
    fn accel(&self, x: f64, v: f64, f: f64) -> f64 {
        f - 2.0 * self.zeta * self.omega_n * v - self.omega_n * self.omega_n * x
    }

    /// One RK4 step with forcing `f0` at the start and `f1` at the end.
    pub fn step(&self, s: &mut OscillatorState, f0: f64, f1: f64, dt: f64) {
        if !dt.is_finite() || dt == 0.0 {
            return;
        }
        let fm = 0.5 * (f0 + f1);
        let k1x = s.v;
        let k1v = self.accel(s.x, s.v, f0);
        let k2x = s.v + 0.5 * dt * k1v;
        let k2v = self.accel(s.x + 0.5 * dt * k1x, k2x, fm);
        let k3x = s.v + 0.5 * dt * k2v;
        let k3v = self.accel(s.x + 0.5 * dt * k2x, k3x, fm);
        let k4x = s.v + dt * k3v;
        let k4v = self.accel(s.x + dt * k3x, k4x, f1);
        s.x += dt * (k1x + 2.0 * k2x + 2.0 * k3x + k4x) / 6.0;
        s.v += dt * (k1v + 2.0 * k2v + 2.0 * k3v + k4v) / 6.0;
    }

    /// Integrate over a uniformly sampled forcing history (per unit mass).
    pub fn integrate(&self, forcing: &[f64], dt: f64, initial: OscillatorState) -> Vec<OscillatorState> {
        let mut traj = Vec::with_capacity(forcing.len().max(1));
        let mut state = initial;
        traj.push(state);
        for w in forcing.windows(2) {
            self.step(&mut state, w[0], w[1], dt);
            traj.push(state);
        }
        traj
    }

    /// Steady-state dynamic amplification |X|/X_static at frequency ratio r = ω/ω_n.
    pub fn amplification(&self, r: f64) -> f64 {
        let a = 1.0 - r * r;
        let b = 2.0 * self.zeta * r;
        1.0 / (a * a + b * b).sqrt()
    }

    /// Total mechanical energy per unit mass.
    pub fn energy(&self, s: &OscillatorState) -> f64 {
        0.5 * s.v * s.v + 0.5 * self.omega_n * self.omega_n * s.x * s.x
    }
}
