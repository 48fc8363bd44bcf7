//! Trapezoidal quadrature on non-uniform 1D grids.

/// ∫ y dx over the whole grid.
pub fn trapz(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "trapz requires matching lengths");
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

/// Running integral from the first point: out[i] = ∫_{x0}^{xi} y dx.
pub fn cumtrapz(x: &[f64], y: &[f64]) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "cumtrapz requires matching lengths");
    let mut out = Vec::with_capacity(x.len());
    let mut acc = 0.0;
    if !x.is_empty() {
        out.push(0.0);
    }
    for i in 1..x.len() {
        acc += 0.5 * (x[i] - x[i - 1]) * (y[i] + y[i - 1]);
        out.push(acc);
    }
    out
}

/// Running integral to the last point: out[i] = ∫_{xi}^{xn} y dx.
///
/// Shear and bending moment of a cantilever build up from the free tip.
pub fn cumtrapz_from_end(x: &[f64], y: &[f64]) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "cumtrapz_from_end requires matching lengths");
    let n = x.len();
    let mut out = vec![0.0; n];
    for i in (0..n.saturating_sub(1)).rev() {
        out[i] = out[i + 1] + 0.5 * (x[i + 1] - x[i]) * (y[i] + y[i + 1]);
    }
    out
}

/// First derivative by central differences, one-sided at the ends.
pub fn gradient(x: &[f64], y: &[f64]) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "gradient requires matching lengths");
    let n = x.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = vec![0.0; n];
    out[0] = (y[1] - y[0]) / (x[1] - x[0]);
    out[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        out[i] = (y[i + 1] - y[i - 1]) / (x[i + 1] - x[i - 1]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| a + (b - a) * i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_trapz_linear_exact() {
        let x = linspace(0.0, 2.0, 11);
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        assert!((trapz(&x, &y) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_cumtrapz_ends_match_trapz() {
        let x = linspace(0.0, 1.0, 101);
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let forward = cumtrapz(&x, &y);
        let backward = cumtrapz_from_end(&x, &y);
        let total = trapz(&x, &y);
        assert!((forward[100] - total).abs() < 1e-12);
        assert!((backward[0] - total).abs() < 1e-12);
        assert_eq!(backward[100], 0.0);
        assert!((total - 1.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_gradient_quadratic_interior_exact() {
        let x = linspace(0.0, 1.0, 21);
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let g = gradient(&x, &y);
        for i in 1..20 {
            assert!((g[i] - 2.0 * x[i]).abs() < 1e-12);
        }
    }
}
