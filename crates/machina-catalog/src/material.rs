// ─────────────────────────────────────────────────────────────────────
// Machina — Material Property
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! A single catalog entry and its uncertainty distribution.

use machina_math::special::{normal_cdf, normal_quantile};
use machina_types::error::{MachinaError, MachinaResult};
use rand::Rng;
use rand_distr::{Distribution as _, LogNormal, Normal};
use serde::{Deserialize, Serialize};

/// Rejection-sampling budget before a truncated draw is declared impossible.
const MAX_REJECTIONS: usize = 10_000;

/// Uncertainty distribution of a catalog value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
    /// Parameters of ln X.
    LogNormal { mu: f64, sigma: f64 },
}

/// Closed interval a sampled value must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub lower: f64,
    pub upper: f64,
}

impl Support {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperty {
    pub name: String,
    pub unit: String,
    pub nominal: f64,
    pub distribution: Distribution,
    /// Extra truncation on top of the distribution's natural support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<Support>,
    /// Historical or technical source for the nominal value.
    pub citation: String,
}

impl Distribution {
    fn natural_support(&self) -> Support {
        match *self {
            Distribution::Normal { .. } => Support {
                lower: f64::NEG_INFINITY,
                upper: f64::INFINITY,
            },
            Distribution::Uniform { low, high } => Support {
                lower: low,
                upper: high,
            },
            Distribution::LogNormal { .. } => Support {
                lower: 0.0,
                upper: f64::INFINITY,
            },
        }
    }

    fn validate(&self) -> MachinaResult<()> {
        let ok = match *self {
            Distribution::Normal { mean, std_dev } => mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0,
            Distribution::Uniform { low, high } => low.is_finite() && high.is_finite() && low <= high,
            Distribution::LogNormal { mu, sigma } => mu.is_finite() && sigma.is_finite() && sigma >= 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(MachinaError::Configuration(format!(
                "invalid distribution parameters: {self:?}"
            )))
        }
    }

    /// Untruncated CDF.
    fn cdf(&self, x: f64) -> f64 {
        match *self {
            Distribution::Normal { mean, std_dev } => {
                if std_dev == 0.0 {
                    return if x >= mean { 1.0 } else { 0.0 };
                }
                normal_cdf((x - mean) / std_dev)
            }
            Distribution::Uniform { low, high } => {
                if high == low {
                    return if x >= low { 1.0 } else { 0.0 };
                }
                ((x - low) / (high - low)).clamp(0.0, 1.0)
            }
            Distribution::LogNormal { mu, sigma } => {
                if x <= 0.0 {
                    return 0.0;
                }
                if sigma == 0.0 {
                    return if x.ln() >= mu { 1.0 } else { 0.0 };
                }
                normal_cdf((x.ln() - mu) / sigma)
            }
        }
    }

    /// Untruncated inverse CDF.
    fn inverse_cdf(&self, p: f64) -> f64 {
        match *self {
            Distribution::Normal { mean, std_dev } => mean + std_dev * normal_quantile(p),
            Distribution::Uniform { low, high } => low + p * (high - low),
            Distribution::LogNormal { mu, sigma } => (mu + sigma * normal_quantile(p)).exp(),
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Distribution::Normal { mean, std_dev } => match Normal::new(mean, std_dev) {
                Ok(d) => d.sample(rng),
                Err(_) => mean,
            },
            Distribution::Uniform { low, high } => {
                if high > low {
                    rng.gen_range(low..high)
                } else {
                    low
                }
            }
            Distribution::LogNormal { mu, sigma } => match LogNormal::new(mu, sigma) {
                Ok(d) => d.sample(rng),
                Err(_) => mu.exp(),
            },
        }
    }

    /// Untruncated standard deviation.
    pub fn std_dev(&self) -> f64 {
        match *self {
            Distribution::Normal { std_dev, .. } => std_dev,
            Distribution::Uniform { low, high } => (high - low) / 12.0_f64.sqrt(),
            Distribution::LogNormal { mu, sigma } => {
                let s2 = sigma * sigma;
                ((s2.exp() - 1.0) * (2.0 * mu + s2).exp()).sqrt()
            }
        }
    }
}

impl MaterialProperty {
    /// Intersection of the natural and the declared support.
    pub fn effective_support(&self) -> Support {
        let natural = self.distribution.natural_support();
        match self.support {
            Some(s) => Support {
                lower: natural.lower.max(s.lower),
                upper: natural.upper.min(s.upper),
            },
            None => natural,
        }
    }

    pub fn validate(&self) -> MachinaResult<()> {
        self.distribution.validate()?;
        if !self.nominal.is_finite() {
            return Err(MachinaError::Configuration(format!(
                "{}: nominal value must be finite",
                self.name
            )));
        }
        let support = self.effective_support();
        if support.lower > support.upper {
            return Err(MachinaError::Configuration(format!(
                "{}: empty support [{}, {}]",
                self.name, support.lower, support.upper
            )));
        }
        if !support.contains(self.nominal) {
            return Err(MachinaError::Configuration(format!(
                "{}: nominal {} outside support [{}, {}]",
                self.name, self.nominal, support.lower, support.upper
            )));
        }
        if self.citation.trim().is_empty() {
            return Err(MachinaError::Configuration(format!(
                "{}: every catalog entry needs a citation",
                self.name
            )));
        }
        Ok(())
    }

    /// Reject a value outside the support instead of clamping it.
    pub fn check_within_support(&self, x: f64) -> MachinaResult<f64> {
        let support = self.effective_support();
        if x.is_finite() && support.contains(x) {
            Ok(x)
        } else {
            Err(MachinaError::Configuration(format!(
                "{}: value {} outside support [{}, {}]",
                self.name, x, support.lower, support.upper
            )))
        }
    }

    /// Independent draw from the truncated distribution (rejection sampling).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MachinaResult<f64> {
        let support = self.effective_support();
        for _ in 0..MAX_REJECTIONS {
            let x = self.distribution.draw(rng);
            if support.contains(x) {
                return Ok(x);
            }
        }
        Err(MachinaError::Configuration(format!(
            "{}: support [{}, {}] has negligible probability mass",
            self.name, support.lower, support.upper
        )))
    }

    /// Truncated inverse CDF, `u` in [0, 1].
    ///
    /// Used by stratified designs: the unit interval is mapped onto
    /// [F(lower), F(upper)] so every stratum lands inside the support.
    pub fn quantile(&self, u: f64) -> MachinaResult<f64> {
        if !(0.0..=1.0).contains(&u) {
            return Err(MachinaError::Configuration(format!(
                "{}: quantile level {u} outside [0, 1]",
                self.name
            )));
        }
        let support = self.effective_support();
        let f_lo = self.distribution.cdf(support.lower);
        let f_hi = self.distribution.cdf(support.upper);
        let p = (f_lo + u * (f_hi - f_lo)).clamp(0.0, 1.0);
        let x = self
            .distribution
            .inverse_cdf(p)
            .clamp(support.lower, support.upper);
        if x.is_finite() {
            Ok(x)
        } else {
            // Open-ended tails at u = 0 or 1; fall back to the nearest finite bound.
            let bounded = if u < 0.5 { support.lower } else { support.upper };
            if bounded.is_finite() {
                Ok(bounded)
            } else {
                Err(MachinaError::Configuration(format!(
                    "{}: quantile {u} is unbounded",
                    self.name
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ash_modulus() -> MaterialProperty {
        MaterialProperty {
            name: "ash modulus".into(),
            unit: "Pa".into(),
            nominal: 12.0e9,
            distribution: Distribution::Normal {
                mean: 12.0e9,
                std_dev: 1.5e9,
            },
            support: Some(Support {
                lower: 8.0e9,
                upper: 16.0e9,
            }),
            citation: "Wood Handbook".into(),
        }
    }

    #[test]
    fn test_samples_stay_in_support() {
        let prop = ash_modulus();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5000 {
            let x = prop.sample(&mut rng).unwrap();
            assert!((8.0e9..=16.0e9).contains(&x));
        }
    }

    #[test]
    fn test_quantile_monotone_and_bounded() {
        let prop = ash_modulus();
        let mut last = f64::NEG_INFINITY;
        for i in 0..=100 {
            let x = prop.quantile(i as f64 / 100.0).unwrap();
            assert!(x >= last);
            assert!((8.0e9..=16.0e9).contains(&x));
            last = x;
        }
        let median = prop.quantile(0.5).unwrap();
        assert!((median - 12.0e9).abs() < 1e6);
    }

    #[test]
    fn test_lognormal_quantile_median() {
        let prop = MaterialProperty {
            name: "human power".into(),
            unit: "W".into(),
            nominal: 75.0,
            distribution: Distribution::LogNormal {
                mu: 75.0_f64.ln(),
                sigma: 0.2,
            },
            support: None,
            citation: "Wilkie 1960".into(),
        };
        assert!((prop.quantile(0.5).unwrap() - 75.0).abs() < 1e-3);
        assert_eq!(prop.effective_support().lower, 0.0);
    }

    #[test]
    fn test_out_of_support_value_rejected() {
        let prop = ash_modulus();
        assert!(prop.check_within_support(20.0e9).is_err());
        assert!(prop.check_within_support(f64::NAN).is_err());
        assert!(prop.check_within_support(9.0e9).is_ok());
    }

    #[test]
    fn test_validate_rejects_nominal_outside_support() {
        let mut prop = ash_modulus();
        prop.nominal = 1.0e9;
        assert!(prop.validate().is_err());
    }

    #[test]
    fn test_validate_requires_citation() {
        let mut prop = ash_modulus();
        prop.citation = "  ".into();
        assert!(prop.validate().is_err());
    }

    #[test]
    fn test_degenerate_uniform() {
        let prop = MaterialProperty {
            name: "crew".into(),
            unit: "persons".into(),
            nominal: 4.0,
            distribution: Distribution::Uniform { low: 4.0, high: 4.0 },
            support: None,
            citation: "Ms. B".into(),
        };
        assert!(prop.validate().is_ok());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(prop.sample(&mut rng).unwrap(), 4.0);
        assert_eq!(prop.quantile(0.3).unwrap(), 4.0);
    }

    #[test]
    fn test_serde_tagged_distribution() {
        let json = r#"{"kind": "uniform", "low": 1.0, "high": 2.0}"#;
        let d: Distribution = serde_json::from_str(json).unwrap();
        assert_eq!(d, Distribution::Uniform { low: 1.0, high: 2.0 });
        assert!((d.std_dev() - 1.0 / 12.0_f64.sqrt()).abs() < 1e-12);
    }
}
