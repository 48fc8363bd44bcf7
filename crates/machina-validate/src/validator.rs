// ─────────────────────────────────────────────────────────────────────
// Machina — Historical Validator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Deterministic rule evaluation and weighted compliance scoring.
//!
//! Score = Σ wᵢ·creditᵢ / Σ wᵢ. Mandatory constraints weigh 1 and earn
//! credit only when they pass. Soft constraints weigh their category
//! weight and earn partial credit max(0, 1 − |margin|/|allowed|) when they
//! fail. Any mandatory failure makes the verdict infeasible.

use crate::constraint::{Constraint, ConstraintCategory, Severity};
use machina_catalog::global::CatalogSnapshot;
use machina_types::error::{ensure_finite, MachinaError, MachinaResult};
use machina_types::state::{BoundKind, ComplianceReport, ConstraintOutcome, DerivedMetrics, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Soft-constraint weights per category.
///
/// The defaults are uncalibrated placeholders pending review by a
/// historian of technology; deployments should supply their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub soft_weights: BTreeMap<ConstraintCategory, f64>,
    #[serde(default = "default_soft_weight")]
    pub default_soft_weight: f64,
}

fn default_soft_weight() -> f64 {
    0.5
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            soft_weights: BTreeMap::new(),
            default_soft_weight: default_soft_weight(),
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> MachinaResult<()> {
        let weights = std::iter::once(&self.default_soft_weight).chain(self.soft_weights.values());
        for w in weights {
            if !(w.is_finite() && *w > 0.0 && *w < 1.0) {
                return Err(MachinaError::Configuration(format!(
                    "soft-constraint weights must lie in (0, 1), got {w}"
                )));
            }
        }
        Ok(())
    }

    pub fn weight(&self, category: ConstraintCategory) -> f64 {
        self.soft_weights
            .get(&category)
            .copied()
            .unwrap_or(self.default_soft_weight)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> MachinaResult<Self> {
        config.validate()?;
        Ok(Validator { config })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn evaluate_one(
        &self,
        constraint: &Constraint,
        measured: f64,
        snapshot: &CatalogSnapshot,
    ) -> MachinaResult<ConstraintOutcome> {
        let (allowed, citation) = constraint.resolve_limit(&snapshot.catalog)?;
        let measured = ensure_finite(measured, 0, &constraint.id, "measured value")?;
        let allowed = ensure_finite(allowed, 0, &constraint.id, "allowed bound")?;

        // Inclusive bounds: equality passes.
        let margin = match constraint.bound {
            BoundKind::Max => allowed - measured,
            BoundKind::Min => measured - allowed,
        };
        let passed = margin >= 0.0;
        let (weight, credit) = match constraint.severity {
            Severity::Mandatory => (1.0, if passed { 1.0 } else { 0.0 }),
            Severity::Soft => {
                let credit = if passed {
                    1.0
                } else if allowed != 0.0 {
                    (1.0 - margin.abs() / allowed.abs()).max(0.0)
                } else {
                    0.0
                };
                (self.config.weight(constraint.category), credit)
            }
        };
        Ok(ConstraintOutcome {
            constraint_id: constraint.id.clone(),
            description: constraint.description.clone(),
            measured,
            allowed,
            bound: constraint.bound,
            passed,
            margin,
            mandatory: constraint.is_mandatory(),
            weight,
            credit,
            citation,
        })
    }

    /// Evaluate every constraint against `metrics` using the given snapshot.
    ///
    /// Constraints whose quantity the result does not carry are listed as
    /// skipped. A missing catalog key is fatal.
    pub fn evaluate(
        &self,
        invention: &str,
        metrics: &DerivedMetrics,
        constraints: &[Constraint],
        snapshot: &CatalogSnapshot,
    ) -> MachinaResult<ComplianceReport> {
        let mut outcomes = Vec::with_capacity(constraints.len());
        let mut skipped = Vec::new();
        for c in constraints {
            match c.quantity.measure(metrics, &snapshot.catalog)? {
                Some(measured) => outcomes.push(self.evaluate_one(c, measured, snapshot)?),
                None => {
                    debug!(constraint = %c.id, "quantity not produced, constraint skipped");
                    skipped.push(c.id.clone());
                }
            }
        }

        let total_weight: f64 = outcomes.iter().map(|o| o.weight).sum();
        let score = if total_weight > 0.0 {
            outcomes.iter().map(|o| o.weight * o.credit).sum::<f64>() / total_weight
        } else {
            1.0
        };
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let pass_rate = if outcomes.is_empty() {
            1.0
        } else {
            passed as f64 / outcomes.len() as f64
        };
        let verdict = if outcomes.iter().any(|o| o.mandatory && !o.passed) {
            Verdict::Infeasible
        } else if passed == outcomes.len() {
            Verdict::Compliant
        } else {
            Verdict::Partial
        };

        info!(
            invention,
            score,
            pass_rate,
            ?verdict,
            catalog_version = snapshot.version,
            "compliance evaluated"
        );
        Ok(ComplianceReport {
            invention: invention.to_string(),
            catalog: snapshot.stamp(),
            outcomes,
            score,
            pass_rate,
            verdict,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Limit, Quantity};
    use machina_catalog::period::period_catalog;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(period_catalog().unwrap(), 7).unwrap()
    }

    fn power_limit(mandatory: bool) -> Constraint {
        let c = Constraint::at_most(
            "crew_power",
            "required power within four men's sustained output",
            Quantity::RequiredPower,
            Limit::Catalog {
                key: "power.human.sustained".into(),
                scale: 4.0,
            },
            ConstraintCategory::Power,
        );
        if mandatory {
            c
        } else {
            c.soft()
        }
    }

    fn metrics(power: f64) -> DerivedMetrics {
        DerivedMetrics {
            required_power: Some(power),
            ..Default::default()
        }
    }

    #[test]
    fn test_bound_is_inclusive() {
        let v = Validator::default();
        let report = v.evaluate("aerial_screw", &metrics(300.0), &[power_limit(true)], &snapshot()).unwrap();
        assert!(report.outcomes[0].passed);
        assert_eq!(report.outcomes[0].margin, 0.0);
        assert_eq!(report.verdict, Verdict::Compliant);
        assert_eq!(report.score, 1.0);
    }

    #[test]
    fn test_mandatory_failure_is_infeasible() {
        let v = Validator::default();
        let soft_ok = Constraint::at_most(
            "span",
            "span",
            Quantity::Span,
            Limit::Fixed {
                value: 12.0,
                citation: "Codex on the Flight of Birds".into(),
            },
            ConstraintCategory::Geometry,
        )
        .soft();
        let m = DerivedMetrics {
            required_power: Some(300.1),
            span: Some(10.0),
            ..Default::default()
        };
        let report = v.evaluate("ornithopter", &m, &[power_limit(true), soft_ok], &snapshot()).unwrap();
        assert_eq!(report.verdict, Verdict::Infeasible);
        assert_eq!(report.mandatory_failures().count(), 1);
        assert!(report.score > 0.0 && report.score < 1.0);
    }

    #[test]
    fn test_soft_partial_credit() {
        let v = Validator::default();
        let report = v.evaluate("x", &metrics(450.0), &[power_limit(false)], &snapshot()).unwrap();
        let o = &report.outcomes[0];
        assert!(!o.passed);
        assert_eq!(o.weight, 0.5);
        assert!((o.credit - 0.5).abs() < 1e-12);
        assert_eq!(report.verdict, Verdict::Partial);
        assert!((report.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_category_weight_override() {
        let mut config = ValidatorConfig::default();
        config.soft_weights.insert(ConstraintCategory::Power, 0.2);
        let v = Validator::new(config).unwrap();
        let report = v.evaluate("x", &metrics(100.0), &[power_limit(false)], &snapshot()).unwrap();
        assert_eq!(report.outcomes[0].weight, 0.2);
        assert!(Validator::new(ValidatorConfig {
            default_soft_weight: 1.5,
            ..ValidatorConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_snapshot_recorded_and_missing_metrics_skipped() {
        let v = Validator::default();
        let snap = snapshot();
        let stress = Constraint::at_most(
            "spar_stress",
            "spar stress",
            Quantity::PeakStress,
            Limit::Catalog {
                key: "material.ash.fatigue_limit".into(),
                scale: 1.0,
            },
            ConstraintCategory::Material,
        );
        let report = v.evaluate("x", &metrics(10.0), &[power_limit(true), stress], &snap).unwrap();
        assert_eq!(report.catalog.version, 7);
        assert_eq!(report.catalog.fingerprint, snap.fingerprint);
        assert_eq!(report.skipped, vec!["spar_stress".to_string()]);
        assert_eq!(report.outcomes.len(), 1);
    }

    #[test]
    fn test_missing_catalog_key_is_fatal() {
        let v = Validator::default();
        let c = Constraint::at_most(
            "bogus",
            "bogus",
            Quantity::RequiredPower,
            Limit::Catalog {
                key: "power.unicorn".into(),
                scale: 1.0,
            },
            ConstraintCategory::Power,
        );
        assert!(matches!(
            v.evaluate("x", &metrics(1.0), &[c], &snapshot()),
            Err(MachinaError::CatalogKey(_))
        ));
    }

    #[test]
    fn test_catalog_nominal_below_minimum_is_infeasible() {
        // A timber whose fatigue limit falls below the mandatory minimum.
        let catalog = period_catalog()
            .unwrap()
            .with_nominal("material.pine.fatigue_limit", 13.0e6)
            .unwrap();
        let snap = CatalogSnapshot::new(catalog, 8).unwrap();
        let c = Constraint::at_least(
            "spar_timber_strength",
            "spar timber fatigue limit",
            Quantity::CatalogNominal("material.pine.fatigue_limit".into()),
            Limit::Fixed {
                value: 15.0e6,
                citation: "workshop practice".into(),
            },
            ConstraintCategory::Material,
        );
        let soft = power_limit(false);
        let report = Validator::default().evaluate("glider", &metrics(1.0), &[c, soft], &snap).unwrap();
        assert_eq!(report.verdict, Verdict::Infeasible);
        assert_eq!(report.mandatory_failures().next().unwrap().constraint_id, "spar_timber_strength");
    }
}
