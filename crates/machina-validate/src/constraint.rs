//! Constraint definitions.
//!
//! A constraint compares one measured quantity against an inclusive
//! bound. Bounds are either catalog entries (optionally scaled) or fixed
//! values with their own citation; every limit is traceable.

use machina_catalog::Catalog;
use machina_types::error::MachinaResult;
use machina_types::state::{BoundKind, DerivedMetrics};
use serde::{Deserialize, Serialize};

/// What is measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "key")]
pub enum Quantity {
    RequiredPower,
    Thrust,
    Lift,
    Weight,
    PeakStress,
    TipDeflection,
    /// Tip deflection over span (or radius for rotors).
    TipDeflectionRatio,
    Span,
    Radius,
    TipSpeed,
    Airspeed,
    DiskLoading,
    ReducedFrequency,
    LiftToWeight,
    /// Nominal value of a catalog entry, e.g. a material property.
    CatalogNominal(String),
}

impl Quantity {
    /// Stable snake_case name, also used for uncertainty outputs.
    pub fn label(&self) -> String {
        let s = match self {
            Quantity::RequiredPower => "required_power",
            Quantity::Thrust => "thrust",
            Quantity::Lift => "lift",
            Quantity::Weight => "weight",
            Quantity::PeakStress => "peak_stress",
            Quantity::TipDeflection => "tip_deflection",
            Quantity::TipDeflectionRatio => "tip_deflection_ratio",
            Quantity::Span => "span",
            Quantity::Radius => "radius",
            Quantity::TipSpeed => "tip_speed",
            Quantity::Airspeed => "airspeed",
            Quantity::DiskLoading => "disk_loading",
            Quantity::ReducedFrequency => "reduced_frequency",
            Quantity::LiftToWeight => "lift_to_weight",
            Quantity::CatalogNominal(key) => return key.clone(),
        };
        s.to_string()
    }

    /// Measured value, or `None` if the result does not carry it.
    pub fn measure(&self, m: &DerivedMetrics, catalog: &Catalog) -> MachinaResult<Option<f64>> {
        Ok(match self {
            Quantity::RequiredPower => m.required_power,
            Quantity::Thrust => m.thrust,
            Quantity::Lift => m.lift,
            Quantity::Weight => m.weight,
            Quantity::PeakStress => m.peak_stress,
            Quantity::TipDeflection => m.tip_deflection,
            Quantity::TipDeflectionRatio => {
                let length = m.span.or(m.radius).filter(|l| *l > 0.0);
                match (m.tip_deflection, length) {
                    (Some(d), Some(l)) => Some(d.abs() / l),
                    _ => None,
                }
            }
            Quantity::Span => m.span,
            Quantity::Radius => m.radius,
            Quantity::TipSpeed => m.tip_speed,
            Quantity::Airspeed => m.airspeed,
            Quantity::DiskLoading => m.disk_loading,
            Quantity::ReducedFrequency => m.reduced_frequency,
            Quantity::LiftToWeight => m.lift_to_weight(),
            Quantity::CatalogNominal(key) => Some(catalog.nominal(key)?),
        })
    }
}

/// Where the bound comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum Limit {
    /// `scale × nominal` of a catalog entry.
    Catalog { key: String, scale: f64 },
    Fixed { value: f64, citation: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Failure makes the design infeasible.
    Mandatory,
    /// Failure costs weighted partial credit.
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintCategory {
    Power,
    Material,
    Geometry,
    Performance,
    Process,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub description: String,
    pub quantity: Quantity,
    pub bound: BoundKind,
    pub limit: Limit,
    pub severity: Severity,
    pub category: ConstraintCategory,
}

impl Constraint {
    fn build(
        id: &str,
        description: &str,
        quantity: Quantity,
        bound: BoundKind,
        limit: Limit,
        category: ConstraintCategory,
    ) -> Self {
        Constraint {
            id: id.to_string(),
            description: description.to_string(),
            quantity,
            bound,
            limit,
            severity: Severity::Mandatory,
            category,
        }
    }

    /// measured ≤ limit
    pub fn at_most(id: &str, description: &str, quantity: Quantity, limit: Limit, category: ConstraintCategory) -> Self {
        Self::build(id, description, quantity, BoundKind::Max, limit, category)
    }

    /// measured ≥ limit
    pub fn at_least(id: &str, description: &str, quantity: Quantity, limit: Limit, category: ConstraintCategory) -> Self {
        Self::build(id, description, quantity, BoundKind::Min, limit, category)
    }

    pub fn soft(mut self) -> Self {
        self.severity = Severity::Soft;
        self
    }

    pub fn is_mandatory(&self) -> bool {
        self.severity == Severity::Mandatory
    }

    /// Allowed value and its citation.
    pub fn resolve_limit(&self, catalog: &Catalog) -> MachinaResult<(f64, String)> {
        match &self.limit {
            Limit::Catalog { key, scale } => {
                let entry = catalog.get(key)?;
                Ok((scale * entry.nominal, format!("{key}: {}", entry.citation)))
            }
            Limit::Fixed { value, citation } => Ok((*value, citation.clone())),
        }
    }

    /// Same constraint with its allowed value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let limit = match &self.limit {
            Limit::Catalog { key, scale } => Limit::Catalog {
                key: key.clone(),
                scale: scale * factor,
            },
            Limit::Fixed { value, citation } => Limit::Fixed {
                value: value * factor,
                citation: citation.clone(),
            },
        };
        Constraint { limit, ..self.clone() }
    }
}
