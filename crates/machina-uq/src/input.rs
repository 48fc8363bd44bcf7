//! Stochastic inputs: catalog entries or manufacturing tolerances.

use machina_catalog::{Catalog, MaterialProperty};
use machina_types::error::{MachinaError, MachinaResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum InputSource {
    /// Distribution of a catalog entry.
    Catalog { key: String },
    /// Workshop tolerance described like a catalog entry.
    Tolerance { property: MaterialProperty },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticInput {
    pub name: String,
    pub source: InputSource,
}

impl StochasticInput {
    pub fn catalog(name: &str, key: &str) -> Self {
        StochasticInput {
            name: name.to_string(),
            source: InputSource::Catalog { key: key.to_string() },
        }
    }

    pub fn tolerance(name: &str, property: MaterialProperty) -> Self {
        StochasticInput {
            name: name.to_string(),
            source: InputSource::Tolerance { property },
        }
    }

    /// Bind to a concrete distribution. Unknown catalog keys are fatal.
    pub fn resolve(&self, catalog: &Catalog) -> MachinaResult<ResolvedInput> {
        let property = match &self.source {
            InputSource::Catalog { key } => catalog.get(key)?.clone(),
            InputSource::Tolerance { property } => {
                property.validate()?;
                property.clone()
            }
        };
        Ok(ResolvedInput {
            name: self.name.clone(),
            property,
        })
    }
}

/// Input bound to its distribution for one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInput {
    pub name: String,
    pub property: MaterialProperty,
}

impl ResolvedInput {
    pub fn nominal(&self) -> f64 {
        self.property.nominal
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> MachinaResult<f64> {
        self.property.sample(rng)
    }

    pub fn at_quantile(&self, u: f64) -> MachinaResult<f64> {
        self.property.quantile(u)
    }
}

pub fn resolve_all(inputs: &[StochasticInput], catalog: &Catalog) -> MachinaResult<Vec<ResolvedInput>> {
    let resolved = inputs
        .iter()
        .map(|i| i.resolve(catalog))
        .collect::<MachinaResult<Vec<_>>>()?;
    for (i, a) in resolved.iter().enumerate() {
        if resolved[..i].iter().any(|b| b.name == a.name) {
            return Err(MachinaError::Configuration(format!(
                "duplicate stochastic input name: {}",
                a.name
            )));
        }
    }
    Ok(resolved)
}
