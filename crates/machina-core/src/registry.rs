// ─────────────────────────────────────────────────────────────────────
// Machina — Invention Registry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tagged-variant registry: one `InventionKind` per reconstructed design,
//! each bound to a fixed table of functions at construction time.

use crate::inventions;
use crate::pipeline::PipelineConfig;
use machina_catalog::Catalog;
use machina_types::config::{FidelityLevel, SimulationParameters};
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::SimulationResult;
use machina_uq::StochasticInput;
use machina_validate::{Constraint, Quantity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventionKind {
    /// Flapping wing of the Ms. B ornithopter.
    OrnithopterWing,
    /// Helical aerial screw, Ms. B f. 83v.
    AerialScrew,
    /// Fixed-wing glider in steady flight.
    Glider,
}

impl InventionKind {
    pub const ALL: [InventionKind; 3] = [
        InventionKind::OrnithopterWing,
        InventionKind::AerialScrew,
        InventionKind::Glider,
    ];

    pub fn id(self) -> &'static str {
        match self {
            InventionKind::OrnithopterWing => "ornithopter_wing",
            InventionKind::AerialScrew => "aerial_screw",
            InventionKind::Glider => "glider",
        }
    }
}

impl fmt::Display for InventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for InventionKind {
    type Err = MachinaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InventionKind::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| MachinaError::Configuration(format!("unknown invention: {s}")))
    }
}

/// Everything one deterministic simulation reads.
pub struct SimulationContext<'a> {
    pub params: &'a SimulationParameters,
    pub fidelity: FidelityLevel,
    pub catalog: &'a Catalog,
    pub config: &'a PipelineConfig,
}

pub type SimulateFn = fn(&SimulationContext<'_>) -> MachinaResult<SimulationResult>;
pub type ConstraintsFn = fn(&SimulationParameters, &Catalog) -> MachinaResult<Vec<Constraint>>;
pub type InputsFn = fn(&SimulationParameters) -> Vec<StochasticInput>;
/// Write a sampled input value into a parameter copy.
pub type ApplyInputFn = fn(&mut SimulationParameters, &str, f64) -> MachinaResult<()>;
pub type OutputsFn = fn() -> Vec<Quantity>;

/// Fixed interface every invention implements.
pub struct InventionSpec {
    pub kind: InventionKind,
    pub title: &'static str,
    /// Manuscript folio the reconstruction follows.
    pub source: &'static str,
    pub simulate: SimulateFn,
    pub constraints: ConstraintsFn,
    pub stochastic_inputs: InputsFn,
    pub apply_input: ApplyInputFn,
    /// Metrics propagated by the uncertainty engine.
    pub uq_outputs: OutputsFn,
}

impl fmt::Debug for InventionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventionSpec")
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    specs: BTreeMap<InventionKind, InventionSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in invention.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in inventions::builtin() {
            registry.specs.insert(spec.kind, spec);
        }
        registry
    }

    pub fn register(&mut self, spec: InventionSpec) -> MachinaResult<()> {
        if self.specs.contains_key(&spec.kind) {
            return Err(MachinaError::Configuration(format!(
                "invention {} registered twice",
                spec.kind
            )));
        }
        self.specs.insert(spec.kind, spec);
        Ok(())
    }

    pub fn get(&self, kind: InventionKind) -> MachinaResult<&InventionSpec> {
        self.specs
            .get(&kind)
            .ok_or_else(|| MachinaError::Configuration(format!("invention {kind} is not registered")))
    }

    pub fn lookup(&self, id: &str) -> MachinaResult<&InventionSpec> {
        self.get(id.parse()?)
    }

    pub fn kinds(&self) -> impl Iterator<Item = InventionKind> + '_ {
        self.specs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
