// ─────────────────────────────────────────────────────────────────────
// Machina — Catalog Map
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::material::MaterialProperty;
use machina_types::error::{MachinaError, MachinaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key → property map. Ordered so the canonical JSON (and its digest) is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, MaterialProperty>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validated entry. Keys are unique; redefinition is an error.
    pub fn insert(&mut self, key: &str, property: MaterialProperty) -> MachinaResult<()> {
        if key.trim().is_empty() {
            return Err(MachinaError::Configuration(
                "catalog keys must not be empty".to_string(),
            ));
        }
        property.validate()?;
        if self.entries.contains_key(key) {
            return Err(MachinaError::Configuration(format!(
                "duplicate catalog key: {key}"
            )));
        }
        self.entries.insert(key.to_string(), property);
        Ok(())
    }

    /// Look up an entry. Absence is fatal: there is no default value.
    pub fn get(&self, key: &str) -> MachinaResult<&MaterialProperty> {
        self.entries
            .get(key)
            .ok_or_else(|| MachinaError::CatalogKey(key.to_string()))
    }

    pub fn nominal(&self, key: &str) -> MachinaResult<f64> {
        self.get(key).map(|p| p.nominal)
    }

    /// `material.<material>.<property>` entry.
    pub fn material(&self, material: &str, property: &str) -> MachinaResult<&MaterialProperty> {
        self.get(&material_key(material, property))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialProperty)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy with one nominal value replaced (and re-validated).
    ///
    /// Catalogs are never mutated in place once shared; what-if studies
    /// build a new catalog instead.
    pub fn with_nominal(&self, key: &str, nominal: f64) -> MachinaResult<Catalog> {
        let mut next = self.clone();
        let entry = next
            .entries
            .get_mut(key)
            .ok_or_else(|| MachinaError::CatalogKey(key.to_string()))?;
        entry.nominal = nominal;
        entry.validate()?;
        Ok(next)
    }

    /// Parse and validate a JSON object of key → property.
    pub fn from_json_str(json: &str) -> MachinaResult<Self> {
        let raw: BTreeMap<String, MaterialProperty> = serde_json::from_str(json)?;
        let mut catalog = Catalog::new();
        for (key, property) in raw {
            catalog.insert(&key, property)?;
        }
        Ok(catalog)
    }

    pub fn from_json_file(path: &str) -> MachinaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Hex blake3 digest of the canonical JSON form.
    pub fn fingerprint(&self) -> MachinaResult<String> {
        let bytes = serde_json::to_vec(&self.entries)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

pub fn material_key(material: &str, property: &str) -> String {
    format!("material.{material}.{property}")
}
