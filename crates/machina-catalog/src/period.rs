// ─────────────────────────────────────────────────────────────────────
// Machina — Period Catalog
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Built-in late-15th-century materials, power sources and manuscript bounds.
//!
//! Timber values are clear-wood figures at 12% moisture; fatigue limits use
//! the ~0.3 × modulus-of-rupture endurance ratio for bending.

use crate::catalog::Catalog;
use crate::material::{Distribution, MaterialProperty, Support};
use machina_types::error::MachinaResult;

const WOOD_HANDBOOK: &str = "USDA FPL Wood Handbook (FPL-GTR-190), Tables 5-3a/5-3b; fatigue per §5 'Fatigue'";

fn normal(name: &str, unit: &str, nominal: f64, std_dev: f64, lower: f64, upper: f64, citation: &str) -> MaterialProperty {
    MaterialProperty {
        name: name.to_string(),
        unit: unit.to_string(),
        nominal,
        distribution: Distribution::Normal {
            mean: nominal,
            std_dev,
        },
        support: Some(Support { lower, upper }),
        citation: citation.to_string(),
    }
}

fn lognormal(name: &str, unit: &str, nominal: f64, sigma: f64, lower: f64, upper: f64, citation: &str) -> MaterialProperty {
    MaterialProperty {
        name: name.to_string(),
        unit: unit.to_string(),
        nominal,
        distribution: Distribution::LogNormal {
            mu: nominal.ln(),
            sigma,
        },
        support: Some(Support { lower, upper }),
        citation: citation.to_string(),
    }
}

fn uniform(name: &str, unit: &str, nominal: f64, low: f64, high: f64, citation: &str) -> MaterialProperty {
    MaterialProperty {
        name: name.to_string(),
        unit: unit.to_string(),
        nominal,
        distribution: Distribution::Uniform { low, high },
        support: None,
        citation: citation.to_string(),
    }
}

struct Timber {
    key: &'static str,
    label: &'static str,
    density: f64,
    modulus: f64,
    fatigue: f64,
}

const TIMBERS: [Timber; 4] = [
    Timber { key: "ash", label: "European ash", density: 670.0, modulus: 12.0e9, fatigue: 31.0e6 },
    Timber { key: "oak", label: "Sessile oak", density: 750.0, modulus: 12.3e9, fatigue: 29.0e6 },
    Timber { key: "pine", label: "Scots pine", density: 510.0, modulus: 10.1e9, fatigue: 24.0e6 },
    Timber { key: "spruce", label: "Norway spruce", density: 430.0, modulus: 9.9e9, fatigue: 21.0e6 },
];

/// The default catalog shipped with the core.
pub fn period_catalog() -> MachinaResult<Catalog> {
    let mut c = Catalog::new();

    for t in &TIMBERS {
        c.insert(
            &format!("material.{}.density", t.key),
            normal(&format!("{} density", t.label), "kg/m^3", t.density, 0.06 * t.density, 0.8 * t.density, 1.2 * t.density, WOOD_HANDBOOK),
        )?;
        c.insert(
            &format!("material.{}.modulus", t.key),
            normal(&format!("{} modulus of elasticity", t.label), "Pa", t.modulus, 0.12 * t.modulus, 0.65 * t.modulus, 1.35 * t.modulus, WOOD_HANDBOOK),
        )?;
        c.insert(
            &format!("material.{}.fatigue_limit", t.key),
            lognormal(&format!("{} bending fatigue limit", t.label), "Pa", t.fatigue, 0.15, 0.5 * t.fatigue, 2.0 * t.fatigue, WOOD_HANDBOOK),
        )?;
    }

    c.insert(
        "material.wrought_iron.density",
        normal("Wrought iron density", "kg/m^3", 7700.0, 60.0, 7500.0, 7900.0, "Gordon, 'The New Science of Strong Materials' (1968), Table 2"),
    )?;
    c.insert(
        "material.wrought_iron.modulus",
        normal("Wrought iron modulus", "Pa", 190.0e9, 10.0e9, 160.0e9, 210.0e9, "Gordon, 'The New Science of Strong Materials' (1968), Table 2"),
    )?;
    c.insert(
        "material.wrought_iron.fatigue_limit",
        lognormal("Wrought iron fatigue limit", "Pa", 150.0e6, 0.12, 90.0e6, 230.0e6, "Gordon (1968); bloomery iron with slag inclusions"),
    )?;

    c.insert(
        "membrane.linen.natural_frequency",
        normal("Tensioned linen panel natural frequency", "Hz", 4.0, 0.6, 2.0, 6.5, "Ms. B f. 74r panel layout; tension per starched linen practice"),
    )?;
    c.insert(
        "membrane.linen.damping_ratio",
        uniform("Linen panel damping ratio", "-", 0.08, 0.05, 0.12, "Fabric membrane damping, textile structural testing range"),
    )?;
    c.insert(
        "membrane.linen.areal_density",
        normal("Starched linen areal density", "kg/m^2", 0.25, 0.03, 0.15, 0.35, "Ms. B f. 83v: 'linen whose pores are stopped with starch'"),
    )?;
    c.insert(
        "membrane.taffeta.natural_frequency",
        normal("Silk taffeta panel natural frequency", "Hz", 6.0, 0.8, 3.5, 9.0, "Codex on the Flight of Birds (1505), f. 16r material notes"),
    )?;
    c.insert(
        "membrane.taffeta.damping_ratio",
        uniform("Silk taffeta damping ratio", "-", 0.05, 0.03, 0.08, "Fabric membrane damping, textile structural testing range"),
    )?;
    c.insert(
        "membrane.taffeta.areal_density",
        normal("Silk taffeta areal density", "kg/m^2", 0.08, 0.01, 0.05, 0.12, "Codex on the Flight of Birds (1505), f. 16r material notes"),
    )?;

    c.insert(
        "power.human.sustained",
        lognormal("Human sustained mechanical power (hours)", "W", 75.0, 0.15, 40.0, 150.0, "Wilkie, 'Man as a source of mechanical power', Ergonomics 3(1), 1960"),
    )?;
    c.insert(
        "power.human.short_burst",
        lognormal("Human short-burst power (~1 min)", "W", 300.0, 0.2, 150.0, 600.0, "Wilkie, 'Man as a source of mechanical power', Ergonomics 3(1), 1960"),
    )?;
    c.insert(
        "power.horse.sustained",
        normal("Draught horse sustained power (working day)", "W", 560.0, 60.0, 400.0, 750.0, "Smeaton, Phil. Trans. 51 (1759); working-day rating below Watt's 746 W"),
    )?;
    c.insert(
        "power.steam.newcomen",
        uniform("Newcomen atmospheric engine output", "W", 4100.0, 3000.0, 5500.0, "Rolt & Allen, 'The Steam Engine of Thomas Newcomen' (1977), Dudley Castle 1712"),
    )?;

    c.insert(
        "manuscript.aerial_screw.radius",
        uniform("Aerial screw radius (8 braccia diameter)", "m", 2.34, 2.2, 2.5, "Paris Manuscript B, f. 83v"),
    )?;
    c.insert(
        "manuscript.aerial_screw.crew",
        uniform("Aerial screw operating crew", "persons", 4.0, 4.0, 4.0, "Paris Manuscript B, f. 83v (four men at the capstan)"),
    )?;
    c.insert(
        "manuscript.ornithopter.span_max",
        uniform("Ornithopter span (20 braccia)", "m", 11.7, 10.5, 12.5, "Paris Manuscript B, ff. 74v-75r"),
    )?;
    c.insert(
        "manuscript.glider.span_max",
        uniform("Fixed-wing glider span", "m", 10.0, 9.0, 11.0, "Codex Atlanticus, f. 846v"),
    )?;
    c.insert(
        "process.timber.max_spar_length",
        uniform("Longest single-piece seasoned spar", "m", 6.0, 5.0, 7.0, "Florentine joinery and shipwright stock, c. 1490"),
    )?;
    c.insert(
        "limit.structure.tip_deflection_ratio",
        uniform("Allowed tip deflection / semi-span", "-", 0.15, 0.10, 0.20, "Modern light-aircraft spar design allowance"),
    )?;
    c.insert(
        "environment.air_density",
        normal("Near-ground air density, Tuscany", "kg/m^3", 1.225, 0.025, 1.12, 1.32, "ISA sea level; seasonal range for Florence"),
    )?;

    Ok(c)
}
