//! Built-in city profiles, template hydrology network and scenario presets.
//!
//! Every city shares the same template reservoirs and rivers; a city only
//! contributes display names and rainfall thresholds.

use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::hydrology::CityNetwork;
use crate::models::{ReservoirState, RiverState, ScenarioInput};

/// City looked up when an unknown id is requested.
pub const DEFAULT_CITY_ID: &str = "chennai";

/// Administrative level of a monitored location.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationLevel {
    District,
    City,
    State,
    Country,
}

/// Static configuration for one monitored location.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityProfile {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub level: LocationLevel,
    /// Design capacity of the drainage network (mm/hr).
    #[pyo3(get)]
    pub rainfall_threshold_mm_hr: f64,
    /// Rainfall at which real-world street flooding starts (mm/hr).
    #[pyo3(get)]
    pub operational_limit_mm_hr: f64,
    #[pyo3(get)]
    pub population_density: String,
    #[pyo3(get)]
    pub impervious_surface_percent: f64,
    #[pyo3(get)]
    pub river_names: Vec<String>,
    #[pyo3(get)]
    pub reservoir_names: Vec<String>,
}

#[pymethods]
impl CityProfile {
    fn __repr__(&self) -> String {
        format!(
            "CityProfile(id={:?}, level={:?}, threshold={} mm/hr, limit={} mm/hr)",
            self.id, self.level, self.rainfall_threshold_mm_hr, self.operational_limit_mm_hr
        )
    }
}

struct CityTemplate {
    id: &'static str,
    name: &'static str,
    level: LocationLevel,
    rainfall_threshold: f64,
    operational_limit: f64,
    population_density: &'static str,
    impervious_percent: f64,
    rivers: [&'static str; 2],
    reservoirs: [&'static str; 5],
}

const CITIES: [CityTemplate; 7] = [
    CityTemplate {
        id: "india",
        name: "India (National View)",
        level: LocationLevel::Country,
        rainfall_threshold: 100.0,
        operational_limit: 60.0,
        population_density: "431 / sq km",
        impervious_percent: 45.0,
        rivers: ["Ganga", "Godavari"],
        reservoirs: ["Indira Sagar", "Nagarjuna Sagar", "Hirakud", "Tehri", "Bhakra"],
    },
    CityTemplate {
        id: "tn",
        name: "Tamil Nadu, India",
        level: LocationLevel::State,
        rainfall_threshold: 85.0,
        operational_limit: 50.0,
        population_density: "555 / sq km",
        impervious_percent: 55.0,
        rivers: ["Kaveri River", "Palar River"],
        reservoirs: ["Mettur Dam", "Bhavanisagar", "Vaigai", "Aliyar", "Papanasam"],
    },
    CityTemplate {
        id: "chennai",
        name: "Chennai, India",
        level: LocationLevel::City,
        rainfall_threshold: 79.0,
        operational_limit: 32.0,
        population_density: "26,553 / sq km",
        impervious_percent: 64.0,
        rivers: ["Cooum River", "Adyar River"],
        reservoirs: ["Chembarambakkam", "Red Hills", "Poondi", "Cholavaram", "Veeranam"],
    },
    CityTemplate {
        id: "mumbai",
        name: "Mumbai, India",
        level: LocationLevel::City,
        rainfall_threshold: 55.0,
        operational_limit: 25.0,
        population_density: "32,303 / sq km",
        impervious_percent: 85.0,
        rivers: ["Mithi River", "Dahisar River"],
        reservoirs: ["Tulsi Lake", "Vihar Lake", "Powai Lake", "Modak Sagar", "Tansa"],
    },
    CityTemplate {
        id: "tnagar",
        name: "T. Nagar (Chennai Central)",
        level: LocationLevel::District,
        rainfall_threshold: 40.0,
        operational_limit: 20.0,
        population_density: "45,000 / sq km",
        impervious_percent: 92.0,
        rivers: ["Mambalam Canal", "Adyar Tributary"],
        reservoirs: ["Local Tank 1", "Local Tank 2", "Temple Tank", "Drainage Sump A", "Drainage Sump B"],
    },
    CityTemplate {
        id: "bengaluru",
        name: "Bengaluru, India",
        level: LocationLevel::City,
        rainfall_threshold: 60.0,
        operational_limit: 40.0,
        population_density: "19,000 / sq km",
        impervious_percent: 78.0,
        rivers: ["Vrishabhavathi", "Arkavathi"],
        reservoirs: ["Bellandur Lake", "Ulsoor Lake", "Sankey Tank", "Hebbal Lake", "Agara Lake"],
    },
    CityTemplate {
        id: "nyc",
        name: "New York City, USA",
        level: LocationLevel::City,
        rainfall_threshold: 45.0,
        operational_limit: 35.0,
        population_density: "11,313 / sq km",
        impervious_percent: 72.0,
        rivers: ["Hudson River", "East River"],
        reservoirs: ["Central Park Res", "Jerome Park", "Silver Lake", "Hillview", "Kensico"],
    },
];

// (name, capacity Mcft, level Mcft, inflow cusecs, outflow cusecs)
const RESERVOIR_TEMPLATES: [(&str, f64, f64, f64, f64); 5] = [
    ("Primary Reservoir", 3645.0, 2850.0, 1200.0, 500.0),
    ("Secondary Reservoir", 3300.0, 2500.0, 800.0, 200.0),
    ("Main Catchment", 3231.0, 3000.0, 9500.0, 8000.0),
    ("Auxiliary Lake", 1081.0, 400.0, 150.0, 0.0),
    ("Downstream Tank", 1465.0, 1100.0, 600.0, 600.0),
];

// (name, design capacity cusecs, flow cusecs)
const RIVER_TEMPLATES: [(&str, f64, f64); 3] = [
    ("Primary River", 60000.0, 15000.0),
    ("Secondary River", 22000.0, 18000.0),
    ("Canal Network", 125000.0, 45000.0),
];

impl From<&CityTemplate> for CityProfile {
    fn from(t: &CityTemplate) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.to_string(),
            level: t.level,
            rainfall_threshold_mm_hr: t.rainfall_threshold,
            operational_limit_mm_hr: t.operational_limit,
            population_density: t.population_density.to_string(),
            impervious_surface_percent: t.impervious_percent,
            river_names: t.rivers.iter().map(|s| s.to_string()).collect(),
            reservoir_names: t.reservoirs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// All built-in city profiles, national view first.
pub fn builtin_cities() -> Vec<CityProfile> {
    CITIES.iter().map(CityProfile::from).collect()
}

/// Lookup table of city profiles by id.
#[derive(Clone, Debug)]
pub struct CityCatalog {
    by_id: FxHashMap<String, CityProfile>,
    default_profile: CityProfile,
}

impl CityCatalog {
    /// Catalog seeded with the built-in cities.
    pub fn builtin() -> Self {
        let default_profile = CITIES
            .iter()
            .find(|t| t.id == DEFAULT_CITY_ID)
            .map(CityProfile::from)
            .unwrap_or_else(|| CityProfile::from(&CITIES[0]));
        Self::with_cities(builtin_cities(), default_profile)
    }

    /// Catalog over caller-supplied cities; `default_profile` answers unknown ids.
    pub fn with_cities(cities: Vec<CityProfile>, default_profile: CityProfile) -> Self {
        let mut by_id = FxHashMap::with_capacity_and_hasher(cities.len(), Default::default());
        for city in cities {
            by_id.insert(city.id.clone(), city);
        }
        Self {
            by_id,
            default_profile,
        }
    }

    pub fn get(&self, id: &str) -> Option<&CityProfile> {
        self.by_id.get(id)
    }

    /// Look up a city, falling back to the default profile.
    pub fn get_or_default(&self, id: &str) -> &CityProfile {
        self.by_id.get(id).unwrap_or(&self.default_profile)
    }

    /// Sorted city ids.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.by_id.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Template network reskinned with a city's reservoir and river names.
///
/// Templates without a city-specific name keep their generic name.
pub fn base_network(profile: &CityProfile) -> CityNetwork {
    let reservoirs = RESERVOIR_TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, &(name, capacity, level, inflow, outflow))| ReservoirState {
            name: profile
                .reservoir_names
                .get(idx)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
            capacity_mcft: capacity,
            current_level_mcft: level,
            inflow_cusecs: inflow,
            outflow_cusecs: outflow,
        })
        .collect();

    let rivers = RIVER_TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, &(name, design, flow))| RiverState {
            name: profile
                .river_names
                .get(idx)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
            design_capacity_cusecs: design,
            current_flow_cusecs: flow,
        })
        .collect();

    CityNetwork { reservoirs, rivers }
}

/// A named set of scenario slider values.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioPreset {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub scenario: ScenarioInput,
}

#[pymethods]
impl ScenarioPreset {
    fn __repr__(&self) -> String {
        format!("ScenarioPreset(id={:?}, label={:?})", self.id, self.label)
    }
}

// (id, label, rainfall mm/hr, duration h, tide m, saturation %)
const PRESETS: [(&str, &str, f64, f64, f64, f64); 5] = [
    ("monsoon_peak", "Monsoon Peak (Extreme)", 110.0, 24.0, 1.2, 95.0),
    ("tropical_storm", "Tropical Storm", 65.0, 6.0, 2.5, 80.0),
    ("standard_rain", "Standard Seasonal Rain", 25.0, 4.0, 0.5, 50.0),
    ("dry_spell", "Dry Spell / Summer", 0.0, 720.0, 0.2, 20.0),
    ("drought", "Severe Drought / Failed Monsoon", 0.0, 2160.0, 0.1, 5.0),
];

pub fn scenario_presets() -> Vec<ScenarioPreset> {
    PRESETS
        .iter()
        .map(|&(id, label, rain, duration, tide, saturation)| ScenarioPreset {
            id: id.to_string(),
            label: label.to_string(),
            scenario: ScenarioInput::new(rain, duration, saturation, tide),
        })
        .collect()
}

pub fn find_preset(id: &str) -> Option<ScenarioPreset> {
    scenario_presets().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScenarioMode;

    #[test]
    fn test_catalog_lookup_and_fallback() {
        let catalog = CityCatalog::builtin();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.get("mumbai").map(|c| c.level), Some(LocationLevel::City));
        assert!(catalog.get("atlantis").is_none());
        assert_eq!(catalog.get_or_default("atlantis").id, DEFAULT_CITY_ID);
        assert_eq!(catalog.ids()[0], "bengaluru");
    }

    #[test]
    fn test_base_network_reskins_names() {
        let catalog = CityCatalog::builtin();
        let network = base_network(catalog.get_or_default("chennai"));

        assert_eq!(network.reservoirs.len(), 5);
        assert_eq!(network.reservoirs[0].name(), "Chembarambakkam");
        assert!((network.reservoirs[0].capacity_mcft() - 3645.0).abs() < 1e-9);

        assert_eq!(network.rivers.len(), 3);
        assert_eq!(network.rivers[1].name(), "Adyar River");
        // Only two river names per city; the canal keeps its template name
        assert_eq!(network.rivers[2].name(), "Canal Network");
    }

    #[test]
    fn test_templates_satisfy_invariants() {
        for &(name, capacity, level, inflow, outflow) in RESERVOIR_TEMPLATES.iter() {
            assert!(ReservoirState::new(name, capacity, level)
                .and_then(|r| r.with_flows(inflow, outflow))
                .is_ok());
        }
        for &(name, design, flow) in RIVER_TEMPLATES.iter() {
            assert!(RiverState::new(name, design, flow).is_ok());
        }
    }

    #[test]
    fn test_presets_are_valid() {
        let presets = scenario_presets();
        assert_eq!(presets.len(), 5);
        for preset in &presets {
            assert!(preset.scenario.validate().is_ok(), "{}", preset.id);
        }
        assert_eq!(
            find_preset("drought").map(|p| p.scenario.mode()),
            Some(ScenarioMode::Drought)
        );
        // Saturation 20 is not below the drought limit
        assert_eq!(
            find_preset("dry_spell").map(|p| p.scenario.mode()),
            Some(ScenarioMode::Baseline)
        );
        assert!(find_preset("blizzard").is_none());
    }
}
