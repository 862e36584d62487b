//! Configuration types for scenario projection and alerting.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

/// Multipliers applied to a city network while it rains.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloodFactors {
    /// Flow multiplier slope: flow_mult = 1 + rainfall * flow_per_mm_hr
    #[pyo3(get, set)]
    pub flow_per_mm_hr: f64,
    /// Level multiplier slope: level_mult = 1 + rainfall * level_per_mm_hr
    #[pyo3(get, set)]
    pub level_per_mm_hr: f64,
    /// Extra factor on reservoir inflow on top of flow_mult
    #[pyo3(get, set)]
    pub inflow_boost: f64,
    /// Extra factor on reservoir outflow on top of flow_mult
    #[pyo3(get, set)]
    pub outflow_boost: f64,
}

impl Default for FloodFactors {
    fn default() -> Self {
        Self {
            flow_per_mm_hr: 0.05,
            level_per_mm_hr: 0.005,
            inflow_boost: 2.0,
            outflow_boost: 1.0,
        }
    }
}

#[pymethods]
impl FloodFactors {
    #[new]
    #[pyo3(signature = (
        flow_per_mm_hr=None,
        level_per_mm_hr=None,
        inflow_boost=None,
        outflow_boost=None
    ))]
    fn py_new(
        flow_per_mm_hr: Option<f64>,
        level_per_mm_hr: Option<f64>,
        inflow_boost: Option<f64>,
        outflow_boost: Option<f64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            flow_per_mm_hr: flow_per_mm_hr.unwrap_or(defaults.flow_per_mm_hr),
            level_per_mm_hr: level_per_mm_hr.unwrap_or(defaults.level_per_mm_hr),
            inflow_boost: inflow_boost.unwrap_or(defaults.inflow_boost),
            outflow_boost: outflow_boost.unwrap_or(defaults.outflow_boost),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "FloodFactors(flow_per_mm_hr={}, level_per_mm_hr={}, inflow_boost={})",
            self.flow_per_mm_hr, self.level_per_mm_hr, self.inflow_boost
        )
    }
}

/// Multipliers for the drought branch. These replace the inflow/overflow
/// arithmetic entirely; they are never blended with [`FloodFactors`].
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroughtFactors {
    #[pyo3(get, set)]
    pub level_multiplier: f64,
    #[pyo3(get, set)]
    pub inflow_multiplier: f64,
    /// Outflow demand rises while supply falls
    #[pyo3(get, set)]
    pub outflow_multiplier: f64,
    #[pyo3(get, set)]
    pub river_flow_multiplier: f64,
}

impl Default for DroughtFactors {
    fn default() -> Self {
        Self {
            level_multiplier: 0.6,
            inflow_multiplier: 0.1,
            outflow_multiplier: 1.5,
            river_flow_multiplier: 0.2,
        }
    }
}

#[pymethods]
impl DroughtFactors {
    #[new]
    #[pyo3(signature = (
        level_multiplier=None,
        inflow_multiplier=None,
        outflow_multiplier=None,
        river_flow_multiplier=None
    ))]
    fn py_new(
        level_multiplier: Option<f64>,
        inflow_multiplier: Option<f64>,
        outflow_multiplier: Option<f64>,
        river_flow_multiplier: Option<f64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            level_multiplier: level_multiplier.unwrap_or(defaults.level_multiplier),
            inflow_multiplier: inflow_multiplier.unwrap_or(defaults.inflow_multiplier),
            outflow_multiplier: outflow_multiplier.unwrap_or(defaults.outflow_multiplier),
            river_flow_multiplier: river_flow_multiplier
                .unwrap_or(defaults.river_flow_multiplier),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "DroughtFactors(level_multiplier={}, outflow_multiplier={})",
            self.level_multiplier, self.outflow_multiplier
        )
    }
}

/// Engine-wide configuration passed explicitly into projection, alerting
/// and diagnostics calls.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    #[pyo3(get, set)]
    pub flood: FloodFactors,
    #[pyo3(get, set)]
    pub drought: DroughtFactors,
    /// Rainfall above which a flash flood warning is raised (mm/hr)
    #[pyo3(get, set)]
    pub flash_flood_threshold_mm_hr: f64,
    /// Fraction of capacity above which the primary reservoir raises a surplus alert
    #[pyo3(get, set)]
    pub reservoir_surplus_fraction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            flood: FloodFactors::default(),
            drought: DroughtFactors::default(),
            flash_flood_threshold_mm_hr: 50.0,
            reservoir_surplus_fraction: 0.95,
        }
    }
}

#[pymethods]
impl EngineConfig {
    #[new]
    #[pyo3(signature = (
        verbosity=None,
        flood=None,
        drought=None,
        flash_flood_threshold_mm_hr=None,
        reservoir_surplus_fraction=None
    ))]
    fn py_new(
        verbosity: Option<u8>,
        flood: Option<FloodFactors>,
        drought: Option<DroughtFactors>,
        flash_flood_threshold_mm_hr: Option<f64>,
        reservoir_surplus_fraction: Option<f64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            flood: flood.unwrap_or(defaults.flood),
            drought: drought.unwrap_or(defaults.drought),
            flash_flood_threshold_mm_hr: flash_flood_threshold_mm_hr
                .unwrap_or(defaults.flash_flood_threshold_mm_hr),
            reservoir_surplus_fraction: reservoir_surplus_fraction
                .unwrap_or(defaults.reservoir_surplus_fraction),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(verbosity={}, flash_flood_threshold_mm_hr={}, reservoir_surplus_fraction={})",
            self.verbosity, self.flash_flood_threshold_mm_hr, self.reservoir_surplus_fraction
        )
    }
}
