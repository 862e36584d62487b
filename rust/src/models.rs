//! Core data types for the hydrology engine.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::hydrology::{classify_river, require_finite, HydrologyError};

/// Drought mode needs saturation strictly below this (percent).
pub const DROUGHT_SATURATION_LIMIT: f64 = 20.0;

/// River condition derived from the flow / design capacity ratio.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiverStatus {
    Normal,
    Warning,
    Critical,
}

impl RiverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Which branch a scenario runs through.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioMode {
    /// No rain and soil not dry enough for drought: nothing changes.
    Baseline,
    Flood,
    Drought,
}

/// A reservoir snapshot. Capacity is a static constant of the city and is
/// validated once here, so the time-step arithmetic never divides by zero.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirState {
    #[pyo3(get)]
    pub(crate) name: String,
    #[pyo3(get)]
    pub(crate) capacity_mcft: f64,
    #[pyo3(get)]
    pub(crate) current_level_mcft: f64,
    #[pyo3(get)]
    pub(crate) inflow_cusecs: f64,
    #[pyo3(get)]
    pub(crate) outflow_cusecs: f64,
}

impl ReservoirState {
    /// Create a reservoir with no recorded flows.
    ///
    /// # Errors
    /// * `InvalidConfiguration` if capacity is not a positive finite number
    /// * `InvalidInput` if the level is non-finite or outside `[0, capacity]`
    pub fn new(
        name: impl Into<String>,
        capacity_mcft: f64,
        current_level_mcft: f64,
    ) -> Result<Self, HydrologyError> {
        if !capacity_mcft.is_finite() || capacity_mcft <= 0.0 {
            return Err(HydrologyError::InvalidConfiguration(format!(
                "reservoir capacity must be positive, got {}",
                capacity_mcft
            )));
        }
        let level = require_finite("current level", current_level_mcft)?;
        if level < 0.0 || level > capacity_mcft {
            return Err(HydrologyError::InvalidInput(format!(
                "current level {} outside [0, {}]",
                level, capacity_mcft
            )));
        }
        Ok(Self {
            name: name.into(),
            capacity_mcft,
            current_level_mcft: level,
            inflow_cusecs: 0.0,
            outflow_cusecs: 0.0,
        })
    }

    /// Attach observed inflow/outflow (cusecs, both >= 0).
    pub fn with_flows(mut self, inflow_cusecs: f64, outflow_cusecs: f64) -> Result<Self, HydrologyError> {
        let inflow = require_finite("inflow", inflow_cusecs)?;
        let outflow = require_finite("outflow", outflow_cusecs)?;
        if inflow < 0.0 || outflow < 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "flows must be non-negative, got inflow={} outflow={}",
                inflow, outflow
            )));
        }
        self.inflow_cusecs = inflow;
        self.outflow_cusecs = outflow;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity_mcft(&self) -> f64 {
        self.capacity_mcft
    }

    pub fn current_level_mcft(&self) -> f64 {
        self.current_level_mcft
    }

    pub fn inflow_cusecs(&self) -> f64 {
        self.inflow_cusecs
    }

    pub fn outflow_cusecs(&self) -> f64 {
        self.outflow_cusecs
    }

    pub fn pct_full(&self) -> f64 {
        self.current_level_mcft / self.capacity_mcft * 100.0
    }
}

#[pymethods]
impl ReservoirState {
    #[new]
    #[pyo3(signature = (name, capacity_mcft, current_level_mcft, inflow_cusecs=0.0, outflow_cusecs=0.0))]
    fn py_new(
        name: String,
        capacity_mcft: f64,
        current_level_mcft: f64,
        inflow_cusecs: f64,
        outflow_cusecs: f64,
    ) -> PyResult<Self> {
        Self::new(name, capacity_mcft, current_level_mcft)
            .and_then(|r| r.with_flows(inflow_cusecs, outflow_cusecs))
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    #[pyo3(name = "pct_full")]
    fn py_pct_full(&self) -> f64 {
        self.pct_full()
    }

    fn __repr__(&self) -> String {
        format!(
            "ReservoirState(name={:?}, level={}/{} Mcft)",
            self.name, self.current_level_mcft, self.capacity_mcft
        )
    }
}

/// A river reach. Status is always derived from the current flow.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverState {
    #[pyo3(get)]
    pub(crate) name: String,
    #[pyo3(get)]
    pub(crate) design_capacity_cusecs: f64,
    #[pyo3(get)]
    pub(crate) current_flow_cusecs: f64,
}

impl RiverState {
    /// # Errors
    /// * `InvalidConfiguration` if design capacity is not a positive finite number
    /// * `InvalidInput` if the flow is negative or non-finite
    pub fn new(
        name: impl Into<String>,
        design_capacity_cusecs: f64,
        current_flow_cusecs: f64,
    ) -> Result<Self, HydrologyError> {
        if !design_capacity_cusecs.is_finite() || design_capacity_cusecs <= 0.0 {
            return Err(HydrologyError::InvalidConfiguration(format!(
                "river design capacity must be positive, got {}",
                design_capacity_cusecs
            )));
        }
        let flow = require_finite("river flow", current_flow_cusecs)?;
        if flow < 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "river flow must be non-negative, got {}",
                flow
            )));
        }
        Ok(Self {
            name: name.into(),
            design_capacity_cusecs,
            current_flow_cusecs: flow,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn design_capacity_cusecs(&self) -> f64 {
        self.design_capacity_cusecs
    }

    pub fn current_flow_cusecs(&self) -> f64 {
        self.current_flow_cusecs
    }

    pub fn status(&self) -> RiverStatus {
        classify_river(self.current_flow_cusecs, self.design_capacity_cusecs)
    }
}

#[pymethods]
impl RiverState {
    #[new]
    fn py_new(name: String, design_capacity_cusecs: f64, current_flow_cusecs: f64) -> PyResult<Self> {
        Self::new(name, design_capacity_cusecs, current_flow_cusecs)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    #[pyo3(name = "status")]
    fn py_status(&self) -> RiverStatus {
        self.status()
    }

    fn __repr__(&self) -> String {
        format!(
            "RiverState(name={:?}, flow={}/{} cusecs, status={})",
            self.name,
            self.current_flow_cusecs,
            self.design_capacity_cusecs,
            self.status().as_str()
        )
    }
}

/// Scenario sliders supplied by the dashboard.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    #[pyo3(get, set)]
    pub rainfall_intensity_mm_hr: f64,
    #[pyo3(get, set)]
    pub duration_hours: f64,
    #[pyo3(get, set)]
    pub soil_saturation_percent: f64,
    #[pyo3(get, set)]
    #[serde(default)]
    pub tide_level_meters: f64,
}

impl ScenarioInput {
    pub fn new(
        rainfall_intensity_mm_hr: f64,
        duration_hours: f64,
        soil_saturation_percent: f64,
        tide_level_meters: f64,
    ) -> Self {
        Self {
            rainfall_intensity_mm_hr,
            duration_hours,
            soil_saturation_percent,
            tide_level_meters,
        }
    }

    pub fn validate(&self) -> Result<(), HydrologyError> {
        let rain = require_finite("rainfall intensity", self.rainfall_intensity_mm_hr)?;
        let duration = require_finite("duration", self.duration_hours)?;
        let saturation = require_finite("soil saturation", self.soil_saturation_percent)?;
        let tide = require_finite("tide level", self.tide_level_meters)?;

        if rain < 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "rainfall intensity must be >= 0, got {}",
                rain
            )));
        }
        if duration <= 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "duration must be > 0 hours, got {}",
                duration
            )));
        }
        if !(0.0..=100.0).contains(&saturation) {
            return Err(HydrologyError::InvalidInput(format!(
                "soil saturation must be within [0, 100], got {}",
                saturation
            )));
        }
        if tide < 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "tide level must be >= 0, got {}",
                tide
            )));
        }
        Ok(())
    }

    pub fn is_drought(&self) -> bool {
        self.rainfall_intensity_mm_hr == 0.0
            && self.soil_saturation_percent < DROUGHT_SATURATION_LIMIT
    }

    pub fn mode(&self) -> ScenarioMode {
        if self.is_drought() {
            ScenarioMode::Drought
        } else if self.rainfall_intensity_mm_hr > 0.0 {
            ScenarioMode::Flood
        } else {
            ScenarioMode::Baseline
        }
    }

    /// Total rainfall over the scenario (mm).
    pub fn total_accumulation_mm(&self) -> f64 {
        self.rainfall_intensity_mm_hr * self.duration_hours
    }
}

#[pymethods]
impl ScenarioInput {
    #[new]
    #[pyo3(signature = (rainfall_intensity_mm_hr, duration_hours, soil_saturation_percent, tide_level_meters=0.0))]
    fn py_new(
        rainfall_intensity_mm_hr: f64,
        duration_hours: f64,
        soil_saturation_percent: f64,
        tide_level_meters: f64,
    ) -> Self {
        Self::new(
            rainfall_intensity_mm_hr,
            duration_hours,
            soil_saturation_percent,
            tide_level_meters,
        )
    }

    #[pyo3(name = "mode")]
    fn py_mode(&self) -> ScenarioMode {
        self.mode()
    }

    #[pyo3(name = "total_accumulation_mm")]
    fn py_total_accumulation_mm(&self) -> f64 {
        self.total_accumulation_mm()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScenarioInput(rain={} mm/hr, duration={} h, saturation={}%, tide={} m)",
            self.rainfall_intensity_mm_hr,
            self.duration_hours,
            self.soil_saturation_percent,
            self.tide_level_meters
        )
    }
}

/// Result of one reservoir/river time step.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    #[pyo3(get)]
    pub new_level: f64,
    #[pyo3(get)]
    pub new_flow: f64,
    #[pyo3(get)]
    pub overflow: bool,
    #[pyo3(get)]
    pub pct_full: f64,
    #[pyo3(get)]
    pub river_status: RiverStatus,
}

#[pymethods]
impl StepOutcome {
    fn __repr__(&self) -> String {
        format!(
            "StepOutcome(new_level={:.2}, new_flow={:.1}, overflow={}, pct_full={:.1})",
            self.new_level, self.new_flow, self.overflow, self.pct_full
        )
    }
}

/// Result of running a whole scenario against one reservoir/river pair.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    #[pyo3(get)]
    pub mode: ScenarioMode,
    /// Zero in drought mode.
    #[pyo3(get)]
    pub runoff_cusecs: i64,
    #[pyo3(get)]
    pub new_level: f64,
    #[pyo3(get)]
    pub new_flow: f64,
    #[pyo3(get)]
    pub overflow: bool,
    #[pyo3(get)]
    pub pct_full: f64,
    #[pyo3(get)]
    pub river_status: RiverStatus,
    #[pyo3(get)]
    pub outflow_demand: f64,
}

#[pymethods]
impl ScenarioOutcome {
    fn __repr__(&self) -> String {
        format!(
            "ScenarioOutcome(mode={:?}, runoff={}, pct_full={:.1}, river={})",
            self.mode,
            self.runoff_cusecs,
            self.pct_full,
            self.river_status.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservoir_rejects_zero_capacity() {
        let err = ReservoirState::new("dry", 0.0, 0.0).unwrap_err();
        assert!(matches!(err, HydrologyError::InvalidConfiguration(_)));

        let err = ReservoirState::new("neg", -10.0, 0.0).unwrap_err();
        assert!(matches!(err, HydrologyError::InvalidConfiguration(_)));

        let err = ReservoirState::new("nan", f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, HydrologyError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_reservoir_rejects_level_out_of_range() {
        assert!(matches!(
            ReservoirState::new("r", 100.0, 101.0),
            Err(HydrologyError::InvalidInput(_))
        ));
        assert!(matches!(
            ReservoirState::new("r", 100.0, -1.0),
            Err(HydrologyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_reservoir_rejects_negative_flow() {
        let res = ReservoirState::new("r", 100.0, 50.0).unwrap();
        assert!(matches!(
            res.with_flows(-1.0, 0.0),
            Err(HydrologyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_pct_full() {
        let res = ReservoirState::new("r", 3645.0, 2850.0).unwrap();
        assert!((res.pct_full() - 78.18930041152264).abs() < 1e-9);
    }

    #[test]
    fn test_river_status_tracks_flow() {
        let river = RiverState::new("r", 22000.0, 18000.0).unwrap();
        // 18000 / 22000 = 0.818
        assert_eq!(river.status(), RiverStatus::Warning);
    }

    #[test]
    fn test_river_rejects_zero_design_capacity() {
        assert!(matches!(
            RiverState::new("r", 0.0, 10.0),
            Err(HydrologyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_scenario_modes() {
        assert_eq!(ScenarioInput::new(0.0, 2160.0, 5.0, 0.1).mode(), ScenarioMode::Drought);
        // Saturation exactly at the limit is not drought
        assert_eq!(ScenarioInput::new(0.0, 720.0, 20.0, 0.2).mode(), ScenarioMode::Baseline);
        assert_eq!(ScenarioInput::new(25.0, 4.0, 50.0, 0.5).mode(), ScenarioMode::Flood);
        // Rain always wins over dry soil
        assert_eq!(ScenarioInput::new(1.0, 4.0, 5.0, 0.5).mode(), ScenarioMode::Flood);
    }

    #[test]
    fn test_scenario_validation() {
        assert!(ScenarioInput::new(25.0, 4.0, 50.0, 0.5).validate().is_ok());
        assert!(ScenarioInput::new(-1.0, 4.0, 50.0, 0.5).validate().is_err());
        assert!(ScenarioInput::new(25.0, 0.0, 50.0, 0.5).validate().is_err());
        assert!(ScenarioInput::new(25.0, 4.0, 101.0, 0.5).validate().is_err());
        assert!(ScenarioInput::new(25.0, 4.0, 50.0, -0.1).validate().is_err());
        assert!(ScenarioInput::new(f64::NAN, 4.0, 50.0, 0.5).validate().is_err());
    }

    #[test]
    fn test_total_accumulation() {
        let input = ScenarioInput::new(110.0, 24.0, 95.0, 1.2);
        assert!((input.total_accumulation_mm() - 2640.0).abs() < 1e-9);
    }
}
