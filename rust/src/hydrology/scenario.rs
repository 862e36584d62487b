//! Whole-scenario runs against a single reservoir/river pair.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{ReservoirState, RiverState, ScenarioInput, ScenarioMode, ScenarioOutcome, StepOutcome};
use crate::{log_changes, log_checks, log_debug};

use super::runoff::compute_runoff;
use super::status::classify_river;
use super::step::step_reservoir;
use super::{require_finite, HydrologyError};

/// The land surface draining into a reservoir.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catchment {
    #[pyo3(get, set)]
    pub area_sq_km: f64,
    /// Share of rainfall that becomes runoff, as a percentage.
    #[pyo3(get, set)]
    pub efficiency_percent: f64,
}

impl Catchment {
    pub fn new(area_sq_km: f64, efficiency_percent: f64) -> Self {
        Self {
            area_sq_km,
            efficiency_percent,
        }
    }

    fn validate(&self) -> Result<(), HydrologyError> {
        let area = require_finite("catchment area", self.area_sq_km)?;
        let efficiency = require_finite("runoff efficiency", self.efficiency_percent)?;
        if area < 0.0 || efficiency < 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "catchment area and efficiency must be >= 0, got area={} efficiency={}",
                area, efficiency
            )));
        }
        Ok(())
    }
}

#[pymethods]
impl Catchment {
    #[new]
    fn py_new(area_sq_km: f64, efficiency_percent: f64) -> Self {
        Self::new(area_sq_km, efficiency_percent)
    }

    fn __repr__(&self) -> String {
        format!(
            "Catchment(area_sq_km={}, efficiency_percent={})",
            self.area_sq_km, self.efficiency_percent
        )
    }
}

fn from_step(mode: ScenarioMode, runoff_cusecs: i64, step: StepOutcome, outflow: f64) -> ScenarioOutcome {
    ScenarioOutcome {
        mode,
        runoff_cusecs,
        new_level: step.new_level,
        new_flow: step.new_flow,
        overflow: step.overflow,
        pct_full: step.pct_full,
        river_status: step.river_status,
        outflow_demand: outflow,
    }
}

/// Run a scenario against one reservoir and its downstream river.
///
/// Drought scenarios skip runoff and the time step entirely and apply the
/// drought multipliers instead. Every other scenario converts rainfall to
/// runoff and advances one step covering the full duration.
pub fn run_scenario(
    scenario: &ScenarioInput,
    catchment: &Catchment,
    reservoir: &ReservoirState,
    river: &RiverState,
    config: &EngineConfig,
) -> Result<ScenarioOutcome, HydrologyError> {
    scenario.validate()?;
    catchment.validate()?;

    let verbosity = config.verbosity;
    let mode = scenario.mode();
    log_changes!(
        verbosity,
        "scenario on {:?}/{:?}: mode={:?}",
        reservoir.name(),
        river.name(),
        mode
    );

    match mode {
        ScenarioMode::Drought => {
            let factors = &config.drought;
            let capacity = reservoir.capacity_mcft();
            let new_level = (reservoir.current_level_mcft() * factors.level_multiplier).min(capacity);
            let new_flow = river.current_flow_cusecs() * factors.river_flow_multiplier;
            let outflow_demand = reservoir.outflow_cusecs() * factors.outflow_multiplier;
            log_debug!(
                verbosity,
                "drought: level {} -> {}, flow {} -> {}, outflow demand {}",
                reservoir.current_level_mcft(),
                new_level,
                river.current_flow_cusecs(),
                new_flow,
                outflow_demand
            );
            Ok(ScenarioOutcome {
                mode,
                runoff_cusecs: 0,
                new_level,
                new_flow,
                overflow: false,
                pct_full: new_level / capacity * 100.0,
                river_status: classify_river(new_flow, river.design_capacity_cusecs()),
                outflow_demand,
            })
        }
        ScenarioMode::Flood | ScenarioMode::Baseline => {
            let runoff = compute_runoff(
                scenario.rainfall_intensity_mm_hr,
                catchment.area_sq_km,
                catchment.efficiency_percent,
            );
            log_debug!(verbosity, "runoff={} cusecs", runoff);
            let step = step_reservoir(reservoir, river, runoff as f64, scenario.duration_hours)?;
            if step.overflow {
                log_changes!(
                    verbosity,
                    "{:?} overflowed, gate release into {:?}",
                    reservoir.name(),
                    river.name()
                );
            }
            log_checks!(
                verbosity,
                "river {:?} status {}",
                river.name(),
                step.river_status.as_str()
            );
            Ok(from_step(mode, runoff, step, reservoir.outflow_cusecs()))
        }
    }
}

/// Step a reservoir/river pair through a rainfall series, carrying level and
/// flow forward from one interval to the next.
///
/// Each entry in `rainfall_mm_hr` is the intensity over one interval of
/// `hours_per_step`. Returns one outcome per interval.
pub fn simulate_hydrograph(
    reservoir: &ReservoirState,
    river: &RiverState,
    catchment: &Catchment,
    rainfall_mm_hr: &[f64],
    hours_per_step: f64,
) -> Result<Vec<StepOutcome>, HydrologyError> {
    catchment.validate()?;

    let mut reservoir = reservoir.clone();
    let mut river = river.clone();
    let mut outcomes = Vec::with_capacity(rainfall_mm_hr.len());

    for &rain in rainfall_mm_hr {
        let rain = require_finite("rainfall intensity", rain)?;
        if rain < 0.0 {
            return Err(HydrologyError::InvalidInput(format!(
                "rainfall intensity must be >= 0, got {}",
                rain
            )));
        }
        let runoff = compute_runoff(rain, catchment.area_sq_km, catchment.efficiency_percent);
        let step = step_reservoir(&reservoir, &river, runoff as f64, hours_per_step)?;
        reservoir.current_level_mcft = step.new_level;
        reservoir.inflow_cusecs = runoff as f64;
        river.current_flow_cusecs = step.new_flow;
        outcomes.push(step);
    }

    Ok(outcomes)
}
