//! Rust core of the HydroGuard flood and drought dashboard.
//!
//! Provides the hydrology engine, recovery prioritization and proposal
//! validation as pure functions, plus the city catalog, alert rules, a JSON
//! request handler and a diagnostics suite built on top of them.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use std::collections::HashMap;

pub mod alerts;
pub mod catalog;
mod config;
pub mod diagnostics;
pub mod hydrology;
pub mod logging;
mod models;
pub mod proposal;
pub mod recovery;
pub mod service;

pub use alerts::{generate_alerts, Alert, AlertSeverity};
pub use catalog::{
    base_network, builtin_cities, find_preset, scenario_presets, CityCatalog, CityProfile,
    LocationLevel, ScenarioPreset, DEFAULT_CITY_ID,
};
pub use config::{DroughtFactors, EngineConfig, FloodFactors};
pub use diagnostics::{run_diagnostics, ProbeCategory, ProbeResult};
pub use hydrology::{
    advance_time_step, assess_risk, classify_river, compute_runoff, project_network, run_scenario,
    simulate_hydrograph, step_reservoir, Catchment, CityNetwork, HydrologyError, NetworkProjection,
    RiskLevel,
};
pub use models::{
    ReservoirState, RiverState, RiverStatus, ScenarioInput, ScenarioMode, ScenarioOutcome,
    StepOutcome,
};
pub use proposal::{
    parse_crores, portfolio_metrics, validate_proposal, EfficiencyTier, PlanStatus,
    PortfolioEntry, PortfolioMetrics, ProposalAssessment, ProposalError,
};
pub use recovery::{
    assess_priority, critical_watch, rank_tasks, score_priority, tally_by_tier, LocationType,
    PriorityAssessment, PriorityError, PriorityTier, RecoveryTask,
};
pub use service::{HydroService, ServiceError};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

/// Convert rainfall over a catchment into runoff (cusecs, truncated).
#[pyfunction]
#[pyo3(name = "compute_runoff")]
fn py_compute_runoff(rainfall_mm_hr: f64, area_sq_km: f64, efficiency_percent: f64) -> i64 {
    compute_runoff(rainfall_mm_hr, area_sq_km, efficiency_percent)
}

/// Advance reservoir level and river flow by one time step.
///
/// # Raises
/// * ValueError if capacity is not positive or an input is negative or NaN
#[pyfunction]
#[pyo3(name = "advance_time_step")]
fn py_advance_time_step(
    capacity: f64,
    current_level: f64,
    river_design_capacity: f64,
    river_current_flow: f64,
    inflow_cusecs: f64,
    hours: f64,
) -> PyResult<StepOutcome> {
    advance_time_step(
        capacity,
        current_level,
        river_design_capacity,
        river_current_flow,
        inflow_cusecs,
        hours,
    )
    .map_err(value_error)
}

/// Run a scenario against one reservoir/river pair.
#[pyfunction]
#[pyo3(name = "run_scenario", signature = (scenario, catchment, reservoir, river, config=None))]
fn py_run_scenario(
    scenario: ScenarioInput,
    catchment: Catchment,
    reservoir: ReservoirState,
    river: RiverState,
    config: Option<EngineConfig>,
) -> PyResult<ScenarioOutcome> {
    let config = config.unwrap_or_default();
    run_scenario(&scenario, &catchment, &reservoir, &river, &config).map_err(value_error)
}

/// Step a reservoir/river pair through a series of rainfall intervals.
#[pyfunction]
#[pyo3(name = "simulate_hydrograph")]
fn py_simulate_hydrograph(
    reservoir: ReservoirState,
    river: RiverState,
    catchment: Catchment,
    rainfall_mm_hr: Vec<f64>,
    hours_per_step: f64,
) -> PyResult<Vec<StepOutcome>> {
    simulate_hydrograph(&reservoir, &river, &catchment, &rainfall_mm_hr, hours_per_step)
        .map_err(value_error)
}

/// Apply a scenario's multipliers to every reservoir and river of a network.
#[pyfunction]
#[pyo3(name = "project_network", signature = (network, scenario, config=None))]
fn py_project_network(
    network: CityNetwork,
    scenario: ScenarioInput,
    config: Option<EngineConfig>,
) -> PyResult<NetworkProjection> {
    let config = config.unwrap_or_default();
    project_network(&network, &scenario, &config).map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "assess_risk")]
fn py_assess_risk(profile: CityProfile, rainfall_mm_hr: f64, soil_saturation_percent: f64) -> RiskLevel {
    assess_risk(&profile, rainfall_mm_hr, soil_saturation_percent)
}

/// Evaluate alert rules for a projected network.
#[pyfunction]
#[pyo3(name = "generate_alerts", signature = (city, scenario, projection, issued_at, config=None))]
fn py_generate_alerts(
    city: CityProfile,
    scenario: ScenarioInput,
    projection: NetworkProjection,
    issued_at: NaiveDateTime,
    config: Option<EngineConfig>,
) -> Vec<Alert> {
    let config = config.unwrap_or_default();
    generate_alerts(&city, &scenario, &projection, &config, issued_at)
}

/// Score an incident's rescue urgency.
///
/// `location_type` is free text; unrecognised values score as "Other".
///
/// # Raises
/// * ValueError for negative depth or population
#[pyfunction]
#[pyo3(name = "score_priority")]
fn py_score_priority(depth_ft: f64, location_type: &str, population_affected: i64) -> PyResult<PriorityTier> {
    score_priority(depth_ft, LocationType::parse(location_type), population_affected)
        .map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "assess_priority")]
fn py_assess_priority(
    depth_ft: f64,
    location_type: &str,
    population_affected: i64,
) -> PyResult<PriorityAssessment> {
    assess_priority(depth_ft, LocationType::parse(location_type), population_affected)
        .map_err(value_error)
}

/// Order task ids for dispatch, most urgent first.
#[pyfunction]
#[pyo3(name = "rank_tasks")]
fn py_rank_tasks(tasks: Vec<RecoveryTask>) -> Vec<String> {
    rank_tasks(&tasks)
}

/// Count tasks per tier, keyed by tier label.
#[pyfunction]
#[pyo3(name = "tally_by_tier")]
fn py_tally_by_tier(tasks: Vec<RecoveryTask>) -> HashMap<String, usize> {
    tally_by_tier(&tasks)
        .into_iter()
        .map(|(tier, count)| (tier.as_str().to_string(), count))
        .collect()
}

#[pyfunction]
#[pyo3(name = "critical_watch")]
fn py_critical_watch(tasks: Vec<RecoveryTask>) -> Vec<RecoveryTask> {
    critical_watch(&tasks)
}

/// Classify a proposal by cost (crores) per impact point.
///
/// # Raises
/// * ValueError if either number is NaN or infinite
#[pyfunction]
#[pyo3(name = "validate_proposal")]
fn py_validate_proposal(cost_cr: f64, impact_score: f64) -> PyResult<ProposalAssessment> {
    validate_proposal(cost_cr, impact_score).map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "parse_crores")]
fn py_parse_crores(label: &str) -> Option<f64> {
    parse_crores(label)
}

#[pyfunction]
#[pyo3(name = "portfolio_metrics")]
fn py_portfolio_metrics(entries: Vec<PortfolioEntry>) -> PortfolioMetrics {
    portfolio_metrics(&entries)
}

#[pyfunction]
#[pyo3(name = "builtin_cities")]
fn py_builtin_cities() -> Vec<CityProfile> {
    builtin_cities()
}

/// Look up a built-in city, falling back to the default city.
#[pyfunction]
#[pyo3(name = "get_city")]
fn py_get_city(city_id: &str) -> CityProfile {
    CityCatalog::builtin().get_or_default(city_id).clone()
}

#[pyfunction]
#[pyo3(name = "base_network")]
fn py_base_network(profile: CityProfile) -> CityNetwork {
    base_network(&profile)
}

#[pyfunction]
#[pyo3(name = "scenario_presets")]
fn py_scenario_presets() -> Vec<ScenarioPreset> {
    scenario_presets()
}

/// Handle a JSON request against the built-in catalog.
///
/// # Returns
/// * `(status, body)`; errors come back as `{"error": ...}` with a 4xx status
#[pyfunction]
#[pyo3(name = "handle_request", signature = (route, body, config=None))]
fn py_handle_request(route: &str, body: &str, config: Option<EngineConfig>) -> (u16, String) {
    let service = HydroService::new(CityCatalog::builtin(), config.unwrap_or_default());
    match service.handle(route, body) {
        Ok(response) => (200, response),
        Err(e) => (
            e.status_code(),
            serde_json::json!({ "error": e.to_string() }).to_string(),
        ),
    }
}

/// Run the deterministic self-check suite.
#[pyfunction]
#[pyo3(name = "run_diagnostics", signature = (config=None))]
fn py_run_diagnostics(config: Option<EngineConfig>) -> Vec<ProbeResult> {
    run_diagnostics(&config.unwrap_or_default())
}

/// The hydroguard.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Hydrology data types
    m.add_class::<ReservoirState>()?;
    m.add_class::<RiverState>()?;
    m.add_class::<RiverStatus>()?;
    m.add_class::<ScenarioInput>()?;
    m.add_class::<ScenarioMode>()?;
    m.add_class::<StepOutcome>()?;
    m.add_class::<ScenarioOutcome>()?;
    m.add_class::<Catchment>()?;
    m.add_class::<CityNetwork>()?;
    m.add_class::<NetworkProjection>()?;
    m.add_class::<RiskLevel>()?;

    // Recovery and proposals
    m.add_class::<LocationType>()?;
    m.add_class::<PriorityTier>()?;
    m.add_class::<PriorityAssessment>()?;
    m.add_class::<RecoveryTask>()?;
    m.add_class::<EfficiencyTier>()?;
    m.add_class::<ProposalAssessment>()?;
    m.add_class::<PlanStatus>()?;
    m.add_class::<PortfolioEntry>()?;
    m.add_class::<PortfolioMetrics>()?;

    // Catalog, alerts, diagnostics
    m.add_class::<LocationLevel>()?;
    m.add_class::<CityProfile>()?;
    m.add_class::<ScenarioPreset>()?;
    m.add_class::<AlertSeverity>()?;
    m.add_class::<Alert>()?;
    m.add_class::<ProbeCategory>()?;
    m.add_class::<ProbeResult>()?;

    // Config types
    m.add_class::<FloodFactors>()?;
    m.add_class::<DroughtFactors>()?;
    m.add_class::<EngineConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_compute_runoff, m)?)?;
    m.add_function(wrap_pyfunction!(py_advance_time_step, m)?)?;
    m.add_function(wrap_pyfunction!(py_run_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(py_simulate_hydrograph, m)?)?;
    m.add_function(wrap_pyfunction!(py_project_network, m)?)?;
    m.add_function(wrap_pyfunction!(py_assess_risk, m)?)?;
    m.add_function(wrap_pyfunction!(py_generate_alerts, m)?)?;
    m.add_function(wrap_pyfunction!(py_score_priority, m)?)?;
    m.add_function(wrap_pyfunction!(py_assess_priority, m)?)?;
    m.add_function(wrap_pyfunction!(py_rank_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(py_tally_by_tier, m)?)?;
    m.add_function(wrap_pyfunction!(py_critical_watch, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate_proposal, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_crores, m)?)?;
    m.add_function(wrap_pyfunction!(py_portfolio_metrics, m)?)?;
    m.add_function(wrap_pyfunction!(py_builtin_cities, m)?)?;
    m.add_function(wrap_pyfunction!(py_get_city, m)?)?;
    m.add_function(wrap_pyfunction!(py_base_network, m)?)?;
    m.add_function(wrap_pyfunction!(py_scenario_presets, m)?)?;
    m.add_function(wrap_pyfunction!(py_handle_request, m)?)?;
    m.add_function(wrap_pyfunction!(py_run_diagnostics, m)?)?;

    Ok(())
}
