//! JSON request handling for exposing the engine over HTTP.
//!
//! Routes:
//! - `/simulate`: one reservoir/river pair through a scenario
//! - `/prioritize`: recovery incident scoring
//! - `/validate-proposal`: proposal cost efficiency
//! - `/project`: a city's whole network, risk band and alerts
//!
//! Bodies and responses are camelCase JSON. Transport is the caller's job.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::{generate_alerts, Alert};
use crate::catalog::{base_network, CityCatalog, DEFAULT_CITY_ID};
use crate::config::EngineConfig;
use crate::hydrology::{assess_risk, project_network, run_scenario, Catchment, HydrologyError, RiskLevel};
use crate::models::{ReservoirState, RiverState, RiverStatus, ScenarioInput, ScenarioMode};
use crate::proposal::{validate_proposal, ProposalError};
use crate::recovery::{assess_priority, LocationType, PriorityError};
use crate::log_changes;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("Unknown city: {0}")]
    UnknownCity(String),
    #[error(transparent)]
    Hydrology(#[from] HydrologyError),
    #[error(transparent)]
    Priority(#[from] PriorityError),
    #[error(transparent)]
    Proposal(#[from] ProposalError),
}

impl ServiceError {
    /// HTTP status a transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownRoute(_) | Self::UnknownCity(_) => 404,
            Self::MalformedBody(_) => 400,
            Self::Hydrology(_) | Self::Priority(_) | Self::Proposal(_) => 422,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservoirBody {
    #[serde(default)]
    name: Option<String>,
    capacity: f64,
    current_level: f64,
    #[serde(default)]
    inflow: f64,
    #[serde(default)]
    outflow: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiverBody {
    #[serde(default)]
    name: Option<String>,
    design_capacity: f64,
    current_flow: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateRequest {
    rainfall_intensity_mm_hr: f64,
    duration_hours: f64,
    soil_saturation_percent: f64,
    #[serde(default)]
    tide_level_meters: f64,
    area_sq_km: f64,
    efficiency_percent: f64,
    reservoir: ReservoirBody,
    river: RiverBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrioritizeRequest {
    depth_ft: f64,
    location_type: String,
    population_affected: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalRequest {
    cost_cr: f64,
    impact_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRequest {
    #[serde(default)]
    city_id: Option<String>,
    scenario: ScenarioInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RiskView {
    level: RiskLevel,
    label: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReservoirView<'a> {
    name: &'a str,
    capacity_mcft: f64,
    current_level_mcft: f64,
    inflow_cusecs: f64,
    outflow_cusecs: f64,
    pct_full: f64,
}

impl<'a> From<&'a ReservoirState> for ReservoirView<'a> {
    fn from(r: &'a ReservoirState) -> Self {
        Self {
            name: r.name(),
            capacity_mcft: r.capacity_mcft(),
            current_level_mcft: r.current_level_mcft(),
            inflow_cusecs: r.inflow_cusecs(),
            outflow_cusecs: r.outflow_cusecs(),
            pct_full: r.pct_full(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RiverView<'a> {
    name: &'a str,
    design_capacity_cusecs: f64,
    current_flow_cusecs: f64,
    status: RiverStatus,
}

impl<'a> From<&'a RiverState> for RiverView<'a> {
    fn from(r: &'a RiverState) -> Self {
        Self {
            name: r.name(),
            design_capacity_cusecs: r.design_capacity_cusecs(),
            current_flow_cusecs: r.current_flow_cusecs(),
            status: r.status(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse<'a> {
    city_id: &'a str,
    mode: ScenarioMode,
    risk: RiskView,
    reservoirs: Vec<ReservoirView<'a>>,
    rivers: Vec<RiverView<'a>>,
    alerts: Vec<Alert>,
}

/// Stateless request handler over a city catalog and engine configuration.
#[derive(Debug, Clone, Default)]
pub struct HydroService {
    catalog: CityCatalog,
    config: EngineConfig,
}

impl HydroService {
    pub fn new(catalog: CityCatalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handle a request, stamping any alerts with the current UTC time.
    pub fn handle(&self, route: &str, body: &str) -> Result<String, ServiceError> {
        self.handle_at(route, body, Utc::now().naive_utc())
    }

    /// Handle a request with an explicit clock for alert timestamps.
    pub fn handle_at(&self, route: &str, body: &str, now: NaiveDateTime) -> Result<String, ServiceError> {
        let route = route.trim_end_matches('/');
        log_changes!(self.config.verbosity, "service: {} ({} bytes)", route, body.len());
        match route {
            "/simulate" => self.simulate(body),
            "/prioritize" => self.prioritize(body),
            "/validate-proposal" => self.validate_proposal(body),
            "/project" => self.project(body, now),
            other => Err(ServiceError::UnknownRoute(other.to_string())),
        }
    }

    fn simulate(&self, body: &str) -> Result<String, ServiceError> {
        let req: SimulateRequest = serde_json::from_str(body)?;
        let scenario = ScenarioInput::new(
            req.rainfall_intensity_mm_hr,
            req.duration_hours,
            req.soil_saturation_percent,
            req.tide_level_meters,
        );
        let catchment = Catchment::new(req.area_sq_km, req.efficiency_percent);
        let reservoir = ReservoirState::new(
            req.reservoir.name.unwrap_or_else(|| "reservoir".to_string()),
            req.reservoir.capacity,
            req.reservoir.current_level,
        )?
        .with_flows(req.reservoir.inflow, req.reservoir.outflow)?;
        let river = RiverState::new(
            req.river.name.unwrap_or_else(|| "river".to_string()),
            req.river.design_capacity,
            req.river.current_flow,
        )?;

        let outcome = run_scenario(&scenario, &catchment, &reservoir, &river, &self.config)?;
        Ok(serde_json::to_string(&outcome)?)
    }

    fn prioritize(&self, body: &str) -> Result<String, ServiceError> {
        let req: PrioritizeRequest = serde_json::from_str(body)?;
        let assessment = assess_priority(
            req.depth_ft,
            LocationType::parse(&req.location_type),
            req.population_affected,
        )?;
        Ok(serde_json::to_string(&assessment)?)
    }

    fn validate_proposal(&self, body: &str) -> Result<String, ServiceError> {
        let req: ProposalRequest = serde_json::from_str(body)?;
        let assessment = validate_proposal(req.cost_cr, req.impact_score)?;
        Ok(serde_json::to_string(&assessment)?)
    }

    fn project(&self, body: &str, now: NaiveDateTime) -> Result<String, ServiceError> {
        let req: ProjectRequest = serde_json::from_str(body)?;
        let city_id = req.city_id.as_deref().unwrap_or(DEFAULT_CITY_ID);
        let city = self
            .catalog
            .get(city_id)
            .ok_or_else(|| ServiceError::UnknownCity(city_id.to_string()))?;

        let projection = project_network(&base_network(city), &req.scenario, &self.config)?;
        let risk = assess_risk(
            city,
            req.scenario.rainfall_intensity_mm_hr,
            req.scenario.soil_saturation_percent,
        );
        let alerts = generate_alerts(city, &req.scenario, &projection, &self.config, now);

        let response = ProjectResponse {
            city_id: &city.id,
            mode: projection.mode,
            risk: RiskView {
                level: risk,
                label: risk.label(),
                description: risk.description(),
            },
            reservoirs: projection.reservoirs.iter().map(ReservoirView::from).collect(),
            rivers: projection.rivers.iter().map(RiverView::from).collect(),
            alerts,
        };
        Ok(serde_json::to_string(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn service() -> HydroService {
        HydroService::new(CityCatalog::builtin(), EngineConfig::default())
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn call(route: &str, body: &str) -> Value {
        let text = service().handle_at(route, body, now()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_simulate_route() {
        let body = r#"{
            "rainfallIntensityMmHr": 15,
            "durationHours": 4,
            "soilSaturationPercent": 50,
            "areaSqKm": 426,
            "efficiencyPercent": 60,
            "reservoir": {"capacity": 3645, "currentLevel": 2850},
            "river": {"designCapacity": 60000, "currentFlow": 15000}
        }"#;
        let out = call("/simulate", body);
        assert_eq!(out["mode"], "Flood");
        assert_eq!(out["runoffCusecs"], 1917);
        assert_eq!(out["overflow"], false);
        assert_eq!(out["riverStatus"], "Normal");
        let new_level = out["newLevel"].as_f64().unwrap();
        // 2850 + 1917 * 3600 * 4 / 1e6
        assert!((new_level - 2877.6048).abs() < 1e-9);
    }

    #[test]
    fn test_simulate_rejects_zero_capacity() {
        let body = r#"{
            "rainfallIntensityMmHr": 15, "durationHours": 4, "soilSaturationPercent": 50,
            "areaSqKm": 426, "efficiencyPercent": 60,
            "reservoir": {"capacity": 0, "currentLevel": 0},
            "river": {"designCapacity": 60000, "currentFlow": 15000}
        }"#;
        let err = service().handle_at("/simulate", body, now()).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Hydrology(HydrologyError::InvalidConfiguration(_))
        ));
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_prioritize_route() {
        let out = call(
            "/prioritize",
            r#"{"depthFt": 6, "locationType": "Hospital", "populationAffected": 5000}"#,
        );
        assert_eq!(out["tier"], "Critical");
        assert_eq!(out["score"], 110);

        let out = call(
            "/prioritize",
            r#"{"depthFt": 1, "locationType": "road", "populationAffected": 10}"#,
        );
        assert_eq!(out["tier"], "Low");
    }

    #[test]
    fn test_prioritize_negative_population() {
        let err = service()
            .handle_at(
                "/prioritize",
                r#"{"depthFt": 1, "locationType": "Road", "populationAffected": -1}"#,
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Priority(_)));
    }

    #[test]
    fn test_validate_proposal_route() {
        let out = call("/validate-proposal", r#"{"costCr": 45, "impactScore": 9}"#);
        assert_eq!(out["isValid"], true);
        assert_eq!(out["tier"], "High Value");
        assert_eq!(out["ratio"], 5.0);

        let out = call("/validate-proposal", r#"{"costCr": 0, "impactScore": 9}"#);
        assert_eq!(out["isValid"], false);
        assert_eq!(out["tier"], "Invalid");
        assert!(out["ratio"].is_null());
    }

    #[test]
    fn test_project_route_heavy_rain() {
        let body = r#"{
            "cityId": "chennai",
            "scenario": {
                "rainfallIntensityMmHr": 110,
                "durationHours": 24,
                "soilSaturationPercent": 95,
                "tideLevelMeters": 1.2
            }
        }"#;
        let out = call("/project", body);
        assert_eq!(out["cityId"], "chennai");
        assert_eq!(out["mode"], "Flood");
        assert_eq!(out["risk"]["level"], "SevereFlooding");
        assert_eq!(out["reservoirs"].as_array().unwrap().len(), 5);
        assert_eq!(out["rivers"].as_array().unwrap().len(), 3);

        let alerts = out["alerts"].as_array().unwrap();
        assert_eq!(alerts[0]["title"], "Flash Flood Warning");
        assert_eq!(alerts[0]["severity"], "critical");
        assert_eq!(alerts[0]["issuedAt"], "2025-12-01T09:30:00");
    }

    #[test]
    fn test_project_defaults_city_and_tide() {
        let body = r#"{"scenario": {"rainfallIntensityMmHr": 0, "durationHours": 4, "soilSaturationPercent": 50}}"#;
        let out = call("/project", body);
        assert_eq!(out["cityId"], DEFAULT_CITY_ID);
        assert_eq!(out["mode"], "Baseline");
        assert!(out["alerts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_project_unknown_city() {
        let body = r#"{"cityId": "atlantis", "scenario": {"rainfallIntensityMmHr": 10, "durationHours": 1, "soilSaturationPercent": 50}}"#;
        let err = service().handle_at("/project", body, now()).unwrap_err();
        assert!(matches!(err, ServiceError::UnknownCity(ref id) if id == "atlantis"));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_unknown_route_and_bad_body() {
        let err = service().handle_at("/forecast", "{}", now()).unwrap_err();
        assert!(matches!(err, ServiceError::UnknownRoute(_)));
        assert_eq!(err.status_code(), 404);

        let err = service().handle_at("/prioritize", "not json", now()).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedBody(_)));
        assert_eq!(err.status_code(), 400);

        let err = service().handle_at("/validate-proposal", r#"{"costCr": 10}"#, now()).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_trailing_slash_is_accepted() {
        let out = call("/validate-proposal/", r#"{"costCr": 80, "impactScore": 7}"#);
        assert_eq!(out["tier"], "Moderate");
    }
}
