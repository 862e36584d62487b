//! Alert rules evaluated over a projected city network.

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::CityProfile;
use crate::config::EngineConfig;
use crate::hydrology::NetworkProjection;
use crate::models::{ScenarioInput, ScenarioMode};
use crate::{log_changes, log_checks};

#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub severity: AlertSeverity,
    #[pyo3(get)]
    pub title: String,
    #[pyo3(get)]
    pub message: String,
    #[pyo3(get)]
    pub location: String,
    #[pyo3(get)]
    pub issued_at: NaiveDateTime,
}

impl Alert {
    fn new(
        id: &str,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        location: impl Into<String>,
        issued_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.to_string(),
            severity,
            title: title.into(),
            message: message.into(),
            location: location.into(),
            issued_at,
        }
    }
}

#[pymethods]
impl Alert {
    fn __repr__(&self) -> String {
        format!(
            "Alert(id={:?}, severity={}, title={:?})",
            self.id,
            self.severity.as_str(),
            self.title
        )
    }
}

/// Evaluate the alert rules for a projected scenario.
///
/// Baseline scenarios raise nothing. Only the first (primary) reservoir is
/// checked for surplus. Alerts come back most severe first; alerts of equal
/// severity keep rule order.
pub fn generate_alerts(
    city: &CityProfile,
    scenario: &ScenarioInput,
    projection: &NetworkProjection,
    config: &EngineConfig,
    now: NaiveDateTime,
) -> Vec<Alert> {
    let verbosity = config.verbosity;
    let mut alerts = Vec::new();

    if projection.mode == ScenarioMode::Baseline {
        log_checks!(verbosity, "alerts: baseline scenario for {}, no rules evaluated", city.id);
        return alerts;
    }

    let rainfall = scenario.rainfall_intensity_mm_hr;
    if rainfall > config.flash_flood_threshold_mm_hr {
        alerts.push(Alert::new(
            "sim-flash-flood",
            AlertSeverity::Critical,
            "Flash Flood Warning",
            format!(
                "Rainfall intensity of {}mm/hr is overwhelming storm water drain capacity in {}.",
                rainfall, city.name
            ),
            "Citywide",
            now,
        ));
    }

    if let Some(primary) = projection.reservoirs.first() {
        let surplus_level = primary.capacity_mcft() * config.reservoir_surplus_fraction;
        log_checks!(
            verbosity,
            "alerts: {} level {:.1} vs surplus line {:.1} mcft",
            primary.name(),
            primary.current_level_mcft(),
            surplus_level
        );
        if primary.current_level_mcft() > surplus_level {
            alerts.push(Alert::new(
                "sim-reservoir-surplus",
                AlertSeverity::High,
                format!("{} Surplus", primary.name()),
                "Reservoir near capacity. Automated gate release impending.",
                primary.name(),
                now,
            ));
        }
    }

    if projection.mode == ScenarioMode::Drought {
        alerts.push(Alert::new(
            "sim-drought-scarcity",
            AlertSeverity::Critical,
            "Severe Water Scarcity",
            format!(
                "Failed monsoon scenario. Reservoir levels dropping rapidly. Soil saturation at {}%.",
                scenario.soil_saturation_percent
            ),
            "Citywide",
            now,
        ));
        alerts.push(Alert::new(
            "sim-drought-rationing",
            AlertSeverity::Medium,
            "Supply Rationing",
            "Recommend cutting non-essential water supply to commercial zones.",
            "Metro Water",
            now,
        ));
    }

    // Stable sort keeps rule order within a severity
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));

    for alert in &alerts {
        log_changes!(
            verbosity,
            "alert [{}] {} ({})",
            alert.severity.as_str(),
            alert.title,
            alert.location
        );
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{base_network, CityCatalog};
    use crate::hydrology::project_network;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 30)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    fn alerts_for(city_id: &str, scenario: ScenarioInput) -> Vec<Alert> {
        let catalog = CityCatalog::builtin();
        let city = catalog.get_or_default(city_id);
        let config = EngineConfig::default();
        let projection = project_network(&base_network(city), &scenario, &config).unwrap();
        generate_alerts(city, &scenario, &projection, &config, now())
    }

    #[test]
    fn test_baseline_raises_nothing() {
        let alerts = alerts_for("chennai", ScenarioInput::new(0.0, 4.0, 50.0, 0.5));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_light_rain_raises_nothing() {
        // Primary reservoir: 2850 * 1.075 = 3063.75 < 3645 * 0.95
        let alerts = alerts_for("chennai", ScenarioInput::new(15.0, 4.0, 50.0, 0.5));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_heavy_rain_flash_flood_and_surplus() {
        let alerts = alerts_for("chennai", ScenarioInput::new(65.0, 6.0, 80.0, 2.5));
        assert_eq!(alerts.len(), 2);

        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].title, "Flash Flood Warning");
        assert_eq!(alerts[0].location, "Citywide");
        assert!(alerts[0].message.contains("65mm/hr"));
        assert!(alerts[0].message.contains("Chennai"));

        assert_eq!(alerts[1].severity, AlertSeverity::High);
        assert!(alerts[1].title.ends_with(" Surplus"));
        assert_eq!(alerts[1].issued_at, now());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let alerts = alerts_for("chennai", ScenarioInput::new(50.0, 6.0, 80.0, 0.5));
        assert!(alerts.iter().all(|a| a.title != "Flash Flood Warning"));
    }

    #[test]
    fn test_drought_alerts_ordered_by_severity() {
        let alerts = alerts_for("chennai", ScenarioInput::new(0.0, 2160.0, 5.0, 0.1));
        let titles: Vec<&str> = alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Severe Water Scarcity", "Supply Rationing"]);
        assert_eq!(alerts[1].severity, AlertSeverity::Medium);
        assert!(alerts[0].message.contains("5%"));
    }

    #[test]
    fn test_severity_ordering_and_labels() {
        assert!(AlertSeverity::Critical > AlertSeverity::High);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Critical).unwrap(),
            "\"critical\""
        );
    }
}
