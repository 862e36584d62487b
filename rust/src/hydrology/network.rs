//! Scenario projection over every reservoir and river of a city.

use pyo3::prelude::*;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::models::{ReservoirState, RiverState, ScenarioInput, ScenarioMode};
use crate::{log_changes, log_checks};

use super::HydrologyError;

/// The reservoirs and rivers monitored for one city.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CityNetwork {
    #[pyo3(get)]
    pub reservoirs: Vec<ReservoirState>,
    #[pyo3(get)]
    pub rivers: Vec<RiverState>,
}

#[pymethods]
impl CityNetwork {
    #[new]
    fn py_new(reservoirs: Vec<ReservoirState>, rivers: Vec<RiverState>) -> Self {
        Self { reservoirs, rivers }
    }

    fn __repr__(&self) -> String {
        format!(
            "CityNetwork(reservoirs={}, rivers={})",
            self.reservoirs.len(),
            self.rivers.len()
        )
    }
}

/// A city network after applying a scenario's multipliers.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkProjection {
    #[pyo3(get)]
    pub mode: ScenarioMode,
    #[pyo3(get)]
    pub reservoirs: Vec<ReservoirState>,
    #[pyo3(get)]
    pub rivers: Vec<RiverState>,
}

#[pymethods]
impl NetworkProjection {
    fn __repr__(&self) -> String {
        format!(
            "NetworkProjection(mode={:?}, reservoirs={}, rivers={})",
            self.mode,
            self.reservoirs.len(),
            self.rivers.len()
        )
    }
}

/// Level, inflow, outflow and river-flow multipliers for one mode.
struct Multipliers {
    level: f64,
    inflow: f64,
    outflow: f64,
    river_flow: f64,
}

fn multipliers_for(mode: ScenarioMode, rainfall_mm_hr: f64, config: &EngineConfig) -> Multipliers {
    match mode {
        ScenarioMode::Flood => {
            let flood = &config.flood;
            let flow_mult = 1.0 + rainfall_mm_hr * flood.flow_per_mm_hr;
            Multipliers {
                level: 1.0 + rainfall_mm_hr * flood.level_per_mm_hr,
                inflow: flow_mult * flood.inflow_boost,
                outflow: flow_mult * flood.outflow_boost,
                river_flow: flow_mult,
            }
        }
        ScenarioMode::Drought => {
            let drought = &config.drought;
            Multipliers {
                level: drought.level_multiplier,
                inflow: drought.inflow_multiplier,
                outflow: drought.outflow_multiplier,
                river_flow: drought.river_flow_multiplier,
            }
        }
        ScenarioMode::Baseline => Multipliers {
            level: 1.0,
            inflow: 1.0,
            outflow: 1.0,
            river_flow: 1.0,
        },
    }
}

/// Project a city network under a scenario.
///
/// Reservoir levels never exceed capacity; projected river flows are whole
/// cusecs. Baseline scenarios return the network unchanged.
pub fn project_network(
    network: &CityNetwork,
    scenario: &ScenarioInput,
    config: &EngineConfig,
) -> Result<NetworkProjection, HydrologyError> {
    scenario.validate()?;
    let mode = scenario.mode();
    let verbosity = config.verbosity;
    log_changes!(
        verbosity,
        "projecting {} reservoirs / {} rivers in {:?} mode",
        network.reservoirs.len(),
        network.rivers.len(),
        mode
    );

    if mode == ScenarioMode::Baseline {
        return Ok(NetworkProjection {
            mode,
            reservoirs: network.reservoirs.clone(),
            rivers: network.rivers.clone(),
        });
    }

    let m = multipliers_for(mode, scenario.rainfall_intensity_mm_hr, config);

    let reservoirs = network
        .reservoirs
        .iter()
        .map(|r| ReservoirState {
            name: r.name.clone(),
            capacity_mcft: r.capacity_mcft,
            current_level_mcft: (r.current_level_mcft * m.level).min(r.capacity_mcft),
            inflow_cusecs: r.inflow_cusecs * m.inflow,
            outflow_cusecs: r.outflow_cusecs * m.outflow,
        })
        .collect();

    let rivers = network
        .rivers
        .iter()
        .map(|r| {
            let projected = RiverState {
                name: r.name.clone(),
                design_capacity_cusecs: r.design_capacity_cusecs,
                current_flow_cusecs: (r.current_flow_cusecs * m.river_flow).floor(),
            };
            log_checks!(
                verbosity,
                "river {:?}: {} cusecs -> {}",
                projected.name,
                projected.current_flow_cusecs,
                projected.status().as_str()
            );
            projected
        })
        .collect();

    Ok(NetworkProjection {
        mode,
        reservoirs,
        rivers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiverStatus;

    fn network() -> CityNetwork {
        CityNetwork {
            reservoirs: vec![
                ReservoirState::new("Primary", 3645.0, 2850.0)
                    .unwrap()
                    .with_flows(1200.0, 500.0)
                    .unwrap(),
                ReservoirState::new("Main Catchment", 3231.0, 3000.0)
                    .unwrap()
                    .with_flows(9500.0, 8000.0)
                    .unwrap(),
            ],
            rivers: vec![
                RiverState::new("Primary River", 60000.0, 15000.0).unwrap(),
                RiverState::new("Secondary River", 22000.0, 18000.0).unwrap(),
            ],
        }
    }

    #[test]
    fn test_flood_projection() {
        // rain 50: flow_mult = 3.5, level_mult = 1.25
        let projection = project_network(
            &network(),
            &ScenarioInput::new(50.0, 6.0, 80.0, 1.0),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(projection.mode, ScenarioMode::Flood);
        let primary = &projection.reservoirs[0];
        assert!((primary.current_level_mcft() - 3562.5).abs() < 1e-9);
        assert!((primary.inflow_cusecs() - 8400.0).abs() < 1e-9);
        assert!((primary.outflow_cusecs() - 1750.0).abs() < 1e-9);

        // 3000 * 1.25 = 3750 clamps to 3231
        let catchment = &projection.reservoirs[1];
        assert!((catchment.current_level_mcft() - 3231.0).abs() < 1e-9);

        assert!((projection.rivers[0].current_flow_cusecs() - 52500.0).abs() < 1e-9);
        assert_eq!(projection.rivers[0].status(), RiverStatus::Warning);
        assert_eq!(projection.rivers[1].status(), RiverStatus::Critical);
    }

    #[test]
    fn test_drought_projection() {
        let projection = project_network(
            &network(),
            &ScenarioInput::new(0.0, 2160.0, 5.0, 0.1),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(projection.mode, ScenarioMode::Drought);
        let primary = &projection.reservoirs[0];
        assert!((primary.current_level_mcft() - 1710.0).abs() < 1e-9);
        assert!((primary.inflow_cusecs() - 120.0).abs() < 1e-9);
        assert!((primary.outflow_cusecs() - 750.0).abs() < 1e-9);
        assert!((projection.rivers[1].current_flow_cusecs() - 3600.0).abs() < 1e-9);
        assert!(projection
            .rivers
            .iter()
            .all(|r| r.status() == RiverStatus::Normal));
    }

    #[test]
    fn test_baseline_projection_is_identity() {
        let net = network();
        let projection = project_network(
            &net,
            &ScenarioInput::new(0.0, 12.0, 40.0, 0.5),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(projection.mode, ScenarioMode::Baseline);
        assert_eq!(projection.reservoirs, net.reservoirs);
        assert_eq!(projection.rivers, net.rivers);
    }

    #[test]
    fn test_projection_does_not_touch_input() {
        let net = network();
        let before = net.clone();
        let _ = project_network(
            &net,
            &ScenarioInput::new(110.0, 24.0, 95.0, 1.2),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(net, before);
    }
}
