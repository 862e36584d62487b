//! Rainfall-runoff conversion and reservoir/river time-step simulation.
//!
//! Two independent branches exist and must stay separate:
//! - flood mode: runoff feeds the reservoir, overflow opens the gates into the river
//! - drought mode: fixed depletion multipliers, no inflow arithmetic at all

mod network;
mod risk;
mod runoff;
mod scenario;
mod status;
mod step;

use thiserror::Error;

pub use network::{project_network, CityNetwork, NetworkProjection};
pub use risk::{assess_risk, RiskLevel};
pub use runoff::{compute_runoff, RUNOFF_SCALE};
pub use scenario::{run_scenario, simulate_hydrograph, Catchment};
pub use status::{classify_river, flow_ratio, CRITICAL_RATIO, WARNING_RATIO};
pub use step::{
    advance_time_step, inflow_volume_mcft, step_reservoir, BASE_FLOW_SHARE,
    OVERFLOW_RELEASE_FACTOR,
};

/// Errors raised by the hydrology engine.
///
/// These are structural failures: the simulation cannot run at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydrologyError {
    /// Static city data is unusable (zero or negative capacity).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A per-run value is malformed (NaN, negative flow, bad duration).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Reject NaN and infinities with a message naming the offending quantity.
pub(crate) fn require_finite(what: &str, value: f64) -> Result<f64, HydrologyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HydrologyError::InvalidInput(format!(
            "{} must be a finite number, got {}",
            what, value
        )))
    }
}
