//! One reservoir/river time step.

use crate::models::{ReservoirState, RiverState, StepOutcome};

use super::status::classify_river;
use super::{require_finite, HydrologyError};

const SECONDS_PER_HOUR: f64 = 3600.0;
const CUBIC_FEET_PER_MCFT: f64 = 1_000_000.0;

/// Share of the inflow that always reaches the river.
pub const BASE_FLOW_SHARE: f64 = 0.2;
/// Extra river flow (as a multiple of inflow) once the reservoir overflows
/// and the emergency gates open. Binary: it does not scale with the surplus.
pub const OVERFLOW_RELEASE_FACTOR: f64 = 1.5;

/// Volume delivered by a constant inflow over `hours`, in Mcft.
#[inline]
pub fn inflow_volume_mcft(inflow_cusecs: f64, hours: f64) -> f64 {
    inflow_cusecs * SECONDS_PER_HOUR * hours / CUBIC_FEET_PER_MCFT
}

/// Arithmetic core; every argument has already been validated.
fn step(
    capacity: f64,
    current_level: f64,
    river_design_capacity: f64,
    river_current_flow: f64,
    inflow_cusecs: f64,
    hours: f64,
) -> StepOutcome {
    let mut new_level = current_level + inflow_volume_mcft(inflow_cusecs, hours);
    let overflow = new_level > capacity;
    if overflow {
        // Spilled volume is not tracked; it shows up as river flow below.
        new_level = capacity;
    }

    let mut new_flow = river_current_flow + inflow_cusecs * BASE_FLOW_SHARE;
    if overflow {
        new_flow += inflow_cusecs * OVERFLOW_RELEASE_FACTOR;
    }

    StepOutcome {
        new_level,
        new_flow,
        overflow,
        pct_full: new_level / capacity * 100.0,
        river_status: classify_river(new_flow, river_design_capacity),
    }
}

fn check_step_inputs(inflow_cusecs: f64, hours: f64) -> Result<(), HydrologyError> {
    let inflow = require_finite("inflow", inflow_cusecs)?;
    let hours = require_finite("hours", hours)?;
    if inflow < 0.0 {
        return Err(HydrologyError::InvalidInput(format!(
            "inflow must be >= 0 cusecs, got {}",
            inflow
        )));
    }
    if hours <= 0.0 {
        return Err(HydrologyError::InvalidInput(format!(
            "time step must be > 0 hours, got {}",
            hours
        )));
    }
    Ok(())
}

/// Advance a validated reservoir/river pair by one step of constant inflow.
///
/// The returned level always lies in `[current_level, capacity]`.
pub fn step_reservoir(
    reservoir: &ReservoirState,
    river: &RiverState,
    inflow_cusecs: f64,
    hours: f64,
) -> Result<StepOutcome, HydrologyError> {
    check_step_inputs(inflow_cusecs, hours)?;
    Ok(step(
        reservoir.capacity_mcft(),
        reservoir.current_level_mcft(),
        river.design_capacity_cusecs(),
        river.current_flow_cusecs(),
        inflow_cusecs,
        hours,
    ))
}

/// Advance reservoir level and river flow by one time step from raw numbers.
///
/// 1. `volume = inflow * 3600 * hours / 1e6` (Mcft)
/// 2. `level = current + volume`, clamped to capacity on overflow
/// 3. `flow = river_flow + inflow * 0.2`, plus `inflow * 1.5` on overflow
/// 4. `pct_full = level / capacity * 100`
///
/// # Errors
/// * `InvalidConfiguration` for a zero, negative or non-finite capacity
/// * `InvalidInput` for a negative inflow, a non-positive step, or NaN values
pub fn advance_time_step(
    capacity: f64,
    current_level: f64,
    river_design_capacity: f64,
    river_current_flow: f64,
    inflow_cusecs: f64,
    hours: f64,
) -> Result<StepOutcome, HydrologyError> {
    let reservoir = ReservoirState::new("reservoir", capacity, current_level)?;
    let river = RiverState::new("river", river_design_capacity, river_current_flow)?;
    step_reservoir(&reservoir, &river, inflow_cusecs, hours)
}
