//! River status classification.
//!
//! A plain threshold classifier with no hysteresis: a flow hovering at a
//! boundary flips status on every evaluation.

use crate::models::RiverStatus;

/// Flow/design ratio strictly above which a river is in Warning.
pub const WARNING_RATIO: f64 = 0.7;
/// Flow/design ratio strictly above which a river is Critical.
pub const CRITICAL_RATIO: f64 = 0.9;

#[inline]
pub fn flow_ratio(current_flow_cusecs: f64, design_capacity_cusecs: f64) -> f64 {
    current_flow_cusecs / design_capacity_cusecs
}

/// Classify a river from its current flow.
///
/// Expects a positive design capacity, which `RiverState::new` guarantees.
pub fn classify_river(current_flow_cusecs: f64, design_capacity_cusecs: f64) -> RiverStatus {
    let ratio = flow_ratio(current_flow_cusecs, design_capacity_cusecs);
    if ratio > CRITICAL_RATIO {
        RiverStatus::Critical
    } else if ratio > WARNING_RATIO {
        RiverStatus::Warning
    } else {
        RiverStatus::Normal
    }
}
