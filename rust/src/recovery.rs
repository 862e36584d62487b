//! Rescue-task prioritization for flood-impacted locations.
//!
//! Additive point model:
//! - depth: > 5 ft → 50, > 2 ft → 30, otherwise 10
//! - location: hospital → 40, residential → 20, anything else → 10
//! - population: > 1000 → 20, > 100 → 10, otherwise 0
//!
//! Totals map to tiers at 80 (Critical), 50 (High) and 30 (Medium).

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when scoring a rescue task.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriorityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Kind of site reported in an incident.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    Hospital,
    Residential,
    Road,
    Other,
}

impl LocationType {
    /// Parse a free-form location type; anything unrecognised is `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hospital" => Self::Hospital,
            "residential" => Self::Residential,
            "road" => Self::Road,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::Residential => "Residential",
            Self::Road => "Road",
            Self::Other => "Other",
        }
    }

    fn points(&self) -> u32 {
        match self {
            Self::Hospital => 40,
            Self::Residential => 20,
            Self::Road | Self::Other => 10,
        }
    }
}

/// Discrete rescue urgency. Ordered from least to most urgent.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

const CRITICAL_SCORE: u32 = 80;
const HIGH_SCORE: u32 = 50;
const MEDIUM_SCORE: u32 = 30;

fn depth_points(depth_ft: f64) -> u32 {
    if depth_ft > 5.0 {
        50
    } else if depth_ft > 2.0 {
        30
    } else {
        10
    }
}

fn population_points(population_affected: i64) -> u32 {
    if population_affected > 1000 {
        20
    } else if population_affected > 100 {
        10
    } else {
        0
    }
}

fn check_inputs(depth_ft: f64, population_affected: i64) -> Result<(), PriorityError> {
    if !depth_ft.is_finite() || depth_ft < 0.0 {
        return Err(PriorityError::InvalidInput(format!(
            "water depth must be a non-negative number of feet, got {}",
            depth_ft
        )));
    }
    if population_affected < 0 {
        return Err(PriorityError::InvalidInput(format!(
            "affected population must be >= 0, got {}",
            population_affected
        )));
    }
    Ok(())
}

/// Total urgency points for an incident.
pub fn priority_score(
    depth_ft: f64,
    location_type: LocationType,
    population_affected: i64,
) -> Result<u32, PriorityError> {
    check_inputs(depth_ft, population_affected)?;
    Ok(depth_points(depth_ft) + location_type.points() + population_points(population_affected))
}

/// Map a point total to its tier.
pub fn tier_for_score(score: u32) -> PriorityTier {
    if score >= CRITICAL_SCORE {
        PriorityTier::Critical
    } else if score >= HIGH_SCORE {
        PriorityTier::High
    } else if score >= MEDIUM_SCORE {
        PriorityTier::Medium
    } else {
        PriorityTier::Low
    }
}

/// Score an incident's rescue urgency.
///
/// # Errors
/// * `InvalidInput` for negative or non-finite depth, or negative population
pub fn score_priority(
    depth_ft: f64,
    location_type: LocationType,
    population_affected: i64,
) -> Result<PriorityTier, PriorityError> {
    priority_score(depth_ft, location_type, population_affected).map(tier_for_score)
}

/// Score and tier together, for callers that display both.
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriorityAssessment {
    #[pyo3(get)]
    pub score: u32,
    #[pyo3(get)]
    pub tier: PriorityTier,
}

pub fn assess_priority(
    depth_ft: f64,
    location_type: LocationType,
    population_affected: i64,
) -> Result<PriorityAssessment, PriorityError> {
    let score = priority_score(depth_ft, location_type, population_affected)?;
    Ok(PriorityAssessment {
        score,
        tier: tier_for_score(score),
    })
}

/// A reported incident with its priority fixed at assessment time.
///
/// The tier is a snapshot: it is not re-derived if conditions on the
/// ground change later. Re-assess to get a fresh one.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryTask {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub location: String,
    #[pyo3(get)]
    pub depth_ft: f64,
    #[pyo3(get)]
    pub location_type: LocationType,
    #[pyo3(get)]
    pub population_affected: i64,
    #[pyo3(get)]
    pub score: u32,
    #[pyo3(get)]
    pub priority: PriorityTier,
    #[pyo3(get)]
    pub reported_at: NaiveDateTime,
}

impl RecoveryTask {
    pub fn assess(
        id: impl Into<String>,
        location: impl Into<String>,
        depth_ft: f64,
        location_type: LocationType,
        population_affected: i64,
        reported_at: NaiveDateTime,
    ) -> Result<Self, PriorityError> {
        let assessment = assess_priority(depth_ft, location_type, population_affected)?;
        Ok(Self {
            id: id.into(),
            location: location.into(),
            depth_ft,
            location_type,
            population_affected,
            score: assessment.score,
            priority: assessment.tier,
            reported_at,
        })
    }
}

#[pymethods]
impl RecoveryTask {
    #[new]
    fn py_new(
        id: String,
        location: String,
        depth_ft: f64,
        location_type: LocationType,
        population_affected: i64,
        reported_at: NaiveDateTime,
    ) -> PyResult<Self> {
        Self::assess(id, location, depth_ft, location_type, population_affected, reported_at)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "RecoveryTask(id={:?}, priority={}, score={})",
            self.id,
            self.priority.as_str(),
            self.score
        )
    }
}

/// Order task ids for dispatch, most urgent first.
///
/// Sort key: tier (desc), score (desc), earliest report first, then id.
pub fn rank_tasks(tasks: &[RecoveryTask]) -> Vec<String> {
    let mut ordered: Vec<&RecoveryTask> = tasks.iter().collect();
    ordered.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.score.cmp(&a.score))
            .then(a.reported_at.cmp(&b.reported_at))
            .then(a.id.cmp(&b.id))
    });
    ordered.into_iter().map(|t| t.id.clone()).collect()
}

/// Count tasks per tier; tiers with no tasks are absent.
pub fn tally_by_tier(tasks: &[RecoveryTask]) -> FxHashMap<PriorityTier, usize> {
    let mut counts: FxHashMap<PriorityTier, usize> = FxHashMap::default();
    for task in tasks {
        *counts.entry(task.priority).or_insert(0) += 1;
    }
    counts
}

/// Critical tasks only, in dispatch order.
pub fn critical_watch(tasks: &[RecoveryTask]) -> Vec<RecoveryTask> {
    let mut critical: Vec<RecoveryTask> = tasks
        .iter()
        .filter(|t| t.priority == PriorityTier::Critical)
        .cloned()
        .collect();
    critical.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.reported_at.cmp(&b.reported_at))
            .then(a.id.cmp(&b.id))
    });
    critical
}
