//! Cost-efficiency scoring for infrastructure proposals.
//!
//! A proposal with bad business numbers (zero cost, impact outside 1-10) is
//! classified `Invalid` and returned normally. Only non-numeric input
//! (NaN, infinity) is an error.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cost per impact point at or below which a proposal is High Value (Cr).
pub const HIGH_VALUE_MAX_RATIO: f64 = 5.0;
/// Cost per impact point strictly above which a proposal is Low Efficiency (Cr).
pub const LOW_EFFICIENCY_MIN_RATIO: f64 = 20.0;
pub const MAX_IMPACT_SCORE: f64 = 10.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProposalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EfficiencyTier {
    #[serde(rename = "Invalid")]
    Invalid,
    #[serde(rename = "Low Efficiency")]
    LowEfficiency,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "High Value")]
    HighValue,
}

impl EfficiencyTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::LowEfficiency => "Low Efficiency",
            Self::Moderate => "Moderate",
            Self::HighValue => "High Value",
        }
    }
}

#[pymethods]
impl EfficiencyTier {
    #[pyo3(name = "label")]
    fn py_label(&self) -> &'static str {
        self.label()
    }
}

/// Validation outcome for one proposal.
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalAssessment {
    #[pyo3(get)]
    pub is_valid: bool,
    #[pyo3(get)]
    pub tier: EfficiencyTier,
    /// Cost per impact point; `None` when the proposal is invalid.
    #[pyo3(get)]
    pub ratio: Option<f64>,
}

#[pymethods]
impl ProposalAssessment {
    fn __repr__(&self) -> String {
        format!(
            "ProposalAssessment(is_valid={}, tier={:?}, ratio={:?})",
            self.is_valid,
            self.tier.label(),
            self.ratio
        )
    }
}

fn tier_for_ratio(ratio: f64) -> EfficiencyTier {
    if ratio <= HIGH_VALUE_MAX_RATIO {
        EfficiencyTier::HighValue
    } else if ratio > LOW_EFFICIENCY_MIN_RATIO {
        EfficiencyTier::LowEfficiency
    } else {
        EfficiencyTier::Moderate
    }
}

/// Classify a proposal by cost (crores) per impact point.
///
/// - cost <= 0, impact <= 0 or impact > 10: invalid
/// - ratio <= 5: High Value (inclusive)
/// - ratio > 20: Low Efficiency (exclusive)
/// - otherwise: Moderate
pub fn validate_proposal(cost_cr: f64, impact_score: f64) -> Result<ProposalAssessment, ProposalError> {
    if !cost_cr.is_finite() || !impact_score.is_finite() {
        return Err(ProposalError::InvalidInput(format!(
            "cost and impact must be finite numbers, got cost={} impact={}",
            cost_cr, impact_score
        )));
    }

    if cost_cr <= 0.0 || impact_score <= 0.0 || impact_score > MAX_IMPACT_SCORE {
        return Ok(ProposalAssessment {
            is_valid: false,
            tier: EfficiencyTier::Invalid,
            ratio: None,
        });
    }

    let ratio = cost_cr / impact_score;
    Ok(ProposalAssessment {
        is_valid: true,
        tier: tier_for_ratio(ratio),
        ratio: Some(ratio),
    })
}

/// Extract the amount from a budget label such as `"₹120 Cr"` or `"₹12.5 Cr"`.
///
/// Takes the first decimal number in the text; `None` if there is none.
pub fn parse_crores(label: &str) -> Option<f64> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.trim_end_matches('.').parse::<f64>().ok()
}

/// Lifecycle of an infrastructure plan.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStatus {
    Draft,
    Proposed,
    UnderReview,
    Approved,
    Active,
    Completed,
}

impl PlanStatus {
    /// Plans whose budget counts as allocated.
    fn is_funded(&self) -> bool {
        matches!(self, Self::Approved | Self::Active)
    }
}

/// Budget and progress of one plan in a capital portfolio.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    #[pyo3(get, set)]
    pub estimated_cost_cr: f64,
    #[pyo3(get, set)]
    pub spent_cr: f64,
    #[pyo3(get, set)]
    pub status: PlanStatus,
    /// Percent complete (0-100).
    #[pyo3(get, set)]
    pub progress: f64,
}

#[pymethods]
impl PortfolioEntry {
    #[new]
    #[pyo3(signature = (estimated_cost_cr, status, spent_cr=0.0, progress=0.0))]
    fn py_new(estimated_cost_cr: f64, status: PlanStatus, spent_cr: f64, progress: f64) -> Self {
        Self {
            estimated_cost_cr,
            spent_cr,
            status,
            progress,
        }
    }
}

/// Aggregate budget figures for a capital portfolio.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    #[pyo3(get)]
    pub allocated_cr: f64,
    #[pyo3(get)]
    pub spent_cr: f64,
    /// Rounded percent of allocated budget already spent.
    #[pyo3(get)]
    pub percent_spent: f64,
    /// Rounded mean progress of active plans.
    #[pyo3(get)]
    pub avg_progress: f64,
    #[pyo3(get)]
    pub active_count: usize,
}

/// Sum allocated/spent budget over funded plans and average active progress.
pub fn portfolio_metrics(entries: &[PortfolioEntry]) -> PortfolioMetrics {
    let (allocated, spent) = entries
        .iter()
        .filter(|e| e.status.is_funded())
        .fold((0.0, 0.0), |(a, s), e| (a + e.estimated_cost_cr, s + e.spent_cr));

    let active: Vec<&PortfolioEntry> = entries
        .iter()
        .filter(|e| e.status == PlanStatus::Active)
        .collect();
    let avg_progress = if active.is_empty() {
        0.0
    } else {
        (active.iter().map(|e| e.progress).sum::<f64>() / active.len() as f64).round()
    };

    PortfolioMetrics {
        allocated_cr: allocated,
        spent_cr: spent,
        percent_spent: if allocated > 0.0 {
            (spent / allocated * 100.0).round()
        } else {
            0.0
        },
        avg_progress,
        active_count: active.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_five_is_high_value() {
        let result = validate_proposal(45.0, 9.0).unwrap();
        assert!(result.is_valid);
        assert_eq!(result.tier, EfficiencyTier::HighValue);
        assert_eq!(result.ratio, Some(5.0));
    }

    #[test]
    fn test_ratio_twenty_is_moderate() {
        let result = validate_proposal(200.0, 10.0).unwrap();
        assert_eq!(result.tier, EfficiencyTier::Moderate);

        let result = validate_proposal(201.0, 10.0).unwrap();
        assert_eq!(result.tier, EfficiencyTier::LowEfficiency);
    }

    #[test]
    fn test_moderate_band() {
        // 120 / 9 = 13.3
        assert_eq!(validate_proposal(120.0, 9.0).unwrap().tier, EfficiencyTier::Moderate);
        // 80 / 7 = 11.4
        assert_eq!(validate_proposal(80.0, 7.0).unwrap().tier, EfficiencyTier::Moderate);
        assert_eq!(validate_proposal(5.5, 1.0).unwrap().tier, EfficiencyTier::Moderate);
    }

    #[test]
    fn test_invalid_business_input_is_classified() {
        for (cost, impact) in [
            (0.0, 5.0),
            (-10.0, 5.0),
            (10.0, 0.0),
            (10.0, -1.0),
            (10.0, 10.5),
            (1.0, 11.0),
        ] {
            let result = validate_proposal(cost, impact).unwrap();
            assert!(!result.is_valid, "cost={} impact={}", cost, impact);
            assert_eq!(result.tier, EfficiencyTier::Invalid);
            assert_eq!(result.ratio, None);
        }
        // Impact of exactly 10 is allowed
        assert!(validate_proposal(10.0, 10.0).unwrap().is_valid);
    }

    #[test]
    fn test_non_finite_is_error() {
        assert!(validate_proposal(f64::NAN, 5.0).is_err());
        assert!(validate_proposal(10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_tier_labels_serialize() {
        let json = serde_json::to_string(&EfficiencyTier::HighValue).unwrap();
        assert_eq!(json, "\"High Value\"");
        assert_eq!(EfficiencyTier::LowEfficiency.label(), "Low Efficiency");
    }

    #[test]
    fn test_parse_crores() {
        assert_eq!(parse_crores("₹120 Cr"), Some(120.0));
        assert_eq!(parse_crores("₹12.5 Cr"), Some(12.5));
        assert_eq!(parse_crores("₹1,200 Cr"), Some(1200.0));
        assert_eq!(parse_crores("45"), Some(45.0));
        assert_eq!(parse_crores("TBD"), None);
        assert_eq!(parse_crores(""), None);
    }

    #[test]
    fn test_portfolio_metrics() {
        let entries = vec![
            PortfolioEntry {
                estimated_cost_cr: 120.0,
                spent_cr: 54.0,
                status: PlanStatus::Active,
                progress: 45.0,
            },
            PortfolioEntry {
                estimated_cost_cr: 45.0,
                spent_cr: 38.0,
                status: PlanStatus::Active,
                progress: 78.0,
            },
            PortfolioEntry {
                estimated_cost_cr: 80.0,
                spent_cr: 0.0,
                status: PlanStatus::Proposed,
                progress: 0.0,
            },
        ];
        let metrics = portfolio_metrics(&entries);
        assert!((metrics.allocated_cr - 165.0).abs() < 1e-9);
        assert!((metrics.spent_cr - 92.0).abs() < 1e-9);
        // 92 / 165 = 55.8%
        assert!((metrics.percent_spent - 56.0).abs() < 1e-9);
        // (45 + 78) / 2 = 61.5
        assert!((metrics.avg_progress - 62.0).abs() < 1e-9);
        assert_eq!(metrics.active_count, 2);
    }

    #[test]
    fn test_empty_portfolio() {
        assert_eq!(portfolio_metrics(&[]), PortfolioMetrics::default());
    }
}
