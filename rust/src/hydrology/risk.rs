//! Scenario risk bands against a city's rainfall thresholds.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::CityProfile;

/// Saturation at or below which a rainless scenario is a severe drought.
const SEVERE_DROUGHT_SATURATION: f64 = 10.0;
/// Saturation at or below which a rainless scenario means water stress.
const WATER_STRESS_SATURATION: f64 = 25.0;

#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    SevereFlooding,
    LocalizedInundation,
    SevereDrought,
    WaterStress,
    Manageable,
    Stable,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SevereFlooding => "Severe Flooding",
            Self::LocalizedInundation => "Localized Inundation",
            Self::SevereDrought => "Severe Drought",
            Self::WaterStress => "Water Stress",
            Self::Manageable => "Manageable",
            Self::Stable => "Normal / Stable",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SevereFlooding => "Critical infrastructure failure likely",
            Self::LocalizedInundation => "Drainage capacity exceeded",
            Self::SevereDrought => "Acute water scarcity. Aquifers depleted.",
            Self::WaterStress => "Reservoir evaporation high.",
            Self::Manageable => "Standard operations",
            Self::Stable => "No active weather event",
        }
    }
}

#[pymethods]
impl RiskLevel {
    #[pyo3(name = "label")]
    fn py_label(&self) -> &'static str {
        self.label()
    }

    #[pyo3(name = "description")]
    fn py_description(&self) -> &'static str {
        self.description()
    }
}

/// Band a scenario's rainfall and soil saturation for a given city.
///
/// Flood bands are checked first, then the drought bands, which only apply
/// when there is no rain at all.
pub fn assess_risk(profile: &CityProfile, rainfall_mm_hr: f64, soil_saturation_percent: f64) -> RiskLevel {
    if rainfall_mm_hr > profile.rainfall_threshold_mm_hr {
        RiskLevel::SevereFlooding
    } else if rainfall_mm_hr > profile.operational_limit_mm_hr {
        RiskLevel::LocalizedInundation
    } else if rainfall_mm_hr == 0.0 && soil_saturation_percent <= SEVERE_DROUGHT_SATURATION {
        RiskLevel::SevereDrought
    } else if rainfall_mm_hr == 0.0 && soil_saturation_percent <= WATER_STRESS_SATURATION {
        RiskLevel::WaterStress
    } else if rainfall_mm_hr > 0.0 {
        RiskLevel::Manageable
    } else {
        RiskLevel::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CityCatalog;

    #[test]
    fn test_chennai_bands() {
        let catalog = CityCatalog::builtin();
        let chennai = catalog.get_or_default("chennai");

        assert_eq!(assess_risk(chennai, 110.0, 95.0), RiskLevel::SevereFlooding);
        assert_eq!(assess_risk(chennai, 79.0, 95.0), RiskLevel::LocalizedInundation);
        assert_eq!(assess_risk(chennai, 32.0, 50.0), RiskLevel::Manageable);
        assert_eq!(assess_risk(chennai, 0.0, 5.0), RiskLevel::SevereDrought);
        assert_eq!(assess_risk(chennai, 0.0, 10.0), RiskLevel::SevereDrought);
        assert_eq!(assess_risk(chennai, 0.0, 20.0), RiskLevel::WaterStress);
        assert_eq!(assess_risk(chennai, 0.0, 40.0), RiskLevel::Stable);
    }

    #[test]
    fn test_thresholds_are_city_specific() {
        let catalog = CityCatalog::builtin();
        // 45 mm/hr floods T. Nagar but is manageable nationally
        assert_eq!(
            assess_risk(catalog.get_or_default("tnagar"), 45.0, 60.0),
            RiskLevel::SevereFlooding
        );
        assert_eq!(
            assess_risk(catalog.get_or_default("india"), 45.0, 60.0),
            RiskLevel::Manageable
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskLevel::Stable.label(), "Normal / Stable");
        assert_eq!(RiskLevel::LocalizedInundation.description(), "Drainage capacity exceeded");
    }
}
