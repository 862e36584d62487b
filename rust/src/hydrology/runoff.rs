//! Rainfall to surface runoff.

/// Unit scale folding mm/hr over sq km into cusecs (simplified rational method).
pub const RUNOFF_SCALE: f64 = 0.5;

/// Convert rainfall over a catchment into runoff.
///
/// Formula: `floor(rainfall * area * (efficiency / 100) * 0.5)`
///
/// Efficiency is a percentage and is not clamped; keeping it in `[0, 100]`
/// is the caller's job. With non-negative inputs the result is never negative.
pub fn compute_runoff(rainfall_mm_hr: f64, area_sq_km: f64, efficiency_percent: f64) -> i64 {
    let coefficient = efficiency_percent / 100.0;
    (rainfall_mm_hr * area_sq_km * coefficient * RUNOFF_SCALE).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catchment() {
        // 15 * 426 * 0.6 * 0.5 = 1917
        assert_eq!(compute_runoff(15.0, 426.0, 60.0), 1917);
        // 180 * 426 * 0.95 * 0.5 = 36423
        assert_eq!(compute_runoff(180.0, 426.0, 95.0), 36423);
    }

    #[test]
    fn test_truncates_fraction() {
        // 1 * 3 * 1.0 * 0.5 = 1.5
        assert_eq!(compute_runoff(1.0, 3.0, 100.0), 1);
        assert_eq!(compute_runoff(1.0, 1.0, 50.0), 0);
    }

    #[test]
    fn test_zero_rain_gives_zero() {
        for area in [0.0, 1.0, 426.0, 10_000.0] {
            for efficiency in [0.0, 35.0, 60.0, 100.0] {
                assert_eq!(compute_runoff(0.0, area, efficiency), 0);
            }
        }
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let steps = [0.0, 0.5, 1.0, 7.5, 15.0, 40.0, 110.0, 280.0];
        for pair in steps.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            assert!(compute_runoff(lo, 426.0, 60.0) <= compute_runoff(hi, 426.0, 60.0));
            assert!(compute_runoff(25.0, lo, 60.0) <= compute_runoff(25.0, hi, 60.0));
            assert!(compute_runoff(25.0, 426.0, lo.min(100.0)) <= compute_runoff(25.0, 426.0, hi.min(100.0)));
        }
    }
}
