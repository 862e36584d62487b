//! Verbosity-gated diagnostics for the simulation and scoring core.
//!
//! Nothing is printed when verbosity is 0, so the pure paths stay silent.
//! Levels:
//! - 0: SILENT (nothing)
//! - 1: CHANGES (mode switches, overflow events, tier decisions)
//! - 2: CHECKS (threshold comparisons)
//! - 3: DEBUG (intermediate arithmetic)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: flood/drought mode selection, reservoir overflow, alert emission.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!("[hydroguard] {}", format_args!($($arg)*));
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: ratio thresholds, risk bands, probe pass/fail reasons.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!("[hydroguard:check] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[hydroguard:debug] {}", format_args!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_CHANGES);
        assert!(VERBOSITY_CHANGES < VERBOSITY_CHECKS);
        assert!(VERBOSITY_CHECKS < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_silent_macros_expand() {
        let verbosity = VERBOSITY_SILENT;
        log_changes!(verbosity, "mode {}", "flood");
        log_checks!(verbosity, "ratio {:.2}", 0.75);
        log_debug!(verbosity, "inflow {}", 1917);
    }
}
