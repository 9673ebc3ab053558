//! Compound storm trigger
//!
//! Combines the two metric windows into the storm signal: temperature
//! decaying AND light raising, both over a full window. The condition is
//! kept exactly as the original system evaluated it, even though it reads
//! inverted against the alert wording (see DESIGN.md).

use crate::trend::{is_decaying, is_raising};
use crate::window::SampleWindow;

/// Per-cycle classification of both metric windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StormAssessment {
    pub temperature_decaying: bool,
    pub temperature_full: bool,
    pub light_raising: bool,
    pub light_full: bool,
}

impl StormAssessment {
    /// All four conjuncts hold: the storm signal fires
    pub fn storm_detected(&self) -> bool {
        self.temperature_decaying && self.temperature_full && self.light_raising && self.light_full
    }

    /// Informational side signal: temperature trend alone matched
    pub fn temperature_warning(&self) -> bool {
        self.temperature_decaying && self.temperature_full
    }

    /// Informational side signal: light trend alone matched
    pub fn light_warning(&self) -> bool {
        self.light_raising && self.light_full
    }
}

/// Evaluate both windows against the storm signature
pub fn assess(temperature: &SampleWindow, light: &SampleWindow) -> StormAssessment {
    StormAssessment {
        temperature_decaying: is_decaying(&temperature.values()),
        temperature_full: temperature.is_full(),
        light_raising: is_raising(&light.values()),
        light_full: light.is_full(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn window(capacity: usize, values: &[i64]) -> SampleWindow {
        let mut w = SampleWindow::new(capacity).unwrap();
        for v in values {
            w.push(Decimal::from(*v));
        }
        w
    }

    #[test]
    fn test_storm_signature_detected() {
        let temp = window(3, &[30, 28, 25]);
        let light = window(3, &[10, 15, 20]);

        let assessment = assess(&temp, &light);
        assert!(assessment.storm_detected());
        assert!(assessment.temperature_warning());
        assert!(assessment.light_warning());
    }

    #[test]
    fn test_both_decaying_is_not_a_storm() {
        let temp = window(3, &[30, 28, 25]);
        let light = window(3, &[20, 15, 10]);

        let assessment = assess(&temp, &light);
        assert!(!assessment.storm_detected());
        assert!(assessment.temperature_warning());
        assert!(!assessment.light_warning());
    }

    #[test]
    fn test_partial_window_never_triggers() {
        // Perfect trend shapes, but only two of three samples accumulated
        let temp = window(3, &[30, 25]);
        let light = window(3, &[10, 20]);

        let assessment = assess(&temp, &light);
        assert!(!assessment.storm_detected());
        assert!(!assessment.temperature_warning());
        assert!(!assessment.light_warning());
    }

    #[test]
    fn test_one_sided_match_does_not_trigger() {
        let temp = window(3, &[25, 28, 30]); // raising, wrong side
        let light = window(3, &[10, 15, 20]);

        let assessment = assess(&temp, &light);
        assert!(!assessment.storm_detected());
        assert!(assessment.light_warning());
        assert!(!assessment.temperature_warning());
    }
}
