//! External predictor collaborator
//!
//! The dashboard layers above the engine consult trained delay/demand/
//! anomaly models. The engine itself never calls them; this module only
//! fixes the seam so those layers can be written against a trait, and
//! ships the rule-based fallback used when no trained model is loaded.

use crate::rng::SimRng;

/// Peak travel windows, inclusive hour ranges.
const MORNING_PEAK: (u8, u8) = (8, 10);
const EVENING_PEAK: (u8, u8) = (17, 19);

/// Delay/demand/anomaly predictions consumed above the core.
pub trait Predictor: Send + Sync {
    /// Predicted delay in minutes for a route at a given hour and weekday.
    fn predict_delay(&self, route_id: &str, hour: u8, day_of_week: u8) -> f64;

    /// Forecast passenger demand for a route at a given hour.
    fn forecast_demand(&self, route_id: &str, hour: u8) -> i64;

    /// Whether the observed bus readings look anomalous.
    fn detect_anomaly(&self, occupancy: i64, delay_minutes: f64, speed_kmh: f64) -> bool;
}

/// Rule-based fallback predictor.
///
/// Draws are seeded per route and hour, so repeated queries for the same
/// slot give the same answer within a process configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor {
    seed: u64,
}

impl HeuristicPredictor {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, route_id: &str, salt: u64) -> SimRng {
        let mut state = self.seed;
        for byte in route_id.bytes() {
            state = state.wrapping_mul(31).wrapping_add(u64::from(byte));
        }
        SimRng::new(state ^ salt.wrapping_mul(0x9E3779B97F4A7C15))
    }
}

fn is_peak_hour(hour: u8) -> bool {
    (MORNING_PEAK.0..=MORNING_PEAK.1).contains(&hour)
        || (EVENING_PEAK.0..=EVENING_PEAK.1).contains(&hour)
}

impl Predictor for HeuristicPredictor {
    fn predict_delay(&self, route_id: &str, hour: u8, day_of_week: u8) -> f64 {
        let mut rng = self.rng_for(route_id, u64::from(hour) + 24 * u64::from(day_of_week));
        let minutes = rng.range_f64(0.0, 15.0);
        (minutes * 10.0).round() / 10.0
    }

    fn forecast_demand(&self, route_id: &str, hour: u8) -> i64 {
        let mut rng = self.rng_for(route_id, 1000 + u64::from(hour));
        if is_peak_hour(hour) {
            rng.range_i64(50, 101)
        } else {
            rng.range_i64(10, 41)
        }
    }

    fn detect_anomaly(&self, occupancy: i64, delay_minutes: f64, speed_kmh: f64) -> bool {
        occupancy > 95 || delay_minutes > 30.0 || speed_kmh < 5.0
    }
}
