//! Delay state machine
//!
//! Each tick, with a small per-bus probability, a bus's delay state is
//! resampled from a weighted distribution over the three states and a
//! state-consistent delay magnitude is drawn. Transitions are memoryless:
//! there is no recovery or decay rule, and a resample may land on the
//! current state (which still redraws the magnitude).
//!
//! The state also determines the speed factor consumed by kinematics.
//! [`speed_factor`] is the single source of that mapping.

use serde::{Deserialize, Serialize};

use crate::models::bus::BusStatus;
use crate::rng::SimRng;

/// Speed factor for a delay state.
///
/// The sole coupling between the state machine and kinematics.
pub const fn speed_factor(status: BusStatus) -> f64 {
    match status {
        BusStatus::OnTime => 1.0,
        BusStatus::MinorDelay => 0.6,
        BusStatus::CriticalDelay => 0.2,
    }
}

/// Inclusive delay band for one state, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBand {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl DelayBand {
    pub const fn new(min_minutes: i64, max_minutes: i64) -> Self {
        Self {
            min_minutes,
            max_minutes,
        }
    }

    /// Whether a magnitude lies inside the band.
    pub fn contains(&self, minutes: f64) -> bool {
        minutes >= self.min_minutes as f64 && minutes <= self.max_minutes as f64
    }
}

/// State machine tuning.
///
/// Defaults are the production dashboard's constants; they are exposed as
/// configuration so different fleet scales can retune without code changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Per-bus per-tick probability that the state is resampled.
    pub transition_probability: f64,

    /// Weight of the critical-delay outcome. Least likely by default.
    pub critical_weight: f64,

    /// Weight of the minor-delay outcome. The remaining mass goes to
    /// on-time.
    pub minor_weight: f64,

    pub on_time_band: DelayBand,
    pub minor_band: DelayBand,
    pub critical_band: DelayBand,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            transition_probability: 0.01,
            critical_weight: 0.1,
            minor_weight: 0.3,
            on_time_band: DelayBand::new(0, 4),
            minor_band: DelayBand::new(5, 14),
            critical_band: DelayBand::new(15, 45),
        }
    }
}

impl DelayConfig {
    /// The delay band associated with a state.
    pub fn band(&self, status: BusStatus) -> DelayBand {
        match status {
            BusStatus::OnTime => self.on_time_band,
            BusStatus::MinorDelay => self.minor_band,
            BusStatus::CriticalDelay => self.critical_band,
        }
    }

    /// Validate tuning values. Returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if !self.transition_probability.is_finite()
            || !(0.0..=1.0).contains(&self.transition_probability)
        {
            return Err(format!(
                "transition_probability must be in [0, 1], got {}",
                self.transition_probability
            ));
        }
        if !self.critical_weight.is_finite() || self.critical_weight < 0.0 {
            return Err("critical_weight must be non-negative".to_string());
        }
        if !self.minor_weight.is_finite() || self.minor_weight < 0.0 {
            return Err("minor_weight must be non-negative".to_string());
        }
        if self.critical_weight + self.minor_weight > 1.0 {
            return Err(format!(
                "critical_weight + minor_weight must not exceed 1.0, got {}",
                self.critical_weight + self.minor_weight
            ));
        }
        for (name, band) in [
            ("on_time_band", self.on_time_band),
            ("minor_band", self.minor_band),
            ("critical_band", self.critical_band),
        ] {
            if band.min_minutes < 0 || band.min_minutes > band.max_minutes {
                return Err(format!(
                    "{name} must satisfy 0 <= min <= max, got [{}, {}]",
                    band.min_minutes, band.max_minutes
                ));
            }
        }
        Ok(())
    }
}

/// Draw a state from the weighted distribution.
pub fn sample_status(config: &DelayConfig, rng: &mut SimRng) -> BusStatus {
    let r = rng.next_f64();
    if r < config.critical_weight {
        BusStatus::CriticalDelay
    } else if r < config.critical_weight + config.minor_weight {
        BusStatus::MinorDelay
    } else {
        BusStatus::OnTime
    }
}

/// Draw a delay magnitude uniformly from a band, in whole minutes.
pub fn sample_delay_minutes(band: DelayBand, rng: &mut SimRng) -> f64 {
    rng.range_i64(band.min_minutes, band.max_minutes + 1) as f64
}

/// One tick of the state machine for one bus.
///
/// Returns the new state and its magnitude when the resample fires, `None`
/// otherwise. The returned state may equal the current one; the magnitude
/// is freshly drawn either way.
pub fn maybe_transition(config: &DelayConfig, rng: &mut SimRng) -> Option<(BusStatus, f64)> {
    if !rng.chance(config.transition_probability) {
        return None;
    }
    let status = sample_status(config, rng);
    let minutes = sample_delay_minutes(config.band(status), rng);
    Some((status, minutes))
}
